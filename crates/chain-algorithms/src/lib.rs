//! Algoritmos incluidos con el motor y proyecto de ejemplo que los usa.
//!
//! `register_builtin` los da de alta en un `AlgorithmRegistry`; el directorio
//! `project/` contiene sus `algorithm.json` y dos cadenas listas para correr.

use std::path::PathBuf;

use chain_core::params::AlgorithmDefinition;
use chain_core::{AlgorithmRegistry, InMemoryProjectStore};

pub mod math;
pub mod text;

pub use math::{AddNumbers, DivideNumbers, MultiplyNumbers, SubtractNumbers};
pub use text::{OutputText, ReadTextFile};

pub fn register_builtin(registry: &mut AlgorithmRegistry) {
    registry.register_default::<AddNumbers>("add_numbers")
            .register_default::<SubtractNumbers>("subtract_numbers")
            .register_default::<MultiplyNumbers>("multiply_numbers")
            .register_default::<DivideNumbers>("divide_numbers")
            .register_default::<ReadTextFile>("read_text_file")
            .register_default::<OutputText>("output_text");
}

pub fn builtin_registry() -> AlgorithmRegistry {
    let mut registry = AlgorithmRegistry::new();
    register_builtin(&mut registry);
    registry
}

/// Definiciones de todos los algoritmos incluidos.
pub fn definitions() -> Vec<AlgorithmDefinition> {
    let mut defs = math::definitions();
    defs.extend(text::definitions());
    defs
}

/// Store en memoria con las definiciones incluidas y ninguna cadena.
pub fn builtin_store() -> InMemoryProjectStore {
    definitions().into_iter()
                 .fold(InMemoryProjectStore::new(), |store, def| store.with_algorithm(def))
}

/// Proyecto de ejemplo distribuido con el crate.
pub fn sample_project_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("project")
}
