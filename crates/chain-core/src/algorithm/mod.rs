//! Unidades de algoritmo: contrato, adaptador tipado y registro.

pub mod definition;
pub mod macros;
pub mod registry;
pub mod typed;

pub use definition::{Algorithm, AlgorithmResult};
pub use registry::{AlgorithmFactory, AlgorithmRegistry};
pub use typed::TypedAlgorithm;
