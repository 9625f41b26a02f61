//! algochain: librería fachada del workspace.
//!
//! - Expone `errors` con el error de nivel aplicación (`CoreError`).
//! - Reexporta los crates del motor para que los binarios dependan de uno solo.
//!
//! Puede usarse desde `main.rs` o por otros crates/clientes.

pub mod errors;

pub use chain_algorithms as algorithms;
pub use chain_core as engine;
pub use chain_persistence as persistence;

pub use chain_core::{ChainRequest, ChainResponse, ChainService, RunMode};
pub use errors::CoreError;
