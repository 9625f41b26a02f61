//! Ejecución por lotes: la misma cadena repetida sobre un iterador.

pub mod iterator;
pub mod runner;

pub use iterator::{expand_files, expand_range, BatchError, BatchSpec, IterType};
pub use runner::BatchRunner;
