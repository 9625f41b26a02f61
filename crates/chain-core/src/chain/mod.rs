//! Cadenas: definiciones, peticiones, respuestas y ejecución.

pub mod definition;
pub mod executor;
pub mod ordinal;
pub mod request;
pub mod response;
pub mod store;

pub use definition::{ChainDefinition, ParameterBinding, SourceKind, StageDescriptor};
pub use executor::ChainExecutor;
pub use ordinal::{ordinal_index, ordinal_word};
pub use request::{AlgorithmRequest, ChainRequest};
pub use response::ChainResponse;
pub use store::{InMemoryProjectStore, ProjectStore};
