//! Errores de persistencia.
//! Mapea errores de IO / JSON a variantes semánticas y luego a `EngineError`.

use chain_core::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid project layout: {0}")]
    InvalidLayout(String),
    #[error("invalid file name: {0:?}")]
    InvalidFileName(String),
}

impl From<PersistenceError> for EngineError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound(what) => EngineError::Io(format!("not found: {what}")),
            PersistenceError::Io(e) => EngineError::Io(e.to_string()),
            PersistenceError::Json(e) => EngineError::Serialization(e.to_string()),
            PersistenceError::InvalidLayout(msg) => EngineError::Internal(msg),
            PersistenceError::InvalidFileName(name) => EngineError::Io(format!("invalid file name: {name:?}")),
        }
    }
}
