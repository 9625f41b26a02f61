use chain_core::EngineError;
use chain_persistence::PersistenceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Error interno: {0}")]
    Internal(String),
    #[error("Error del motor: {0}")]
    Engine(#[from] EngineError),
    #[error("Error de persistencia: {0}")]
    Persistence(#[from] PersistenceError),
}
