//! Errores del motor de cadenas.
//!
//! Dos familias separadas:
//! - `ChainError`: detiene la cadena en curso (o la iteración de un batch) y
//!   se traduce a una respuesta `error`. Distingue errores de parámetros
//!   (lista estructurada) de errores de negocio (texto libre).
//! - `EngineError`: fallos de infraestructura fuera de una ejecución
//!   (cadena inexistente, IO al persistir historial, etc.).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error de validación de un parámetro concreto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamError {
    pub parameter: String,
    pub message: String,
}

impl ParamError {
    pub fn new(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self { parameter: parameter.into(),
               message: message.into() }
    }
}

/// Error que detiene una cadena.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainError {
    /// Uno o más parámetros no pasaron la validación.
    #[error("Error in parameters")]
    Parameter(Vec<ParamError>),
    /// El algoritmo rechazó la entrada o falló de forma inesperada.
    #[error("{0}")]
    Business(String),
}

impl ChainError {
    /// Atajo para un error de parámetros con una sola entrada.
    pub fn parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        ChainError::Parameter(vec![ParamError::new(parameter, message)])
    }

    /// Atajo para un error de negocio.
    pub fn business(message: impl Into<String>) -> Self {
        ChainError::Business(message.into())
    }

    pub fn is_parameter(&self) -> bool {
        matches!(self, ChainError::Parameter(_))
    }
}

/// Errores de infraestructura del motor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("chain not found: {0}")]
    ChainNotFound(String),
    #[error("algorithm not found: {0}")]
    AlgorithmNotFound(String),
    /// La clave no es un nombre de carpeta simple (vacía, `.`, `..`, con separadores).
    #[error("invalid status key: {0:?}")]
    InvalidStatusKey(String),
    #[error("io: {0}")]
    Io(String),
    #[error("serialization: {0}")]
    Serialization(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}
