//! Expansión de iteradores de batch (`files` y `range`).

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errores terminales antes de ejecutar cualquier iteración.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("Invalid iterator")]
    InvalidIterator,
    #[error("Empty batch")]
    EmptyBatch,
    #[error("Invalid batch parameter")]
    InvalidParameter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IterType {
    /// Expansión glob de `iter_value`; un archivo por iteración.
    Files,
    /// `start,stop[,step]` con `stop` inclusivo.
    Range,
}

impl IterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IterType::Files => "files",
            IterType::Range => "range",
        }
    }
}

impl FromStr for IterType {
    type Err = BatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "files" => Ok(IterType::Files),
            "range" => Ok(IterType::Range),
            _ => Err(BatchError::InvalidIterator),
        }
    }
}

/// Parámetros de un batch tal como los envía el llamador.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSpec {
    /// `<algoritmo>__<parámetro>`
    pub iter_param: String,
    pub iter_type: String,
    pub iter_value: String,
}

impl BatchSpec {
    pub fn new(iter_param: impl Into<String>, iter_type: impl Into<String>, iter_value: impl Into<String>) -> Self {
        Self { iter_param: iter_param.into(),
               iter_type: iter_type.into(),
               iter_value: iter_value.into() }
    }

    /// Valores de cada iteración, en orden.
    pub fn expand(&self) -> Result<Vec<Value>, BatchError> {
        let values = match self.iter_type.parse::<IterType>()? {
            IterType::Files => expand_files(&self.iter_value)?,
            IterType::Range => expand_range(&self.iter_value)?.into_iter().map(Value::from).collect(),
        };
        if values.is_empty() {
            return Err(BatchError::EmptyBatch);
        }
        Ok(values)
    }
}

/// Rutas que casan con el patrón, ordenadas.
pub fn expand_files(pattern: &str) -> Result<Vec<Value>, BatchError> {
    let paths = glob::glob(pattern).map_err(|_| BatchError::InvalidIterator)?;
    let mut files: Vec<String> = paths.filter_map(Result::ok)
                                      .map(|p| p.to_string_lossy().into_owned())
                                      .collect();
    files.sort();
    Ok(files.into_iter().map(Value::String).collect())
}

/// Máximo de iteraciones que acepta un rango.
pub const MAX_RANGE_ITERATIONS: i128 = 100_000;

/// `"a,b"` -> a..=b; `"a,b,s"` -> a, a+s, ... sin pasar de b.
///
/// Rangos que superan `MAX_RANGE_ITERATIONS` se rechazan como iterador
/// inválido. La aritmética se hace en `i128`, así que extremos cercanos a
/// `i64::MAX` no desbordan.
pub fn expand_range(spec: &str) -> Result<Vec<i64>, BatchError> {
    let parts = spec.split(',')
                    .map(|x| x.trim().parse::<i64>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| BatchError::InvalidIterator)?;
    let (start, stop, step) = match parts.as_slice() {
        [start, stop] => (*start as i128, *stop as i128 + 1, 1i128),
        [start, stop, step] => (*start as i128, *stop as i128 + 1, *step as i128),
        _ => return Err(BatchError::InvalidIterator),
    };
    if step == 0 {
        return Err(BatchError::InvalidIterator);
    }
    let span = if step > 0 { stop - start } else { start - stop };
    let count = if span <= 0 { 0 } else { (span + step.abs() - 1) / step.abs() };
    if count > MAX_RANGE_ITERATIONS {
        return Err(BatchError::InvalidIterator);
    }
    (0..count).map(|i| i64::try_from(start + i * step).map_err(|_| BatchError::InvalidIterator))
              .collect()
}
