//! Respuesta de una ejecución de cadena.
//!
//! Se serializa con el discriminador `output_type`:
//! - `string`: `output_value` es texto.
//! - `batch_result`: `output_value` es la lista de respuestas por iteración.
//! - `error`: `message` y, para errores de parámetros, `error_list`.
//! - cualquier otro tipo (`geo_raster`, ...): payload libre en `output_value`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{CHAIN_COMPLETE_MESSAGE, NOT_SERIALIZABLE, PARAMETER_ERROR_MESSAGE};
use crate::errors::{ChainError, ParamError};
use crate::ledger::LedgerValue;

pub const OUTPUT_STRING: &str = "string";
pub const OUTPUT_BATCH: &str = "batch_result";
pub const OUTPUT_ERROR: &str = "error";
/// Tipo asignado a salidas que no declaran `output_type`.
pub const OUTPUT_JSON: &str = "json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Value", try_from = "Value")]
pub enum ChainResponse {
    Text(String),
    BatchResult(Vec<ChainResponse>),
    Payload { output_type: String, output_value: Value },
    Error { message: String, error_list: Option<Vec<ParamError>> },
}

impl ChainResponse {
    pub fn text(value: impl Into<String>) -> Self {
        ChainResponse::Text(value.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        ChainResponse::Error { message: message.into(),
                               error_list: None }
    }

    /// Respuesta por defecto cuando ninguna etapa fija `chain_output_value`.
    pub fn complete() -> Self {
        ChainResponse::text(CHAIN_COMPLETE_MESSAGE)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ChainResponse::Error { .. })
    }

    pub fn output_type(&self) -> &str {
        match self {
            ChainResponse::Text(_) => OUTPUT_STRING,
            ChainResponse::BatchResult(_) => OUTPUT_BATCH,
            ChainResponse::Payload { output_type, .. } => output_type,
            ChainResponse::Error { .. } => OUTPUT_ERROR,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ChainResponse::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn error_list(&self) -> Option<&[ParamError]> {
        match self {
            ChainResponse::Error { error_list, .. } => error_list.as_deref(),
            _ => None,
        }
    }

    /// Construye la respuesta final a partir del valor `chain_output_value`
    /// que dejó la última etapa.
    pub fn from_output_value(value: &LedgerValue) -> Self {
        match value {
            LedgerValue::Opaque(_) => ChainResponse::error(NOT_SERIALIZABLE),
            LedgerValue::Json(Value::String(s)) => ChainResponse::Text(s.clone()),
            LedgerValue::Json(v) if v.get("output_type").is_some() => {
                ChainResponse::try_from(v.clone()).unwrap_or_else(|_| ChainResponse::Payload { output_type: OUTPUT_JSON.into(),
                                                                                              output_value: v.clone() })
            }
            LedgerValue::Json(v) => ChainResponse::Payload { output_type: OUTPUT_JSON.into(),
                                                             output_value: v.clone() },
        }
    }

    pub fn to_value(&self) -> Value {
        Value::from(self.clone())
    }
}

impl From<ChainError> for ChainResponse {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Parameter(list) => ChainResponse::Error { message: PARAMETER_ERROR_MESSAGE.to_string(),
                                                                  error_list: Some(list) },
            ChainError::Business(message) => ChainResponse::error(message),
        }
    }
}

impl From<ChainResponse> for Value {
    fn from(response: ChainResponse) -> Self {
        let mut map = Map::new();
        map.insert("output_type".into(), Value::String(response.output_type().to_string()));
        match response {
            ChainResponse::Text(text) => {
                map.insert("output_value".into(), Value::String(text));
            }
            ChainResponse::BatchResult(items) => {
                map.insert("output_value".into(), Value::Array(items.into_iter().map(Value::from).collect()));
            }
            ChainResponse::Payload { output_value, .. } => {
                map.insert("output_value".into(), output_value);
            }
            ChainResponse::Error { message, error_list } => {
                map.insert("message".into(), Value::String(message));
                if let Some(list) = error_list {
                    map.insert("error_list".into(), serde_json::to_value(list).unwrap_or(Value::Null));
                }
            }
        }
        Value::Object(map)
    }
}

impl TryFrom<Value> for ChainResponse {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, String> {
        let Value::Object(mut map) = value else {
            return Err("chain response must be an object".into());
        };
        let output_type = match map.remove("output_type") {
            Some(Value::String(t)) => t,
            _ => return Err("missing output_type".into()),
        };
        let output_value = map.remove("output_value");
        match output_type.as_str() {
            OUTPUT_STRING => match output_value {
                Some(Value::String(s)) => Ok(ChainResponse::Text(s)),
                _ => Err("string response requires a text output_value".into()),
            },
            OUTPUT_BATCH => match output_value {
                Some(Value::Array(items)) => {
                    let items = items.into_iter()
                                     .map(ChainResponse::try_from)
                                     .collect::<Result<Vec<_>, _>>()?;
                    Ok(ChainResponse::BatchResult(items))
                }
                _ => Err("batch_result requires a list output_value".into()),
            },
            OUTPUT_ERROR => {
                let message = match map.remove("message") {
                    Some(Value::String(m)) => m,
                    _ => return Err("error response requires a message".into()),
                };
                let error_list = match map.remove("error_list") {
                    None | Some(Value::Null) => None,
                    Some(list) => Some(serde_json::from_value(list).map_err(|e| e.to_string())?),
                };
                Ok(ChainResponse::Error { message,
                                          error_list })
            }
            _ => Ok(ChainResponse::Payload { output_type,
                                             output_value: output_value.unwrap_or(Value::Null) }),
        }
    }
}
