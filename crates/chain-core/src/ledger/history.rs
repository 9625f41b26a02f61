//! Historial del ledger y su forma serializada.
//!
//! Cada etapa completada deja un `HistoryEntry` inmutable: copia de la
//! metadata vigente al terminar, nombre del algoritmo y parámetros recibidos.
//! La serialización (`ChainHistory`) es estable y nunca falla por la forma
//! del payload: valores opacos se sustituyen por `NOT_SERIALIZABLE`.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{CHAIN_OUTPUT_KEY, NOT_SERIALIZABLE};
use crate::errors::EngineError;
use crate::params::RawParams;

/// Valor almacenado en la metadata del ledger.
///
/// `Opaque` permite pasar objetos en memoria entre etapas (modelos,
/// buffers, handles) que no tienen representación JSON.
#[derive(Clone)]
pub enum LedgerValue {
    Json(Value),
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl LedgerValue {
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        LedgerValue::Opaque(Arc::new(value))
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            LedgerValue::Json(v) => Some(v),
            LedgerValue::Opaque(_) => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            LedgerValue::Opaque(inner) => inner.downcast_ref::<T>(),
            LedgerValue::Json(_) => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, LedgerValue::Json(Value::Null))
    }

    /// JSON del valor, o el centinela si es opaco.
    pub fn to_json_lossy(&self) -> Value {
        match self {
            LedgerValue::Json(v) => v.clone(),
            LedgerValue::Opaque(_) => Value::String(NOT_SERIALIZABLE.to_string()),
        }
    }
}

impl fmt::Debug for LedgerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerValue::Json(v) => write!(f, "Json({v})"),
            LedgerValue::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

impl PartialEq for LedgerValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LedgerValue::Json(a), LedgerValue::Json(b)) => a == b,
            (LedgerValue::Opaque(a), LedgerValue::Opaque(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Value> for LedgerValue {
    fn from(value: Value) -> Self {
        LedgerValue::Json(value)
    }
}

impl From<&str> for LedgerValue {
    fn from(value: &str) -> Self {
        LedgerValue::Json(Value::String(value.to_string()))
    }
}

impl From<String> for LedgerValue {
    fn from(value: String) -> Self {
        LedgerValue::Json(Value::String(value))
    }
}

impl From<i64> for LedgerValue {
    fn from(value: i64) -> Self {
        LedgerValue::Json(Value::from(value))
    }
}

impl From<f64> for LedgerValue {
    fn from(value: f64) -> Self {
        LedgerValue::Json(Value::from(value))
    }
}

/// Claves de metadata que no se copian al registro serializado.
const RESERVED_RECORD_KEYS: [&str; 3] = [CHAIN_OUTPUT_KEY, "algorithm_name", "algorithm_params"];

/// Metadata de trabajo: clave -> valor, en orden de inserción.
pub type Metadata = IndexMap<String, LedgerValue>;

/// Snapshot archivado al terminar una etapa.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub algorithm_name: String,
    pub algorithm_params: RawParams,
    pub metadata: Metadata,
}

impl HistoryEntry {
    /// Valor de `key` en esta entrada (None si la etapa no lo dejó).
    pub fn get(&self, key: &str) -> Option<&LedgerValue> {
        self.metadata.get(key)
    }

    /// Forma serializable completa (metadata incluida).
    ///
    /// Claves de metadata que coinciden con campos del registro se omiten:
    /// nombre y parámetros archivados siempre prevalecen.
    pub fn to_record(&self) -> HistoryRecord {
        let metadata = self.metadata
                           .iter()
                           .filter(|(k, _)| !RESERVED_RECORD_KEYS.contains(&k.as_str()))
                           .map(|(k, v)| (k.clone(), v.to_json_lossy()))
                           .collect();
        HistoryRecord { algorithm_name: self.algorithm_name.clone(),
                        algorithm_params: self.params_lossy(),
                        metadata }
    }

    /// Forma serializable sólo con nombre y parámetros.
    pub fn to_params_record(&self) -> HistoryRecord {
        HistoryRecord { algorithm_name: self.algorithm_name.clone(),
                        algorithm_params: self.params_lossy(),
                        metadata: IndexMap::new() }
    }

    fn params_lossy(&self) -> RawParams {
        // los parámetros ya son JSON; se copian tal cual
        self.algorithm_params.clone()
    }
}

/// Una etapa del historial tal como se escribe a disco.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub algorithm_name: String,
    pub algorithm_params: RawParams,
    #[serde(flatten)]
    pub metadata: IndexMap<String, Value>,
}

impl HistoryRecord {
    /// Reconstruye una entrada de historial (toda la metadata es JSON).
    pub fn into_entry(self) -> HistoryEntry {
        HistoryEntry { algorithm_name: self.algorithm_name,
                       algorithm_params: self.algorithm_params,
                       metadata: self.metadata
                                     .into_iter()
                                     .map(|(k, v)| (k, LedgerValue::Json(v)))
                                     .collect() }
    }
}

/// Documento de historial de una ejecución.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChainHistory {
    // misma clave raíz que los archivos de historial ya existentes
    #[serde(rename = "atk_chain_metadata")]
    pub chain_metadata: Vec<HistoryRecord>,
}

impl ChainHistory {
    pub fn from_entries(entries: &[HistoryEntry]) -> Self {
        Self { chain_metadata: entries.iter().map(HistoryEntry::to_record).collect() }
    }

    pub fn params_only(entries: &[HistoryEntry]) -> Self {
        Self { chain_metadata: entries.iter().map(HistoryEntry::to_params_record).collect() }
    }

    pub fn to_value(&self) -> Value {
        // sólo contiene JSON; la conversión no puede fallar
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn into_entries(self) -> Vec<HistoryEntry> {
        self.chain_metadata.into_iter().map(HistoryRecord::into_entry).collect()
    }
}

/// Destino de los archivos de historial (`<status_key>.json`, `batch_<key>.json`).
pub trait HistoryWriter: Send + Sync {
    fn write_json(&self, file_name: &str, content: &Value) -> Result<(), EngineError>;
}

/// Writer en memoria para tests y ejecuciones efímeras.
#[derive(Debug, Default)]
pub struct InMemoryHistoryWriter {
    files: DashMap<String, Value>,
}

impl InMemoryHistoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, file_name: &str) -> Option<Value> {
        self.files.get(file_name).map(|v| v.value().clone())
    }

    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

impl HistoryWriter for InMemoryHistoryWriter {
    fn write_json(&self, file_name: &str, content: &Value) -> Result<(), EngineError> {
        self.files.insert(file_name.to_string(), content.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn opaque_values_become_sentinel() {
        let v = LedgerValue::opaque(vec![1u8, 2, 3]);
        assert_eq!(v.to_json_lossy(), json!(NOT_SERIALIZABLE));
        assert_eq!(v.downcast_ref::<Vec<u8>>(), Some(&vec![1u8, 2, 3]));
        assert!(v.as_json().is_none());
    }

    #[test]
    fn record_flattens_metadata_and_drops_output_value() {
        let mut metadata = Metadata::new();
        metadata.insert("result".into(), LedgerValue::from(3i64));
        metadata.insert(CHAIN_OUTPUT_KEY.into(), LedgerValue::from(json!({"output_type": "string"})));
        let entry = HistoryEntry { algorithm_name: "add_numbers".into(),
                                   algorithm_params: [("a".to_string(), json!(1))].into_iter().collect(),
                                   metadata };
        let value = serde_json::to_value(entry.to_record()).unwrap();
        assert_eq!(value, json!({"algorithm_name": "add_numbers", "algorithm_params": {"a": 1}, "result": 3}));
    }

    #[test]
    fn archived_name_and_params_win_over_metadata() {
        let mut metadata = Metadata::new();
        metadata.insert("algorithm_name".into(), LedgerValue::from("spoof"));
        metadata.insert("algorithm_params".into(), LedgerValue::from(json!({"x": 1})));
        metadata.insert("kept".into(), LedgerValue::from(1i64));
        let entry = HistoryEntry { algorithm_name: "real".into(),
                                   algorithm_params: [("p".to_string(), json!(2))].into_iter().collect(),
                                   metadata };
        let doc = ChainHistory::from_entries(&[entry]).to_value();
        assert_eq!(doc,
                   json!({"atk_chain_metadata": [{"algorithm_name": "real", "algorithm_params": {"p": 2}, "kept": 1}]}));

        let back: ChainHistory = serde_json::from_value(doc).unwrap();
        assert_eq!(back.chain_metadata[0].algorithm_name, "real");
    }

    #[test]
    fn in_memory_writer_keeps_files() {
        let w = InMemoryHistoryWriter::new();
        w.write_json("b.json", &json!(2)).unwrap();
        w.write_json("a.json", &json!(1)).unwrap();
        assert_eq!(w.file_names(), vec!["a.json", "b.json"]);
        assert_eq!(w.get("a.json"), Some(json!(1)));
    }
}
