use std::any::Any;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use log::debug;
use serde_json::Value;

use super::history::{ChainHistory, HistoryEntry, HistoryWriter, LedgerValue, Metadata};
use super::status::{escape_message, ChainStatus, RunState, StatusPublisher};
use crate::constants::STATUS_MESSAGE_SEPARATOR;
use crate::errors::{ChainError, EngineError};
use crate::params::RawParams;

/// Estado acumulado de una ejecución de cadena.
///
/// Una instancia por ejecución (o por batch, reiniciada entre iteraciones).
/// Sólo el algoritmo en curso escribe `metadata`; al terminar cada etapa el
/// ejecutor archiva una copia en `history` y limpia la metadata, salvo en la
/// última etapa, cuya metadata queda viva para construir la respuesta.
pub struct ChainLedger {
    status_key: String,
    metadata: Metadata,
    history: Vec<HistoryEntry>,
    chain_percent: u8,
    batch_percent: u8,
    status: Arc<dyn StatusPublisher>,
    temp_folder: Option<PathBuf>,
}

impl fmt::Debug for ChainLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainLedger")
         .field("status_key", &self.status_key)
         .field("metadata", &self.metadata)
         .field("history", &self.history.len())
         .field("chain_percent", &self.chain_percent)
         .field("batch_percent", &self.batch_percent)
         .finish()
    }
}

impl ChainLedger {
    pub fn new(status_key: impl Into<String>, status: Arc<dyn StatusPublisher>) -> Self {
        Self { status_key: status_key.into(),
               metadata: Metadata::new(),
               history: Vec::new(),
               chain_percent: 0,
               batch_percent: 0,
               status,
               temp_folder: None }
    }

    /// Asocia la carpeta temporal provista por el `RunWorkspace`.
    pub fn with_temp_folder(mut self, path: impl Into<PathBuf>) -> Self {
        self.temp_folder = Some(path.into());
        self
    }

    pub fn status_key(&self) -> &str {
        &self.status_key
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn status_publisher(&self) -> &Arc<dyn StatusPublisher> {
        &self.status
    }

    // ---------------------------------------------------------------
    // Metadata actual
    // ---------------------------------------------------------------

    pub fn add_to_metadata(&mut self, key: impl Into<String>, value: impl Into<LedgerValue>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Guarda un objeto en memoria sin representación JSON.
    pub fn add_opaque<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.metadata.insert(key.into(), LedgerValue::opaque(value));
    }

    pub fn get_from_metadata(&self, key: &str) -> Result<&LedgerValue, ChainError> {
        self.metadata
            .get(key)
            .ok_or_else(|| ChainError::business(format!("Key not found in metadata: {key}")))
    }

    /// Igual que `get_from_metadata` pero exige un valor JSON.
    pub fn get_json(&self, key: &str) -> Result<&Value, ChainError> {
        self.get_from_metadata(key)?
            .as_json()
            .ok_or_else(|| ChainError::business(format!("Metadata value is not JSON: {key}")))
    }

    pub fn clear_current_metadata(&mut self) {
        self.metadata.clear();
    }

    // ---------------------------------------------------------------
    // Historial
    // ---------------------------------------------------------------

    /// Copia la metadata actual al historial, etiquetada con el algoritmo y
    /// los parámetros recibidos. La metadata actual no se modifica.
    pub fn archive_metadata(&mut self, algorithm_name: &str, algorithm_params: RawParams) {
        self.history.push(HistoryEntry { algorithm_name: algorithm_name.to_string(),
                                         algorithm_params,
                                         metadata: self.metadata.clone() });
    }

    /// Valor de `key` en cada entrada de `algorithm_name`, en orden
    /// cronológico; `None` para entradas que no tienen la clave.
    pub fn search_history(&self, key: &str, algorithm_name: &str) -> Vec<Option<&LedgerValue>> {
        self.history
            .iter()
            .filter(|h| h.algorithm_name == algorithm_name)
            .map(|h| h.get(key))
            .collect()
    }

    /// Valores de `key` en todo el historial, omitiendo ausencias y nulls.
    pub fn search_all_history(&self, key: &str) -> Vec<&LedgerValue> {
        self.history
            .iter()
            .filter_map(|h| h.get(key))
            .filter(|v| !v.is_null())
            .collect()
    }

    pub fn history_size(&self) -> usize {
        self.history.len()
    }

    pub fn get_from_history(&self, index: usize, key: &str) -> Option<&LedgerValue> {
        self.history.get(index).and_then(|h| h.get(key))
    }

    pub fn is_algo_in_history(&self, algorithm_name: &str) -> bool {
        self.history.iter().any(|h| h.algorithm_name == algorithm_name)
    }

    /// Vacía metadata e historial entre iteraciones de un batch.
    pub fn reset(&mut self) {
        self.metadata.clear();
        self.history.clear();
        self.chain_percent = 0;
    }

    // ---------------------------------------------------------------
    // Estado y progreso
    // ---------------------------------------------------------------

    pub fn chain_percent(&self) -> u8 {
        self.chain_percent
    }

    pub fn set_chain_percent(&mut self, percent: u8) {
        self.chain_percent = percent.min(100);
    }

    pub fn batch_percent(&self) -> u8 {
        self.batch_percent
    }

    pub fn set_batch_percent(&mut self, percent: u8) {
        self.batch_percent = percent.min(100);
    }

    /// Estado fijado externamente; en curso si nadie lo fijó.
    pub fn get_run_state(&self) -> RunState {
        self.status.run_state(&self.status_key).unwrap_or(RunState::Running)
    }

    pub fn request_cancel(&self) {
        self.status.set_run_state(&self.status_key, RunState::Cancelled);
    }

    /// Añade `message` al transcript y publica un snapshot con los tres
    /// porcentajes de progreso.
    pub fn set_status(&self, message: &str, algorithm_percent: u8) {
        let latest = escape_message(message);
        let all_msg = match self.status.fetch(&self.status_key) {
            Some(prev) if !prev.all_msg.is_empty() => {
                format!("{}{}{}", prev.all_msg, STATUS_MESSAGE_SEPARATOR, latest)
            }
            _ => latest.clone(),
        };
        debug!("[{}] {}", self.status_key, message);
        self.status.publish(&self.status_key,
                            ChainStatus { latest_msg: latest,
                                          all_msg,
                                          algorithm_percent_complete: algorithm_percent.min(100),
                                          chain_percent_complete: self.chain_percent,
                                          batch_percent_complete: self.batch_percent,
                                          updated_at: Utc::now() });
    }

    // ---------------------------------------------------------------
    // Serialización
    // ---------------------------------------------------------------

    pub fn history_document(&self) -> ChainHistory {
        ChainHistory::from_entries(&self.history)
    }

    /// Historial completo como JSON; los valores opacos se sustituyen por
    /// el centinela.
    pub fn history_to_json(&self) -> Value {
        self.history_document().to_value()
    }

    /// Sólo nombre de algoritmo y parámetros de cada etapa.
    pub fn params_to_json(&self) -> Value {
        ChainHistory::params_only(&self.history).to_value()
    }

    pub fn save_history_to_json(&self, writer: &dyn HistoryWriter, file_name: &str) -> Result<(), EngineError> {
        writer.write_json(file_name, &self.history_to_json())
    }

    pub fn save_params_to_json(&self, writer: &dyn HistoryWriter, file_name: &str) -> Result<(), EngineError> {
        writer.write_json(file_name, &self.params_to_json())
    }

    // ---------------------------------------------------------------
    // Carpeta temporal
    // ---------------------------------------------------------------

    pub fn temp_folder(&self) -> Option<&Path> {
        self.temp_folder.as_deref()
    }

    /// Borra el contenido de la carpeta temporal dejándola vacía.
    pub fn clear_temp_folder(&self) -> io::Result<()> {
        let Some(folder) = self.temp_folder.as_deref() else {
            return Ok(());
        };
        if folder.exists() {
            fs::remove_dir_all(folder)?;
        }
        fs::create_dir_all(folder)
    }
}
