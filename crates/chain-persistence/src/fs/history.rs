use std::fs;
use std::path::{Path, PathBuf};

use chain_core::ledger::is_valid_status_key;
use chain_core::{EngineError, HistoryWriter};
use log::debug;
use serde_json::Value;

use crate::config::ChainConfig;
use crate::error::PersistenceError;

/// Escribe historiales como JSON con sangría en una carpeta fija.
#[derive(Debug, Clone)]
pub struct FsHistoryWriter {
    folder: PathBuf,
}

impl FsHistoryWriter {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self { folder: folder.into() }
    }

    pub fn from_config(config: &ChainConfig) -> Self {
        Self::new(config.history_path.clone())
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Ruta del archivo dentro de la carpeta; rechaza nombres que salgan de ella.
    pub fn path_for(&self, file_name: &str) -> Result<PathBuf, PersistenceError> {
        if !is_valid_status_key(file_name) {
            return Err(PersistenceError::InvalidFileName(file_name.to_string()));
        }
        Ok(self.folder.join(file_name))
    }

    pub fn write(&self, file_name: &str, content: &Value) -> Result<PathBuf, PersistenceError> {
        let path = self.path_for(file_name)?;
        fs::create_dir_all(&self.folder)?;
        fs::write(&path, serde_json::to_string_pretty(content)?)?;
        debug!("history written to {}", path.display());
        Ok(path)
    }

    /// Lee un historial escrito previamente.
    pub fn read(&self, file_name: &str) -> Result<Value, PersistenceError> {
        let path = self.path_for(file_name)?;
        if !path.is_file() {
            return Err(PersistenceError::NotFound(path.display().to_string()));
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }
}

impl HistoryWriter for FsHistoryWriter {
    fn write_json(&self, file_name: &str, content: &Value) -> Result<(), EngineError> {
        self.write(file_name, content).map(|_| ()).map_err(EngineError::from)
    }
}
