//! Store de proyecto sobre el sistema de archivos.
//!
//! Layout esperado bajo la raíz:
//! - `algorithms/<nombre>/algorithm.json` (se admiten subcarpetas: `grupo/algo`)
//! - `chains/<nombre>.json` con `{ "<nombre>": [etapas] }`, o bien un único
//!   `chains.json` con todas las cadenas.
//!
//! Archivos ilegibles o mal formados se reportan como "no encontrado" en la
//! interfaz `ProjectStore`; los cargadores `load_*` devuelven el error.

use std::fs;
use std::path::{Path, PathBuf};

use chain_core::{AlgorithmDefinition, ChainDefinition, ProjectStore};
use indexmap::IndexMap;
use log::{debug, warn};
use serde_json::Value;

use crate::config::ChainConfig;
use crate::error::PersistenceError;

const ALGORITHMS_DIR: &str = "algorithms";
const ALGORITHM_FILE: &str = "algorithm.json";
const CHAINS_DIR: &str = "chains";
const CHAINS_FILE: &str = "chains.json";

#[derive(Debug, Clone)]
pub struct FsProjectStore {
    root: PathBuf,
}

impl FsProjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &ChainConfig) -> Self {
        Self::new(config.project_path.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Comprueba que la raíz tenga carpeta de algoritmos y alguna fuente de
    /// cadenas.
    pub fn validate_layout(&self) -> Result<(), PersistenceError> {
        if !self.root.join(ALGORITHMS_DIR).is_dir() {
            return Err(PersistenceError::InvalidLayout(format!("missing {}/ under {}",
                                                               ALGORITHMS_DIR,
                                                               self.root.display())));
        }
        if !self.root.join(CHAINS_DIR).is_dir() && !self.root.join(CHAINS_FILE).is_file() {
            return Err(PersistenceError::InvalidLayout(format!("missing {}/ or {} under {}",
                                                               CHAINS_DIR,
                                                               CHAINS_FILE,
                                                               self.root.display())));
        }
        Ok(())
    }

    pub fn algorithm_path(&self, name: &str) -> PathBuf {
        let mut path = self.root.join(ALGORITHMS_DIR);
        for part in name.split(['/', '\\']).filter(|p| !p.is_empty()) {
            path.push(part);
        }
        path.join(ALGORITHM_FILE)
    }

    pub fn load_algorithm(&self, name: &str) -> Result<AlgorithmDefinition, PersistenceError> {
        let path = self.algorithm_path(name);
        if !path.is_file() {
            return Err(PersistenceError::NotFound(path.display().to_string()));
        }
        let def: AlgorithmDefinition = serde_json::from_str(&fs::read_to_string(&path)?)?;
        def.check_unique_names().map_err(PersistenceError::InvalidLayout)?;
        Ok(def)
    }

    /// Todas las cadenas definidas en un archivo `{ nombre: [etapas] }`.
    pub fn load_chain_file(path: &Path) -> Result<IndexMap<String, ChainDefinition>, PersistenceError> {
        let raw: IndexMap<String, Value> = serde_json::from_str(&fs::read_to_string(path)?)?;
        let mut chains = IndexMap::with_capacity(raw.len());
        for (name, stages) in &raw {
            chains.insert(name.clone(), ChainDefinition::from_stages_value(name, stages)?);
        }
        Ok(chains)
    }

    pub fn load_chain(&self, name: &str) -> Result<ChainDefinition, PersistenceError> {
        let single = self.root.join(CHAINS_DIR).join(format!("{name}.json"));
        let candidates = [single, self.root.join(CHAINS_FILE)];
        for path in candidates.iter().filter(|p| p.is_file()) {
            let mut chains = Self::load_chain_file(path)?;
            if let Some(chain) = chains.shift_remove(name) {
                debug!("chain '{}' loaded from {}", name, path.display());
                return Ok(chain);
            }
        }
        Err(PersistenceError::NotFound(format!("chain {name}")))
    }
}

impl ProjectStore for FsProjectStore {
    fn algorithm_definition(&self, name: &str) -> Option<AlgorithmDefinition> {
        match self.load_algorithm(name) {
            Ok(def) => Some(def),
            Err(PersistenceError::NotFound(_)) => None,
            Err(e) => {
                warn!("algorithm '{}' unreadable: {}", name, e);
                None
            }
        }
    }

    fn chain_definition(&self, name: &str) -> Option<ChainDefinition> {
        match self.load_chain(name) {
            Ok(chain) if !chain.is_empty() => Some(chain),
            Ok(_) | Err(PersistenceError::NotFound(_)) => None,
            Err(e) => {
                warn!("chain '{}' unreadable: {}", name, e);
                None
            }
        }
    }

    fn chain_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = fs::read_dir(self.root.join(CHAINS_DIR)) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) == Some("json") {
                    if let Ok(chains) = Self::load_chain_file(&path) {
                        names.extend(chains.into_keys());
                    }
                }
            }
        }
        if let Ok(chains) = Self::load_chain_file(&self.root.join(CHAINS_FILE)) {
            names.extend(chains.into_keys());
        }
        names.sort();
        names.dedup();
        names
    }

    fn algorithm_names(&self) -> Vec<String> {
        let base = self.root.join(ALGORITHMS_DIR);
        let pattern = format!("{}/**/{}", glob::Pattern::escape(&base.to_string_lossy()), ALGORITHM_FILE);
        let Ok(paths) = glob::glob(&pattern) else {
            return Vec::new();
        };
        let mut names: Vec<String> = paths.filter_map(Result::ok)
                                          .filter_map(|p| {
                                              let dir = p.parent()?.strip_prefix(&base).ok()?;
                                              let parts: Vec<_> =
                                                  dir.components().map(|c| c.as_os_str().to_string_lossy()).collect();
                                              (!parts.is_empty()).then(|| parts.join("/"))
                                          })
                                          .collect();
        names.sort();
        names
    }
}
