//! Punto de entrada para llamadores externos (CLI, servidores, demo).
//!
//! `ChainService` reúne el store del proyecto, el registro de algoritmos, el
//! tablero de estado y el destino de los archivos de historial. Cada llamada
//! a `handle` es independiente: ledger y carpeta de trabajo propios.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};
use uuid::Uuid;

use crate::algorithm::AlgorithmRegistry;
use crate::batch::{BatchRunner, BatchSpec};
use crate::chain::{ChainDefinition, ChainExecutor, ChainRequest, ChainResponse, ProjectStore};
use crate::errors::EngineError;
use crate::ledger::{is_valid_status_key, ChainLedger, ChainStatus, HistoryWriter, InMemoryStatusBoard, RunState,
                    RunWorkspace, StatusPublisher};

/// Modo de ejecución pedido por el llamador.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    Single,
    Batch(BatchSpec),
}

/// Resultado de `handle`: la respuesta y la clave bajo la que se publicó.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub status_key: String,
    pub response: ChainResponse,
}

pub struct ChainService<S: ProjectStore, W: HistoryWriter> {
    store: S,
    registry: AlgorithmRegistry,
    writer: W,
    status: Arc<dyn StatusPublisher>,
    working_root: PathBuf,
}

impl<S: ProjectStore, W: HistoryWriter> ChainService<S, W> {
    pub fn new(store: S, registry: AlgorithmRegistry, writer: W) -> Self {
        Self { store,
               registry,
               writer,
               status: Arc::new(InMemoryStatusBoard::new()),
               working_root: std::env::temp_dir().join("algochain") }
    }

    /// Comparte un tablero de estado existente (p.ej. con un lector externo).
    pub fn with_status_board(mut self, status: Arc<dyn StatusPublisher>) -> Self {
        self.status = status;
        self
    }

    pub fn with_working_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.working_root = root.into();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn registry(&self) -> &AlgorithmRegistry {
        &self.registry
    }

    pub fn working_root(&self) -> &Path {
        &self.working_root
    }

    pub fn status_board(&self) -> &Arc<dyn StatusPublisher> {
        &self.status
    }

    /// Ejecuta una petición completa.
    ///
    /// Errores de cadena (parámetros, negocio, cancelación) vuelven como
    /// respuesta `error` dentro de `Ok`; `Err` queda para cadenas
    /// inexistentes, claves inválidas y fallos de infraestructura.
    ///
    /// La clave nombra la carpeta de trabajo y el archivo de historial, así
    /// que sólo se aceptan nombres simples (ver `is_valid_status_key`).
    /// Una cancelación pendiente sobre la clave se consume en esta ejecución.
    pub fn handle(&self, request: &ChainRequest, status_key: Option<&str>, mode: RunMode) -> Result<RunReport, EngineError> {
        let chain = self.chain(&request.chain_name)?;
        let status_key = status_key.map(str::to_string)
                                   .unwrap_or_else(|| Uuid::new_v4().simple().to_string());
        if !is_valid_status_key(&status_key) {
            return Err(EngineError::InvalidStatusKey(status_key));
        }

        let workspace = RunWorkspace::create(&self.working_root, &status_key)?;
        let mut ledger = ChainLedger::new(status_key.clone(), self.status.clone()).with_temp_folder(workspace.temp_folder());
        let executor = ChainExecutor::new(&self.store, &self.registry);

        info!("[{}] running chain '{}' ({:?})", status_key, chain.name, mode);
        let response = match &mode {
            RunMode::Single => {
                let response = executor.execute(&chain, &request.algorithms, &mut ledger);
                let file_name = format!("{status_key}.json");
                if let Err(e) = ledger.save_history_to_json(&self.writer, &file_name) {
                    warn!("could not write {}: {}", file_name, e);
                }
                response
            }
            RunMode::Batch(spec) => {
                BatchRunner::new(executor, &self.writer).run_batch(&chain, &request.algorithms, spec, &mut ledger)
            }
        };
        drop(workspace);
        if self.status.run_state(&status_key) == Some(RunState::Cancelled) {
            self.status.set_run_state(&status_key, RunState::Running);
        }

        Ok(RunReport { status_key,
                       response })
    }

    /// Último estado publicado para `status_key`.
    pub fn status(&self, status_key: &str) -> Option<ChainStatus> {
        self.status.fetch(status_key)
    }

    /// Pide la cancelación; surte efecto antes de la siguiente iteración.
    pub fn cancel(&self, status_key: &str) {
        self.status.set_run_state(status_key, RunState::Cancelled);
    }

    /// Olvida estado y señal de `status_key`. El tablero no expira entradas
    /// por sí mismo: los llamadores de larga vida deben invocarlo tras leer
    /// el estado final.
    pub fn forget(&self, status_key: &str) {
        self.status.forget(status_key);
    }

    pub fn list_chains(&self) -> Vec<String> {
        self.store.chain_names()
    }

    pub fn template(&self, chain_name: &str) -> Result<ChainRequest, EngineError> {
        let chain = self.chain(chain_name)?;
        ChainRequest::template(&chain, &self.store)
    }

    fn chain(&self, name: &str) -> Result<ChainDefinition, EngineError> {
        self.store
            .chain_definition(name)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| EngineError::ChainNotFound(name.to_string()))
    }
}
