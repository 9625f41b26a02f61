//! Publicación de estado de ejecuciones.
//!
//! Cada ejecución (cadena o batch) publica su progreso bajo su `status_key`.
//! Lectores externos consultan el último snapshot con `fetch`; el estado de
//! ejecución (`RunState`) se fija desde fuera para pedir la cancelación de un
//! batch. Las escrituras por clave son atómicas y gana la última.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Señal de ejecución consultada entre iteraciones de un batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Cancelled,
    Running,
}

impl RunState {
    /// Código numérico histórico (0 = cancelar, 1 = en curso).
    pub fn code(&self) -> u8 {
        match self {
            RunState::Cancelled => 0,
            RunState::Running => 1,
        }
    }

    pub fn from_code(code: u8) -> Self {
        if code == 0 {
            RunState::Cancelled
        } else {
            RunState::Running
        }
    }
}

/// Snapshot de estado publicado para una `status_key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainStatus {
    pub latest_msg: String,
    pub all_msg: String,
    pub algorithm_percent_complete: u8,
    pub chain_percent_complete: u8,
    pub batch_percent_complete: u8,
    pub updated_at: DateTime<Utc>,
}

/// Servicio de publicación de estado inyectado en el ledger.
pub trait StatusPublisher: Send + Sync {
    /// Publica (reemplaza) el snapshot de `key`.
    fn publish(&self, key: &str, status: ChainStatus);
    /// Último snapshot publicado para `key`.
    fn fetch(&self, key: &str) -> Option<ChainStatus>;
    /// Estado de ejecución fijado externamente, si existe.
    fn run_state(&self, key: &str) -> Option<RunState>;
    fn set_run_state(&self, key: &str, state: RunState);
    /// Olvida snapshot y estado de `key`.
    fn forget(&self, key: &str);
}

/// Tablero de estado en memoria, compartido por todo el proceso.
#[derive(Debug, Default)]
pub struct InMemoryStatusBoard {
    statuses: DashMap<String, ChainStatus>,
    run_states: DashMap<String, RunState>,
}

impl InMemoryStatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

impl StatusPublisher for InMemoryStatusBoard {
    fn publish(&self, key: &str, status: ChainStatus) {
        self.statuses.insert(key.to_string(), status);
    }

    fn fetch(&self, key: &str) -> Option<ChainStatus> {
        self.statuses.get(key).map(|s| s.value().clone())
    }

    fn run_state(&self, key: &str) -> Option<RunState> {
        self.run_states.get(key).map(|s| *s.value())
    }

    fn set_run_state(&self, key: &str, state: RunState) {
        self.run_states.insert(key.to_string(), state);
    }

    fn forget(&self, key: &str) {
        self.statuses.remove(key);
        self.run_states.remove(key);
    }
}

/// Escapa el mensaje para que pueda mostrarse tal cual en HTML.
pub fn escape_message(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    for c in message.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
