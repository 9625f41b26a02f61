//! Ledger de una ejecución: metadata actual, historial por etapa, progreso
//! y publicación de estado.

pub mod core;
pub mod history;
pub mod status;
pub mod workspace;

pub use self::core::ChainLedger;
pub use history::{ChainHistory, HistoryEntry, HistoryRecord, HistoryWriter, InMemoryHistoryWriter, LedgerValue, Metadata};
pub use status::{escape_message, ChainStatus, InMemoryStatusBoard, RunState, StatusPublisher};
pub use workspace::{is_valid_status_key, RunWorkspace};
