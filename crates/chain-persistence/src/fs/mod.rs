//! Implementaciones sobre el sistema de archivos de `ProjectStore` y
//! `HistoryWriter`.

pub mod history;
pub mod project;

pub use history::FsHistoryWriter;
pub use project::FsProjectStore;
