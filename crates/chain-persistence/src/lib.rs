//! chain-persistence
//!
//! Capa de archivos del motor de cadenas: configuración desde `.env`, store
//! de proyecto (definiciones de algoritmos y cadenas en disco) y escritura
//! de historiales.
//!
//! Módulos:
//! - `config`: carga de configuración desde .env.
//! - `fs`: `FsProjectStore` y `FsHistoryWriter`.
//! - `error`: errores de persistencia y su conversión a `EngineError`.

pub mod config;
pub mod error;
pub mod fs;

pub use config::{init_dotenv, ChainConfig};
pub use error::PersistenceError;
pub use fs::{FsHistoryWriter, FsProjectStore};
