//! chain-core: motor de ejecución de cadenas de algoritmos.
//!
//! Validación de parámetros, ledger con historial por etapa, ejecución
//! lineal de cadenas y batches con cancelación cooperativa.
pub mod algorithm;
pub mod batch;
pub mod chain;
pub mod constants;
pub mod errors;
pub mod ledger;
pub mod params;
pub mod service;

pub use algorithm::{Algorithm, AlgorithmRegistry, AlgorithmResult, TypedAlgorithm};
pub use batch::{BatchError, BatchRunner, BatchSpec, IterType};
pub use chain::{AlgorithmRequest, ChainDefinition, ChainExecutor, ChainRequest, ChainResponse, InMemoryProjectStore,
                ParameterBinding, ProjectStore, SourceKind, StageDescriptor};
pub use errors::{ChainError, EngineError, ParamError};
pub use ledger::{ChainHistory, ChainLedger, ChainStatus, HistoryWriter, InMemoryHistoryWriter, InMemoryStatusBoard,
                 LedgerValue, RunState, RunWorkspace, StatusPublisher};
pub use params::{AlgorithmDefinition, DataType, ParamMap, ParamValue, ParameterSpec, RawParams};
pub use service::{ChainService, RunMode, RunReport};
