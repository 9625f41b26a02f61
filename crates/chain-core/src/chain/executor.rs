//! Ejecutor lineal de cadenas.
//!
//! Estados: `Idle -> Running(i) -> {Complete, Failed}`. Por cada etapa:
//! 1. parámetros enviados (vacío si no hay);
//! 2. resolución de los parámetros `chain_ledger` contra el historial;
//! 3. validación contra la definición del algoritmo;
//! 4. ejecución, archivo de la metadata y limpieza (salvo la última etapa).
//!
//! El primer error de parámetros o de negocio detiene la cadena y se
//! devuelve como respuesta `error`.

use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use log::{debug, error, info, warn};

use super::ordinal::{ordinal_index, select};
use super::{AlgorithmRequest, ChainDefinition, ChainResponse, ProjectStore, SourceKind, StageDescriptor};
use crate::algorithm::{Algorithm, AlgorithmRegistry, AlgorithmResult};
use crate::constants::{CHAIN_OUTPUT_KEY, NOT_SERIALIZABLE};
use crate::errors::{ChainError, ParamError};
use crate::ledger::{ChainLedger, LedgerValue};
use crate::params::{validate, ParamMap, RawParams};

pub const MSG_ALGORITHM_NOT_FOUND: &str = "Algorithm not found";
pub const MSG_OCCURRENCE_NOT_FOUND: &str = "Occurrence not found";

pub struct ChainExecutor<'a> {
    store: &'a dyn ProjectStore,
    registry: &'a AlgorithmRegistry,
}

impl<'a> ChainExecutor<'a> {
    pub fn new(store: &'a dyn ProjectStore, registry: &'a AlgorithmRegistry) -> Self {
        Self { store,
               registry }
    }

    /// Ejecuta todas las etapas de `algorithms` sobre `ledger`.
    ///
    /// La etapa `i` de la petición toma los orígenes de sus parámetros de la
    /// etapa `i` de `chain`.
    pub fn execute(&self, chain: &ChainDefinition, algorithms: &[AlgorithmRequest], ledger: &mut ChainLedger) -> ChainResponse {
        ledger.set_status("Starting chain run...", 0);
        let total = algorithms.len();
        ledger.set_chain_percent(0);

        for (idx, request) in algorithms.iter().enumerate() {
            ledger.set_chain_percent(progress(idx, total));
            let start = Instant::now();
            ledger.set_status(&format!("Running algorithm: {}", request.name), 0);

            if let Err(err) = self.run_stage(chain, idx, request, ledger, idx + 1 == total) {
                let response = ChainResponse::from(err);
                error!("[{}] {}", ledger.status_key(), response.to_value());
                return response;
            }
            info!("alg ran in: {} s", start.elapsed().as_secs_f64());
        }

        ledger.set_chain_percent(100);
        ledger.set_status("Chain run complete", 100);

        match ledger.metadata().get(CHAIN_OUTPUT_KEY) {
            Some(value) => ChainResponse::from_output_value(value),
            None => ChainResponse::complete(),
        }
    }

    fn run_stage(&self,
                 chain: &ChainDefinition,
                 idx: usize,
                 request: &AlgorithmRequest,
                 ledger: &mut ChainLedger,
                 is_last: bool)
                 -> Result<(), ChainError> {
        let stage = chain.stage(idx).ok_or_else(not_found)?;
        if stage.algorithm != request.name {
            warn!("stage {} of '{}' declares '{}' but request runs '{}'",
                  idx, chain.name, stage.algorithm, request.name);
        }

        let mut supplied = request.parameters.clone();
        resolve_ledger_params(stage, &mut supplied, ledger)?;

        let definition = self.store.algorithm_definition(&request.name).ok_or_else(not_found)?;
        let params = validate(&definition, &supplied).into_result()?;
        let algorithm = self.registry.create(&request.name).ok_or_else(not_found)?;

        run_guarded(algorithm.as_ref(), ledger, &params)?;

        ledger.archive_metadata(&request.name, to_raw(&params));
        if !is_last {
            ledger.clear_current_metadata();
        }
        Ok(())
    }
}

fn not_found() -> ChainError {
    ChainError::parameter("", MSG_ALGORITHM_NOT_FOUND)
}

fn progress(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (done * 100 / total) as u8
}

fn to_raw(params: &ParamMap) -> RawParams {
    params.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()
}

/// Sustituye en `supplied` los parámetros enlazados a etapas anteriores.
///
/// Un valor ausente o nulo en la entrada seleccionada elimina el parámetro,
/// de modo que la validación lo trata como no enviado.
fn resolve_ledger_params(stage: &StageDescriptor, supplied: &mut RawParams, ledger: &ChainLedger) -> Result<(), ChainError> {
    let mut errors = Vec::new();
    for (param, binding) in &stage.parameters {
        if stage.source_of(binding) != SourceKind::ChainLedger {
            continue;
        }
        let Some(source) = binding.source_algorithm.as_deref() else {
            continue;
        };
        let key = binding.key.as_deref().unwrap_or(param);
        let found = ledger.search_history(key, source);
        if found.is_empty() {
            errors.push(ParamError::new(param.clone(), MSG_ALGORITHM_NOT_FOUND));
            continue;
        }

        let index = binding.occurrence.as_deref().map(ordinal_index).unwrap_or(-1);
        debug!("resolving {param} from {source}.{key} (index {index}, {} entries)", found.len());
        match select(&found, index) {
            None => {
                let word = binding.occurrence.as_deref().unwrap_or_default();
                errors.push(ParamError::new(param.clone(), format!("{MSG_OCCURRENCE_NOT_FOUND}: {word}")));
            }
            Some(None) | Some(Some(LedgerValue::Json(serde_json::Value::Null))) => {
                supplied.shift_remove(param);
            }
            Some(Some(LedgerValue::Json(value))) => {
                supplied.insert(param.clone(), value.clone());
            }
            Some(Some(LedgerValue::Opaque(_))) => {
                errors.push(ParamError::new(param.clone(), NOT_SERIALIZABLE));
            }
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ChainError::Parameter(errors))
    }
}

/// Ejecuta el algoritmo convirtiendo un panic en error de negocio.
fn run_guarded(algorithm: &dyn Algorithm, ledger: &mut ChainLedger, params: &ParamMap) -> AlgorithmResult {
    match panic::catch_unwind(AssertUnwindSafe(|| algorithm.run(ledger, params))) {
        Ok(result) => result,
        Err(payload) => {
            let detail = payload.downcast_ref::<&str>()
                                .map(|s| s.to_string())
                                .or_else(|| payload.downcast_ref::<String>().cloned())
                                .unwrap_or_else(|| "unknown panic".to_string());
            error!("algorithm '{}' panicked: {}", algorithm.name(), detail);
            Err(ChainError::business(format!("Unexpected error in {}: {}", algorithm.name(), detail)))
        }
    }
}
