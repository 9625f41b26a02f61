use std::panic::{self, AssertUnwindSafe};

use log::{error, info, warn};
use serde_json::{Map, Value};

use super::{BatchError, BatchSpec};
use crate::chain::{AlgorithmRequest, ChainDefinition, ChainExecutor, ChainResponse};
use crate::constants::{BATCH_CANCELLED_MESSAGE, BATCH_FILE_PREFIX, BATCH_PARAM_SEPARATOR};
use crate::ledger::{ChainLedger, HistoryWriter, RunState};

/// Repite la cadena completa variando un parámetro.
///
/// Las iteraciones son secuenciales y comparten el ledger, que se reinicia
/// entre una y otra. La cancelación se consulta antes de cada iteración.
pub struct BatchRunner<'a> {
    executor: ChainExecutor<'a>,
    writer: &'a dyn HistoryWriter,
}

impl<'a> BatchRunner<'a> {
    pub fn new(executor: ChainExecutor<'a>, writer: &'a dyn HistoryWriter) -> Self {
        Self { executor,
               writer }
    }

    pub fn run_batch(&self,
                     chain: &ChainDefinition,
                     algorithms: &[AlgorithmRequest],
                     spec: &BatchSpec,
                     ledger: &mut ChainLedger)
                     -> ChainResponse {
        let values = match spec.expand() {
            Ok(values) => values,
            Err(e) => return ChainResponse::error(e.to_string()),
        };
        let (target_algorithm, target_param) = match target(spec, algorithms) {
            Ok(t) => t,
            Err(e) => return ChainResponse::error(e.to_string()),
        };

        let total = values.len();
        ledger.set_status("Starting batch job...", 0);
        let mut results = Vec::with_capacity(total);
        let mut batch_output = Map::new();

        for (idx, value) in values.into_iter().enumerate() {
            if ledger.get_run_state() == RunState::Cancelled {
                info!("[{}] batch cancelled before iteration {}", ledger.status_key(), idx);
                return ChainResponse::error(BATCH_CANCELLED_MESSAGE);
            }

            let mut iteration = algorithms.to_vec();
            if let Some(stage) = iteration.iter_mut().find(|a| a.name == target_algorithm) {
                stage.parameters.insert(target_param.to_string(), value);
            }

            let response = panic::catch_unwind(AssertUnwindSafe(|| self.executor.execute(chain, &iteration, ledger)))
                .unwrap_or_else(|_| {
                    error!("[{}] iteration {} aborted unexpectedly", ledger.status_key(), idx);
                    ChainResponse::error(format!("Unexpected error in batch iteration {idx}"))
                });
            results.push(response);
            batch_output.insert(idx.to_string(), ledger.history_to_json());

            ledger.reset();
            ledger.set_batch_percent(((idx + 1) * 100 / total) as u8);
        }

        batch_output.insert("batch_type".into(), Value::String(spec.iter_type.clone()));
        batch_output.insert("batch_iterator".into(), Value::String(spec.iter_param.clone()));
        batch_output.insert("batch_iteration_value".into(), Value::String(spec.iter_value.clone()));

        let file_name = format!("{}{}.json", BATCH_FILE_PREFIX, ledger.status_key());
        if let Err(e) = self.writer.write_json(&file_name, &Value::Object(batch_output)) {
            warn!("could not write {}: {}", file_name, e);
        }

        ledger.set_batch_percent(100);
        ledger.set_status("Batch complete", 100);
        ChainResponse::BatchResult(results)
    }
}

/// Separa `<algoritmo>__<parámetro>` y comprueba que la etapa existe.
fn target<'s>(spec: &'s BatchSpec, algorithms: &[AlgorithmRequest]) -> Result<(&'s str, &'s str), BatchError> {
    let (algorithm, param) = spec.iter_param
                                 .split_once(BATCH_PARAM_SEPARATOR)
                                 .ok_or(BatchError::InvalidParameter)?;
    if param.is_empty() || !algorithms.iter().any(|a| a.name == algorithm) {
        return Err(BatchError::InvalidParameter);
    }
    Ok((algorithm, param))
}
