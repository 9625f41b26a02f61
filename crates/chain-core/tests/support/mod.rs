#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chain_core::{Algorithm, AlgorithmDefinition, AlgorithmRegistry, AlgorithmResult, ChainDefinition, ChainError,
                 ChainLedger, DataType, InMemoryProjectStore, ParamMap, ParameterBinding, ParameterSpec,
                 StageDescriptor};
use serde_json::json;

/// Deja `tile = "tile-<name>"` en el ledger (o nada si `with_output` es false).
pub struct Fetch {
    pub with_output: bool,
}

impl Algorithm for Fetch {
    fn name(&self) -> &str {
        "fetch"
    }

    fn run(&self, ledger: &mut ChainLedger, params: &ParamMap) -> AlgorithmResult {
        let name = params["name"].as_str().unwrap_or_default();
        if self.with_output {
            ledger.add_to_metadata("tile", format!("tile-{name}"));
        }
        Ok(())
    }
}

/// Combina `tile` y `label`; guarda lo recibido para inspeccionarlo.
pub struct Combine {
    pub calls: Arc<AtomicUsize>,
}

impl Algorithm for Combine {
    fn name(&self) -> &str {
        "combine"
    }

    fn run(&self, ledger: &mut ChainLedger, params: &ParamMap) -> AlgorithmResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let tile = params["tile"].as_str().unwrap_or_default().to_string();
        let label = params.get("label").and_then(|v| v.as_str()).unwrap_or("none");
        ledger.add_to_metadata("received", tile.clone());
        ledger.add_to_metadata("combined", format!("{tile}+{label}"));
        Ok(())
    }
}

/// Fija la salida final de la cadena.
pub struct Emit;

impl Algorithm for Emit {
    fn name(&self) -> &str {
        "emit"
    }

    fn run(&self, ledger: &mut ChainLedger, params: &ParamMap) -> AlgorithmResult {
        let combined = params["combined"].as_str().unwrap_or_default();
        ledger.add_to_metadata("chain_output_value", json!({"output_type": "string", "output_value": combined}));
        Ok(())
    }
}

pub struct Reject;

impl Algorithm for Reject {
    fn name(&self) -> &str {
        "reject"
    }

    fn run(&self, _ledger: &mut ChainLedger, _params: &ParamMap) -> AlgorithmResult {
        Err(ChainError::business("Cannot process this input"))
    }
}

pub struct Explode;

impl Algorithm for Explode {
    fn name(&self) -> &str {
        "explode"
    }

    fn run(&self, _ledger: &mut ChainLedger, _params: &ParamMap) -> AlgorithmResult {
        panic!("kaboom")
    }
}

pub fn definitions() -> Vec<AlgorithmDefinition> {
    vec![AlgorithmDefinition::new("fetch").required(ParameterSpec::new("name", DataType::String))
                                          .output("tile", Some(DataType::String)),
         AlgorithmDefinition::new("combine").required(ParameterSpec::new("tile", DataType::String))
                                            .optional(ParameterSpec::new("label", DataType::String))
                                            .output("combined", Some(DataType::String)),
         AlgorithmDefinition::new("emit").required(ParameterSpec::new("combined", DataType::String)),
         AlgorithmDefinition::new("reject"),
         AlgorithmDefinition::new("explode")]
}

/// fetch -> combine -> emit
pub fn pipeline_chain() -> ChainDefinition {
    ChainDefinition::new("pipeline",
                         vec![StageDescriptor::new("fetch"),
                              StageDescriptor::new("combine").bind("tile", ParameterBinding::ledger("fetch", "tile"))
                                                             .bind("label", ParameterBinding::user()),
                              StageDescriptor::new("emit").bind("combined",
                                                                ParameterBinding::ledger("combine", "combined")),])
}

pub fn store_with(chains: Vec<ChainDefinition>) -> InMemoryProjectStore {
    let mut store = InMemoryProjectStore::new();
    for def in definitions() {
        store.add_algorithm(def);
    }
    for chain in chains {
        store.add_chain(chain);
    }
    store
}

pub fn registry(fetch_output: bool, combine_calls: Arc<AtomicUsize>) -> AlgorithmRegistry {
    let mut reg = AlgorithmRegistry::new();
    reg.register("fetch", move || Box::new(Fetch { with_output: fetch_output }) as Box<dyn Algorithm>)
       .register("combine", move || Box::new(Combine { calls: combine_calls.clone() }) as Box<dyn Algorithm>)
       .register("emit", || Box::new(Emit) as Box<dyn Algorithm>)
       .register("reject", || Box::new(Reject) as Box<dyn Algorithm>)
       .register("explode", || Box::new(Explode) as Box<dyn Algorithm>);
    reg
}
