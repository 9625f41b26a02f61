use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ChainDefinition, ProjectStore};
use crate::errors::EngineError;
use crate::params::RawParams;

/// Parámetros enviados para una etapa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmRequest {
    pub name: String,
    #[serde(default)]
    pub parameters: RawParams,
}

impl AlgorithmRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(),
               parameters: RawParams::new() }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }
}

/// Petición de ejecución: nombre de cadena y parámetros por etapa, en el
/// mismo orden que las etapas de la definición.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainRequest {
    pub chain_name: String,
    pub algorithms: Vec<AlgorithmRequest>,
}

impl ChainRequest {
    pub fn new(chain_name: impl Into<String>) -> Self {
        Self { chain_name: chain_name.into(),
               algorithms: Vec::new() }
    }

    pub fn with_algorithm(mut self, algorithm: AlgorithmRequest) -> Self {
        self.algorithms.push(algorithm);
        self
    }

    /// Primera etapa con ese nombre de algoritmo.
    pub fn algorithm_mut(&mut self, name: &str) -> Option<&mut AlgorithmRequest> {
        self.algorithms.iter_mut().find(|a| a.name == name)
    }

    /// Petición pre-rellenada con el `default_value` de cada parámetro
    /// (o `null`), útil para construir formularios.
    pub fn template(chain: &ChainDefinition, store: &dyn ProjectStore) -> Result<Self, EngineError> {
        let mut request = ChainRequest::new(chain.name.clone());
        for name in chain.algorithm_names() {
            let definition = store.algorithm_definition(name)
                                  .ok_or_else(|| EngineError::AlgorithmNotFound(name.to_string()))?;
            let parameters = definition.all_parameters()
                                       .map(|p| (p.name.clone(), p.default_value.clone().unwrap_or(Value::Null)))
                                       .collect();
            request.algorithms.push(AlgorithmRequest { name: name.to_string(),
                                                       parameters });
        }
        Ok(request)
    }
}
