use serde::de::DeserializeOwned;

use super::{Algorithm, AlgorithmResult};
use crate::errors::ChainError;
use crate::ledger::ChainLedger;
use crate::params::{params_to_value, ParamMap};

/// Interfaz de alto nivel para algoritmos con parámetros tipados.
///
/// Implementadores escriben `run_typed` con un struct serde; el adaptador de
/// abajo lo decodifica desde el `ParamMap` validado.
pub trait TypedAlgorithm {
    /// Parámetros deserializables desde el mapa validado.
    type Params: DeserializeOwned;

    /// Identificador estable del algoritmo.
    fn id(&self) -> &'static str;

    fn run_typed(&self, ledger: &mut ChainLedger, params: Self::Params) -> AlgorithmResult;
}

// -------------------------------------------------------------
// Adaptador: cualquier `TypedAlgorithm` implementa `Algorithm` neutro.
// -------------------------------------------------------------
impl<T> Algorithm for T where T: TypedAlgorithm
{
    fn name(&self) -> &str {
        self.id()
    }

    fn run(&self, ledger: &mut ChainLedger, params: &ParamMap) -> AlgorithmResult {
        let typed: T::Params = serde_json::from_value(params_to_value(params))
            .map_err(|e| ChainError::business(format!("Invalid parameters for {}: {}", self.id(), e)))?;
        self.run_typed(ledger, typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::InMemoryStatusBoard;
    use crate::params::ParamValue;
    use serde::Deserialize;
    use std::sync::Arc;

    #[derive(Deserialize)]
    struct ScaleParams {
        value: f64,
        #[serde(default = "one")]
        factor: f64,
    }

    fn one() -> f64 {
        1.0
    }

    struct Scale;

    impl TypedAlgorithm for Scale {
        type Params = ScaleParams;

        fn id(&self) -> &'static str {
            "scale"
        }

        fn run_typed(&self, ledger: &mut ChainLedger, p: ScaleParams) -> AlgorithmResult {
            ledger.add_to_metadata("scaled", p.value * p.factor);
            Ok(())
        }
    }

    #[test]
    fn typed_params_are_decoded() {
        let mut ledger = ChainLedger::new("k", Arc::new(InMemoryStatusBoard::new()));
        let mut params = ParamMap::new();
        params.insert("value".into(), ParamValue::Float(2.5));
        params.insert("factor".into(), ParamValue::Float(2.0));
        Scale.run(&mut ledger, &params).unwrap();
        assert_eq!(ledger.get_json("scaled").unwrap(), &serde_json::json!(5.0));
        assert_eq!(Algorithm::name(&Scale), "scale");
    }

    #[test]
    fn undecodable_params_are_business_errors() {
        let mut ledger = ChainLedger::new("k", Arc::new(InMemoryStatusBoard::new()));
        let err = Scale.run(&mut ledger, &ParamMap::new()).unwrap_err();
        assert!(!err.is_parameter());
        assert!(err.to_string().starts_with("Invalid parameters for scale"));
    }
}
