use crate::errors::ChainError;
use crate::ledger::ChainLedger;
use crate::params::ParamMap;

/// Resultado de ejecutar un algoritmo: el ledger se muta in situ.
pub type AlgorithmResult = Result<(), ChainError>;

/// Unidad de cómputo ejecutable dentro de una cadena.
///
/// El motor sólo llama a `run` con parámetros ya validados y coaccionados
/// según la `AlgorithmDefinition` del mismo nombre. Los efectos se limitan a
/// la metadata del ledger y, opcionalmente, a su carpeta temporal.
pub trait Algorithm {
    /// Nombre con el que se registró (usado en logs).
    fn name(&self) -> &str;

    /// Ejecuta la unidad. Un `ChainError::Business` detiene la cadena con
    /// el texto del error.
    fn run(&self, ledger: &mut ChainLedger, params: &ParamMap) -> AlgorithmResult;
}
