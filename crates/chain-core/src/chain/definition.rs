//! Definiciones de cadena: lista lineal de etapas con el origen de cada
//! parámetro.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Origen de un parámetro de etapa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Valor enviado directamente en la petición.
    #[default]
    User,
    /// Valor leído del historial de una etapa anterior.
    ChainLedger,
}

/// Enlace de un parámetro con su origen.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParameterBinding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_algorithm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Ordinal en palabras ("first", "second"...); por defecto la última.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence: Option<String>,
}

impl ParameterBinding {
    pub fn user() -> Self {
        Self { source: Some(SourceKind::User),
               ..Self::default() }
    }

    pub fn ledger(source_algorithm: impl Into<String>, key: impl Into<String>) -> Self {
        Self { source: Some(SourceKind::ChainLedger),
               source_algorithm: Some(source_algorithm.into()),
               key: Some(key.into()),
               occurrence: None }
    }

    pub fn with_occurrence(mut self, occurrence: impl Into<String>) -> Self {
        self.occurrence = Some(occurrence.into());
        self
    }
}

/// Una etapa de la cadena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDescriptor {
    pub algorithm: String,
    /// Origen por defecto para los parámetros sin `source` propio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_source: Option<SourceKind>,
    #[serde(default)]
    pub parameters: IndexMap<String, ParameterBinding>,
}

impl StageDescriptor {
    pub fn new(algorithm: impl Into<String>) -> Self {
        Self { algorithm: algorithm.into(),
               parameter_source: None,
               parameters: IndexMap::new() }
    }

    pub fn bind(mut self, parameter: impl Into<String>, binding: ParameterBinding) -> Self {
        self.parameters.insert(parameter.into(), binding);
        self
    }

    /// Origen efectivo de `binding` dentro de esta etapa.
    pub fn source_of(&self, binding: &ParameterBinding) -> SourceKind {
        binding.source.or(self.parameter_source).unwrap_or_default()
    }
}

/// Cadena con nombre: etapas en orden fijo, sin ramas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDefinition {
    pub name: String,
    pub stages: Vec<StageDescriptor>,
}

impl ChainDefinition {
    pub fn new(name: impl Into<String>, stages: Vec<StageDescriptor>) -> Self {
        Self { name: name.into(),
               stages }
    }

    /// Interpreta una lista de etapas JSON (formato `chains.json`).
    pub fn from_stages_value(name: &str, stages: &Value) -> Result<Self, serde_json::Error> {
        let stages: Vec<StageDescriptor> = serde_json::from_value(stages.clone())?;
        Ok(Self::new(name, stages))
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage(&self, index: usize) -> Option<&StageDescriptor> {
        self.stages.get(index)
    }

    pub fn algorithm_names(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|s| s.algorithm.as_str())
    }
}
