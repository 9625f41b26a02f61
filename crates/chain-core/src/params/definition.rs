//! Esquema declarativo de un algoritmo (`algorithm.json`).
//!
//! La definición es inmutable una vez cargada: el motor la consulta por
//! nombre en el `ProjectStore` antes de validar los parámetros de cada etapa.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Tipos de dato admitidos para parámetros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    String,
    Integer,
    Float,
    Array,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Integer => "integer",
            DataType::Float => "float",
            DataType::Array => "array",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Float)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" => Ok(DataType::String),
            "integer" => Ok(DataType::Integer),
            "float" => Ok(DataType::Float),
            "array" => Ok(DataType::Array),
            other => Err(format!("unknown data_type: {other}")),
        }
    }
}

impl Serialize for DataType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// Los esquemas escritos a mano usan "Integer", "integer", etc.
impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Regla de validación personalizada ya interpretada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomRule {
    GreaterThan(String),
    LessThan(String),
    EvenOnly,
    OddOnly,
    Regex(String),
}

impl CustomRule {
    /// Interpreta el texto de `custom_validation`. Las reglas con nombre no
    /// distinguen mayúsculas ni espacios; la regex se conserva literal.
    pub fn parse(raw: &str) -> Option<CustomRule> {
        if raw.is_empty() {
            return None;
        }
        if raw.starts_with('^') {
            return Some(CustomRule::Regex(raw.to_string()));
        }
        let normalized: String = raw.to_lowercase().chars().filter(|c| *c != ' ').collect();
        if let Some(other) = normalized.strip_prefix("greaterthan.") {
            return Some(CustomRule::GreaterThan(other.to_string()));
        }
        if let Some(other) = normalized.strip_prefix("lessthan.") {
            return Some(CustomRule::LessThan(other.to_string()));
        }
        match normalized.as_str() {
            "evenonly" => Some(CustomRule::EvenOnly),
            "oddonly" => Some(CustomRule::OddOnly),
            _ => None,
        }
    }
}

/// Descriptor de un parámetro declarado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
    #[serde(default)]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub custom_validation: Option<String>,
    #[serde(default)]
    pub parameter_choices: Option<Vec<Value>>,
    #[serde(default)]
    pub sort_order: i64,
}

impl ParameterSpec {
    /// Descriptor mínimo, útil para construir definiciones en código.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self { name: name.into(),
               data_type,
               display_name: None,
               description: None,
               field_type: None,
               help_text: None,
               min_value: None,
               max_value: None,
               default_value: None,
               custom_validation: None,
               parameter_choices: None,
               sort_order: 0 }
    }

    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_value = min;
        self.max_value = max;
        self
    }

    pub fn with_custom(mut self, rule: impl Into<String>) -> Self {
        self.custom_validation = Some(rule.into());
        self
    }

    pub fn with_choices(mut self, choices: Vec<Value>) -> Self {
        self.parameter_choices = Some(choices);
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn custom_rule(&self) -> Option<CustomRule> {
        self.custom_validation.as_deref().and_then(CustomRule::parse)
    }

    /// Lista de opciones si está declarada y no vacía.
    pub fn choices(&self) -> Option<&[Value]> {
        self.parameter_choices.as_deref().filter(|c| !c.is_empty())
    }
}

/// Salida declarada de un algoritmo (clave que deja en el ledger).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
}

/// Definición inmutable de un algoritmo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub required_parameters: Vec<ParameterSpec>,
    #[serde(default)]
    pub optional_parameters: Vec<ParameterSpec>,
    #[serde(default)]
    pub outputs: Vec<OutputSpec>,
}

impl AlgorithmDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(),
               display_name: None,
               description: None,
               version: None,
               license: None,
               homepage: None,
               private: false,
               required_parameters: vec![],
               optional_parameters: vec![],
               outputs: vec![] }
    }

    pub fn required(mut self, spec: ParameterSpec) -> Self {
        self.required_parameters.push(spec);
        self
    }

    pub fn optional(mut self, spec: ParameterSpec) -> Self {
        self.optional_parameters.push(spec);
        self
    }

    pub fn output(mut self, name: impl Into<String>, data_type: Option<DataType>) -> Self {
        self.outputs.push(OutputSpec { name: name.into(),
                                       data_type,
                                       display_name: None,
                                       description: None,
                                       sort_order: self.outputs.len() as i64 });
        self
    }

    /// Todos los parámetros en orden: requeridos y luego opcionales.
    pub fn all_parameters(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.required_parameters.iter().chain(self.optional_parameters.iter())
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.all_parameters().find(|p| p.name == name)
    }

    /// Devuelve el primer nombre de parámetro repetido, si existe.
    pub fn check_unique_names(&self) -> Result<(), String> {
        let mut seen = std::collections::HashSet::new();
        for p in self.all_parameters() {
            if !seen.insert(p.name.as_str()) {
                return Err(format!("duplicated parameter '{}' in algorithm '{}'", p.name, self.name));
            }
        }
        Ok(())
    }
}
