//! Valores de parámetro tipados.
//!
//! El validador convierte los valores JSON recibidos en la petición (o
//! resueltos desde el ledger) a `ParamValue`, de modo que los algoritmos
//! reciben tipos concretos en lugar de JSON arbitrario.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parámetros tal como llegan en la petición: nombre -> JSON.
pub type RawParams = IndexMap<String, Value>;

/// Parámetros ya validados y coaccionados.
pub type ParamMap = IndexMap<String, ParamValue>;

/// Valor de un parámetro tras la coacción al tipo declarado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Enteros y flotantes se leen como `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(i) => Some(*i as f64),
            ParamValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            ParamValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Representación JSON del valor (para archivar en el historial).
    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::Int(i) => Value::from(*i),
            ParamValue::Float(f) => serde_json::Number::from_f64(*f).map(Value::Number)
                                                                   .unwrap_or(Value::Null),
            ParamValue::String(s) => Value::String(s.clone()),
            ParamValue::Array(items) => Value::Array(items.clone()),
        }
    }

    /// Forma textual usada por la validación con expresiones regulares.
    pub fn display_string(&self) -> String {
        match self {
            ParamValue::String(s) => s.clone(),
            ParamValue::Int(i) => i.to_string(),
            ParamValue::Float(f) => format_float(*f),
            ParamValue::Array(items) => Value::Array(items.clone()).to_string(),
        }
    }
}

/// Convierte un `ParamMap` completo a un objeto JSON.
pub fn params_to_value(params: &ParamMap) -> Value {
    let map: serde_json::Map<String, Value> = params.iter()
                                                    .map(|(k, v)| (k.clone(), v.to_json()))
                                                    .collect();
    Value::Object(map)
}

/// Formatea un flotante dejando siempre la parte decimal (`14` -> `14.0`),
/// que es como se muestran los límites en los mensajes de error.
pub fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn untagged_serialization_is_plain_json() {
        assert_eq!(serde_json::to_value(ParamValue::Int(3)).unwrap(), json!(3));
        assert_eq!(serde_json::to_value(ParamValue::String("a".into())).unwrap(), json!("a"));
        assert_eq!(serde_json::to_value(ParamValue::Array(vec![json!(1)])).unwrap(), json!([1]));
    }

    #[test]
    fn float_format_keeps_decimal() {
        assert_eq!(format_float(14.0), "14.0");
        assert_eq!(format_float(13.25), "13.25");
    }

    #[test]
    fn params_to_value_converts_each_entry() {
        let mut p = ParamMap::new();
        p.insert("b".into(), ParamValue::Int(1));
        p.insert("a".into(), ParamValue::Float(2.5));
        let v = params_to_value(&p);
        assert_eq!(v, json!({"b": 1, "a": 2.5}));
    }
}
