//! Validación y coacción de parámetros contra la definición de un algoritmo.
//!
//! Orden de chequeos por parámetro:
//! 1. presencia (sólo requeridos),
//! 2. coacción al `DataType` declarado,
//! 3. límites `min_value` / `max_value` (numéricos),
//! 4. regla personalizada (`greaterthan.x`, `lessthan.x`, `evenonly`, `oddonly`),
//! 5. pertenencia a `parameter_choices`,
//! 6. expresión regular (`custom_validation` que empieza con `^`).
//!
//! Los errores de un mismo parámetro se acumulan; si la coacción falla se
//! omiten 3-5 pero la regex se evalúa igualmente. Nada se lanza: el caller
//! recibe la lista completa en orden (requeridos y luego opcionales).

use regex::Regex;
use serde_json::Value;

use super::definition::{AlgorithmDefinition, CustomRule, DataType, ParameterSpec};
use super::value::{format_float, ParamMap, ParamValue, RawParams};
use crate::errors::{ChainError, ParamError};

pub const MSG_MISSING: &str = "Parameter missing";
pub const MSG_TOO_SMALL: &str = "Value too small";
pub const MSG_TOO_LARGE: &str = "Value too large";
pub const MSG_EVEN: &str = "Value must be an even number";
pub const MSG_ODD: &str = "Value must be an odd number";

/// Resultado de validar un conjunto de parámetros.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validation {
    /// Parámetros coaccionados (sólo los que se pudieron convertir).
    pub params: ParamMap,
    /// Errores en el orden en que se detectaron.
    pub errors: Vec<ParamError>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(params)` si no hubo errores; si no, `ChainError::Parameter`.
    pub fn into_result(self) -> Result<ParamMap, ChainError> {
        if self.errors.is_empty() {
            Ok(self.params)
        } else {
            Err(ChainError::Parameter(self.errors))
        }
    }
}

/// Valida `supplied` contra `definition`.
pub fn validate(definition: &AlgorithmDefinition, supplied: &RawParams) -> Validation {
    let mut out = Validation::default();

    for spec in &definition.required_parameters {
        match supplied.get(&spec.name) {
            None | Some(Value::Null) => out.errors.push(ParamError::new(&spec.name, MSG_MISSING)),
            Some(raw) => check_param(spec, raw, supplied, &mut out),
        }
    }

    for spec in &definition.optional_parameters {
        match supplied.get(&spec.name) {
            // opcionales ausentes o vacíos se descartan en silencio
            None | Some(Value::Null) => {}
            Some(Value::String(s)) if s.is_empty() => {}
            Some(raw) => check_param(spec, raw, supplied, &mut out),
        }
    }

    out
}

fn check_param(spec: &ParameterSpec, raw: &Value, supplied: &RawParams, out: &mut Validation) {
    let mut errors: Vec<String> = Vec::new();
    let rule = spec.custom_rule();
    let coerced = coerce(spec.data_type, raw);

    match &coerced {
        None => errors.push(format!("Not a valid {}", spec.data_type)),
        Some(value) => {
            if spec.data_type.is_numeric() {
                check_numeric(spec, value, rule.as_ref(), &out.params, supplied, &mut errors);
            }
            if let Some(choices) = spec.choices() {
                if !choices.iter().any(|c| matches_choice(value, c)) {
                    errors.push(format!("Value not in list of valid choices: {}", choice_list(choices)));
                }
            }
        }
    }

    if let Some(CustomRule::Regex(pattern)) = &rule {
        let text = match &coerced {
            Some(value) => value.display_string(),
            None => raw_text(raw),
        };
        match Regex::new(pattern) {
            Ok(re) => {
                if !re.is_match(&text) {
                    errors.push(format!("Value does not match expression: \"{pattern}\""));
                }
            }
            Err(_) => errors.push(format!("Invalid expression: \"{pattern}\"")),
        }
    }

    if let Some(value) = coerced {
        out.params.insert(spec.name.clone(), value);
    }
    out.errors
       .extend(errors.into_iter().map(|m| ParamError::new(&spec.name, m)));
}

fn check_numeric(spec: &ParameterSpec,
                 value: &ParamValue,
                 rule: Option<&CustomRule>,
                 coerced: &ParamMap,
                 supplied: &RawParams,
                 errors: &mut Vec<String>) {
    let Some(n) = value.as_f64() else { return };

    if let Some(min) = spec.min_value {
        if n < min {
            errors.push(MSG_TOO_SMALL.to_string());
        }
    }
    if let Some(max) = spec.max_value {
        if n > max {
            errors.push(MSG_TOO_LARGE.to_string());
        }
    }

    match rule {
        Some(CustomRule::GreaterThan(other)) | Some(CustomRule::LessThan(other)) => {
            let greater = matches!(rule, Some(CustomRule::GreaterThan(_)));
            match sibling_value(other, spec.data_type, coerced, supplied) {
                Ok(sibling) => {
                    let bound = sibling.as_f64().unwrap_or(f64::NAN);
                    let shown = sibling.display_string();
                    if greater && n <= bound {
                        errors.push(format!("Value must be greater than {shown}"));
                    } else if !greater && n >= bound {
                        errors.push(format!("Value must be less than {shown}"));
                    }
                }
                Err(msg) => errors.push(msg),
            }
        }
        Some(CustomRule::EvenOnly) => {
            if let ParamValue::Int(i) = value {
                if i % 2 != 0 {
                    errors.push(MSG_EVEN.to_string());
                }
            }
        }
        Some(CustomRule::OddOnly) => {
            if let ParamValue::Int(i) = value {
                if i % 2 == 0 {
                    errors.push(MSG_ODD.to_string());
                }
            }
        }
        _ => {}
    }
}

/// Busca el parámetro hermano ya coaccionado (o, en su defecto, el valor
/// crudo) y lo convierte al mismo tipo numérico.
fn sibling_value(name: &str, data_type: DataType, coerced: &ParamMap, supplied: &RawParams) -> Result<ParamValue, String> {
    let raw = match coerced.get(name) {
        Some(v) => v.to_json(),
        None => match supplied.get(name) {
            Some(v) if !v.is_null() => v.clone(),
            _ => return Err(format!("Comparison parameter not found: {name}")),
        },
    };
    coerce(data_type, &raw).ok_or_else(|| format!("Comparison parameter {name} is not a valid {data_type}"))
}

/// Convierte `raw` al tipo declarado. `None` si no es convertible.
pub fn coerce(data_type: DataType, raw: &Value) -> Option<ParamValue> {
    match data_type {
        DataType::String => match raw {
            Value::Null => None,
            Value::String(s) => Some(ParamValue::String(s.clone())),
            other => Some(ParamValue::String(other.to_string())),
        },
        DataType::Integer => match raw {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(ParamValue::Int(i)),
                // los flotantes se truncan hacia cero
                None => n.as_f64().filter(|f| f.is_finite()).map(|f| ParamValue::Int(f.trunc() as i64)),
            },
            Value::String(s) => s.trim().parse::<i64>().ok().map(ParamValue::Int),
            _ => None,
        },
        DataType::Float => match raw {
            Value::Number(n) => n.as_f64().map(ParamValue::Float),
            Value::String(s) => s.trim().parse::<f64>().ok().map(ParamValue::Float),
            _ => None,
        },
        DataType::Array => match raw {
            Value::Array(items) => Some(ParamValue::Array(items.clone())),
            Value::String(s) => parse_array_text(s).map(ParamValue::Array),
            _ => None,
        },
    }
}

/// Acepta `"[1,2,3]"` y `"1,2,3"`. Cada ítem se interpreta como escalar JSON
/// si es posible (`"2"` -> 2) y como texto si no.
fn parse_array_text(s: &str) -> Option<Vec<Value>> {
    if s.is_empty() {
        return None;
    }
    let inner = match s.strip_prefix('[') {
        Some(rest) => rest.strip_suffix(']').unwrap_or(rest),
        None => s,
    };
    if inner.trim().is_empty() {
        return Some(vec![]);
    }
    Some(inner.split(',')
              .map(|item| {
                  let item = item.trim();
                  serde_json::from_str::<Value>(item).unwrap_or_else(|_| Value::String(item.to_string()))
              })
              .collect())
}

fn matches_choice(value: &ParamValue, choice: &Value) -> bool {
    match (value, choice) {
        (ParamValue::String(s), Value::String(c)) => s == c,
        (ParamValue::Int(_) | ParamValue::Float(_), Value::Number(c)) => value.as_f64() == c.as_f64(),
        (ParamValue::Array(items), Value::Array(c)) => items == c,
        _ => false,
    }
}

/// `['thing1', 'thing2']`, como se muestran las opciones a los usuarios.
fn choice_list(choices: &[Value]) -> String {
    let items: Vec<String> = choices.iter()
                                    .map(|c| match c {
                                        Value::String(s) => format!("'{s}'"),
                                        Value::Number(n) => match n.as_i64() {
                                            Some(i) => i.to_string(),
                                            None => n.as_f64().map(format_float).unwrap_or_else(|| n.to_string()),
                                        },
                                        other => other.to_string(),
                                    })
                                    .collect();
    format!("[{}]", items.join(", "))
}

fn raw_text(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
