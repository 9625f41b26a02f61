//! Parámetros de algoritmos: esquema declarativo, valores tipados y
//! validación.

pub mod definition;
pub mod validator;
pub mod value;

pub use definition::{AlgorithmDefinition, CustomRule, DataType, OutputSpec, ParameterSpec};
pub use validator::{coerce, validate, Validation};
pub use value::{params_to_value, ParamMap, ParamValue, RawParams};
