//! Operaciones aritméticas sobre dos operandos.
//!
//! Cada una deja `result` en el ledger y, para encadenarlas, lee sus
//! operandos de la petición o de una etapa anterior según la cadena.

use chain_core::params::{AlgorithmDefinition, DataType, ParameterSpec};
use chain_core::{typed_algorithm, ChainError};
use serde::Deserialize;

pub const RESULT_KEY: &str = "result";

#[derive(Debug, Clone, Deserialize)]
pub struct Operands {
    pub a: f64,
    pub b: f64,
}

typed_algorithm! {
    AddNumbers {
        id: "add_numbers",
        params: Operands,
        run(_self, ledger, p) {
            ledger.add_to_metadata(RESULT_KEY, p.a + p.b);
            Ok(())
        }
    }
}

typed_algorithm! {
    SubtractNumbers {
        id: "subtract_numbers",
        params: Operands,
        run(_self, ledger, p) {
            ledger.add_to_metadata(RESULT_KEY, p.a - p.b);
            Ok(())
        }
    }
}

typed_algorithm! {
    MultiplyNumbers {
        id: "multiply_numbers",
        params: Operands,
        run(_self, ledger, p) {
            ledger.add_to_metadata(RESULT_KEY, p.a * p.b);
            Ok(())
        }
    }
}

typed_algorithm! {
    DivideNumbers {
        id: "divide_numbers",
        params: Operands,
        run(_self, ledger, p) {
            if p.b == 0.0 {
                return Err(ChainError::business("Cannot divide by zero"));
            }
            ledger.add_to_metadata(RESULT_KEY, p.a / p.b);
            Ok(())
        }
    }
}

fn binary(name: &str, display: &str) -> AlgorithmDefinition {
    let mut def = AlgorithmDefinition::new(name).required(ParameterSpec::new("a", DataType::Float))
                                                .required(ParameterSpec::new("b", DataType::Float))
                                                .output(RESULT_KEY, Some(DataType::Float));
    def.display_name = Some(display.to_string());
    def.version = Some("0.1.0".to_string());
    def
}

pub fn definitions() -> Vec<AlgorithmDefinition> {
    let mut divide = binary("divide_numbers", "Divide Numbers");
    // el divisor se rechaza en ejecución, no en validación
    divide.required_parameters[1].description = Some("Divisor; zero is rejected at run time".into());
    vec![binary("add_numbers", "Add Numbers"),
         binary("subtract_numbers", "Subtract Numbers"),
         binary("multiply_numbers", "Multiply Numbers"),
         divide]
}
