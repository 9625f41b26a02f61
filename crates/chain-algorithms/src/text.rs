//! Algoritmos de texto: lectura de archivos y salida final de la cadena.

use std::fs;
use std::path::Path;

use chain_core::constants::CHAIN_OUTPUT_KEY;
use chain_core::params::{AlgorithmDefinition, DataType, ParameterSpec};
use chain_core::{typed_algorithm, ChainError};
use log::debug;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct OutputParams {
    pub text: String,
    #[serde(default)]
    pub prefix: Option<String>,
}

typed_algorithm! {
    OutputText {
        id: "output_text",
        params: OutputParams,
        run(_self, ledger, p) {
            let text = match p.prefix {
                Some(prefix) if !prefix.is_empty() => format!("{prefix}{}", p.text),
                _ => p.text,
            };
            ledger.add_to_metadata(CHAIN_OUTPUT_KEY, text);
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadParams {
    pub path: String,
}

typed_algorithm! {
    ReadTextFile {
        id: "read_text_file",
        params: ReadParams,
        run(_self, ledger, p) {
            let text = fs::read_to_string(&p.path)
                .map_err(|_| ChainError::business(format!("File could not be read: {}", p.path)))?;
            let line_count = text.lines().count() as i64;
            let file_name = Path::new(&p.path).file_name()
                                              .map(|n| n.to_string_lossy().into_owned())
                                              .unwrap_or_else(|| p.path.clone());
            debug!("{} leído: {} líneas", file_name, line_count);
            ledger.add_to_metadata("summary", format!("{file_name}: {line_count} lines"));
            ledger.add_to_metadata("text", text);
            ledger.add_to_metadata("line_count", line_count);
            ledger.add_to_metadata("file_name", file_name);
            Ok(())
        }
    }
}

pub fn definitions() -> Vec<AlgorithmDefinition> {
    let mut output = AlgorithmDefinition::new("output_text").required(ParameterSpec::new("text", DataType::String))
                                                            .optional(ParameterSpec::new("prefix", DataType::String));
    output.display_name = Some("Output Text".into());
    output.version = Some("0.1.0".into());

    let mut read = AlgorithmDefinition::new("read_text_file").required(ParameterSpec::new("path", DataType::String))
                                                             .output("text", Some(DataType::String))
                                                             .output("line_count", Some(DataType::Integer))
                                                             .output("file_name", Some(DataType::String))
                                                             .output("summary", Some(DataType::String));
    read.display_name = Some("Read Text File".into());
    read.version = Some("0.1.0".into());
    vec![read, output]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_core::params::{ParamMap, ParamValue};
    use chain_core::{Algorithm, ChainLedger, InMemoryStatusBoard};
    use serde_json::json;
    use std::sync::Arc;

    fn ledger() -> ChainLedger {
        ChainLedger::new("text", Arc::new(InMemoryStatusBoard::new()))
    }

    fn params(pairs: &[(&str, &str)]) -> ParamMap {
        pairs.iter()
             .map(|(k, v)| (k.to_string(), ParamValue::String(v.to_string())))
             .collect()
    }

    #[test]
    fn output_text_applies_prefix() {
        let mut l = ledger();
        OutputText.run(&mut l, &params(&[("text", "20.0"), ("prefix", "Result: ")])).unwrap();
        assert_eq!(l.get_json(CHAIN_OUTPUT_KEY).unwrap(), &json!("Result: 20.0"));
    }

    #[test]
    fn read_text_file_reports_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "uno\ndos\ntres\n").unwrap();
        let mut l = ledger();
        ReadTextFile.run(&mut l, &params(&[("path", path.to_str().unwrap())])).unwrap();
        assert_eq!(l.get_json("line_count").unwrap(), &json!(3));
        assert_eq!(l.get_json("summary").unwrap(), &json!("notes.txt: 3 lines"));
    }

    #[test]
    fn missing_file_is_business_error() {
        let err = ReadTextFile.run(&mut ledger(), &params(&[("path", "/no/such/file.txt")])).unwrap_err();
        assert_eq!(err, ChainError::business("File could not be read: /no/such/file.txt"));
    }
}
