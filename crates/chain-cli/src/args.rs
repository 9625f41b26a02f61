//! Parseo manual de argumentos: `<comando> --flag valor ...`.

use std::fs;

use chain_core::{BatchSpec, ChainRequest};

pub const USAGE: &str = "Uso:
  chain-cli run --chain '<JSON>' [--status-key K]
  chain-cli batch --chain '<JSON>' --iter-param algo__param --iter-type files|range --iter-value V [--status-key K]
  chain-cli list
  chain-cli template --name <cadena>

--chain acepta el JSON de la petición o @ruta a un archivo con él.";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run { request: ChainRequest, status_key: Option<String> },
    Batch { request: ChainRequest, spec: BatchSpec, status_key: Option<String> },
    List,
    Template { name: String },
}

/// Error de uso (código de salida 2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageError(pub String);

#[derive(Debug, Default)]
struct Flags {
    chain: Option<String>,
    status_key: Option<String>,
    iter_param: Option<String>,
    iter_type: Option<String>,
    iter_value: Option<String>,
    name: Option<String>,
}

fn parse_flags(rest: &[String]) -> Result<Flags, UsageError> {
    let mut flags = Flags::default();
    let mut i = 0;
    while i < rest.len() {
        let flag = rest[i].as_str();
        let value = rest.get(i + 1)
                        .cloned()
                        .ok_or_else(|| UsageError(format!("falta valor para {flag}")))?;
        let slot = match flag {
            "--chain" => &mut flags.chain,
            "--status-key" => &mut flags.status_key,
            "--iter-param" => &mut flags.iter_param,
            "--iter-type" => &mut flags.iter_type,
            "--iter-value" => &mut flags.iter_value,
            "--name" => &mut flags.name,
            other => return Err(UsageError(format!("flag desconocido: {other}"))),
        };
        *slot = Some(value);
        i += 2;
    }
    Ok(flags)
}

fn require(value: Option<String>, flag: &str) -> Result<String, UsageError> {
    value.ok_or_else(|| UsageError(format!("{flag} es obligatorio")))
}

/// Lee la petición en línea o desde `@archivo`.
fn parse_request(raw: &str) -> Result<ChainRequest, UsageError> {
    let text = match raw.strip_prefix('@') {
        Some(path) => fs::read_to_string(path).map_err(|e| UsageError(format!("no se pudo leer {path}: {e}")))?,
        None => raw.to_string(),
    };
    serde_json::from_str(&text).map_err(|e| UsageError(format!("petición inválida: {e}")))
}

pub fn parse(args: &[String]) -> Result<Command, UsageError> {
    let Some((command, rest)) = args.split_first() else {
        return Err(UsageError("falta el comando".into()));
    };
    let flags = parse_flags(rest)?;
    match command.as_str() {
        "run" => Ok(Command::Run { request: parse_request(&require(flags.chain, "--chain")?)?,
                                   status_key: flags.status_key }),
        "batch" => {
            let request = parse_request(&require(flags.chain, "--chain")?)?;
            let spec = BatchSpec::new(require(flags.iter_param, "--iter-param")?,
                                      require(flags.iter_type, "--iter-type")?,
                                      require(flags.iter_value, "--iter-value")?);
            Ok(Command::Batch { request,
                                spec,
                                status_key: flags.status_key })
        }
        "list" => Ok(Command::List),
        "template" => Ok(Command::Template { name: require(flags.name, "--name")? }),
        other => Err(UsageError(format!("comando desconocido: {other}"))),
    }
}
