mod args;

use std::process;

use chain_algorithms::builtin_registry;
use chain_core::{ChainService, EngineError, RunMode, RunReport};
use chain_persistence::{init_dotenv, ChainConfig, FsHistoryWriter, FsProjectStore};
use log::{error, info};
use serde_json::json;

use crate::args::{parse, Command, USAGE};

const EXIT_OK: i32 = 0;
const EXIT_USAGE: i32 = 2;
const EXIT_NOT_FOUND: i32 = 4;
const EXIT_ERROR: i32 = 5;

fn main() {
    init_dotenv();
    env_logger::init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse(&argv) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[chain-cli] {}\n\n{}", e.0, USAGE);
            process::exit(EXIT_USAGE);
        }
    };

    let config = ChainConfig::from_env();
    let store = FsProjectStore::from_config(&config);
    if let Err(e) = store.validate_layout() {
        eprintln!("[chain-cli] {e}");
        process::exit(EXIT_ERROR);
    }
    info!("proyecto en {}", store.root().display());
    let service = ChainService::new(store, builtin_registry(), FsHistoryWriter::from_config(&config))
        .with_working_root(config.working_root.clone());

    process::exit(execute(&service, command));
}

fn execute(service: &ChainService<FsProjectStore, FsHistoryWriter>, command: Command) -> i32 {
    match command {
        Command::List => {
            for name in service.list_chains() {
                println!("{name}");
            }
            EXIT_OK
        }
        Command::Template { name } => match service.template(&name) {
            Ok(request) => print_json(&json!(request)),
            Err(e) => engine_failure(e),
        },
        Command::Run { request, status_key } => {
            report(service.handle(&request, status_key.as_deref(), RunMode::Single))
        }
        Command::Batch { request, spec, status_key } => {
            report(service.handle(&request, status_key.as_deref(), RunMode::Batch(spec)))
        }
    }
}

fn report(result: Result<RunReport, EngineError>) -> i32 {
    match result {
        Ok(report) => {
            let code = if report.response.is_error() { EXIT_ERROR } else { EXIT_OK };
            print_json(&json!({ "status_key": report.status_key, "response": report.response })).max(code)
        }
        Err(e) => engine_failure(e),
    }
}

fn print_json(value: &serde_json::Value) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{text}");
            EXIT_OK
        }
        Err(e) => {
            error!("salida no serializable: {e}");
            EXIT_ERROR
        }
    }
}

fn engine_failure(err: EngineError) -> i32 {
    eprintln!("[chain-cli] {err}");
    match err {
        EngineError::ChainNotFound(_) | EngineError::AlgorithmNotFound(_) => EXIT_NOT_FOUND,
        EngineError::InvalidStatusKey(_) => EXIT_USAGE,
        _ => EXIT_ERROR,
    }
}
