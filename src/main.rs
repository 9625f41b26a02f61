use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use algochain_rust::algorithms::{builtin_registry, sample_project_path};
use algochain_rust::engine::{AlgorithmRequest, BatchSpec, ChainRequest, ChainService, RunMode, RunReport};
use algochain_rust::persistence::{init_dotenv, ChainConfig, FsHistoryWriter, FsProjectStore};
use algochain_rust::CoreError;
use log::info;

type Service = ChainService<FsProjectStore, FsHistoryWriter>;

/// Ejecuta una petición en un hilo bloqueante mientras se consulta el estado
/// publicado con la misma `status_key`.
async fn run_with_polling(service: Arc<Service>,
                          request: ChainRequest,
                          key: &str,
                          mode: RunMode)
                          -> Result<RunReport, CoreError> {
    let worker = {
        let service = service.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || service.handle(&request, Some(key.as_str()), mode))
    };
    let mut last_seen = String::new();
    while !worker.is_finished() {
        if let Some(status) = service.status(key) {
            if status.latest_msg != last_seen {
                println!("[{key}] {} (cadena {}%, batch {}%)",
                         status.latest_msg, status.chain_percent_complete, status.batch_percent_complete);
                last_seen = status.latest_msg;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    let report = worker.await.map_err(|e| CoreError::Internal(e.to_string()))??;
    Ok(report)
}

fn build_service() -> Result<Service, CoreError> {
    let config = ChainConfig::from_env();
    // sin CHAIN_PROJECT_PATH se usa el proyecto de ejemplo
    let project = if config.project_path == PathBuf::from(".") { sample_project_path() } else { config.project_path.clone() };
    let store = FsProjectStore::new(project);
    store.validate_layout()?;
    info!("proyecto: {}", store.root().display());
    Ok(ChainService::new(store, builtin_registry(), FsHistoryWriter::from_config(&config))
        .with_working_root(config.working_root))
}

#[tokio::main]
async fn main() -> Result<(), CoreError> {
    init_dotenv();
    env_logger::init();

    let service = Arc::new(build_service()?);
    println!("Cadenas disponibles: {:?}", service.list_chains());

    println!("--- Demo: do_some_math ---");
    let math = ChainRequest::new("do_some_math")
        .with_algorithm(AlgorithmRequest::new("add_numbers").param("a", 2).param("b", 3))
        .with_algorithm(AlgorithmRequest::new("multiply_numbers").param("b", 4))
        .with_algorithm(AlgorithmRequest::new("output_text").param("prefix", "Resultado: "));
    let report = run_with_polling(service.clone(), math, "demo-math", RunMode::Single).await?;
    println!("[demo-math] respuesta: {}", report.response.to_value());

    println!("--- Demo: batch sobre rango ---");
    let template = service.template("do_some_math")?;
    let spec = BatchSpec::new("add_numbers__a", "range", "1,3");
    let report = run_with_polling(service.clone(), template, "demo-range", RunMode::Batch(spec)).await?;
    println!("[demo-range] respuesta: {}", report.response.to_value());

    println!("--- Demo: describe_files ---");
    let pattern = sample_project_path().join("data").join("*.txt");
    let request = ChainRequest::new("describe_files").with_algorithm(AlgorithmRequest::new("read_text_file"))
                                                     .with_algorithm(AlgorithmRequest::new("output_text"));
    let spec = BatchSpec::new("read_text_file__path", "files", pattern.to_string_lossy());
    let report = run_with_polling(service.clone(), request, "demo-files", RunMode::Batch(spec)).await?;
    println!("[demo-files] respuesta: {}", report.response.to_value());

    println!("Historiales en {}", service.writer().folder().display());
    Ok(())
}
