use std::fs;
use std::path::Path;

use chain_core::{Algorithm, AlgorithmRegistry, AlgorithmRequest, AlgorithmResult, ChainLedger, ChainRequest,
                 ChainResponse, ChainService, ParamMap, ProjectStore, RunMode, SourceKind};
use chain_persistence::{FsHistoryWriter, FsProjectStore, PersistenceError};
use serde_json::json;

fn write(path: &Path, content: &serde_json::Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(content).unwrap()).unwrap();
}

fn project(root: &Path) {
    write(&root.join("algorithms/greet/algorithm.json"),
          &json!({"name": "greet", "version": "0.1.0",
                  "required_parameters": [{"name": "who", "data_type": "String", "default_value": "world"}],
                  "optional_parameters": [], "outputs": [{"name": "greeting"}]}));
    write(&root.join("algorithms/text/shout/algorithm.json"),
          &json!({"name": "text/shout",
                  "required_parameters": [{"name": "text", "data_type": "string"}]}));
    fs::create_dir_all(root.join("algorithms/broken")).unwrap();
    fs::write(root.join("algorithms/broken/algorithm.json"), "{ not json").unwrap();
    write(&root.join("chains/hello.json"),
          &json!({"hello": [
              {"algorithm": "greet", "parameter_source": "user"},
              {"algorithm": "text/shout", "parameters": {
                  "text": {"source": "chain_ledger", "source_algorithm": "greet", "key": "greeting"}}}
          ]}));
    write(&root.join("chains.json"), &json!({"legacy": [{"algorithm": "greet"}], "empty": []}));
}

#[test]
fn loads_definitions_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    project(dir.path());
    let store = FsProjectStore::new(dir.path());
    store.validate_layout().unwrap();

    let greet = store.algorithm_definition("greet").unwrap();
    assert_eq!(greet.required_parameters[0].default_value, Some(json!("world")));
    assert!(store.algorithm_definition("text/shout").is_some());
    assert!(store.algorithm_definition("broken").is_none());
    assert!(matches!(store.load_algorithm("broken"), Err(PersistenceError::Json(_))));
    assert!(store.algorithm_definition("missing").is_none());

    let hello = store.chain_definition("hello").unwrap();
    assert_eq!(hello.len(), 2);
    assert_eq!(hello.stages[1].source_of(&hello.stages[1].parameters["text"]), SourceKind::ChainLedger);
    assert!(store.chain_definition("legacy").is_some());
    assert!(store.chain_definition("empty").is_none());
    assert!(store.chain_definition("nope").is_none());

    assert_eq!(store.chain_names(), vec!["empty", "hello", "legacy"]);
    assert_eq!(store.algorithm_names(), vec!["broken", "greet", "text/shout"]);
}

#[test]
fn layout_validation_reports_missing_folders() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsProjectStore::new(dir.path());
    assert!(matches!(store.validate_layout(), Err(PersistenceError::InvalidLayout(_))));
    fs::create_dir_all(dir.path().join("algorithms")).unwrap();
    assert!(matches!(store.validate_layout(), Err(PersistenceError::InvalidLayout(_))));
    fs::create_dir_all(dir.path().join("chains")).unwrap();
    assert!(store.validate_layout().is_ok());
}

#[test]
fn history_writer_creates_folder_and_pretty_prints() {
    let dir = tempfile::tempdir().unwrap();
    let writer = FsHistoryWriter::new(dir.path().join("history"));
    let path = writer.write("k.json", &json!({"atk_chain_metadata": []})).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains('\n'));
    assert_eq!(writer.read("k.json").unwrap(), json!({"atk_chain_metadata": []}));
    assert!(matches!(writer.read("other.json"), Err(PersistenceError::NotFound(_))));
}

#[test]
fn history_writer_stays_inside_its_folder() {
    let dir = tempfile::tempdir().unwrap();
    let writer = FsHistoryWriter::new(dir.path().join("history"));
    for name in ["../escape.json", "/tmp/abs.json", "a/b.json", "..", ""] {
        assert!(matches!(writer.write(name, &json!({})), Err(PersistenceError::InvalidFileName(_))), "{name:?}");
    }
    assert!(!dir.path().join("escape.json").exists());
    assert!(!dir.path().join("history").exists());
}

struct Greet;

impl Algorithm for Greet {
    fn name(&self) -> &str {
        "greet"
    }

    fn run(&self, ledger: &mut ChainLedger, params: &ParamMap) -> AlgorithmResult {
        let who = params["who"].as_str().unwrap_or_default();
        ledger.add_to_metadata("greeting", format!("hello {who}"));
        Ok(())
    }
}

struct Shout;

impl Algorithm for Shout {
    fn name(&self) -> &str {
        "text/shout"
    }

    fn run(&self, ledger: &mut ChainLedger, params: &ParamMap) -> AlgorithmResult {
        let text = params["text"].as_str().unwrap_or_default().to_uppercase();
        ledger.add_to_metadata("chain_output_value", json!({"output_type": "string", "output_value": text}));
        Ok(())
    }
}

#[test]
fn service_runs_a_project_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    project(dir.path());
    let history = dir.path().join("history");
    let mut registry = AlgorithmRegistry::new();
    registry.register("greet", || Box::new(Greet) as Box<dyn Algorithm>)
            .register("text/shout", || Box::new(Shout) as Box<dyn Algorithm>);
    let svc = ChainService::new(FsProjectStore::new(dir.path()), registry, FsHistoryWriter::new(&history))
        .with_working_root(dir.path().join("work"));

    let request = ChainRequest::new("hello").with_algorithm(AlgorithmRequest::new("greet").param("who", "rust"))
                                            .with_algorithm(AlgorithmRequest::new("text/shout"));
    let report = svc.handle(&request, Some("disk"), RunMode::Single).unwrap();

    assert_eq!(report.response, ChainResponse::text("HELLO RUST"));
    let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(history.join("disk.json")).unwrap()).unwrap();
    assert_eq!(saved["atk_chain_metadata"][0]["greeting"], json!("hello rust"));
    assert!(!dir.path().join("work/disk").exists());
}
