use chain_algorithms::{builtin_registry, definitions, sample_project_path};
use chain_core::{AlgorithmRequest, BatchSpec, ChainDefinition, ChainRequest, ChainResponse, ChainService, InMemoryHistoryWriter,
                 ProjectStore, RunMode, StageDescriptor};
use chain_persistence::FsProjectStore;

fn service(work: &std::path::Path) -> ChainService<FsProjectStore, InMemoryHistoryWriter> {
    ChainService::new(FsProjectStore::new(sample_project_path()),
                      builtin_registry(),
                      InMemoryHistoryWriter::new()).with_working_root(work)
}

#[test]
fn project_files_match_builtin_definitions() {
    let store = FsProjectStore::new(sample_project_path());
    store.validate_layout().unwrap();
    for def in definitions() {
        let on_disk = store.algorithm_definition(&def.name).unwrap_or_else(|| panic!("{} missing", def.name));
        let names = |d: &chain_core::AlgorithmDefinition| {
            d.all_parameters().map(|p| (p.name.clone(), p.data_type)).collect::<Vec<_>>()
        };
        assert_eq!(names(&on_disk), names(&def), "{}", def.name);
        let outputs = |d: &chain_core::AlgorithmDefinition| d.outputs.iter().map(|o| o.name.clone()).collect::<Vec<_>>();
        assert_eq!(outputs(&on_disk), outputs(&def), "{}", def.name);
    }
    assert_eq!(store.chain_names(), vec!["describe_files", "do_some_math"]);
}

#[test]
fn do_some_math_chains_results() {
    let work = tempfile::tempdir().unwrap();
    let svc = service(work.path());
    let request = ChainRequest::new("do_some_math")
        .with_algorithm(AlgorithmRequest::new("add_numbers").param("a", 2).param("b", 3))
        .with_algorithm(AlgorithmRequest::new("multiply_numbers").param("b", 4))
        .with_algorithm(AlgorithmRequest::new("output_text").param("prefix", "Result: "));

    let report = svc.handle(&request, Some("math"), RunMode::Single).unwrap();

    assert_eq!(report.response, ChainResponse::text("Result: 20.0"));
    let history = svc.writer().get("math.json").unwrap();
    assert_eq!(history["atk_chain_metadata"][1]["algorithm_params"]["a"], serde_json::json!(5.0));
    assert_eq!(history["atk_chain_metadata"][1]["result"], serde_json::json!(20.0));
}

#[test]
fn template_defaults_run_as_is() {
    let work = tempfile::tempdir().unwrap();
    let svc = service(work.path());
    let template = svc.template("do_some_math").unwrap();
    assert_eq!(template.algorithms.len(), 3);

    let report = svc.handle(&template, None, RunMode::Single).unwrap();
    assert_eq!(report.response, ChainResponse::text("6.0"));
}

#[test]
fn division_by_zero_stops_the_chain() {
    let work = tempfile::tempdir().unwrap();
    let store = chain_algorithms::builtin_store()
        .with_chain(ChainDefinition::new("divide", vec![StageDescriptor::new("divide_numbers")]));
    let svc = ChainService::new(store, builtin_registry(), InMemoryHistoryWriter::new()).with_working_root(work.path());
    let request = ChainRequest::new("divide").with_algorithm(AlgorithmRequest::new("divide_numbers").param("a", 1)
                                                                                                      .param("b", 0));

    let report = svc.handle(&request, Some("div"), RunMode::Single).unwrap();

    assert_eq!(report.response, ChainResponse::error("Cannot divide by zero"));
    assert!(svc.writer().get("div.json").is_some());
}

#[test]
fn describe_files_batch_over_data_folder() {
    let work = tempfile::tempdir().unwrap();
    let svc = service(work.path());
    let pattern = sample_project_path().join("data").join("*.txt");
    let spec = BatchSpec::new("read_text_file__path", "files", pattern.to_string_lossy());
    let request = ChainRequest::new("describe_files").with_algorithm(AlgorithmRequest::new("read_text_file"))
                                                     .with_algorithm(AlgorithmRequest::new("output_text"));

    let report = svc.handle(&request, Some("files"), RunMode::Batch(spec)).unwrap();

    assert_eq!(report.response,
               ChainResponse::BatchResult(vec![ChainResponse::text("first.txt: 2 lines"),
                                               ChainResponse::text("second.txt: 3 lines")]));
    assert_eq!(svc.writer().file_names(), vec!["batch_files.json"]);
}
