mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chain_core::{AlgorithmRequest, ChainDefinition, ChainExecutor, ChainLedger, ChainResponse, InMemoryStatusBoard,
                 LedgerValue, ParamError, ParameterBinding, StageDescriptor, StatusPublisher};
use support::{pipeline_chain, registry, store_with};

fn pipeline_request(label: &str) -> Vec<AlgorithmRequest> {
    vec![AlgorithmRequest::new("fetch").param("name", "a"),
         AlgorithmRequest::new("combine").param("label", label),
         AlgorithmRequest::new("emit")]
}

fn ledger(board: &Arc<InMemoryStatusBoard>) -> ChainLedger {
    ChainLedger::new("run-key", board.clone())
}

#[test]
fn three_stage_pipeline_passes_values_forward() {
    let store = store_with(vec![pipeline_chain()]);
    let reg = registry(true, Arc::new(AtomicUsize::new(0)));
    let board = Arc::new(InMemoryStatusBoard::new());
    let mut l = ledger(&board);

    let response = ChainExecutor::new(&store, &reg).execute(&pipeline_chain(), &pipeline_request("x"), &mut l);

    assert_eq!(response, ChainResponse::text("tile-a+x"));
    // combine recibió el valor de fetch sin modificar
    assert_eq!(l.get_from_history(1, "received"), Some(&LedgerValue::from("tile-a")));
    assert_eq!(l.history_size(), 3);
    // la metadata de la última etapa queda viva
    assert!(l.get_from_metadata("chain_output_value").is_ok());

    let status = board.fetch("run-key").unwrap();
    assert_eq!(status.chain_percent_complete, 100);
    assert_eq!(status.latest_msg, "Chain run complete");
    assert!(status.all_msg.starts_with("Starting chain run...  \nRunning algorithm: fetch"));
}

#[test]
fn missing_upstream_output_fails_validation() {
    let store = store_with(vec![pipeline_chain()]);
    let calls = Arc::new(AtomicUsize::new(0));
    let reg = registry(false, calls.clone());
    let board = Arc::new(InMemoryStatusBoard::new());
    let mut l = ledger(&board);

    let response = ChainExecutor::new(&store, &reg).execute(&pipeline_chain(), &pipeline_request("x"), &mut l);

    assert_eq!(response.error_message(), Some("Error in parameters"));
    assert_eq!(response.error_list(), Some(&[ParamError::new("tile", "Parameter missing")][..]));
    assert_eq!(calls.load(Ordering::SeqCst), 0, "combine must not run");
    assert_eq!(l.history_size(), 1);
}

#[test]
fn occurrence_selects_among_repeated_stages() {
    let chain = |occurrence: Option<&str>| {
        let mut binding = ParameterBinding::ledger("fetch", "tile");
        binding.occurrence = occurrence.map(str::to_string);
        ChainDefinition::new("repeat",
                             vec![StageDescriptor::new("fetch"),
                                  StageDescriptor::new("fetch"),
                                  StageDescriptor::new("combine").bind("tile", binding)])
    };
    let request = vec![AlgorithmRequest::new("fetch").param("name", "a"),
                       AlgorithmRequest::new("fetch").param("name", "b"),
                       AlgorithmRequest::new("combine")];
    let store = store_with(vec![]);
    let reg = registry(true, Arc::new(AtomicUsize::new(0)));
    let board = Arc::new(InMemoryStatusBoard::new());
    let exec = ChainExecutor::new(&store, &reg);

    let cases = [(None, "tile-b"), (Some("first"), "tile-a"), (Some("second"), "tile-b"), (Some("deadparrot"), "tile-b")];
    for (occurrence, expected) in cases {
        let mut l = ledger(&board);
        let response = exec.execute(&chain(occurrence), &request, &mut l);
        assert_eq!(response, ChainResponse::complete(), "occurrence {occurrence:?}");
        assert_eq!(l.get_json("received").unwrap(), expected, "occurrence {occurrence:?}");
    }

    let mut l = ledger(&board);
    let response = exec.execute(&chain(Some("third")), &request, &mut l);
    assert_eq!(response.error_list(), Some(&[ParamError::new("tile", "Occurrence not found: third")][..]));
}

#[test]
fn source_stage_absent_from_history_is_algorithm_not_found() {
    let chain = ChainDefinition::new("ghost",
                                     vec![StageDescriptor::new("fetch"),
                                          StageDescriptor::new("combine").bind("tile",
                                                                               ParameterBinding::ledger("ghost", "tile"))]);
    let store = store_with(vec![]);
    let reg = registry(true, Arc::new(AtomicUsize::new(0)));
    let board = Arc::new(InMemoryStatusBoard::new());
    let mut l = ledger(&board);
    let request = vec![AlgorithmRequest::new("fetch").param("name", "a"), AlgorithmRequest::new("combine")];

    let response = ChainExecutor::new(&store, &reg).execute(&chain, &request, &mut l);

    assert_eq!(response.error_message(), Some("Error in parameters"));
    assert_eq!(response.error_list(), Some(&[ParamError::new("tile", "Algorithm not found")][..]));
}

#[test]
fn stage_index_past_chain_length_is_algorithm_not_found() {
    let chain = ChainDefinition::new("short", vec![StageDescriptor::new("fetch")]);
    let store = store_with(vec![]);
    let reg = registry(true, Arc::new(AtomicUsize::new(0)));
    let board = Arc::new(InMemoryStatusBoard::new());
    let mut l = ledger(&board);
    let request = vec![AlgorithmRequest::new("fetch").param("name", "a"),
                       AlgorithmRequest::new("fetch").param("name", "b")];

    let response = ChainExecutor::new(&store, &reg).execute(&chain, &request, &mut l);

    assert_eq!(response.error_list(), Some(&[ParamError::new("", "Algorithm not found")][..]));
    assert_eq!(l.history_size(), 1);
}

#[test]
fn unregistered_algorithm_is_algorithm_not_found() {
    let chain = ChainDefinition::new("unknown", vec![StageDescriptor::new("nowhere")]);
    let store = store_with(vec![]);
    let reg = registry(true, Arc::new(AtomicUsize::new(0)));
    let board = Arc::new(InMemoryStatusBoard::new());
    let mut l = ledger(&board);

    let response = ChainExecutor::new(&store, &reg).execute(&chain, &[AlgorithmRequest::new("nowhere")], &mut l);

    assert_eq!(response.error_list(), Some(&[ParamError::new("", "Algorithm not found")][..]));
}

#[test]
fn business_errors_halt_with_their_text() {
    let chain = ChainDefinition::new("bad", vec![StageDescriptor::new("reject"), StageDescriptor::new("fetch")]);
    let store = store_with(vec![]);
    let reg = registry(true, Arc::new(AtomicUsize::new(0)));
    let board = Arc::new(InMemoryStatusBoard::new());
    let mut l = ledger(&board);
    let request = vec![AlgorithmRequest::new("reject"), AlgorithmRequest::new("fetch").param("name", "a")];

    let response = ChainExecutor::new(&store, &reg).execute(&chain, &request, &mut l);

    assert_eq!(response, ChainResponse::error("Cannot process this input"));
    assert_eq!(l.history_size(), 0);
}

#[test]
fn panics_become_business_errors() {
    let chain = ChainDefinition::new("panic", vec![StageDescriptor::new("explode")]);
    let store = store_with(vec![]);
    let reg = registry(true, Arc::new(AtomicUsize::new(0)));
    let board = Arc::new(InMemoryStatusBoard::new());
    let mut l = ledger(&board);

    let response = ChainExecutor::new(&store, &reg).execute(&chain, &[AlgorithmRequest::new("explode")], &mut l);

    let message = response.error_message().unwrap();
    assert!(message.starts_with("Unexpected error in explode"), "{message}");
    assert!(message.contains("kaboom"));
    assert!(response.error_list().is_none());
}

#[test]
fn chain_without_output_value_returns_default_text() {
    let chain = ChainDefinition::new("plain", vec![StageDescriptor::new("fetch")]);
    let store = store_with(vec![]);
    let reg = registry(true, Arc::new(AtomicUsize::new(0)));
    let board = Arc::new(InMemoryStatusBoard::new());
    let mut l = ledger(&board);

    let response = ChainExecutor::new(&store, &reg).execute(&chain,
                                                              &[AlgorithmRequest::new("fetch").param("name", "z")],
                                                              &mut l);

    assert_eq!(response.to_value(),
               serde_json::json!({"output_type": "string", "output_value": "Chain run complete."}));
    assert_eq!(l.get_json("tile").unwrap(), "tile-z");
}
