//! Tests for the batch pipeline.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::broadcast::error::TryRecvError;

use gqlgw_domain::engine::{EventKind, GatewayEvent};
use gqlgw_domain::memory::{BroadcastBus, MemoryEngine, MemoryPersistedQueries};
use gqlgw_domain::operation::{BatchResponse, Operation, Variables};

use super::*;

// ============================================================
// Test Fixtures
// ============================================================

type MemoryCoordinator = BatchCoordinator<MemoryEngine, MemoryPersistedQueries, BroadcastBus>;

/// Helper to create a coordinator over the in-memory engine with a
/// registered "default" schema.
fn test_coordinator(
    options: GatewayOptions,
) -> (
    MemoryCoordinator,
    Arc<MemoryEngine>,
    Arc<MemoryPersistedQueries>,
    Arc<BroadcastBus>,
) {
    let engine = Arc::new(MemoryEngine::new());
    engine.add_schema("default");
    let persisted = Arc::new(MemoryPersistedQueries::new());
    let bus = Arc::new(BroadcastBus::new(32));
    let coordinator = BatchCoordinator::new(
        Arc::clone(&engine),
        Arc::clone(&persisted),
        Arc::clone(&bus),
        options,
    );
    (coordinator, engine, persisted, bus)
}

fn json_request(body: &str) -> RawRequest<'_> {
    RawRequest {
        content_type: Some("application/json"),
        body: body.as_bytes(),
    }
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<GatewayEvent>) -> Vec<GatewayEvent> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return events,
            Err(TryRecvError::Lagged(_)) => continue,
        }
    }
}

// ============================================================
// Section 1: Content-Kind Detection and Request Parsing
// ============================================================

#[test]
fn test_content_kind_matches_json_by_prefix() {
    assert_eq!(
        ContentKind::from_content_type(Some("application/json")),
        ContentKind::Json
    );
    assert_eq!(
        ContentKind::from_content_type(Some("application/json; charset=utf-8")),
        ContentKind::Json
    );
    assert_eq!(
        ContentKind::from_content_type(Some("APPLICATION/JSON")),
        ContentKind::Json
    );
}

#[test]
fn test_content_kind_other_for_non_json_or_absent() {
    assert_eq!(
        ContentKind::from_content_type(Some("text/plain")),
        ContentKind::Other
    );
    assert_eq!(
        ContentKind::from_content_type(Some("application/x-www-form-urlencoded")),
        ContentKind::Other
    );
    assert_eq!(ContentKind::from_content_type(None), ContentKind::Other);
}

#[tokio::test]
async fn test_parse_single_object_body() {
    let parser = RequestParser::new(Arc::new(MemoryPersistedQueries::new()));

    let batch = parser
        .parse(
            Some("application/json"),
            br#"{"query": "{ ping }", "variables": {"a": 1}}"#,
        )
        .await;

    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].text.as_deref(), Some("{ ping }"));
    assert_eq!(batch[0].variables["a"], 1);
}

#[tokio::test]
async fn test_parse_array_body_preserves_order() {
    let parser = RequestParser::new(Arc::new(MemoryPersistedQueries::new()));

    let batch = parser
        .parse(
            Some("application/json"),
            br#"[{"query": "{ a }"}, {"query": "{ b }"}, {"query": "{ c }"}]"#,
        )
        .await;

    let texts: Vec<_> = batch.iter().map(|op| op.text.as_deref()).collect();
    assert_eq!(texts, vec![Some("{ a }"), Some("{ b }"), Some("{ c }")]);
}

#[tokio::test]
async fn test_parse_array_element_without_query_keeps_position() {
    let parser = RequestParser::new(Arc::new(MemoryPersistedQueries::new()));

    let batch = parser
        .parse(
            Some("application/json"),
            br#"[{"query": "{ a }"}, {"variables": {}}, {"query": "{ c }"}]"#,
        )
        .await;

    assert_eq!(batch.len(), 3);
    assert_eq!(batch[1].text, None);
}

#[tokio::test]
async fn test_parse_defaults_wrong_typed_variables_to_empty_map() {
    let parser = RequestParser::new(Arc::new(MemoryPersistedQueries::new()));

    let batch = parser
        .parse(
            Some("application/json"),
            br#"{"query": "{ ping }", "variables": null}"#,
        )
        .await;

    assert_eq!(batch[0].variables, Variables::new());

    let batch = parser
        .parse(
            Some("application/json"),
            br#"{"query": "{ ping }", "variables": "not an object"}"#,
        )
        .await;

    assert_eq!(batch[0].variables, Variables::new());
}

#[tokio::test]
async fn test_parse_malformed_json_yields_empty_batch() {
    let parser = RequestParser::new(Arc::new(MemoryPersistedQueries::new()));
    let batch = parser.parse(Some("application/json"), b"{ not json").await;
    assert!(batch.is_empty());
}

#[tokio::test]
async fn test_parse_scalar_top_level_yields_empty_batch() {
    let parser = RequestParser::new(Arc::new(MemoryPersistedQueries::new()));
    let batch = parser.parse(Some("application/json"), b"\"hello\"").await;
    assert!(batch.is_empty());
}

#[tokio::test]
async fn test_parse_empty_array_yields_empty_batch() {
    let parser = RequestParser::new(Arc::new(MemoryPersistedQueries::new()));
    let batch = parser.parse(Some("application/json"), b"[]").await;
    assert!(batch.is_empty());
}

#[tokio::test]
async fn test_parse_non_json_resolves_persisted_query() {
    let persisted = Arc::new(MemoryPersistedQueries::new());
    persisted.register("ping-v1", "{ ping }");
    let parser = RequestParser::new(persisted);

    let batch = parser.parse(Some("text/plain"), b"ping-v1").await;
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].text.as_deref(), Some("{ ping }"));
    assert!(batch[0].variables.is_empty());
}

#[tokio::test]
async fn test_parse_non_json_unknown_id_yields_empty_batch() {
    let parser = RequestParser::new(Arc::new(MemoryPersistedQueries::new()));
    let batch = parser.parse(Some("text/plain"), b"unknown-id").await;
    assert!(batch.is_empty());
}

// ============================================================
// Section 2: Batch Guard
// ============================================================

#[test]
fn test_guard_rejects_empty_batch() {
    assert_eq!(check_batch_size(0, 10), Err(BatchError::MissingQuery));
}

#[test]
fn test_guard_accepts_batch_at_limit() {
    assert_eq!(check_batch_size(10, 10), Ok(()));
    assert_eq!(check_batch_size(1, 10), Ok(()));
}

#[test]
fn test_guard_rejects_batch_over_limit() {
    assert_eq!(
        check_batch_size(11, 10),
        Err(BatchError::BatchTooLarge { size: 11, max: 10 })
    );
}

// ============================================================
// Section 3: Operation Executor
// ============================================================

#[tokio::test]
async fn test_executor_returns_engine_envelope_on_success() {
    let engine = Arc::new(MemoryEngine::new());
    let schema = engine.add_schema("default");
    engine.register_result("default", "{ ping }", json!({"data": {"ping": "pong"}}));
    let bus = Arc::new(BroadcastBus::new(8));
    let executor = OperationExecutor::new(Arc::clone(&engine), bus, false);

    let result = executor.execute(&schema, &Operation::query("{ ping }")).await;

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({"data": {"ping": "pong"}})
    );
}

#[tokio::test]
async fn test_executor_publishes_exactly_one_query_event_per_success() {
    let engine = Arc::new(MemoryEngine::new());
    let schema = engine.add_schema("default");
    engine.register_result(
        "default",
        "query Ping { ping }",
        json!({"data": {"ping": "pong"}}),
    );
    let bus = Arc::new(BroadcastBus::new(8));
    let mut rx = bus.subscribe();
    let executor = OperationExecutor::new(Arc::clone(&engine), bus, false);

    executor
        .execute(&schema, &Operation::query("query Ping { ping }"))
        .await;

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::Query);
    assert_eq!(events[0].name(), "gateway.query.executed");
    assert_eq!(events[0].operation_name.as_deref(), Some("Ping"));
    assert_eq!(events[0].schema, "default");
    assert_eq!(events[0].query, "query Ping { ping }");
    assert_eq!(events[0].result["data"]["ping"], "pong");
}

#[tokio::test]
async fn test_executor_classifies_mutation_events() {
    let engine = Arc::new(MemoryEngine::new());
    let schema = engine.add_schema("default");
    engine.register_result(
        "default",
        "mutation Save { save }",
        json!({"data": {"save": true}}),
    );
    let bus = Arc::new(BroadcastBus::new(8));
    let mut rx = bus.subscribe();
    let executor = OperationExecutor::new(Arc::clone(&engine), bus, false);

    executor
        .execute(&schema, &Operation::query("mutation Save { save }"))
        .await;

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::Mutation);
    assert_eq!(events[0].name(), "gateway.mutation.executed");
}

#[tokio::test]
async fn test_executor_event_carries_current_handler_context() {
    let engine = Arc::new(MemoryEngine::new());
    let schema = engine.add_schema("default");
    engine.register_result("default", "{ ping }", json!({"data": {"ping": "pong"}}));
    engine.set_context_value("staging", json!("preview"));
    let bus = Arc::new(BroadcastBus::new(8));
    let mut rx = bus.subscribe();
    let executor = OperationExecutor::new(Arc::clone(&engine), bus, false);

    executor.execute(&schema, &Operation::query("{ ping }")).await;

    let events = drain(&mut rx);
    assert_eq!(events[0].context["staging"], "preview");
}

#[tokio::test]
async fn test_executor_converts_failure_to_errors_payload_without_event() {
    let engine = Arc::new(MemoryEngine::new());
    let schema = engine.add_schema("default");
    engine.register_failure("default", "{ boom }", "resolver exploded");
    let bus = Arc::new(BroadcastBus::new(8));
    let mut rx = bus.subscribe();
    let executor = OperationExecutor::new(Arc::clone(&engine), bus, false);

    let result = executor.execute(&schema, &Operation::query("{ boom }")).await;

    assert!(result.is_failure());
    let wire = serde_json::to_value(&result).unwrap();
    assert_eq!(wire["errors"][0]["message"], "resolver exploded");
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_executor_fails_missing_or_empty_query_text() {
    let engine = Arc::new(MemoryEngine::new());
    let schema = engine.add_schema("default");
    let bus = Arc::new(BroadcastBus::new(8));
    let executor = OperationExecutor::new(Arc::clone(&engine), bus, false);

    let missing = Operation {
        text: None,
        variables: Variables::new(),
    };
    let result = executor.execute(&schema, &missing).await;
    assert!(result.is_failure());

    let blank = Operation::query("   ");
    let result = executor.execute(&schema, &blank).await;
    let wire = serde_json::to_value(&result).unwrap();
    assert_eq!(wire["errors"][0]["message"], "Syntax Error: query must not be empty");
}

#[tokio::test]
async fn test_executor_production_payload_hides_debug_fields() {
    let engine = Arc::new(MemoryEngine::new());
    let schema = engine.add_schema("default");
    engine.register_failure("default", "{ boom }", "resolver exploded");
    let bus = Arc::new(BroadcastBus::new(8));
    let executor = OperationExecutor::new(Arc::clone(&engine), bus, false);

    let result = executor.execute(&schema, &Operation::query("{ boom }")).await;
    let wire = serde_json::to_value(&result).unwrap();

    let entry = wire["errors"][0].as_object().unwrap();
    assert_eq!(entry.len(), 1, "production payload must carry only message: {entry:?}");
}

#[tokio::test]
async fn test_executor_debug_payload_is_superset_of_production() {
    let engine = Arc::new(MemoryEngine::new());
    let schema = engine.add_schema("default");
    engine.register_failure("default", "{ boom }", "resolver exploded");
    let bus = Arc::new(BroadcastBus::new(8));
    let executor = OperationExecutor::new(Arc::clone(&engine), bus, true);

    let result = executor.execute(&schema, &Operation::query("{ boom }")).await;
    let wire = serde_json::to_value(&result).unwrap();

    let entry = &wire["errors"][0];
    assert_eq!(entry["message"], "resolver exploded");
    assert_eq!(entry["code"], "execution_error");
    assert!(entry["file"].is_string());
    assert!(entry["line"].is_u64());
    assert!(entry["trace"].is_string());
}

// ============================================================
// Section 4: Batch Coordinator
// ============================================================

#[tokio::test]
async fn test_single_operation_returns_bare_object() {
    let (coordinator, engine, _, _) = test_coordinator(GatewayOptions::default());
    engine.register_result("default", "{ ping }", json!({"data": {"ping": "pong"}}));

    let response = coordinator
        .handle("default", json_request(r#"{"query": "{ ping }", "variables": {}}"#))
        .await
        .unwrap();

    assert!(matches!(response, BatchResponse::Single(_)));
    let wire = serde_json::to_value(&response).unwrap();
    assert_eq!(wire, json!({"data": {"ping": "pong"}}));
}

#[tokio::test]
async fn test_single_element_array_unwraps_to_bare_object() {
    // Response shape follows operation count, not the submitted JSON
    // shape: one operation in, one envelope out.
    let (coordinator, engine, _, _) = test_coordinator(GatewayOptions::default());
    engine.register_result("default", "{ ping }", json!({"data": {"ping": "pong"}}));

    let response = coordinator
        .handle("default", json_request(r#"[{"query": "{ ping }"}]"#))
        .await
        .unwrap();

    assert!(matches!(response, BatchResponse::Single(_)));
}

#[tokio::test]
async fn test_batch_results_preserve_request_order() {
    let (coordinator, engine, _, _) = test_coordinator(GatewayOptions::default());
    engine.register_result("default", "{ a }", json!({"data": {"a": 1}}));
    engine.register_result("default", "{ b }", json!({"data": {"b": 2}}));
    engine.register_result("default", "{ c }", json!({"data": {"c": 3}}));

    let response = coordinator
        .handle(
            "default",
            json_request(r#"[{"query": "{ c }"}, {"query": "{ a }"}, {"query": "{ b }"}]"#),
        )
        .await
        .unwrap();

    let wire = serde_json::to_value(&response).unwrap();
    let items = wire.as_array().unwrap();
    assert_eq!(items[0]["data"]["c"], 3);
    assert_eq!(items[1]["data"]["a"], 1);
    assert_eq!(items[2]["data"]["b"], 2);
}

#[tokio::test]
async fn test_failing_operation_does_not_abort_siblings() {
    let (coordinator, engine, _, bus) = test_coordinator(GatewayOptions::default());
    let mut rx = bus.subscribe();
    engine.register_result("default", "{ a }", json!({"data": {"a": 1}}));
    engine.register_failure("default", "{ boom }", "resolver exploded");
    engine.register_result("default", "{ c }", json!({"data": {"c": 3}}));

    let response = coordinator
        .handle(
            "default",
            json_request(r#"[{"query": "{ a }"}, {"query": "{ boom }"}, {"query": "{ c }"}]"#),
        )
        .await
        .unwrap();

    let wire = serde_json::to_value(&response).unwrap();
    let items = wire.as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["data"]["a"], 1);
    assert_eq!(items[1]["errors"][0]["message"], "resolver exploded");
    assert_eq!(items[2]["data"]["c"], 3);

    // Only the two successes publish events.
    assert_eq!(drain(&mut rx).len(), 2);
}

#[tokio::test]
async fn test_malformed_array_element_fails_at_its_index_only() {
    let (coordinator, engine, _, _) = test_coordinator(GatewayOptions::default());
    engine.register_result("default", "{ a }", json!({"data": {"a": 1}}));

    let response = coordinator
        .handle(
            "default",
            json_request(r#"[{"query": "{ a }"}, {"variables": {"x": 1}}]"#),
        )
        .await
        .unwrap();

    let wire = serde_json::to_value(&response).unwrap();
    let items = wire.as_array().unwrap();
    assert_eq!(items[0]["data"]["a"], 1);
    assert!(items[1]["errors"][0]["message"]
        .as_str()
        .unwrap()
        .contains("query must not be empty"));
}

#[tokio::test]
async fn test_empty_batch_signals_missing_query() {
    let (coordinator, _, _, _) = test_coordinator(GatewayOptions::default());

    for body in ["[]", "{ not json", "42"] {
        let err = coordinator
            .handle("default", json_request(body))
            .await
            .unwrap_err();
        assert_eq!(err, BatchError::MissingQuery, "body: {body}");
    }
}

#[tokio::test]
async fn test_over_limit_batch_rejected_before_any_execution() {
    let (coordinator, engine, _, bus) = test_coordinator(GatewayOptions {
        batch_limit: 10,
        ..Default::default()
    });
    let mut rx = bus.subscribe();
    engine.register_result("default", "{ ping }", json!({"data": {"ping": "pong"}}));

    let ops: Vec<String> = (0..11).map(|_| r#"{"query": "{ ping }"}"#.to_string()).collect();
    let body = format!("[{}]", ops.join(","));

    let err = coordinator
        .handle("default", json_request(&body))
        .await
        .unwrap_err();

    assert_eq!(err, BatchError::BatchTooLarge { size: 11, max: 10 });
    assert!(drain(&mut rx).is_empty(), "no operation may execute");
}

#[tokio::test]
async fn test_unknown_schema_is_fatal_when_autobuild_disabled() {
    let (coordinator, _, _, _) = test_coordinator(GatewayOptions::default());

    let err = coordinator
        .handle("missing", json_request(r#"{"query": "{ ping }"}"#))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        BatchError::SchemaNotFound {
            schema: "missing".to_string()
        }
    );
}

#[tokio::test]
async fn test_unknown_schema_is_built_when_autobuild_enabled() {
    let (coordinator, engine, _, _) = test_coordinator(GatewayOptions {
        autobuild: true,
        ..Default::default()
    });
    engine.register_result("fresh", "{ ping }", json!({"data": {"ping": "pong"}}));

    let response = coordinator
        .handle("fresh", json_request(r#"{"query": "{ ping }"}"#))
        .await
        .unwrap();

    let wire = serde_json::to_value(&response).unwrap();
    assert_eq!(wire["data"]["ping"], "pong");
}

#[tokio::test]
async fn test_persisted_query_path_through_coordinator() {
    let (coordinator, engine, persisted, _) = test_coordinator(GatewayOptions::default());
    persisted.register("ping-v1", "{ ping }");
    engine.register_result("default", "{ ping }", json!({"data": {"ping": "pong"}}));

    let response = coordinator
        .handle(
            "default",
            RawRequest {
                content_type: Some("text/plain"),
                body: b"ping-v1",
            },
        )
        .await
        .unwrap();

    let wire = serde_json::to_value(&response).unwrap();
    assert_eq!(wire, json!({"data": {"ping": "pong"}}));
}

#[tokio::test]
async fn test_example_batch_with_failure_matches_wire_contract() {
    // request [{"query": "{ a }"}, {"query": "{ b }"}], second throws
    // => [{"data": ...}, {"errors": [{"message": ...}]}]
    let (coordinator, engine, _, _) = test_coordinator(GatewayOptions::default());
    engine.register_result("default", "{ a }", json!({"data": {"a": 1}}));
    engine.register_failure("default", "{ b }", "boom");

    let response = coordinator
        .handle("default", json_request(r#"[{"query": "{ a }"}, {"query": "{ b }"}]"#))
        .await
        .unwrap();

    let wire = serde_json::to_value(&response).unwrap();
    assert_eq!(wire[0], json!({"data": {"a": 1}}));
    assert_eq!(wire[1], json!({"errors": [{"message": "boom"}]}));
}
