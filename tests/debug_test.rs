mod common;

use std::sync::Arc;

use common::{FakeConnection, RecordingHost, fixtures};
use lsp_types::request::{ExecuteCommand, Request};
use rclang_client::debugger::{DEBUG_TYPE, DebugAdapterServer, DebugConfiguration, Debugger};
use rclang_client::error::DebugError;
use rclang_client::protocol::{DEBUG_ADAPTER_START, DebugDiscoveryParams, RunType};
use serde_json::json;
use tokio_test::assert_ok;

fn discovery(run_type: RunType) -> DebugDiscoveryParams {
    DebugDiscoveryParams {
        path: "file:///w/fib.rc".to_string(),
        run_type,
    }
}

fn session() -> serde_json::Value {
    json!({ "name": "fib", "uri": "tcp://127.0.0.1:5005" })
}

#[tokio::test]
async fn test_start_launches_host_debugger() {
    let (conn, host) = fixtures();
    conn.reply(ExecuteCommand::METHOD, session());
    let debugger = Debugger::new(conn.clone(), host.clone());

    let started = assert_ok!(debugger.start(false, &discovery(RunType::Run)).await);

    assert!(started);
    let sent = conn.requests(ExecuteCommand::METHOD);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["command"], DEBUG_ADAPTER_START);
    assert_eq!(
        sent[0]["arguments"],
        json!([{ "path": "file:///w/fib.rc", "runType": "run" }])
    );
    assert_eq!(
        host.debug_sessions(),
        vec![DebugConfiguration {
            kind: Some(DEBUG_TYPE.to_string()),
            name: Some("fib".to_string()),
            request: Some("launch".to_string()),
            no_debug: Some(false),
            debug_server: Some(5005),
            ..DebugConfiguration::default()
        }]
    );
}

#[tokio::test]
async fn test_run_session_sets_no_debug() {
    let (conn, host) = fixtures();
    conn.reply(ExecuteCommand::METHOD, session());
    let debugger = Debugger::new(conn, host.clone());

    assert!(
        debugger
            .start_session(true, &discovery(RunType::TestFile))
            .await
    );
    assert_eq!(host.debug_sessions()[0].no_debug, Some(true));
    assert!(host.errors().is_empty());
}

#[tokio::test]
async fn test_no_adapter_reports_session_not_started() {
    let (conn, host) = fixtures();
    conn.reply(ExecuteCommand::METHOD, json!(null));
    conn.reply(ExecuteCommand::METHOD, json!(null));
    let debugger = Debugger::new(conn, host.clone());

    assert!(
        !debugger
            .start_session(false, &discovery(RunType::Run))
            .await
    );
    assert!(!debugger.start_session(true, &discovery(RunType::Run)).await);

    assert!(host.debug_sessions().is_empty());
    assert_eq!(
        host.errors(),
        vec!["Debug session not started", "Run session not started"]
    );
}

#[tokio::test]
async fn test_host_declining_reports_session_not_started() {
    let conn = Arc::new(FakeConnection::new());
    let host = Arc::new(RecordingHost::new().declining_debug());
    conn.reply(ExecuteCommand::METHOD, session());
    let debugger = Debugger::new(conn, host.clone());

    assert!(
        !debugger
            .start_session(false, &discovery(RunType::Run))
            .await
    );
    assert_eq!(host.debug_sessions().len(), 1);
    assert_eq!(host.errors(), vec!["Debug session not started"]);
}

#[tokio::test]
async fn test_bad_adapter_uri_is_an_error() {
    let (conn, host) = fixtures();
    conn.reply(
        ExecuteCommand::METHOD,
        json!({ "name": "fib", "uri": "tcp://127.0.0.1" }),
    );
    let debugger = Debugger::new(conn, host.clone());

    let err = debugger
        .start(false, &discovery(RunType::Run))
        .await
        .unwrap_err();

    assert!(matches!(err, DebugError::InvalidAdapterUri(_)));
    assert!(host.debug_sessions().is_empty());
}

#[tokio::test]
async fn test_transport_failure_reports_session_not_started() {
    let (conn, host) = fixtures();
    conn.fail(ExecuteCommand::METHOD, "server went away");
    let debugger = Debugger::new(conn, host.clone());

    assert!(
        !debugger
            .start_session(false, &discovery(RunType::Run))
            .await
    );
    assert_eq!(host.errors(), vec!["Debug session not started"]);
}

#[tokio::test]
async fn test_resolve_without_type_debugs_active_document() {
    let conn = Arc::new(FakeConnection::new());
    let host = Arc::new(RecordingHost::new().with_active_document("file:///w/fib_test.rc"));
    conn.reply(ExecuteCommand::METHOD, session());
    let debugger = Debugger::new(conn.clone(), host.clone());

    let resolved = debugger
        .resolve_debug_configuration(DebugConfiguration::default())
        .await;

    assert_eq!(resolved, DebugConfiguration::default());
    assert_eq!(
        conn.requests(ExecuteCommand::METHOD)[0]["arguments"],
        json!([{ "path": "file:///w/fib_test.rc", "runType": "runOrTestFile" }])
    );
    assert_eq!(host.debug_sessions().len(), 1);
}

#[tokio::test]
async fn test_resolve_with_type_is_untouched() {
    let conn = Arc::new(FakeConnection::new());
    let host = Arc::new(RecordingHost::new().with_active_document("file:///w/fib.rc"));
    let debugger = Debugger::new(conn.clone(), host);
    let configuration = DebugConfiguration {
        kind: Some(DEBUG_TYPE.to_string()),
        main_class: Some("Fib".to_string()),
        ..DebugConfiguration::default()
    };

    let resolved = debugger
        .resolve_debug_configuration(configuration.clone())
        .await;

    assert_eq!(resolved, configuration);
    assert!(conn.requests(ExecuteCommand::METHOD).is_empty());
}

#[tokio::test]
async fn test_descriptor_for_main_class() {
    let (conn, host) = fixtures();
    conn.reply(ExecuteCommand::METHOD, session());
    let debugger = Debugger::new(conn.clone(), host);
    let configuration: DebugConfiguration = serde_json::from_value(json!({
        "type": DEBUG_TYPE,
        "request": "launch",
        "mainClass": "Fib",
        "args": ["10"]
    }))
    .unwrap();

    let server = debugger
        .create_debug_adapter_descriptor(&configuration)
        .await
        .unwrap();

    assert_eq!(
        server,
        Some(DebugAdapterServer {
            host: "127.0.0.1".to_string(),
            port: 5005,
        })
    );
    let argument = &conn.requests(ExecuteCommand::METHOD)[0]["arguments"][0];
    assert_eq!(argument["mainClass"], "Fib");
    assert_eq!(argument["args"], json!(["10"]));
}

#[tokio::test]
async fn test_descriptor_without_target_asks_nothing() {
    let (conn, host) = fixtures();
    let debugger = Debugger::new(conn.clone(), host);

    let server = debugger
        .create_debug_adapter_descriptor(&DebugConfiguration::default())
        .await
        .unwrap();

    assert_eq!(server, None);
    assert!(conn.requests(ExecuteCommand::METHOD).is_empty());
}
