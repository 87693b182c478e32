//! Common test helpers: a scripted connection and a recording editor host.

#![allow(dead_code)]

pub mod fake_connection;
pub mod recording_host;

use std::sync::Arc;

use serde_json::{Value, json};

pub use fake_connection::FakeConnection;
pub use recording_host::RecordingHost;

/// Builds the JSON of a tree node the way the server sends it.
pub fn node(view_id: &str, uri: Option<&str>, label: &str) -> Value {
    let mut node = json!({ "viewId": view_id, "label": label });
    if let Some(uri) = uri {
        node["nodeUri"] = json!(uri);
    }
    node
}

/// Builds a `Rc/treeViewChildren` result.
pub fn children(nodes: Vec<Value>) -> Value {
    json!({ "nodes": nodes })
}

/// A fresh connection and host pair.
pub fn fixtures() -> (Arc<FakeConnection>, Arc<RecordingHost>) {
    (Arc::new(FakeConnection::new()), Arc::new(RecordingHost::new()))
}

/// Yields until `count` requests for `method` have been issued.
pub async fn wait_for_requests(connection: &FakeConnection, method: &str, count: usize) {
    while connection.requests(method).len() < count {
        tokio::task::yield_now().await;
    }
}
