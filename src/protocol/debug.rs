//! Debug adapter discovery payloads.
//!
//! Debug adapters are started by the server through the
//! `debug-adapter-start` command, sent as a standard `workspace/executeCommand`.

use serde::{Deserialize, Serialize};

/// Server command that launches a debug adapter and answers with a [`DebugSession`].
pub const DEBUG_ADAPTER_START: &str = "debug-adapter-start";

/// What the user wants to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunType {
    /// Run the main entry point.
    Run,
    /// Run the file, or its tests when it is a test file.
    RunOrTestFile,
    /// Run the tests of a file.
    TestFile,
    /// Run a whole test target.
    TestTarget,
}

/// Parameters for discovering what to debug in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugDiscoveryParams {
    /// Document uri or path.
    pub path: String,
    /// How to run it.
    pub run_type: RunType,
}

/// A debug adapter started by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugSession {
    /// Session display name.
    pub name: String,
    /// Adapter socket; the authority is `host:port`.
    pub uri: String,
}
