//! Debug adapter bridge.
//!
//! The language server starts debug adapters on request and answers with
//! the socket the adapter listens on. This module turns that answer into a
//! launch configuration for the editor's debugger, and into adapter
//! descriptors for sessions the editor starts itself.

use std::sync::Arc;

use lsp_types::request::ExecuteCommand;
use lsp_types::{ExecuteCommandParams, Url, WorkDoneProgressParams};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info, instrument, warn};

use crate::error::{DebugError, LspError};
use crate::host::EditorHost;
use crate::lsp::RcConnection;
use crate::protocol::{DEBUG_ADAPTER_START, DebugDiscoveryParams, DebugSession, RunType};

/// Debug configuration type contributed by the client.
pub const DEBUG_TYPE: &str = "rc-lang";

/// Result type for debugger operations.
pub type DebugResult<T> = std::result::Result<T, DebugError>;

/// A debug configuration as exchanged with the editor.
///
/// Known keys are typed; anything else is kept in `extra` and passed to the
/// server untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugConfiguration {
    /// Configuration type; absent when the user has no launch configuration.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Session name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `launch` or `attach`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<String>,
    /// Run without debugging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_debug: Option<bool>,
    /// Port of an already running debug adapter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_server: Option<u16>,
    /// Main class to launch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_class: Option<String>,
    /// Test class to run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_class: Option<String>,
    /// Host of a remote VM to attach to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
    /// Remaining keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// What a configuration asks the server to debug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugTarget<'a> {
    /// Launch a main class.
    MainClass(&'a str),
    /// Run a test class.
    TestClass(&'a str),
    /// Attach to a running VM.
    Attach {
        /// The VM host.
        host_name: &'a str,
    },
}

impl DebugConfiguration {
    /// The debug target, if this configuration names one.
    pub fn target(&self) -> Option<DebugTarget<'_>> {
        if let Some(main_class) = &self.main_class {
            Some(DebugTarget::MainClass(main_class))
        } else if let Some(test_class) = &self.test_class {
            Some(DebugTarget::TestClass(test_class))
        } else {
            self.host_name
                .as_deref()
                .map(|host_name| DebugTarget::Attach { host_name })
        }
    }
}

/// TCP endpoint of a debug adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugAdapterServer {
    /// Adapter host.
    pub host: String,
    /// Adapter port.
    pub port: u16,
}

/// Reads the adapter endpoint from the authority (`host:port`) of a session uri.
/// ## Errors
/// Fails when the uri does not parse or carries no port.
pub fn debug_server_from_uri(uri: &str) -> DebugResult<DebugAdapterServer> {
    let parsed = Url::parse(uri).map_err(|e| DebugError::InvalidAdapterUri(format!("{uri}: {e}")))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| DebugError::InvalidAdapterUri(format!("{uri}: missing host")))?;
    let port = parsed
        .port()
        .ok_or_else(|| DebugError::InvalidAdapterUri(format!("{uri}: missing port")))?;
    Ok(DebugAdapterServer {
        host: host.to_string(),
        port,
    })
}

/// Starts debug and run sessions through the server.
#[derive(Debug)]
pub struct Debugger<C, H> {
    connection: Arc<C>,
    host: Arc<H>,
}

impl<C, H> Debugger<C, H>
where
    C: RcConnection,
    H: EditorHost,
{
    /// Creates the bridge.
    pub fn new(connection: Arc<C>, host: Arc<H>) -> Self {
        Self { connection, host }
    }

    /// Asks the server to start a debug adapter; `None` when it started nothing.
    async fn debug_adapter_start<P: Serialize>(&self, params: &P) -> DebugResult<Option<DebugSession>> {
        let argument =
            serde_json::to_value(params).map_err(|e| LspError::ParseError(e.to_string()))?;
        let response = self
            .connection
            .request::<ExecuteCommand>(ExecuteCommandParams {
                command: DEBUG_ADAPTER_START.to_string(),
                arguments: vec![argument],
                work_done_progress_params: WorkDoneProgressParams::default(),
            })
            .await?;

        match response {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| LspError::ParseError(format!("{DEBUG_ADAPTER_START}: {e}")).into()),
        }
    }

    /// Starts a session for `params`.
    ///
    /// Returns `Ok(false)` when the server started no adapter or the host
    /// declined to start debugging.
    /// ## Errors
    /// Fails on transport errors, a bad adapter uri, or a host failure.
    #[instrument(skip(self), level = "debug")]
    pub async fn start(&self, no_debug: bool, params: &DebugDiscoveryParams) -> DebugResult<bool> {
        let Some(session) = self.debug_adapter_start(params).await? else {
            debug!("server started no debug adapter");
            return Ok(false);
        };
        let server = debug_server_from_uri(&session.uri)?;
        info!(name = %session.name, port = server.port, "debug adapter started");

        let configuration = DebugConfiguration {
            kind: Some(DEBUG_TYPE.to_string()),
            name: Some(session.name),
            request: Some("launch".to_string()),
            no_debug: Some(no_debug),
            debug_server: Some(server.port),
            ..DebugConfiguration::default()
        };
        Ok(self.host.start_debugging(&configuration)?)
    }

    /// Starts a session and tells the user when it did not start.
    pub async fn start_session(&self, no_debug: bool, params: &DebugDiscoveryParams) -> bool {
        let started = match self.start(no_debug, params).await {
            Ok(started) => started,
            Err(e) => {
                error!(error = %e, "failed to start session");
                false
            }
        };
        if !started {
            self.host.show_error_message(if no_debug {
                "Run session not started"
            } else {
                "Debug session not started"
            });
        }
        started
    }

    /// Fills in a configuration before the editor launches it.
    ///
    /// With no configuration type and an active editor, the active document
    /// is run or tested. The configuration itself is returned unchanged.
    pub async fn resolve_debug_configuration(
        &self,
        configuration: DebugConfiguration,
    ) -> DebugConfiguration {
        if configuration.kind.is_none()
            && let Some(document) = self.host.active_document()
        {
            let params = DebugDiscoveryParams {
                path: document.to_string(),
                run_type: RunType::RunOrTestFile,
            };
            if let Err(e) = self.start(false, &params).await {
                warn!(error = %e, "failed to debug active document");
            }
        }
        configuration
    }

    /// Resolves the adapter endpoint for a session started by the editor.
    ///
    /// Only configurations naming a main class, test class or host are
    /// handed to the server; everything else gets no adapter.
    /// ## Errors
    /// Fails on transport errors or a bad adapter uri.
    pub async fn create_debug_adapter_descriptor(
        &self,
        configuration: &DebugConfiguration,
    ) -> DebugResult<Option<DebugAdapterServer>> {
        let Some(target) = configuration.target() else {
            return Ok(None);
        };
        debug!(?target, "starting debug adapter for configuration");
        match self.debug_adapter_start(configuration).await? {
            Some(session) => debug_server_from_uri(&session.uri).map(Some),
            None => Ok(None),
        }
    }
}
