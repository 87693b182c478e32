//! LSP client implementation.
//!
//! This module spawns the rclang language server, runs the `async-lsp`
//! main loop over its stdio, and exposes the connection through
//! [`RcConnection`]. Server pushes from the custom message catalog are
//! forwarded on a channel as [`ServerEvent`]s.
//!
//! # Example
//!
//! ```ignore
//! use rclang_client::lsp::client::LspClient;
//!
//! let client = LspClient::builder()
//!     .server_command("java")
//!     .server_args(["-jar", "rclang-language-server.jar"])
//!     .workspace_root("/path/to/project")
//!     .build()
//!     .await?;
//!
//! client.did_open(Path::new("src/fib.rc")).await?;
//! client.shutdown().await?;
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use async_lsp::concurrency::ConcurrencyLayer;
use async_lsp::panic::CatchUnwindLayer;
use async_lsp::router::Router;
use async_lsp::tracing::TracingLayer;
use async_lsp::{LanguageServer, ServerSocket};
use lsp_types::notification::Notification;
use lsp_types::request::Request;
use lsp_types::{
    ClientCapabilities, ClientInfo, DidChangeTextDocumentParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, DynamicRegistrationClientCapabilities, InitializeParams,
    InitializedParams, MessageType, ServerCapabilities, TextDocumentClientCapabilities,
    TextDocumentContentChangeEvent, TextDocumentIdentifier, TextDocumentItem,
    TextDocumentSyncClientCapabilities, TraceValue, Url, VersionedTextDocumentIdentifier,
    WindowClientCapabilities, WorkDoneProgressParams, WorkspaceClientCapabilities,
    WorkspaceFolder, notification, request,
};
use tokio::sync::{Mutex, mpsc};
use tower::ServiceBuilder;
use tracing::{debug, error, info, trace, warn};

use crate::error::LspError;
use crate::protocol::{ExecuteClientCommand, TreeViewDidChange};

use super::LspResult;
use super::connection::{RcConnection, ServerEvent};
use super::types::{language_id_for, path_to_url};

/// State for handling notifications pushed by the language server.
#[derive(Debug, Clone)]
struct ClientState {
    events: mpsc::UnboundedSender<ServerEvent>,
}

impl ClientState {
    fn new(events: mpsc::UnboundedSender<ServerEvent>) -> Self {
        Self { events }
    }

    fn forward(&self, event: ServerEvent) {
        // The receiver is gone once the client shuts down; late pushes are dropped.
        if self.events.send(event).is_err() {
            debug!("server event dropped, no receiver");
        }
    }
}

/// Configuration for building an LSP client.
#[derive(Debug, Clone)]
pub struct LspClientConfig {
    /// Command to start the language server.
    pub server_command: String,
    /// Arguments to pass to the language server.
    pub server_args: Vec<String>,
    /// Root directory of the workspace.
    pub workspace_root: PathBuf,
    /// Timeout for initialization.
    pub init_timeout: std::time::Duration,
    /// Timeout for requests.
    pub request_timeout: std::time::Duration,
}

impl Default for LspClientConfig {
    fn default() -> Self {
        Self {
            server_command: "rclang-language-server".to_string(),
            server_args: Vec::new(),
            workspace_root: PathBuf::from("."),
            init_timeout: std::time::Duration::from_secs(30),
            request_timeout: std::time::Duration::from_secs(10),
        }
    }
}

/// Builder for constructing an LSP client.
#[derive(Debug, Default)]
pub struct LspClientBuilder {
    config: LspClientConfig,
}

impl LspClientBuilder {
    /// Creates a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server command.
    #[must_use]
    pub fn server_command(mut self, command: impl Into<String>) -> Self {
        self.config.server_command = command.into();
        self
    }

    /// Sets the server arguments.
    #[must_use]
    pub fn server_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.config.server_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the workspace root.
    #[must_use]
    pub fn workspace_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.workspace_root = path.into();
        self
    }

    /// Sets the initialization timeout.
    #[must_use]
    pub fn init_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config.init_timeout = timeout;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Builds the LSP client.
    ///
    /// This will spawn the language server process and perform initialization.
    /// ## Errors
    /// Fails when the process cannot be spawned or the handshake does not complete.
    pub async fn build(self) -> LspResult<LspClient> {
        let workspace_root = self.config.workspace_root.canonicalize().map_err(|e| {
            LspError::InitializationFailed(format!("failed to canonicalize workspace root: {e}"))
        })?;

        let mut cmd = async_process::Command::new(&self.config.server_command);
        cmd.args(&self.config.server_args)
            .current_dir(&workspace_root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            LspError::ServerStartFailed(format!(
                "failed to spawn '{}': {}",
                self.config.server_command, e
            ))
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| LspError::ServerStartFailed("failed to capture stdout".to_string()))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| LspError::ServerStartFailed("failed to capture stdin".to_string()))?;

        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let (mainloop, server) = async_lsp::MainLoop::new_client(|_client| {
            let mut router = Router::new(ClientState::new(events_tx));

            router.notification::<ExecuteClientCommand>(|this, params| {
                trace!(command = %params.command, "server pushed client command");
                this.forward(ServerEvent::ExecuteClientCommand(params));
                ControlFlow::Continue(())
            });

            router.notification::<TreeViewDidChange>(|this, params| {
                trace!(nodes = params.nodes.len(), "server pushed tree change");
                this.forward(ServerEvent::TreeViewDidChange(params));
                ControlFlow::Continue(())
            });

            router.notification::<notification::LogMessage>(|_this, params| {
                log_server_message(params.typ, &params.message);
                ControlFlow::Continue(())
            });

            router.notification::<notification::ShowMessage>(|_this, params| {
                log_server_message(params.typ, &params.message);
                ControlFlow::Continue(())
            });

            router.notification::<notification::PublishDiagnostics>(|_this, diag| {
                debug!(uri = %diag.uri, count = diag.diagnostics.len(), "diagnostics published");
                ControlFlow::Continue(())
            });

            router.notification::<notification::Progress>(|_this, _prog| ControlFlow::Continue(()));

            router.request::<request::WorkDoneProgressCreate, _>(|_this, _params| async { Ok(()) });

            router.unhandled_notification(|_this, notif| {
                debug!(method = %notif.method, "ignoring server notification");
                ControlFlow::Continue(())
            });

            ServiceBuilder::new()
                .layer(TracingLayer::default())
                .layer(CatchUnwindLayer::default())
                .layer(ConcurrencyLayer::default())
                .service(router)
        });

        let mainloop_handle = tokio::spawn(async move {
            if let Err(e) = mainloop.run_buffered(stdout, stdin).await {
                error!(error = ?e, "language server main loop stopped");
            }
        });

        let workspace_uri = Url::from_file_path(&workspace_root).map_err(|()| {
            LspError::InitializationFailed(format!(
                "invalid workspace root path: {}",
                workspace_root.display()
            ))
        })?;

        let init_params = InitializeParams {
            process_id: Some(std::process::id()),
            workspace_folders: Some(vec![WorkspaceFolder {
                uri: workspace_uri,
                name: workspace_root
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("rclang")
                    .to_string(),
            }]),
            initialization_options: None,
            capabilities: ClientCapabilities {
                workspace: Some(WorkspaceClientCapabilities {
                    did_change_configuration: Some(DynamicRegistrationClientCapabilities {
                        dynamic_registration: Some(false),
                    }),
                    execute_command: Some(DynamicRegistrationClientCapabilities {
                        dynamic_registration: Some(false),
                    }),
                    ..Default::default()
                }),
                text_document: Some(TextDocumentClientCapabilities {
                    synchronization: Some(TextDocumentSyncClientCapabilities {
                        dynamic_registration: Some(false),
                        will_save: Some(false),
                        will_save_wait_until: Some(false),
                        did_save: Some(false),
                    }),
                    ..Default::default()
                }),
                window: Some(WindowClientCapabilities {
                    work_done_progress: Some(true),
                    ..Default::default()
                }),
                experimental: Some(serde_json::json!({ "treeViewProvider": true })),
                ..Default::default()
            },
            trace: Some(TraceValue::Off),
            client_info: Some(ClientInfo {
                name: "rclang-client".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            locale: None,
            work_done_progress_params: WorkDoneProgressParams::default(),
            ..Default::default()
        };

        let server = Arc::new(Mutex::new(server));

        let init_result = tokio::time::timeout(
            self.config.init_timeout,
            server.lock().await.initialize(init_params),
        )
        .await
        .map_err(|_| LspError::Timeout(self.config.init_timeout))?
        .map_err(|e| LspError::InitializationFailed(format!("initialize request failed: {e:?}")))?;

        info!(
            server = ?init_result.server_info.as_ref().map(|s| &s.name),
            "language server initialized"
        );

        server
            .lock()
            .await
            .initialized(InitializedParams {})
            .map_err(|e| {
                LspError::InitializationFailed(format!("initialized notification failed: {e:?}"))
            })?;

        Ok(LspClient {
            config: self.config,
            server,
            _mainloop_handle: mainloop_handle,
            capabilities: Arc::new(init_result.capabilities),
            open_documents: Arc::new(Mutex::new(HashMap::new())),
            events: Mutex::new(Some(events_rx)),
            _child_process: Arc::new(Mutex::new(child)),
        })
    }
}

fn log_server_message(typ: MessageType, message: &str) {
    match typ {
        MessageType::ERROR => error!(target: "rclang_server", "{message}"),
        MessageType::WARNING => warn!(target: "rclang_server", "{message}"),
        MessageType::INFO => info!(target: "rclang_server", "{message}"),
        _ => debug!(target: "rclang_server", "{message}"),
    }
}

/// LSP client for communicating with the rclang language server.
///
/// This client manages the lifecycle of the server process, keeps the
/// server informed about open documents and carries the custom message
/// catalog for the rest of the crate.
#[derive(Debug)]
pub struct LspClient {
    /// Configuration used to create this client.
    config: LspClientConfig,
    /// The language server handle for making requests.
    server: Arc<Mutex<ServerSocket>>,
    /// Handle to the mainloop task.
    _mainloop_handle: tokio::task::JoinHandle<()>,
    /// Server capabilities from initialization.
    capabilities: Arc<ServerCapabilities>,
    /// Open documents and their current version.
    open_documents: Arc<Mutex<HashMap<Url, i32>>>,
    /// Server pushes, until someone takes them.
    events: Mutex<Option<mpsc::UnboundedReceiver<ServerEvent>>>,
    /// The language server process handle (kept alive to prevent kill-on-drop).
    _child_process: Arc<Mutex<async_process::Child>>,
}

impl LspClient {
    /// Creates a new builder for constructing an LSP client.
    pub fn builder() -> LspClientBuilder {
        LspClientBuilder::new()
    }

    /// Capabilities announced by the server during initialization.
    pub fn capabilities(&self) -> &ServerCapabilities {
        &self.capabilities
    }

    /// Takes the stream of server-pushed events. Returns `None` after the first call.
    pub async fn take_events(&self) -> Option<mpsc::UnboundedReceiver<ServerEvent>> {
        self.events.lock().await.take()
    }

    /// Shuts down the language server gracefully.
    /// ## Errors
    /// Fails if the shutdown request or exit notification cannot be delivered.
    pub async fn shutdown(&self) -> LspResult<()> {
        self.server
            .lock()
            .await
            .shutdown(())
            .await
            .map_err(|e| LspError::RequestFailed(format!("shutdown request failed: {e:?}")))?;

        self.server
            .lock()
            .await
            .exit(())
            .map_err(|e| LspError::RequestFailed(format!("exit notification failed: {e:?}")))?;

        Ok(())
    }

    /// Opens a document in the language server.
    ///
    /// This sends a `textDocument/didOpen` notification and tracks the document as open.
    /// ## Errors
    /// Fails if the file cannot be read or the notification cannot be sent.
    pub async fn did_open(&self, path: &Path) -> LspResult<Url> {
        let uri = path_to_url(path)?;

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            LspError::DocumentNotFound(format!("failed to read '{}': {}", path.display(), e))
        })?;

        let params = DidOpenTextDocumentParams {
            text_document: TextDocumentItem {
                uri: uri.clone(),
                language_id: language_id_for(path).to_string(),
                version: 0,
                text: content,
            },
        };

        self.server
            .lock()
            .await
            .did_open(params)
            .map_err(|e| LspError::RequestFailed(format!("didOpen notification failed: {e:?}")))?;

        self.open_documents.lock().await.insert(uri.clone(), 0);

        Ok(uri)
    }

    /// Notifies the language server about a full-text document change.
    /// ## Errors
    /// Fails if the document is not open or the notification cannot be sent.
    pub async fn did_change(&self, path: &Path, content: &str) -> LspResult<()> {
        let uri = path_to_url(path)?;

        let version = {
            let mut open = self.open_documents.lock().await;
            let Some(version) = open.get_mut(&uri) else {
                return Err(LspError::DocumentNotFound(format!(
                    "document not open: {}",
                    path.display()
                )));
            };
            *version += 1;
            *version
        };

        let params = DidChangeTextDocumentParams {
            text_document: VersionedTextDocumentIdentifier { uri, version },
            content_changes: vec![TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text: content.to_string(),
            }],
        };

        self.server.lock().await.did_change(params).map_err(|e| {
            LspError::RequestFailed(format!("didChange notification failed: {e:?}"))
        })?;

        Ok(())
    }

    /// Closes a document in the language server.
    /// ## Errors
    /// Fails if the notification cannot be sent.
    pub async fn did_close(&self, path: &Path) -> LspResult<()> {
        let uri = path_to_url(path)?;

        let params = DidCloseTextDocumentParams {
            text_document: TextDocumentIdentifier { uri: uri.clone() },
        };

        self.server
            .lock()
            .await
            .did_close(params)
            .map_err(|e| LspError::RequestFailed(format!("didClose notification failed: {e:?}")))?;

        self.open_documents.lock().await.remove(&uri);

        Ok(())
    }
}

/// Sends a request on a clone of the socket; the lock is only held while
/// cloning, so any number of requests can be outstanding at once.
async fn send_request<R: Request>(
    server: &Mutex<ServerSocket>,
    timeout: std::time::Duration,
    params: R::Params,
) -> LspResult<R::Result> {
    let socket = server.lock().await.clone();
    tokio::time::timeout(timeout, socket.request::<R>(params))
        .await
        .map_err(|_| LspError::Timeout(timeout))?
        .map_err(|e| LspError::RequestFailed(format!("{} failed: {e:?}", R::METHOD)))
}

fn send_notification<N: Notification>(socket: &ServerSocket, params: N::Params) -> LspResult<()> {
    socket
        .notify::<N>(params)
        .map_err(|e| LspError::RequestFailed(format!("{} failed: {e:?}", N::METHOD)))
}

impl RcConnection for LspClient {
    fn request<R>(&self, params: R::Params) -> impl Future<Output = LspResult<R::Result>> + Send
    where
        R: Request,
    {
        let server = Arc::clone(&self.server);
        let timeout = self.config.request_timeout;
        async move { send_request::<R>(&server, timeout, params).await }
    }

    fn notify<N>(&self, params: N::Params) -> impl Future<Output = LspResult<()>> + Send
    where
        N: Notification,
    {
        let server = Arc::clone(&self.server);
        async move {
            let socket = server.lock().await.clone();
            send_notification::<N>(&socket, params)
        }
    }
}
