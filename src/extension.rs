//! The client context.
//!
//! [`Extension`] is built once when the client activates and owns every
//! component: tree views, preview panels, the debugger bridge and the status
//! bar. Editor commands and server pushes are dispatched through it.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::debugger::Debugger;
use crate::error::{CommandError, Result};
use crate::goto;
use crate::host::EditorHost;
use crate::lsp::types::path_to_url;
use crate::lsp::{RcConnection, ServerEvent};
use crate::preview::IrPreviewPanel;
use crate::protocol::{ClientCommand, DebugDiscoveryParams};
use crate::status_bar::StatusBar;
use crate::tree_view::TreeViews;

/// Command id that opens an IR preview.
pub const START_IR_PREVIEW_COMMAND: &str = "rc.IRPreview.start";
/// Command id that starts a debug session.
pub const START_DEBUG_SESSION_COMMAND: &str = "StartDebugSession";
/// Command id that starts a run session.
pub const START_RUN_SESSION_COMMAND: &str = "StartRunSession";

/// A command invoked from the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    /// Open an IR preview for a file.
    StartIrPreview {
        /// The file to preview.
        path: PathBuf,
    },
    /// Debug the discovered target.
    StartDebugSession(DebugDiscoveryParams),
    /// Run the discovered target without debugging.
    StartRunSession(DebugDiscoveryParams),
    /// A command id this client does not handle.
    Unrecognized {
        /// The command id.
        command: String,
    },
}

#[derive(Deserialize)]
struct PreviewArgument {
    path: PathBuf,
}

fn decode<T: serde::de::DeserializeOwned>(
    command: &str,
    argument: Option<Value>,
) -> std::result::Result<T, CommandError> {
    let argument = argument.ok_or_else(|| CommandError::MissingArgument(command.to_string()))?;
    serde_json::from_value(argument).map_err(|e| CommandError::InvalidArgument {
        command: command.to_string(),
        reason: e.to_string(),
    })
}

impl EditorCommand {
    /// Decodes a command id and its argument.
    /// ## Errors
    /// Fails when a known command has a missing or malformed argument.
    pub fn parse(command: &str, argument: Option<Value>) -> std::result::Result<Self, CommandError> {
        Ok(match command {
            START_IR_PREVIEW_COMMAND => Self::StartIrPreview {
                path: decode::<PreviewArgument>(command, argument)?.path,
            },
            START_DEBUG_SESSION_COMMAND => Self::StartDebugSession(decode(command, argument)?),
            START_RUN_SESSION_COMMAND => Self::StartRunSession(decode(command, argument)?),
            other => Self::Unrecognized {
                command: other.to_string(),
            },
        })
    }
}

/// The activated client.
#[derive(Debug)]
pub struct Extension<C, H> {
    connection: Arc<C>,
    host: Arc<H>,
    extension_root: PathBuf,
    tree_views: TreeViews<C, H>,
    debugger: Debugger<C, H>,
    previews: Mutex<Vec<Arc<IrPreviewPanel<C, H>>>>,
    next_panel_id: AtomicU64,
    status_bar: StatusBar,
}

impl<C, H> Extension<C, H>
where
    C: RcConnection,
    H: EditorHost,
{
    /// Builds every component and registers the configured tree views.
    pub fn activate(connection: Arc<C>, host: Arc<H>, settings: &Settings) -> Self {
        info!(views = ?settings.tree_views, "activating rclang client");
        let tree_views = TreeViews::start(
            Arc::clone(&connection),
            Arc::clone(&host),
            settings.tree_views.iter().cloned(),
        );
        let debugger = Debugger::new(Arc::clone(&connection), Arc::clone(&host));
        let status_bar = StatusBar::show(&*host);
        Self {
            connection,
            host,
            extension_root: settings.extension_root.clone(),
            tree_views,
            debugger,
            previews: Mutex::new(Vec::new()),
            next_panel_id: AtomicU64::new(1),
            status_bar,
        }
    }

    /// The tree views.
    pub fn tree_views(&self) -> &TreeViews<C, H> {
        &self.tree_views
    }

    /// The debug adapter bridge.
    pub fn debugger(&self) -> &Debugger<C, H> {
        &self.debugger
    }

    /// The status bar.
    pub fn status_bar(&self) -> &StatusBar {
        &self.status_bar
    }

    /// Runs an editor command.
    ///
    /// Failures are reported to the user here and returned to the caller.
    /// ## Errors
    /// Fails when the preview cannot be opened.
    pub async fn execute_command(&self, command: EditorCommand) -> Result<()> {
        match command {
            EditorCommand::StartIrPreview { path } => {
                if let Err(e) = self.start_preview(path).await {
                    self.host
                        .show_error_message(&format!("IR preview failed: {e}"));
                    return Err(e);
                }
            }
            EditorCommand::StartDebugSession(params) => {
                self.debugger.start_session(false, &params).await;
            }
            EditorCommand::StartRunSession(params) => {
                self.debugger.start_session(true, &params).await;
            }
            EditorCommand::Unrecognized { command } => {
                warn!(command = %command, "unrecognized editor command");
            }
        }
        Ok(())
    }

    /// Opens a new preview panel for `path` and renders it. Returns the panel id.
    async fn start_preview(&self, path: PathBuf) -> Result<u64> {
        let uri = path_to_url(&path)?;
        let id = self.next_panel_id.fetch_add(1, Ordering::Relaxed);
        let panel = IrPreviewPanel::create(
            Arc::clone(&self.connection),
            Arc::clone(&self.host),
            &self.extension_root,
            id,
            uri,
        );
        panel.update().await?;
        self.previews.lock().await.push(Arc::new(panel));
        Ok(id)
    }

    /// Ids of the open preview panels.
    pub async fn preview_ids(&self) -> Vec<u64> {
        self.previews
            .lock()
            .await
            .iter()
            .map(|panel| panel.panel().id)
            .collect()
    }

    /// Reports a preview panel's visibility; showing it again re-renders it.
    /// ## Errors
    /// Fails when the re-render request fails.
    pub async fn set_preview_visible(&self, panel_id: u64, visible: bool) -> Result<()> {
        let panel = self
            .previews
            .lock()
            .await
            .iter()
            .find(|p| p.panel().id == panel_id)
            .cloned();
        if let Some(panel) = panel {
            panel.set_visible(visible).await?;
        }
        Ok(())
    }

    /// Closes a preview panel.
    pub async fn close_preview(&self, panel_id: u64) {
        let mut previews = self.previews.lock().await;
        if let Some(index) = previews.iter().position(|p| p.panel().id == panel_id) {
            previews.remove(index).dispose();
        }
    }

    /// Acts on a message pushed by the server.
    pub async fn handle_server_event(&self, event: ServerEvent) {
        match event {
            ServerEvent::ExecuteClientCommand(params) => match ClientCommand::try_from(params) {
                Ok(command) => {
                    if let Err(e) = goto::handle_client_command(&*self.host, command) {
                        warn!(error = %e, "client command failed");
                    }
                }
                Err(e) => warn!(error = %e, "rejected client command"),
            },
            ServerEvent::TreeViewDidChange(params) => self.tree_views.did_change(params).await,
        }
    }

    /// Handles server pushes until the channel closes.
    pub async fn run_events(&self, mut events: mpsc::UnboundedReceiver<ServerEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_server_event(event).await;
        }
        debug!("server event stream closed");
    }

    /// Tears down every component. The connection itself is shut down by its owner.
    pub async fn deactivate(&self) {
        self.tree_views.dispose_all().await;
        for panel in self.previews.lock().await.iter() {
            panel.dispose();
        }
        info!("rclang client deactivated");
    }
}
