//! The editor host: everything the client draws or opens.
//!
//! The tree widgets, the preview webview, editor panes, the status bar and
//! the debugger frontend belong to the embedding editor. Components reach
//! them only through [`EditorHost`]. [`TerminalHost`] is a headless
//! implementation that reports every UI action on the terminal.

use std::path::PathBuf;

use lsp_types::{Range, Url};
use tracing::{info, warn};

use crate::debugger::DebugConfiguration;
use crate::error::HostError;
use crate::status_bar::StatusBarItem;

/// Which editor group a document opens in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewColumn {
    /// The group holding the active editor.
    Active,
    /// A new group to the side of the active one.
    Beside,
    /// A numbered group, starting at 1.
    Number(u32),
}

/// An editor currently shown in some pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleEditor {
    /// The document in the editor.
    pub uri: Url,
    /// Its pane, if it has one.
    pub view_column: Option<ViewColumn>,
}

impl VisibleEditor {
    /// True for auxiliary panes such as the output channel.
    pub fn is_output(&self) -> bool {
        self.uri.scheme() == "output"
    }
}

/// Options for a webview panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebviewOptions {
    /// Allow scripts inside the webview.
    pub enable_scripts: bool,
    /// Directories the webview may load resources from.
    pub local_resource_roots: Vec<PathBuf>,
}

/// A webview panel owned by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebviewPanel {
    /// Client-assigned panel identity.
    pub id: u64,
    /// Panel type, used by the host to restore panels.
    pub view_type: String,
    /// Panel title.
    pub title: String,
    /// Where the panel opens.
    pub column: ViewColumn,
    /// Webview options.
    pub options: WebviewOptions,
}

/// UI surface of the embedding editor.
pub trait EditorHost: Send + Sync {
    /// Asks a tree widget to re-query a node, or the whole view for `None`.
    fn refresh_tree(&self, view_id: &str, node_uri: Option<&str>);

    /// Expands a node in a tree widget.
    fn expand_tree_node(&self, view_id: &str, node_uri: &str);

    /// Selects and focuses a node in a tree widget.
    fn select_tree_node(&self, view_id: &str, node_uri: &str);

    /// Replaces the whole content of a webview panel, creating it if needed.
    fn render_webview(&self, panel: &WebviewPanel, html: &str);

    /// Column of the active text editor, if any.
    fn active_column(&self) -> Option<ViewColumn>;

    /// Document of the active text editor, if any.
    fn active_document(&self) -> Option<Url>;

    /// Editors visible in any pane, in pane order.
    fn visible_editors(&self) -> Vec<VisibleEditor>;

    /// Opens a document in a pane and selects a range.
    /// ## Errors
    /// Fails if the document cannot be opened.
    fn show_document(&self, uri: &Url, selection: Range, column: ViewColumn)
    -> Result<(), HostError>;

    /// Shows an error notification to the user.
    fn show_error_message(&self, message: &str);

    /// Creates or updates the status bar item.
    fn set_status_bar_item(&self, item: &StatusBarItem);

    /// Starts a debug session; `Ok(false)` when the host declined.
    /// ## Errors
    /// Fails if the host debugger could not be reached.
    fn start_debugging(&self, configuration: &DebugConfiguration) -> Result<bool, HostError>;
}

/// Headless host that reports UI actions on stdout and the log.
#[derive(Debug, Default)]
pub struct TerminalHost {
    preview_out: Option<PathBuf>,
}

impl TerminalHost {
    /// Creates a host printing everything to stdout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes preview HTML to `path` instead of stdout.
    #[must_use]
    pub fn with_preview_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.preview_out = Some(path.into());
        self
    }
}

impl EditorHost for TerminalHost {
    fn refresh_tree(&self, view_id: &str, node_uri: Option<&str>) {
        info!(view_id, node_uri, "tree refresh");
    }

    fn expand_tree_node(&self, view_id: &str, node_uri: &str) {
        println!("[{view_id}] expand {node_uri}");
    }

    fn select_tree_node(&self, view_id: &str, node_uri: &str) {
        println!("[{view_id}] select {node_uri}");
    }

    fn render_webview(&self, panel: &WebviewPanel, html: &str) {
        match &self.preview_out {
            Some(path) => match std::fs::write(path, html) {
                Ok(()) => info!(panel = panel.id, path = %path.display(), "preview written"),
                Err(e) => warn!(panel = panel.id, error = %e, "failed to write preview"),
            },
            None => println!("{html}"),
        }
    }

    fn active_column(&self) -> Option<ViewColumn> {
        None
    }

    fn active_document(&self) -> Option<Url> {
        None
    }

    fn visible_editors(&self) -> Vec<VisibleEditor> {
        Vec::new()
    }

    fn show_document(
        &self,
        uri: &Url,
        selection: Range,
        column: ViewColumn,
    ) -> Result<(), HostError> {
        println!(
            "open {}:{}:{} ({column:?})",
            uri,
            selection.start.line + 1,
            selection.start.character + 1
        );
        Ok(())
    }

    fn show_error_message(&self, message: &str) {
        eprintln!("error: {message}");
    }

    fn set_status_bar_item(&self, item: &StatusBarItem) {
        info!(text = %item.text, "status bar");
    }

    fn start_debugging(&self, configuration: &DebugConfiguration) -> Result<bool, HostError> {
        let Some(port) = configuration.debug_server else {
            return Ok(false);
        };
        println!(
            "debug adapter for '{}' listening on port {port}",
            configuration.name.as_deref().unwrap_or("rc-lang")
        );
        Ok(true)
    }
}
