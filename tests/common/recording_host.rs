//! An editor host that records every UI action.

use std::sync::Mutex;

use lsp_types::{Range, Url};
use rclang_client::debugger::DebugConfiguration;
use rclang_client::error::HostError;
use rclang_client::host::{EditorHost, ViewColumn, VisibleEditor, WebviewPanel};
use rclang_client::status_bar::StatusBarItem;

/// One recorded host call.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Refresh {
        view_id: String,
        node_uri: Option<String>,
    },
    Expand {
        view_id: String,
        node_uri: String,
    },
    Select {
        view_id: String,
        node_uri: String,
    },
    Render {
        panel_id: u64,
        html: String,
    },
    ShowDocument {
        uri: Url,
        selection: Range,
        column: ViewColumn,
    },
    Error(String),
    StatusBar(String),
    StartDebugging(DebugConfiguration),
}

#[derive(Debug)]
pub struct RecordingHost {
    calls: Mutex<Vec<HostCall>>,
    active_column: Option<ViewColumn>,
    active_document: Option<Url>,
    visible_editors: Vec<VisibleEditor>,
    accept_debugging: bool,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            active_column: None,
            active_document: None,
            visible_editors: Vec::new(),
            accept_debugging: true,
        }
    }
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_active_column(mut self, column: ViewColumn) -> Self {
        self.active_column = Some(column);
        self
    }

    pub fn with_active_document(mut self, uri: &str) -> Self {
        self.active_document = Some(Url::parse(uri).unwrap());
        self
    }

    /// Adds a visible editor; `column` is a pane number.
    pub fn with_visible_editor(mut self, uri: &str, column: u32) -> Self {
        self.visible_editors.push(VisibleEditor {
            uri: Url::parse(uri).unwrap(),
            view_column: Some(ViewColumn::Number(column)),
        });
        self
    }

    pub fn declining_debug(mut self) -> Self {
        self.accept_debugging = false;
        self
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Expand and select calls only, in order.
    pub fn tree_ui_calls(&self) -> Vec<HostCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, HostCall::Expand { .. } | HostCall::Select { .. }))
            .collect()
    }

    pub fn renders(&self) -> Vec<(u64, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                HostCall::Render { panel_id, html } => Some((panel_id, html)),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                HostCall::Error(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn shown_documents(&self) -> Vec<(Url, Range, ViewColumn)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                HostCall::ShowDocument {
                    uri,
                    selection,
                    column,
                } => Some((uri, selection, column)),
                _ => None,
            })
            .collect()
    }

    pub fn debug_sessions(&self) -> Vec<DebugConfiguration> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                HostCall::StartDebugging(configuration) => Some(configuration),
                _ => None,
            })
            .collect()
    }
}

impl EditorHost for RecordingHost {
    fn refresh_tree(&self, view_id: &str, node_uri: Option<&str>) {
        self.record(HostCall::Refresh {
            view_id: view_id.to_string(),
            node_uri: node_uri.map(str::to_string),
        });
    }

    fn expand_tree_node(&self, view_id: &str, node_uri: &str) {
        self.record(HostCall::Expand {
            view_id: view_id.to_string(),
            node_uri: node_uri.to_string(),
        });
    }

    fn select_tree_node(&self, view_id: &str, node_uri: &str) {
        self.record(HostCall::Select {
            view_id: view_id.to_string(),
            node_uri: node_uri.to_string(),
        });
    }

    fn render_webview(&self, panel: &WebviewPanel, html: &str) {
        self.record(HostCall::Render {
            panel_id: panel.id,
            html: html.to_string(),
        });
    }

    fn active_column(&self) -> Option<ViewColumn> {
        self.active_column
    }

    fn active_document(&self) -> Option<Url> {
        self.active_document.clone()
    }

    fn visible_editors(&self) -> Vec<VisibleEditor> {
        self.visible_editors.clone()
    }

    fn show_document(
        &self,
        uri: &Url,
        selection: Range,
        column: ViewColumn,
    ) -> Result<(), HostError> {
        self.record(HostCall::ShowDocument {
            uri: uri.clone(),
            selection,
            column,
        });
        Ok(())
    }

    fn show_error_message(&self, message: &str) {
        self.record(HostCall::Error(message.to_string()));
    }

    fn set_status_bar_item(&self, item: &StatusBarItem) {
        self.record(HostCall::StatusBar(item.text.clone()));
    }

    fn start_debugging(&self, configuration: &DebugConfiguration) -> Result<bool, HostError> {
        self.record(HostCall::StartDebugging(configuration.clone()));
        Ok(self.accept_debugging)
    }
}
