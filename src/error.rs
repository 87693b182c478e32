//! Error types for the rclang language client.
//!
//! This module defines all error types used throughout the client,
//! organized by subsystem: LSP transport, tree views, editor commands
//! and the debug adapter bridge.
//!
//! "Nothing found" answers from the server (no parent, no IR lines, no
//! debug session) are never errors; they come back as `Option`/empty values.

use thiserror::Error;

/// Errors related to LSP client operations.
#[derive(Debug, Error)]
pub enum LspError {
    /// The language server process failed to start.
    #[error("failed to start language server: {0}")]
    ServerStartFailed(String),

    /// Failed to initialize the language server.
    #[error("language server initialization failed: {0}")]
    InitializationFailed(String),

    /// A request to the language server timed out.
    #[error("language server request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Failed to send a request or notification to the language server.
    #[error("failed to send request to language server: {0}")]
    RequestFailed(String),

    /// Failed to parse a payload exchanged with the language server.
    #[error("failed to parse language server payload: {0}")]
    ParseError(String),

    /// Invalid position in document.
    #[error("invalid position: line {line}, column {column}")]
    InvalidPosition {
        /// The line number.
        line: u32,
        /// The column number.
        column: u32,
    },

    /// Document not found or not open.
    #[error("document not found: {0}")]
    DocumentNotFound(String),
}

/// Errors raised by the tree synchronization engine.
#[derive(Debug, Error)]
pub enum TreeViewError {
    /// No registration exists for the view id.
    #[error("unknown tree view: {0}")]
    UnknownView(String),

    /// The request for the view failed at the transport level.
    #[error("tree view request failed: {0}")]
    Lsp(#[from] LspError),
}

/// Errors raised while decoding commands at the client boundary.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A known command was invoked without its required argument.
    #[error("command '{0}' is missing its argument")]
    MissingArgument(String),

    /// A known command carried an argument of the wrong shape.
    #[error("invalid argument for command '{command}': {reason}")]
    InvalidArgument {
        /// The command identifier.
        command: String,
        /// Why decoding failed.
        reason: String,
    },
}

/// Errors raised by the debug adapter bridge.
#[derive(Debug, Error)]
pub enum DebugError {
    /// The debug adapter uri did not carry a usable `host:port` authority.
    #[error("invalid debug adapter uri: {0}")]
    InvalidAdapterUri(String),

    /// The server failed to start a debug adapter.
    #[error("debug adapter start failed: {0}")]
    Lsp(#[from] LspError),

    /// The editor host refused to start the session.
    #[error("editor host failed to start debugging: {0}")]
    Host(#[from] HostError),
}

/// A failure reported by the editor host while performing a UI action.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HostError(pub String);

/// A unified error type for the entire client.
#[derive(Debug, Error)]
pub enum Error {
    /// LSP-related error.
    #[error("LSP error: {0}")]
    Lsp(#[from] LspError),

    /// Tree-view-related error.
    #[error("tree view error: {0}")]
    TreeView(#[from] TreeViewError),

    /// Command decoding error.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Debugger-related error.
    #[error("debug error: {0}")]
    Debug(#[from] DebugError),

    /// Editor host error.
    #[error("editor host error: {0}")]
    Host(#[from] HostError),
}

/// A specialized Result type for rclang-client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lsp_error_display() {
        let err = LspError::ServerStartFailed("connection refused".to_string());
        assert_eq!(
            err.to_string(),
            "failed to start language server: connection refused"
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = TreeViewError::UnknownView("rcAst".to_string()).into();
        assert!(matches!(err, Error::TreeView(TreeViewError::UnknownView(_))));
    }

    #[test]
    fn test_tree_view_error_from_lsp_error() {
        let lsp_err = LspError::RequestFailed("Rc/treeViewChildren".to_string());
        let tree_err: TreeViewError = lsp_err.into();
        assert!(matches!(tree_err, TreeViewError::Lsp(_)));
    }

    #[test]
    fn test_command_error_display() {
        let err = CommandError::MissingArgument("rclang.goto".to_string());
        assert_eq!(err.to_string(), "command 'rclang.goto' is missing its argument");
    }
}
