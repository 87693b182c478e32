//! LSP (Language Server Protocol) client module.
//!
//! This module owns the single long-lived connection to the rclang
//! language server.
//!
//! # Architecture
//!
//! The LSP module is organized into:
//! - `client`: spawns the server and runs the `async-lsp` main loop
//! - `connection`: the [`RcConnection`] seam the other components talk to
//! - `types`: path and position conversions

pub mod client;
pub mod connection;
pub mod types;

use crate::error::LspError;

/// Result type for LSP operations.
pub type LspResult<T> = std::result::Result<T, LspError>;

pub use client::{LspClient, LspClientBuilder, LspClientConfig};
pub use connection::{RcConnection, ServerEvent};
pub use lsp_types::{Position, Range, TextDocumentIdentifier, TextDocumentPositionParams, Url};
