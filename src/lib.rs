//! rclang language client
//!
//! A client for the rclang language server. It launches the server, speaks
//! LSP plus a small `Rc/` message catalog to it, and drives the editor
//! surfaces built on top: an IR preview webview, AST tree views, go-to
//! navigation and a debug adapter bridge.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   EditorHost   ┌──────────────────┐
//! │   Editor host    │◄───────────────│    Extension     │
//! │ (trees, webview, │                │ tree_view preview│
//! │  panes, debug)   │───commands────►│ goto debugger    │
//! └──────────────────┘                └────────┬─────────┘
//!                                              │ RcConnection
//!                                       ┌──────▼──────┐
//!                                       │  LspClient  │
//!                                       └──────┬──────┘
//!                                              │ JSON-RPC (stdio)
//!                                       ┌──────▼────────┐
//!                                       │ rclang server │
//!                                       └───────────────┘
//! ```
//!
//! # Modules
//!
//! - [`error`] - Error types for the entire client
//! - [`lsp`] - LSP client and the [`lsp::RcConnection`] seam
//! - [`protocol`] - The `Rc/` message catalog
//! - [`tree_view`] - Tree synchronization engine
//! - [`preview`] - IR preview panel
//! - [`goto`] - Server-driven navigation
//! - [`debugger`] - Debug adapter bridge
//! - [`extension`] - The client context object
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use rclang_client::{config::Settings, extension::Extension, host::TerminalHost};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::default();
//!     let client = Arc::new(settings.client_builder(".").build().await?);
//!     let events = client.take_events().await.expect("events taken once");
//!
//!     let extension = Extension::activate(client.clone(), Arc::new(TerminalHost::new()), &settings);
//!     extension.run_events(events).await;
//!     Ok(())
//! }
//! ```

// Enforce documentation and other quality attributes
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are too strict
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod config;
pub mod debugger;
pub mod error;
pub mod extension;
pub mod goto;
pub mod host;
pub mod lsp;
pub mod preview;
pub mod protocol;
pub mod status_bar;
pub mod tree_view;

// Re-export commonly used types at the crate root
pub use error::{Error, Result};
