//! The request/notification seam shared by every client component.
//!
//! Components are generic over [`RcConnection`] instead of holding an
//! [`LspClient`](super::client::LspClient) directly, so the tree engine,
//! preview and debugger can be driven by any transport that speaks the
//! message catalog.

use std::future::Future;

use lsp_types::ExecuteCommandParams;
use lsp_types::notification::Notification;
use lsp_types::request::Request;

use crate::protocol::TreeViewDidChangeParams;

use super::LspResult;

/// A typed channel to the language server.
///
/// Any number of requests may be outstanding at once; completions arrive in
/// whatever order the server answers them.
pub trait RcConnection: Send + Sync {
    /// Sends a request and waits for its typed response.
    fn request<R>(&self, params: R::Params) -> impl Future<Output = LspResult<R::Result>> + Send
    where
        R: Request;

    /// Sends a fire-and-forget notification.
    fn notify<N>(&self, params: N::Params) -> impl Future<Output = LspResult<()>> + Send
    where
        N: Notification;
}

/// A message pushed by the server that the client must act on.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// `Rc/executeClientCommand`.
    ExecuteClientCommand(ExecuteCommandParams),
    /// `Rc/treeViewDidChange`.
    TreeViewDidChange(TreeViewDidChangeParams),
}
