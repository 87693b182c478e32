//! Tree synchronization engine.
//!
//! Keeps one registration per tree view id. Each registration caches the
//! nodes the server has returned, keyed by `nodeUri`, so the host widget can
//! work purely with opaque uri strings and look node data up on demand.
//!
//! Children are fetched lazily: the widget asks for the children of a node
//! when it is expanded, and the roots when `parent` is `None`. The cache is
//! last-arrival-wins and never evicts; a response that arrives after its view
//! was disposed is dropped.
//!
//! Widget interactions (expand, collapse, visibility) are forwarded to the
//! server as notifications so it can track UI state without owning it.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use lsp_types::TextDocumentPositionParams;
use tokio::sync::Mutex;
use tracing::{debug, instrument, trace};

use crate::error::TreeViewError;
use crate::host::EditorHost;
use crate::lsp::{LspResult, RcConnection};
use crate::protocol::{
    TreeViewChildren, TreeViewChildrenParams, TreeViewDidChangeParams, TreeViewNode,
    TreeViewNodeCollapseDidChange, TreeViewNodeCollapseDidChangeParams, TreeViewParent,
    TreeViewParentParams, TreeViewReveal, TreeViewVisibilityDidChange,
    TreeViewVisibilityDidChangeParams,
};

/// Result type for tree view operations.
pub type TreeViewResult<T> = std::result::Result<T, TreeViewError>;

/// State owned for one logical tree view.
#[derive(Debug)]
struct TreeViewRegistration {
    view_id: String,
    nodes: Mutex<HashMap<String, TreeViewNode>>,
    disposed: AtomicBool,
}

impl TreeViewRegistration {
    fn new(view_id: String) -> Self {
        Self {
            view_id,
            nodes: Mutex::new(HashMap::new()),
            disposed: AtomicBool::new(false),
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

/// An interaction reported by a tree widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeViewEvent {
    /// The view was shown or hidden.
    VisibilityChanged {
        /// The view.
        view_id: String,
        /// True if now visible.
        visible: bool,
    },
    /// The user expanded a node.
    Expanded {
        /// The view.
        view_id: String,
        /// The node.
        node_uri: String,
    },
    /// The user collapsed a node.
    Collapsed {
        /// The view.
        view_id: String,
        /// The node.
        node_uri: String,
    },
}

impl TreeViewEvent {
    fn view_id(&self) -> &str {
        match self {
            Self::VisibilityChanged { view_id, .. }
            | Self::Expanded { view_id, .. }
            | Self::Collapsed { view_id, .. } => view_id,
        }
    }
}

/// One UI step of a reveal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealStep {
    /// Expand an ancestor.
    Expand(String),
    /// Select the target node.
    Select(String),
}

/// The expand/select sequence that makes a node visible and selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealPlan {
    /// The view holding the node.
    pub view_id: String,
    /// Steps in execution order, root first.
    pub steps: Vec<RevealStep>,
}

impl RevealPlan {
    /// Builds a plan from a reveal chain ordered target first, root last.
    ///
    /// Returns `None` for an empty chain.
    pub fn from_chain(view_id: impl Into<String>, uri_chain: &[String]) -> Option<Self> {
        let (target, ancestors) = uri_chain.split_first()?;
        let steps = ancestors
            .iter()
            .rev()
            .map(|uri| RevealStep::Expand(uri.clone()))
            .chain(std::iter::once(RevealStep::Select(target.clone())))
            .collect();
        Some(Self {
            view_id: view_id.into(),
            steps,
        })
    }
}

/// All tree views of the client and their node caches.
#[derive(Debug)]
pub struct TreeViews<C, H> {
    connection: Arc<C>,
    host: Arc<H>,
    registrations: Mutex<HashMap<String, Arc<TreeViewRegistration>>>,
}

impl<C, H> TreeViews<C, H>
where
    C: RcConnection,
    H: EditorHost,
{
    /// Registers one tree view per id.
    pub fn start<I, S>(connection: Arc<C>, host: Arc<H>, view_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let registrations = view_ids
            .into_iter()
            .map(|id| {
                let id = id.into();
                debug!(view_id = %id, "registering tree view");
                (id.clone(), Arc::new(TreeViewRegistration::new(id)))
            })
            .collect();
        Self {
            connection,
            host,
            registrations: Mutex::new(registrations),
        }
    }

    /// Ids of the live registrations, sorted.
    pub async fn view_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.registrations.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    async fn registration(&self, view_id: &str) -> TreeViewResult<Arc<TreeViewRegistration>> {
        self.registrations
            .lock()
            .await
            .get(view_id)
            .cloned()
            .ok_or_else(|| TreeViewError::UnknownView(view_id.to_string()))
    }

    /// Fetches the children of `parent`, or the roots for `None`.
    ///
    /// Every returned node with a uri is cached; the uris are returned in
    /// server order. Nodes without a uri cannot be referenced later and are
    /// left out.
    /// ## Errors
    /// Fails for an unknown view or when the request fails; the cache is left untouched.
    #[instrument(skip(self), level = "debug")]
    pub async fn get_children(
        &self,
        view_id: &str,
        parent: Option<&str>,
    ) -> TreeViewResult<Vec<String>> {
        let registration = self.registration(view_id).await?;

        let result = self
            .connection
            .request::<TreeViewChildren>(TreeViewChildrenParams {
                view_id: registration.view_id.clone(),
                node_uri: parent.map(str::to_string),
            })
            .await?;

        if registration.is_disposed() {
            debug!("view disposed while fetching children, dropping response");
            return Ok(Vec::new());
        }

        let mut nodes = registration.nodes.lock().await;
        let uris = result
            .nodes
            .into_iter()
            .filter_map(|node| {
                let uri = node.node_uri.clone()?;
                nodes.insert(uri.clone(), node);
                Some(uri)
            })
            .collect::<Vec<_>>();
        trace!(count = uris.len(), cached = nodes.len(), "children cached");
        Ok(uris)
    }

    /// Resolves the parent of a node; `None` means the node is top-level.
    /// ## Errors
    /// Fails for an unknown view or when the request fails.
    #[instrument(skip(self), level = "debug")]
    pub async fn get_parent(&self, view_id: &str, node_uri: &str) -> TreeViewResult<Option<String>> {
        let registration = self.registration(view_id).await?;

        let result = self
            .connection
            .request::<TreeViewParent>(TreeViewParentParams {
                view_id: registration.view_id.clone(),
                node_uri: node_uri.to_string(),
            })
            .await?;

        if let Some(parent) = &result.uri
            && let Some(node) = registration.nodes.lock().await.get(parent)
        {
            trace!(parent = %parent, state = ?node.collapse_state, "parent is cached");
        }
        Ok(result.uri)
    }

    /// Cached data for a node, as last returned by the server.
    pub async fn node(&self, view_id: &str, node_uri: &str) -> Option<TreeViewNode> {
        let registration = self.registration(view_id).await.ok()?;
        registration.nodes.lock().await.get(node_uri).cloned()
    }

    /// Number of cached nodes of a view.
    pub async fn cached_len(&self, view_id: &str) -> usize {
        match self.registration(view_id).await {
            Ok(registration) => registration.nodes.lock().await.len(),
            Err(_) => 0,
        }
    }

    /// Forwards a widget interaction to the server.
    ///
    /// Events for views that are not registered (or already disposed) are ignored.
    /// ## Errors
    /// Fails when the notification cannot be sent.
    pub async fn handle_event(&self, event: TreeViewEvent) -> LspResult<()> {
        if self.registration(event.view_id()).await.is_err() {
            debug!(view_id = event.view_id(), "event for unregistered view ignored");
            return Ok(());
        }

        match event {
            TreeViewEvent::VisibilityChanged { view_id, visible } => {
                self.connection
                    .notify::<TreeViewVisibilityDidChange>(TreeViewVisibilityDidChangeParams {
                        view_id,
                        visible,
                    })
                    .await
            }
            TreeViewEvent::Expanded { view_id, node_uri } => {
                self.notify_collapse(view_id, node_uri, false).await
            }
            TreeViewEvent::Collapsed { view_id, node_uri } => {
                self.notify_collapse(view_id, node_uri, true).await
            }
        }
    }

    async fn notify_collapse(
        &self,
        view_id: String,
        node_uri: String,
        collapsed: bool,
    ) -> LspResult<()> {
        self.connection
            .notify::<TreeViewNodeCollapseDidChange>(TreeViewNodeCollapseDidChangeParams {
                view_id,
                node_uri,
                collapsed,
            })
            .await
    }

    /// Applies a server-pushed change.
    ///
    /// Each node with a uri replaces its cached entry and its subtree is
    /// refreshed in the widget; a node without a uri refreshes its whole view.
    pub async fn did_change(&self, params: TreeViewDidChangeParams) {
        for node in params.nodes {
            let Ok(registration) = self.registration(&node.view_id).await else {
                debug!(view_id = %node.view_id, "change for unregistered view ignored");
                continue;
            };
            match node.node_uri.clone() {
                Some(uri) => {
                    registration.nodes.lock().await.insert(uri.clone(), node);
                    self.host.refresh_tree(&registration.view_id, Some(&uri));
                }
                None => self.host.refresh_tree(&registration.view_id, None),
            }
        }
    }

    /// Reveals the tree node at a document position.
    ///
    /// Ancestors are expanded root first, then the target is selected.
    /// Returns the applied plan, or `None` when the server found no node or
    /// the named view is not registered by the time the response arrives.
    /// ## Errors
    /// Fails when the request fails.
    #[instrument(skip(self, params), fields(uri = %params.text_document.uri), level = "debug")]
    pub async fn reveal(
        &self,
        params: TextDocumentPositionParams,
    ) -> TreeViewResult<Option<RevealPlan>> {
        let Some(result) = self.connection.request::<TreeViewReveal>(params).await? else {
            return Ok(None);
        };
        if self.registration(&result.view_id).await.is_err() {
            debug!(view_id = %result.view_id, "reveal for unregistered view dropped");
            return Ok(None);
        }

        let Some(plan) = RevealPlan::from_chain(result.view_id, &result.uri_chain) else {
            return Ok(None);
        };

        for step in &plan.steps {
            match step {
                RevealStep::Expand(uri) => self.host.expand_tree_node(&plan.view_id, uri),
                RevealStep::Select(uri) => self.host.select_tree_node(&plan.view_id, uri),
            }
        }
        Ok(Some(plan))
    }

    /// Ends a registration. Outstanding responses for it are dropped.
    pub async fn dispose(&self, view_id: &str) -> bool {
        let Some(registration) = self.registrations.lock().await.remove(view_id) else {
            return false;
        };
        registration.disposed.store(true, Ordering::Release);
        debug!(view_id, "tree view disposed");
        true
    }

    /// Ends every registration.
    pub async fn dispose_all(&self) {
        for (_, registration) in self.registrations.lock().await.drain() {
            registration.disposed.store(true, Ordering::Release);
        }
    }
}
