//! Tree view requests and notifications.
//!
//! The server owns the tree contents; the client only ever refers to nodes
//! through the opaque `nodeUri` strings the server hands out.

use lsp_types::notification::Notification;
use lsp_types::request::Request;
use lsp_types::{Command, TextDocumentPositionParams};
use serde::{Deserialize, Deserializer, Serialize};

/// Whether a node has children and how they are shown initially.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollapseState {
    /// No children. Sent on the wire as an absent field.
    #[default]
    Leaf,
    /// Has children; the user expands the node manually.
    Collapsed,
    /// Has children; expanded automatically on first load.
    Expanded,
}

impl CollapseState {
    /// Returns true for nodes without children.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf)
    }
}

fn collapse_state_or_leaf<'de, D>(deserializer: D) -> Result<CollapseState, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<CollapseState>::deserialize(deserializer)?.unwrap_or_default())
}

/// One node of a server-defined tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeViewNode {
    /// The view this node belongs to.
    pub view_id: String,
    /// Identity of the node, absent only for the implicit root of a view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_uri: Option<String>,
    /// Display text.
    pub label: String,
    /// Command to run when the node is clicked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Command>,
    /// Icon name or SVG path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Hover text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    /// Leaf, collapsed or expanded.
    #[serde(
        default,
        deserialize_with = "collapse_state_or_leaf",
        skip_serializing_if = "CollapseState::is_leaf"
    )]
    pub collapse_state: CollapseState,
}

/// Fetches the children of a node, or the top-level nodes when `nodeUri` is absent.
#[derive(Debug)]
pub enum TreeViewChildren {}

impl Request for TreeViewChildren {
    type Params = TreeViewChildrenParams;
    type Result = TreeViewChildrenResult;
    const METHOD: &'static str = "Rc/treeViewChildren";
}

/// Parameters of `Rc/treeViewChildren`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeViewChildrenParams {
    /// The view to query.
    pub view_id: String,
    /// Parent node; `None` asks for the roots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_uri: Option<String>,
}

/// Result of `Rc/treeViewChildren`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeViewChildrenResult {
    /// The child nodes, in display order.
    #[serde(default)]
    pub nodes: Vec<TreeViewNode>,
}

/// Resolves the parent of a node.
#[derive(Debug)]
pub enum TreeViewParent {}

impl Request for TreeViewParent {
    type Params = TreeViewParentParams;
    type Result = TreeViewParentResult;
    const METHOD: &'static str = "Rc/treeViewParent";
}

/// Parameters of `Rc/treeViewParent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeViewParentParams {
    /// The view to query.
    pub view_id: String,
    /// The child whose parent is wanted.
    pub node_uri: String,
}

/// Result of `Rc/treeViewParent`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeViewParentResult {
    /// Absent for top-level nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// Finds the tree node matching a text document position.
#[derive(Debug)]
pub enum TreeViewReveal {}

impl Request for TreeViewReveal {
    type Params = TextDocumentPositionParams;
    type Result = Option<TreeViewRevealResult>;
    const METHOD: &'static str = "Rc/treeViewReveal";
}

/// Result of `Rc/treeViewReveal`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeViewRevealResult {
    /// The view holding the node.
    pub view_id: String,
    /// The node to reveal at index 0, followed by its ancestors up to the root.
    pub uri_chain: Vec<String>,
}

/// Pushed by the server when tree contents changed.
#[derive(Debug)]
pub enum TreeViewDidChange {}

impl Notification for TreeViewDidChange {
    type Params = TreeViewDidChangeParams;
    const METHOD: &'static str = "Rc/treeViewDidChange";
}

/// Parameters of `Rc/treeViewDidChange`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeViewDidChangeParams {
    /// Nodes whose data changed.
    #[serde(default)]
    pub nodes: Vec<TreeViewNode>,
}

/// Sent when a tree view is shown or hidden.
#[derive(Debug)]
pub enum TreeViewVisibilityDidChange {}

impl Notification for TreeViewVisibilityDidChange {
    type Params = TreeViewVisibilityDidChangeParams;
    const METHOD: &'static str = "Rc/treeViewVisibilityDidChange";
}

/// Parameters of `Rc/treeViewVisibilityDidChange`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeViewVisibilityDidChangeParams {
    /// The view whose visibility changed.
    pub view_id: String,
    /// True if the view is visible.
    pub visible: bool,
}

/// Sent when the user expands or collapses a node.
#[derive(Debug)]
pub enum TreeViewNodeCollapseDidChange {}

impl Notification for TreeViewNodeCollapseDidChange {
    type Params = TreeViewNodeCollapseDidChangeParams;
    const METHOD: &'static str = "Rc/treeViewNodeCollapseDidChange";
}

/// Parameters of `Rc/treeViewNodeCollapseDidChange`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeViewNodeCollapseDidChangeParams {
    /// The view holding the node.
    pub view_id: String,
    /// The node that was expanded or collapsed.
    pub node_uri: String,
    /// True if collapsed, false if expanded.
    pub collapsed: bool,
}
