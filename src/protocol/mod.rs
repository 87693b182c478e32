//! Custom message catalog spoken with the rclang language server.
//!
//! Every message lives under the vendor-prefixed `Rc/` method namespace and
//! is declared as an [`lsp_types::request::Request`] or
//! [`lsp_types::notification::Notification`] so it can travel over the same
//! `async-lsp` socket as standard LSP traffic.
//!
//! | Method | Kind | Direction |
//! |---|---|---|
//! | `Rc/irPreviewPanelUpdate` | request | client → server |
//! | `Rc/treeViewChildren` | request | client → server |
//! | `Rc/treeViewParent` | request | client → server |
//! | `Rc/treeViewReveal` | request | client → server |
//! | `Rc/treeViewDidChange` | notification | server → client |
//! | `Rc/treeViewVisibilityDidChange` | notification | client → server |
//! | `Rc/treeViewNodeCollapseDidChange` | notification | client → server |
//! | `Rc/executeClientCommand` | notification | server → client |

pub mod client_command;
pub mod debug;
pub mod ir_preview;
pub mod tree_view;

pub use client_command::{ClientCommand, ExecuteClientCommand, GOTO_COMMAND, WindowLocation};
pub use debug::{DEBUG_ADAPTER_START, DebugDiscoveryParams, DebugSession, RunType};
pub use ir_preview::{IrPreviewUpdate, IrPreviewUpdateParams, IrPreviewUpdateResult};
pub use tree_view::{
    CollapseState, TreeViewChildren, TreeViewChildrenParams, TreeViewChildrenResult,
    TreeViewDidChange, TreeViewDidChangeParams, TreeViewNode, TreeViewNodeCollapseDidChange,
    TreeViewNodeCollapseDidChangeParams, TreeViewParent, TreeViewParentParams,
    TreeViewParentResult, TreeViewReveal, TreeViewRevealResult, TreeViewVisibilityDidChange,
    TreeViewVisibilityDidChangeParams,
};
