//! The client's status bar item.

use crate::host::EditorHost;

/// Side of the status bar an item sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBarAlignment {
    /// Left side.
    Left,
    /// Right side.
    Right,
}

/// A text item in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBarItem {
    /// Side of the bar.
    pub alignment: StatusBarAlignment,
    /// Higher priority sits further left.
    pub priority: i32,
    /// Displayed text.
    pub text: String,
}

impl Default for StatusBarItem {
    fn default() -> Self {
        Self {
            alignment: StatusBarAlignment::Right,
            priority: 100,
            text: "RclangStatusBar".to_string(),
        }
    }
}

/// Owns the single status bar item of the client.
#[derive(Debug, Default)]
pub struct StatusBar {
    item: StatusBarItem,
}

impl StatusBar {
    /// Shows the default item.
    pub fn show(host: &impl EditorHost) -> Self {
        let bar = Self::default();
        host.set_status_bar_item(&bar.item);
        bar
    }

    /// Replaces the displayed text.
    pub fn set_text(&mut self, host: &impl EditorHost, text: impl Into<String>) {
        self.item.text = text.into();
        host.set_status_bar_item(&self.item);
    }

    /// The item as last shown.
    pub fn item(&self) -> &StatusBarItem {
        &self.item
    }
}
