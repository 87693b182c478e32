//! IR preview panel.
//!
//! Each update asks the server for the IR listing of one document and
//! replaces the whole webview content with a one-column table, one row per
//! source line. Nothing is cached or diffed between updates.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use lsp_types::Url;
use tracing::debug;

use crate::host::{EditorHost, ViewColumn, WebviewOptions, WebviewPanel};
use crate::lsp::{LspResult, RcConnection};
use crate::protocol::{IrPreviewUpdate, IrPreviewUpdateParams, IrPreviewUpdateResult};

/// Webview type of the preview panel.
pub const VIEW_TYPE: &str = "IRPreview";

/// Title of the preview panel.
pub const TITLE: &str = "IRPreview";

/// One text cell per source line: the line's IR fragments concatenated.
pub fn render_rows(result: &IrPreviewUpdateResult) -> Vec<String> {
    result
        .irs
        .iter()
        .flatten()
        .map(|fragments| fragments.concat())
        .collect()
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders the full webview document for a set of rows.
pub fn render_html(rows: &[String]) -> String {
    let mut table = String::new();
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            table.push('\n');
        }
        let _ = write!(table, "<tr><td>{}</td></tr>", escape_html(row));
    }
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>IR Preview</title>
</head>
<body>
    <table border="1">
{table}
    </table>
</body>
</html>"#
    )
}

/// Webview options: scripts on, resources restricted to `<extension root>/media`.
pub fn webview_options(extension_root: &Path) -> WebviewOptions {
    WebviewOptions {
        enable_scripts: true,
        local_resource_roots: vec![extension_root.join("media")],
    }
}

/// A preview panel bound to one document.
#[derive(Debug)]
pub struct IrPreviewPanel<C, H> {
    connection: Arc<C>,
    host: Arc<H>,
    panel: WebviewPanel,
    document_uri: Url,
    visible: AtomicBool,
    disposed: AtomicBool,
}

impl<C, H> IrPreviewPanel<C, H>
where
    C: RcConnection,
    H: EditorHost,
{
    /// Creates a panel in the active editor's column, or the first column.
    pub fn create(
        connection: Arc<C>,
        host: Arc<H>,
        extension_root: &Path,
        id: u64,
        document_uri: Url,
    ) -> Self {
        let column = host.active_column().unwrap_or(ViewColumn::Number(1));
        Self {
            connection,
            host,
            panel: WebviewPanel {
                id,
                view_type: VIEW_TYPE.to_string(),
                title: TITLE.to_string(),
                column,
                options: webview_options(extension_root),
            },
            document_uri,
            visible: AtomicBool::new(true),
            disposed: AtomicBool::new(false),
        }
    }

    /// The webview this panel renders into.
    pub fn panel(&self) -> &WebviewPanel {
        &self.panel
    }

    /// The previewed document.
    pub fn document_uri(&self) -> &Url {
        &self.document_uri
    }

    /// Fetches the listing and replaces the webview content.
    ///
    /// Returns the number of rendered rows. A disposed panel renders nothing.
    /// ## Errors
    /// Fails when the request fails; the previous content stays in place.
    pub async fn update(&self) -> LspResult<usize> {
        if self.is_disposed() {
            return Ok(0);
        }
        let result = self
            .connection
            .request::<IrPreviewUpdate>(IrPreviewUpdateParams {
                document_uri: self.document_uri.clone(),
            })
            .await?;

        let rows = render_rows(&result);
        debug!(uri = %self.document_uri, rows = rows.len(), "rendering IR preview");
        self.host.render_webview(&self.panel, &render_html(&rows));
        Ok(rows.len())
    }

    /// Records a visibility change; becoming visible triggers an update.
    ///
    /// The panel only counts as visible once that update succeeded, so a
    /// failed re-render is retried the next time it is shown.
    /// ## Errors
    /// Propagates a failed update.
    pub async fn set_visible(&self, visible: bool) -> LspResult<()> {
        if !visible {
            self.visible.store(false, Ordering::Release);
            return Ok(());
        }
        if self.visible.load(Ordering::Acquire) {
            return Ok(());
        }
        self.update().await?;
        self.visible.store(true, Ordering::Release);
        Ok(())
    }

    /// True while the panel is shown.
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }

    /// Closes the panel; later updates are no-ops.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
    }

    /// True once disposed.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(irs: &[&[&str]]) -> IrPreviewUpdateResult {
        IrPreviewUpdateResult {
            irs: Some(
                irs.iter()
                    .map(|line| line.iter().map(ToString::to_string).collect())
                    .collect(),
            ),
        }
    }

    #[test]
    fn test_rows_concatenate_fragments() {
        let rows = render_rows(&result(&[&["a", "b"], &[], &["c"]]));
        assert_eq!(rows, vec!["ab", "", "c"]);
    }

    #[test]
    fn test_absent_irs_render_no_rows() {
        assert!(render_rows(&IrPreviewUpdateResult::default()).is_empty());
        let html = render_html(&[]);
        assert!(!html.contains("<tr>"));
    }

    #[test]
    fn test_html_has_one_row_per_line() {
        let html = render_html(&["ab".to_string(), String::new(), "c".to_string()]);
        assert_eq!(html.matches("<tr>").count(), 3);
        assert!(html.contains("<tr><td>ab</td></tr>\n<tr><td></td></tr>\n<tr><td>c</td></tr>"));
    }

    #[test]
    fn test_html_escapes_cells() {
        let html = render_html(&["%1 = icmp < %2 & \"x\"".to_string()]);
        assert!(html.contains("<td>%1 = icmp &lt; %2 &amp; &quot;x&quot;</td>"));
    }

    #[test]
    fn test_webview_options() {
        let options = webview_options(Path::new("/ext"));
        assert!(options.enable_scripts);
        assert_eq!(
            options.local_resource_roots,
            vec![std::path::PathBuf::from("/ext/media")]
        );
    }
}
