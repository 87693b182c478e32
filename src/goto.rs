//! Go-to navigation requested by the server.

use tracing::{debug, instrument};

use crate::error::HostError;
use crate::host::{EditorHost, ViewColumn, VisibleEditor};
use crate::protocol::{ClientCommand, WindowLocation};

/// Picks the pane a go-to opens in.
///
/// Without `other_window` the active pane is reused. Otherwise the last
/// visible pane that is not an output pane is used, falling back to a new
/// pane beside the active one.
pub fn resolve_view_column(location: &WindowLocation, visible: &[VisibleEditor]) -> ViewColumn {
    if !location.other_window {
        return ViewColumn::Active;
    }
    visible
        .iter()
        .filter(|editor| !editor.is_output())
        .filter_map(|editor| editor.view_column)
        .next_back()
        .unwrap_or(ViewColumn::Beside)
}

/// Opens the target document and selects the range.
/// ## Errors
/// Fails when the host cannot open the document.
#[instrument(skip(host), fields(uri = %location.uri), level = "debug")]
pub fn go_to<H: EditorHost>(host: &H, location: &WindowLocation) -> Result<ViewColumn, HostError> {
    let column = resolve_view_column(location, &host.visible_editors());
    host.show_document(&location.uri, location.range, column)?;
    Ok(column)
}

/// Runs a server-pushed client command. Unknown commands are ignored.
/// ## Errors
/// Fails when a go-to cannot open its document.
pub fn handle_client_command<H: EditorHost>(
    host: &H,
    command: ClientCommand,
) -> Result<(), HostError> {
    match command {
        ClientCommand::GoTo(location) => go_to(host, &location).map(|_| ()),
        ClientCommand::Unrecognized { command, .. } => {
            debug!(command = %command, "ignoring unrecognized client command");
            Ok(())
        }
    }
}
