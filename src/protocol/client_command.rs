//! Server-pushed client commands.
//!
//! The server asks the client to perform editor actions through
//! `Rc/executeClientCommand`. Payloads are decoded here, once, into
//! [`ClientCommand`]; nothing downstream handles raw JSON arguments.

use lsp_types::notification::Notification;
use lsp_types::{ExecuteCommandParams, Range, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CommandError;

/// Command identifier of the go-to navigation command.
pub const GOTO_COMMAND: &str = "rclang.goto";

/// Notification carrying a command the client should execute.
#[derive(Debug)]
pub enum ExecuteClientCommand {}

impl Notification for ExecuteClientCommand {
    type Params = ExecuteCommandParams;
    const METHOD: &'static str = "Rc/executeClientCommand";
}

/// Target of a go-to command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowLocation {
    /// Document to open.
    pub uri: Url,
    /// Range to select.
    pub range: Range,
    /// Open beside the current editor group instead of replacing it.
    #[serde(default)]
    pub other_window: bool,
}

/// A decoded server-pushed command.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    /// Open a document and select a range.
    GoTo(WindowLocation),
    /// Any command this client does not know.
    Unrecognized {
        /// The command identifier.
        command: String,
        /// The raw arguments.
        arguments: Vec<Value>,
    },
}

impl TryFrom<ExecuteCommandParams> for ClientCommand {
    type Error = CommandError;

    fn try_from(params: ExecuteCommandParams) -> Result<Self, Self::Error> {
        let ExecuteCommandParams {
            command,
            arguments,
            ..
        } = params;

        if command != GOTO_COMMAND {
            return Ok(Self::Unrecognized { command, arguments });
        }

        let argument = arguments
            .into_iter()
            .next()
            .ok_or_else(|| CommandError::MissingArgument(command.clone()))?;
        let location =
            serde_json::from_value(argument).map_err(|e| CommandError::InvalidArgument {
                command,
                reason: e.to_string(),
            })?;
        Ok(Self::GoTo(location))
    }
}
