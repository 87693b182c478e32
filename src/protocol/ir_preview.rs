//! IR preview request.

use lsp_types::Url;
use lsp_types::request::Request;
use serde::{Deserialize, Serialize};

/// Asks the server for the intermediate representation of a document.
#[derive(Debug)]
pub enum IrPreviewUpdate {}

impl Request for IrPreviewUpdate {
    type Params = IrPreviewUpdateParams;
    type Result = IrPreviewUpdateResult;
    const METHOD: &'static str = "Rc/irPreviewPanelUpdate";
}

/// Parameters of `Rc/irPreviewPanelUpdate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrPreviewUpdateParams {
    /// Document to preview.
    pub document_uri: Url,
}

/// Line-indexed IR listing: `irs[line]` holds the IR fragments emitted for
/// that source line, possibly none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrPreviewUpdateResult {
    /// Absent when the server has nothing to show.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub irs: Option<Vec<Vec<String>>>,
}
