//! Helper conversions for working with LSP types.
//!
//! Paths given on the command line become `file://` URLs the server
//! understands, and 1-indexed editor positions become 0-indexed LSP ones.

use lsp_types::{Position, Url};
use std::path::Path;

use crate::error::LspError;

use super::LspResult;

/// Converts a path to an LSP file:// URI.
///
/// This handles both absolute and relative paths, converting them to
/// properly formatted file:// URIs that LSP servers expect.
/// ## Errors
/// Returns `LspError::DocumentNotFound` when the path cannot be resolved.
pub fn path_to_url(path: &Path) -> LspResult<Url> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| {
                LspError::DocumentNotFound(format!("failed to get current directory: {e}"))
            })?
            .join(path)
    };

    // Canonicalize to resolve symlinks and normalize path
    let canonical = absolute.canonicalize().map_err(|e| {
        LspError::DocumentNotFound(format!(
            "failed to canonicalize path '{}': {}",
            path.display(),
            e
        ))
    })?;

    Url::from_file_path(&canonical)
        .map_err(|()| LspError::DocumentNotFound(format!("invalid path: {}", canonical.display())))
}

/// Converts user-facing 1-indexed position to LSP 0-indexed position.
///
/// # Errors
///
/// Returns error if line or column is 0.
pub fn to_lsp_position(line: u32, column: u32) -> LspResult<Position> {
    if line == 0 || column == 0 {
        return Err(LspError::InvalidPosition { line, column });
    }
    Ok(Position {
        line: line - 1,
        character: column - 1,
    })
}

/// Guesses the language id announced in `didOpen` from a file extension.
pub fn language_id_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("rc") => "rclang",
        _ => "plaintext",
    }
}
