//! Error types for document content parsing.

use thiserror::Error;

/// Errors that can occur while parsing persisted document content.
///
/// `apply` itself is total and has no error type; only the serialized
/// content boundary can fail.
#[derive(Error, Debug)]
pub enum ContentError {
    /// The content string is not valid JSON or not a block array.
    #[error("content is not a valid block array: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A table block's cell matrix is not rectangular.
    #[error("table block {block_id} has a ragged cell matrix")]
    RaggedTable { block_id: String },

    /// A table block has zero rows or zero columns.
    #[error("table block {block_id} has an empty cell matrix")]
    EmptyTable { block_id: String },
}
