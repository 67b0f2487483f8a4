//! The operation sum type.
//!
//! Every edit the editor can express is exactly one of these variants.
//! Dispatch is always an explicit match — no reflection, no trait objects.
//! Operations are serializable because they travel the wire verbatim; the
//! discriminant is `type` and field names are camelCase, matching the
//! client protocol.

use serde::{Deserialize, Serialize};

use crate::block::{Alignment, BlockType, TableCell};
use crate::position::{Position, Range};
use crate::style::TextStyle;

/// A structured, atomic edit to a document.
///
/// Applicable to any well-formed document; out-of-range indices make the
/// operation a no-op rather than an error. The transform engine relies on
/// that to express killed operations (see `vellum-ot`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Operation {
    /// Insert text at a position; the new text inherits the style of the
    /// run containing that position.
    InsertText { position: Position, text: String },

    /// Delete a range, possibly spanning blocks; surviving edges merge into
    /// the start block.
    DeleteText { range: Range },

    /// Set the named style attributes on every run overlapping the range.
    ApplyFormatting { range: Range, style: TextStyle },

    /// Clear the named style attributes on every run overlapping the range.
    RemoveFormatting { range: Range, style: TextStyle },

    /// Split a block in two; the tail becomes a new paragraph inheriting
    /// alignment, indent, and line spacing.
    SplitBlock { position: Position },

    /// Concatenate block `i` into block `i-1`. No-op at `i == 0`.
    MergeBlock { block_index: u32 },

    ChangeBlockType {
        block_index: u32,
        new_type: BlockType,
    },

    ChangeBlockAlignment {
        block_index: u32,
        new_alignment: Alignment,
    },

    /// Insert a new blank block after the named index (`-1` inserts at the
    /// top). Table blocks get the default cell matrix.
    InsertBlock {
        after_block_index: i32,
        block_type: BlockType,
    },

    /// Set indent, clamped to the editor's maximum.
    SetIndent {
        block_index: u32,
        indent_level: u8,
    },

    /// Set the image URL; ignored unless the block is image-typed.
    SetImage {
        block_index: u32,
        image_url: String,
    },

    SetLineSpacing {
        block_index: u32,
        line_spacing: f32,
    },

    /// Remove a block; deleting the only block leaves one empty paragraph.
    DeleteBlock { block_index: u32 },

    /// Replace a table block's cell matrix (must be rectangular).
    SetTableData {
        block_index: u32,
        table_data: Vec<Vec<TableCell>>,
    },
}

impl Operation {
    /// Whether this operation changes the block list's shape.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Operation::SplitBlock { .. }
                | Operation::MergeBlock { .. }
                | Operation::InsertBlock { .. }
                | Operation::DeleteBlock { .. }
        )
    }

    /// Whether this operation is one of the degenerate forms `apply`
    /// ignores. The transform engine produces these when a concurrent
    /// operation has consumed this one's target.
    pub fn is_noop(&self) -> bool {
        match self {
            Operation::InsertText { text, .. } => text.is_empty(),
            Operation::DeleteText { range } => range.normalized().is_empty(),
            Operation::ApplyFormatting { range, style } | Operation::RemoveFormatting { range, style } => {
                range.normalized().is_empty() || style == &TextStyle::default()
            }
            Operation::MergeBlock { block_index } => *block_index == 0,
            Operation::SplitBlock { position } => position.block_index == u32::MAX,
            Operation::ChangeBlockType { block_index, .. }
            | Operation::ChangeBlockAlignment { block_index, .. }
            | Operation::SetIndent { block_index, .. }
            | Operation::SetImage { block_index, .. }
            | Operation::SetLineSpacing { block_index, .. }
            | Operation::DeleteBlock { block_index }
            | Operation::SetTableData { block_index, .. } => *block_index == u32::MAX,
            Operation::InsertBlock { after_block_index, .. } => *after_block_index == i32::MAX,
        }
    }

    /// Short name of the variant, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::InsertText { .. } => "insert_text",
            Operation::DeleteText { .. } => "delete_text",
            Operation::ApplyFormatting { .. } => "apply_formatting",
            Operation::RemoveFormatting { .. } => "remove_formatting",
            Operation::SplitBlock { .. } => "split_block",
            Operation::MergeBlock { .. } => "merge_block",
            Operation::ChangeBlockType { .. } => "change_block_type",
            Operation::ChangeBlockAlignment { .. } => "change_block_alignment",
            Operation::InsertBlock { .. } => "insert_block",
            Operation::SetIndent { .. } => "set_indent",
            Operation::SetImage { .. } => "set_image",
            Operation::SetLineSpacing { .. } => "set_line_spacing",
            Operation::DeleteBlock { .. } => "delete_block",
            Operation::SetTableData { .. } => "set_table_data",
        }
    }
}
