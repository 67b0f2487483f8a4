//! Block types.
//!
//! A block is the addressable unit of a document: a typed container with a
//! non-empty run list and presentation metadata. Blocks that display no text
//! (horizontal rule, image, table) still carry the empty sentinel run so the
//! run-list invariant holds uniformly.

use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::ids::next_block_id;
use crate::run::{normalize_runs, runs_len_utf16, runs_text, TextRun};

/// Deepest indent the editor allows.
pub const MAX_INDENT_LEVEL: u8 = 8;

/// Dimensions of the cell matrix a freshly inserted table block gets.
pub const DEFAULT_TABLE_ROWS: usize = 2;
pub const DEFAULT_TABLE_COLS: usize = 2;

/// What a block *is*. Presentation metadata (alignment, indent, spacing)
/// lives on the block itself, orthogonal to the type.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum BlockType {
    #[default]
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    BulletListItem,
    NumberedListItem,
    Blockquote,
    CodeBlock,
    HorizontalRule,
    Image,
    Table,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::Heading1 => "heading1",
            BlockType::Heading2 => "heading2",
            BlockType::Heading3 => "heading3",
            BlockType::BulletListItem => "bullet-list-item",
            BlockType::NumberedListItem => "numbered-list-item",
            BlockType::Blockquote => "blockquote",
            BlockType::CodeBlock => "code-block",
            BlockType::HorizontalRule => "horizontal-rule",
            BlockType::Image => "image",
            BlockType::Table => "table",
        }
    }

    /// Blocks that render something other than their run text.
    pub fn is_void(&self) -> bool {
        matches!(
            self,
            BlockType::HorizontalRule | BlockType::Image | BlockType::Table
        )
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Horizontal alignment of a block's content.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// One cell of a table block. Same non-empty run invariant as blocks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub runs: Vec<TextRun>,
}

impl TableCell {
    pub fn empty() -> Self {
        Self {
            runs: vec![TextRun::sentinel()],
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            runs: vec![TextRun::plain(text)],
        }
    }
}

/// An addressable unit of the document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Stable id, unique within the document for the block's lifetime.
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    #[serde(default)]
    pub alignment: Alignment,
    #[serde(default)]
    pub indent_level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_spacing: Option<f32>,
    pub runs: Vec<TextRun>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_data: Option<Vec<Vec<TableCell>>>,
}

impl Block {
    /// New blank block of the given type with a generated id. Table blocks
    /// get the default cell matrix.
    pub fn new(block_type: BlockType) -> Self {
        let table_data = (block_type == BlockType::Table).then(default_table_data);
        Self {
            id: next_block_id(),
            block_type,
            alignment: Alignment::default(),
            indent_level: 0,
            line_spacing: None,
            runs: vec![TextRun::sentinel()],
            image_url: None,
            table_data,
        }
    }

    pub fn paragraph() -> Self {
        Self::new(BlockType::Paragraph)
    }

    /// Paragraph with the given unstyled text. Test and seeding helper.
    pub fn paragraph_text(text: impl Into<String>) -> Self {
        let mut block = Self::paragraph();
        block.runs = vec![TextRun::plain(text)];
        block.normalize();
        block
    }

    /// Concatenated run text.
    pub fn text(&self) -> String {
        runs_text(&self.runs)
    }

    /// UTF-16 length of the block's text.
    pub fn len_utf16(&self) -> u32 {
        runs_len_utf16(&self.runs)
    }

    /// Normalize the run list (and restore the sentinel if needed).
    pub fn normalize(&mut self) {
        normalize_runs(&mut self.runs);
    }

    /// Structural equality ignoring the block id.
    ///
    /// Convergence checks compare documents that reached the same state
    /// along different operation orders; generated ids differ per path, so
    /// the comparison must not see them.
    pub fn content_eq(&self, other: &Block) -> bool {
        self.block_type == other.block_type
            && self.alignment == other.alignment
            && self.indent_level == other.indent_level
            && self.line_spacing == other.line_spacing
            && self.runs == other.runs
            && self.image_url == other.image_url
            && self.table_data == other.table_data
    }
}

/// The cell matrix a new table block starts with.
pub fn default_table_data() -> Vec<Vec<TableCell>> {
    (0..DEFAULT_TABLE_ROWS)
        .map(|_| (0..DEFAULT_TABLE_COLS).map(|_| TableCell::empty()).collect())
        .collect()
}

/// Check a cell matrix is rectangular with rows >= 1 and cols >= 1.
pub fn table_data_is_valid(data: &[Vec<TableCell>]) -> bool {
    let Some(first) = data.first() else {
        return false;
    };
    !first.is_empty() && data.iter().all(|row| row.len() == first.len())
}
