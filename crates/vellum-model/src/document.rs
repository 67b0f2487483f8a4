//! The document: identity plus an ordered block list.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::block::Block;
use crate::error::ContentError;

/// A block-structured document.
///
/// `blocks` is never empty; the empty document is one empty paragraph.
/// Blocks are related only by position — there are no cross-references.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub blocks: Vec<Block>,
}

impl Document {
    /// New document with a single empty paragraph.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            blocks: vec![Block::paragraph()],
        }
    }

    /// Single-paragraph document with the given text. Test and seeding
    /// helper.
    pub fn with_text(id: impl Into<String>, title: impl Into<String>, text: &str) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            blocks: vec![Block::paragraph_text(text)],
        }
    }

    /// Document whose paragraphs are the given strings, in order.
    pub fn with_paragraphs(
        id: impl Into<String>,
        title: impl Into<String>,
        texts: &[&str],
    ) -> Self {
        let blocks = if texts.is_empty() {
            vec![Block::paragraph()]
        } else {
            texts.iter().map(|t| Block::paragraph_text(*t)).collect()
        };
        Self {
            id: id.into(),
            title: title.into(),
            blocks,
        }
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Text of the block at `index`, if it exists.
    pub fn block_text(&self, index: usize) -> Option<String> {
        self.blocks.get(index).map(Block::text)
    }

    /// All block texts joined with newlines. Debug and test helper.
    pub fn full_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Serialize the block list to the persisted content format.
    pub fn to_content(&self) -> String {
        // Blocks serialize without surprises; a failure here would be a
        // serde bug, so fall back to the empty array rather than panic.
        serde_json::to_string(&self.blocks).unwrap_or_else(|_| "[]".into())
    }

    /// Parse persisted content into a document, enforcing the run and
    /// table invariants.
    pub fn parse_content(
        id: impl Into<String>,
        title: impl Into<String>,
        content: &str,
    ) -> Result<Self, ContentError> {
        let mut blocks: Vec<Block> = serde_json::from_str(content)?;
        for block in &mut blocks {
            block.normalize();
            if let Some(mut data) = block.table_data.take() {
                if data.is_empty() || data.iter().any(|row| row.is_empty()) {
                    return Err(ContentError::EmptyTable {
                        block_id: block.id.clone(),
                    });
                }
                let cols = data[0].len();
                if data.iter().any(|row| row.len() != cols) {
                    return Err(ContentError::RaggedTable {
                        block_id: block.id.clone(),
                    });
                }
                for cell in data.iter_mut().flatten() {
                    crate::run::normalize_runs(&mut cell.runs);
                }
                block.table_data = Some(data);
            }
        }
        if blocks.is_empty() {
            blocks.push(Block::paragraph());
        }
        Ok(Self {
            id: id.into(),
            title: title.into(),
            blocks,
        })
    }

    /// Parse persisted content, falling back to a one-empty-paragraph
    /// document when the content is malformed.
    pub fn from_content_or_default(
        id: impl Into<String>,
        title: impl Into<String>,
        content: &str,
    ) -> Self {
        let id = id.into();
        let title = title.into();
        match Self::parse_content(id.clone(), title.clone(), content) {
            Ok(doc) => doc,
            Err(err) => {
                warn!(document_id = %id, error = %err, "unparseable content, starting empty");
                Self::new(id, title)
            }
        }
    }

    /// Structural equality ignoring block ids (see [`Block::content_eq`]).
    pub fn content_eq(&self, other: &Document) -> bool {
        self.blocks.len() == other.blocks.len()
            && self
                .blocks
                .iter()
                .zip(&other.blocks)
                .all(|(a, b)| a.content_eq(b))
    }
}
