//! Block-based document model for Vellum.
//!
//! # Architecture
//!
//! A document is an ordered sequence of typed blocks; each block carries a
//! non-empty sequence of styled text runs. Every edit is one variant of the
//! [`Operation`] sum type, and [`apply`] is the single pure entry point that
//! turns a document plus an operation into a new document.
//!
//! Two properties the rest of the system leans on:
//!
//! - **Totality**: `apply` never fails. Out-of-range or malformed operations
//!   return the document unchanged. The transform engine exploits this by
//!   degrading killed operations to out-of-range forms.
//! - **Normalization**: no zero-length run survives an operation, adjacent
//!   runs with equal styles are merged, and a block whose runs would empty
//!   out gets a single `{text: "", style: {}}` sentinel back. Un-normalized
//!   state never escapes the apply boundary.
//!
//! Offsets throughout are UTF-16 code units — the protocol talks to browser
//! clients whose string indices are UTF-16.

mod apply;
mod block;
mod document;
mod error;
pub mod ids;
mod op;
mod position;
mod run;
mod style;
pub mod text;

pub use apply::apply;
pub use block::{
    Alignment, Block, BlockType, TableCell, DEFAULT_TABLE_COLS, DEFAULT_TABLE_ROWS,
    MAX_INDENT_LEVEL,
};
pub use document::Document;
pub use error::ContentError;
pub use ids::{next_block_id, reset_block_ids};
pub use op::Operation;
pub use position::{Position, Range};
pub use run::{
    apply_to_style_range, normalize_runs, runs_len_utf16, runs_text, split_runs_at, style_at,
    TextRun,
};
pub use style::TextStyle;

/// Result type for content parsing.
pub type Result<T> = std::result::Result<T, ContentError>;
