//! Apply-time context captured alongside operations.

use serde::{Deserialize, Serialize};
use vellum_model::{Document, Operation};

/// Base-state measurements a transform needs that the operation itself
/// does not carry.
///
/// Captured by whoever applies the operation — the room when it applies a
/// sequenced op, the client when it applies a local edit — and stored next
/// to the op in history buffers and pending queues. Everything except
/// merge_block and split_block captures nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpContext {
    /// merge_block: UTF-16 text length of block `i-1` in the base state.
    /// Positions on the merged-away block land after this offset.
    pub join_offset: Option<u32>,
    /// merge_block: text length of the merged-away block `i`.
    /// split_block: text length of the origin block.
    /// delete_text spanning blocks: text length of the end block.
    pub block_len: Option<u32>,
}

impl OpContext {
    /// Measure `op`'s context against the document it is about to be
    /// applied to. Out-of-range ops capture nothing.
    pub fn capture(base: &Document, op: &Operation) -> Self {
        match op {
            Operation::MergeBlock { block_index } => {
                let i = *block_index as usize;
                if i == 0 || i >= base.blocks.len() {
                    return Self::default();
                }
                Self {
                    join_offset: Some(base.blocks[i - 1].len_utf16()),
                    block_len: Some(base.blocks[i].len_utf16()),
                }
            }
            Operation::SplitBlock { position } => {
                let Some(block) = base.blocks.get(position.block_index as usize) else {
                    return Self::default();
                };
                Self {
                    join_offset: None,
                    block_len: Some(block.len_utf16()),
                }
            }
            Operation::DeleteText { range } => {
                let r = range.normalized();
                if !r.spans_blocks() {
                    return Self::default();
                }
                let Some(end_block) = base.blocks.get(r.end.block_index as usize) else {
                    return Self::default();
                };
                Self {
                    join_offset: None,
                    block_len: Some(end_block.len_utf16()),
                }
            }
            _ => Self::default(),
        }
    }
}
