//! Position-transform primitives.
//!
//! Each function maps a position through the document-shape effect of one
//! concurrent operation. The per-variant transform in `transform.rs` is
//! assembled entirely from these plus the scalar index rules.

use vellum_model::{Position, Range};

/// Map `pos` through an insert of `len` UTF-16 units at `ins`.
///
/// `shift_on_tie` decides the `pos == ins` case: true means the insert
/// lands before `pos` (the insert has priority).
pub fn pos_vs_insert_text(pos: Position, ins: Position, len: u32, shift_on_tie: bool) -> Position {
    if pos.block_index != ins.block_index {
        return pos;
    }
    if pos.offset > ins.offset || (pos.offset == ins.offset && shift_on_tie) {
        Position::new(pos.block_index, pos.offset.saturating_add(len))
    } else {
        pos
    }
}

/// Map `pos` through a deletion of `range` (normalized, non-empty).
///
/// Positions at or before the start are unchanged, positions strictly
/// inside collapse to the start, and positions at or after the end shift
/// left — across blocks when the range spans blocks.
pub fn pos_vs_delete(pos: Position, range: Range) -> Position {
    if pos <= range.start {
        return pos;
    }
    if pos < range.end {
        return range.start;
    }
    let removed_blocks = range.end.block_index - range.start.block_index;
    if pos.block_index == range.end.block_index {
        Position::new(
            range.start.block_index,
            range.start.offset.saturating_add(pos.offset - range.end.offset),
        )
    } else {
        Position::new(pos.block_index - removed_blocks, pos.offset)
    }
}

/// Map `pos` through a block split at `split`.
///
/// `move_on_tie` decides the `pos.offset == split.offset` case: true moves
/// the position into the new tail block (the split has priority).
pub fn pos_vs_split(pos: Position, split: Position, move_on_tie: bool) -> Position {
    if pos.block_index < split.block_index {
        return pos;
    }
    if pos.block_index > split.block_index {
        return Position::new(pos.block_index.saturating_add(1), pos.offset);
    }
    if pos.offset > split.offset || (pos.offset == split.offset && move_on_tie) {
        Position::new(pos.block_index.saturating_add(1), pos.offset - split.offset)
    } else {
        pos
    }
}

/// Map `pos` through `merge_block(merge_idx)`. `join_offset` is the length
/// of block `merge_idx - 1` in the merge's base state (from [`crate::OpContext`]).
pub fn pos_vs_merge(pos: Position, merge_idx: u32, join_offset: u32) -> Position {
    if merge_idx == 0 || pos.block_index < merge_idx {
        return pos;
    }
    if pos.block_index == merge_idx {
        Position::new(merge_idx - 1, join_offset.saturating_add(pos.offset))
    } else {
        Position::new(pos.block_index - 1, pos.offset)
    }
}

/// Map `pos` through `insert_block(after)`.
pub fn pos_vs_insert_block(pos: Position, after: i32) -> Position {
    if (pos.block_index as i64) > after as i64 {
        Position::new(pos.block_index.saturating_add(1), pos.offset)
    } else {
        pos
    }
}

/// Map `pos` through `delete_block(idx)`. A position on the deleted block
/// lands at the start of the block that now occupies its index; whether
/// that is the right outcome for the *operation* carrying the position is
/// the caller's decision (inserts into a deleted block die instead).
pub fn pos_vs_delete_block(pos: Position, idx: u32) -> Position {
    if pos.block_index < idx {
        pos
    } else if pos.block_index == idx {
        Position::new(idx, 0)
    } else {
        Position::new(pos.block_index - 1, pos.offset)
    }
}
