//! Positions and ranges in document coordinates.

use serde::{Deserialize, Serialize};

/// A point in the document: block index plus UTF-16 offset into that
/// block's text.
///
/// The derived ordering is document order (block index first, then offset),
/// which is exactly what range comparisons need.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub block_index: u32,
    pub offset: u32,
}

impl Position {
    pub const fn new(block_index: u32, offset: u32) -> Self {
        Self {
            block_index,
            offset,
        }
    }
}

/// Half-open span: `start` inclusive, `end` exclusive, `start <= end` in
/// document order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Range covering nothing at `pos`.
    pub const fn collapsed(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Return the range with endpoints swapped into document order.
    pub fn normalized(&self) -> Range {
        if self.start <= self.end {
            *self
        } else {
            Range {
                start: self.end,
                end: self.start,
            }
        }
    }

    /// Whether `pos` lies strictly inside the range (not on either edge).
    pub fn contains_strictly(&self, pos: Position) -> bool {
        self.start < pos && pos < self.end
    }

    pub fn spans_blocks(&self) -> bool {
        self.start.block_index != self.end.block_index
    }
}
