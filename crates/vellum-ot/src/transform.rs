//! The per-variant transform.
//!
//! `transform_one(op, against, ctx, against_priority)` rewrites `op` so it
//! carries the same intent after `against` has been applied. Coordinates go
//! through the primitives in `primitives.rs`; the variant-specific rules
//! live here:
//!
//! - insert/insert and split ties resolve by priority;
//! - an insert strictly inside a concurrent delete is swallowed;
//! - attribute setters on the same block adopt the priority value;
//! - a delete_block whose target was concurrently split or merged turns
//!   into a delete_text over where that text ended up (using the captured
//!   [`OpContext`]);
//! - operations whose target block identity no longer exists die.

use tracing::debug;
use vellum_model::text::utf16_len;
use vellum_model::{Document, Operation, Position, Range};

use crate::context::OpContext;
use crate::primitives::{
    pos_vs_delete, pos_vs_delete_block, pos_vs_insert_block, pos_vs_insert_text, pos_vs_merge,
    pos_vs_split,
};

/// Index a killed operation is retargeted to; always out of range, so
/// `apply` ignores the op.
pub const DEAD_INDEX: u32 = u32::MAX;

const DEAD_POSITION: Position = Position::new(DEAD_INDEX, 0);

/// Transform concurrent `a` and `b` (both based on `base`) into `(a', b')`
/// with `a` carrying priority, such that
/// `apply(apply(base, a), b') == apply(apply(base, b), a')`.
pub fn transform_pair(a: &Operation, b: &Operation, base: &Document) -> (Operation, Operation) {
    let ctx_a = OpContext::capture(base, a);
    let ctx_b = OpContext::capture(base, b);
    (
        transform_one(a, b, ctx_b, false),
        transform_one(b, a, ctx_a, true),
    )
}

/// Rebase `op` over an already-applied `prior`. The prior op has priority;
/// this is the second component of `transform_pair(prior, op)` and is what
/// the room uses to replay an incoming op against its history.
pub fn transform_single(op: &Operation, prior: &Operation, prior_ctx: OpContext) -> Operation {
    transform_one(op, prior, prior_ctx, true)
}

/// How an index travels through a concurrent shape change. The role
/// matters because "the block after me" (an insert anchor) and "the block
/// that is me" (an attribute target) react differently when blocks vanish.
#[derive(Clone, Copy, PartialEq, Eq)]
enum IdxRole {
    /// change_block_type / alignment / indent / image / spacing / table.
    Attr,
    /// merge_block's own index (dies when its pair is broken).
    Merge,
    /// delete_block's own index.
    DeleteBlk,
}

fn transform_one(
    op: &Operation,
    against: &Operation,
    ctx: OpContext,
    against_priority: bool,
) -> Operation {
    if op.is_noop() || against.is_noop() {
        return op.clone();
    }

    match op {
        Operation::InsertText { position, text } => {
            if let Operation::DeleteText { range } = against {
                let r = range.normalized();
                if r.contains_strictly(*position) {
                    // Swallowed: degrade to a zero-length insert at the
                    // collapse point so both paths agree the text is gone.
                    return Operation::InsertText {
                        position: r.start,
                        text: String::new(),
                    };
                }
            }
            match map_point(*position, against, ctx, against_priority) {
                Some(p) => Operation::InsertText {
                    position: p,
                    text: text.clone(),
                },
                None => Operation::InsertText {
                    position: DEAD_POSITION,
                    text: String::new(),
                },
            }
        }

        Operation::SplitBlock { position } => {
            match map_point(*position, against, ctx, against_priority) {
                Some(p) => Operation::SplitBlock { position: p },
                None => Operation::SplitBlock {
                    position: DEAD_POSITION,
                },
            }
        }

        Operation::DeleteText { range } => Operation::DeleteText {
            range: map_range(*range, against, ctx, true),
        },

        Operation::ApplyFormatting { range, style } => Operation::ApplyFormatting {
            range: map_range(*range, against, ctx, false),
            style: formatting_style(style, *range, against, against_priority),
        },

        Operation::RemoveFormatting { range, style } => Operation::RemoveFormatting {
            range: map_range(*range, against, ctx, false),
            style: formatting_style(style, *range, against, against_priority),
        },

        Operation::MergeBlock { block_index } => {
            match map_index(*block_index, against, IdxRole::Merge) {
                Some(i) if i >= 1 => Operation::MergeBlock { block_index: i },
                _ => Operation::MergeBlock { block_index: 0 },
            }
        }

        Operation::DeleteBlock { block_index } => {
            transform_delete_block(*block_index, against, ctx)
        }

        Operation::InsertBlock {
            after_block_index,
            block_type,
        } => {
            if let Operation::InsertBlock {
                after_block_index: other_after,
                ..
            } = against
            {
                if other_after == after_block_index {
                    // Priority goes first; the other anchors after it.
                    let after = if against_priority {
                        after_block_index.saturating_add(1)
                    } else {
                        *after_block_index
                    };
                    return Operation::InsertBlock {
                        after_block_index: after,
                        block_type: *block_type,
                    };
                }
            }
            match map_after_index(*after_block_index, against) {
                Some(after) => Operation::InsertBlock {
                    after_block_index: after,
                    block_type: *block_type,
                },
                None => Operation::InsertBlock {
                    after_block_index: i32::MAX,
                    block_type: *block_type,
                },
            }
        }

        Operation::ChangeBlockType {
            block_index,
            new_type,
        } => {
            let mut value = *new_type;
            if against_priority {
                if let Operation::ChangeBlockType {
                    block_index: other,
                    new_type: winner,
                } = against
                {
                    if other == block_index {
                        value = *winner;
                    }
                }
            }
            Operation::ChangeBlockType {
                block_index: map_attr_index(*block_index, against),
                new_type: value,
            }
        }

        Operation::ChangeBlockAlignment {
            block_index,
            new_alignment,
        } => {
            let mut value = *new_alignment;
            if against_priority {
                if let Operation::ChangeBlockAlignment {
                    block_index: other,
                    new_alignment: winner,
                } = against
                {
                    if other == block_index {
                        value = *winner;
                    }
                }
            }
            Operation::ChangeBlockAlignment {
                block_index: map_attr_index(*block_index, against),
                new_alignment: value,
            }
        }

        Operation::SetIndent {
            block_index,
            indent_level,
        } => {
            let mut value = *indent_level;
            if against_priority {
                if let Operation::SetIndent {
                    block_index: other,
                    indent_level: winner,
                } = against
                {
                    if other == block_index {
                        value = *winner;
                    }
                }
            }
            Operation::SetIndent {
                block_index: map_attr_index(*block_index, against),
                indent_level: value,
            }
        }

        Operation::SetImage {
            block_index,
            image_url,
        } => {
            let mut value = image_url.clone();
            if against_priority {
                if let Operation::SetImage {
                    block_index: other,
                    image_url: winner,
                } = against
                {
                    if other == block_index {
                        value = winner.clone();
                    }
                }
            }
            Operation::SetImage {
                block_index: map_attr_index(*block_index, against),
                image_url: value,
            }
        }

        Operation::SetLineSpacing {
            block_index,
            line_spacing,
        } => {
            let mut value = *line_spacing;
            if against_priority {
                if let Operation::SetLineSpacing {
                    block_index: other,
                    line_spacing: winner,
                } = against
                {
                    if other == block_index {
                        value = *winner;
                    }
                }
            }
            Operation::SetLineSpacing {
                block_index: map_attr_index(*block_index, against),
                line_spacing: value,
            }
        }

        Operation::SetTableData {
            block_index,
            table_data,
        } => {
            let mut value = table_data.clone();
            if against_priority {
                if let Operation::SetTableData {
                    block_index: other,
                    table_data: winner,
                } = against
                {
                    if other == block_index {
                        value = winner.clone();
                    }
                }
            }
            Operation::SetTableData {
                block_index: map_attr_index(*block_index, against),
                table_data: value,
            }
        }
    }
}

/// Map a point position (insert_text, split_block) through `against`.
/// `None` means the target block's identity is gone and the op must die.
fn map_point(
    pos: Position,
    against: &Operation,
    ctx: OpContext,
    against_priority: bool,
) -> Option<Position> {
    match against {
        Operation::InsertText { position, text } => Some(pos_vs_insert_text(
            pos,
            *position,
            utf16_len(text),
            against_priority,
        )),
        Operation::DeleteText { range } => Some(pos_vs_delete(pos, range.normalized())),
        Operation::SplitBlock { position } => {
            Some(pos_vs_split(pos, *position, against_priority))
        }
        Operation::MergeBlock { block_index } => Some(pos_vs_merge(
            pos,
            *block_index,
            ctx.join_offset.unwrap_or(0),
        )),
        Operation::InsertBlock {
            after_block_index, ..
        } => Some(pos_vs_insert_block(pos, *after_block_index)),
        Operation::DeleteBlock { block_index } => {
            if pos.block_index == *block_index {
                None
            } else {
                Some(pos_vs_delete_block(pos, *block_index))
            }
        }
        _ => Some(pos),
    }
}

/// Map a range (delete_text, formatting) through `against`. `is_delete`
/// selects the tie rule against a concurrent insert: a delete's start
/// steps over an insert at its start boundary (the insert survives), a
/// formatting range absorbs it (matching right-biased style inheritance).
fn map_range(range: Range, against: &Operation, ctx: OpContext, is_delete: bool) -> Range {
    let r = range.normalized();
    if r.is_empty() {
        return r;
    }
    let (start, end) = match against {
        Operation::InsertText { position, text } => {
            let len = utf16_len(text);
            (
                pos_vs_insert_text(r.start, *position, len, is_delete),
                pos_vs_insert_text(r.end, *position, len, false),
            )
        }
        Operation::DeleteText { range: other } => {
            let o = other.normalized();
            (pos_vs_delete(r.start, o), pos_vs_delete(r.end, o))
        }
        Operation::SplitBlock { position } => (
            pos_vs_split(r.start, *position, true),
            pos_vs_split(r.end, *position, false),
        ),
        Operation::MergeBlock { block_index } => {
            let join = ctx.join_offset.unwrap_or(0);
            (
                pos_vs_merge(r.start, *block_index, join),
                pos_vs_merge(r.end, *block_index, join),
            )
        }
        Operation::InsertBlock {
            after_block_index, ..
        } => (
            pos_vs_insert_block(r.start, *after_block_index),
            pos_vs_insert_block(r.end, *after_block_index),
        ),
        Operation::DeleteBlock { block_index } => {
            let d = *block_index;
            if r.start.block_index == d && r.end.block_index == d {
                // Entirely inside the deleted block: nothing left to touch.
                let p = Position::new(d, 0);
                (p, p)
            } else if r.end.block_index == d {
                // The covered part of the deleted block is gone; the range
                // now runs to the end of the block above (apply clamps).
                (
                    pos_vs_delete_block(r.start, d),
                    Position::new(d.saturating_sub(1), u32::MAX),
                )
            } else {
                (
                    pos_vs_delete_block(r.start, d),
                    pos_vs_delete_block(r.end, d),
                )
            }
        }
        _ => (r.start, r.end),
    };
    let mut out = Range::new(start, end);
    if out.start > out.end {
        out.end = out.start;
    }
    out
}

/// The formatting-conflict policy: when two formatting ops overlap and name
/// a common attribute, the non-priority side drops the contested keys.
fn formatting_style(
    style: &vellum_model::TextStyle,
    range: Range,
    against: &Operation,
    against_priority: bool,
) -> vellum_model::TextStyle {
    let mut style = style.clone();
    if !against_priority {
        return style;
    }
    let (other_range, other_style) = match against {
        Operation::ApplyFormatting { range, style } | Operation::RemoveFormatting { range, style } => {
            (range.normalized(), style)
        }
        _ => return style,
    };
    let mine = range.normalized();
    let overlaps = !mine.is_empty()
        && !other_range.is_empty()
        && mine.start < other_range.end
        && other_range.start < mine.end;
    if overlaps && style.names_common_attr(other_style) {
        style.clear_named(other_style);
    }
    style
}

/// Scalar index transform for ops that target a block by index.
fn map_index(idx: u32, against: &Operation, role: IdxRole) -> Option<u32> {
    match against {
        Operation::DeleteText { range } => {
            let o = range.normalized();
            if !o.spans_blocks() {
                return Some(idx);
            }
            let sb = o.start.block_index;
            let eb = o.end.block_index;
            if idx <= sb {
                Some(idx)
            } else if idx > eb {
                Some(idx - (eb - sb))
            } else {
                // The block's identity was consumed by the deletion.
                None
            }
        }
        Operation::SplitBlock { position } => {
            if idx > position.block_index {
                Some(idx.saturating_add(1))
            } else {
                Some(idx)
            }
        }
        Operation::MergeBlock { block_index: m } => {
            if idx < *m {
                Some(idx)
            } else if idx == *m {
                None
            } else {
                Some(idx - 1)
            }
        }
        Operation::InsertBlock {
            after_block_index, ..
        } => {
            if (idx as i64) > *after_block_index as i64 {
                Some(idx.saturating_add(1))
            } else {
                Some(idx)
            }
        }
        Operation::DeleteBlock { block_index: d } => {
            if idx < *d {
                Some(idx)
            } else if idx == *d {
                None
            } else if role == IdxRole::Merge && idx == d.saturating_add(1) {
                // Merging into a deleted block: the pair is broken.
                None
            } else {
                Some(idx - 1)
            }
        }
        _ => Some(idx),
    }
}

fn map_attr_index(idx: u32, against: &Operation) -> u32 {
    map_index(idx, against, IdxRole::Attr).unwrap_or(DEAD_INDEX)
}

/// Transform insert_block's anchor ("the block I insert after"; `-1` is
/// the document top). `None` means the slot the new block would occupy was
/// consumed by a concurrent multi-block deletion.
fn map_after_index(after: i32, against: &Operation) -> Option<i32> {
    if after < 0 {
        return Some(after);
    }
    let a = after as u32;
    match against {
        Operation::DeleteText { range } => {
            let o = range.normalized();
            if !o.spans_blocks() {
                return Some(after);
            }
            let sb = o.start.block_index;
            let eb = o.end.block_index;
            if a < sb {
                Some(after)
            } else if a < eb {
                // The new block would land among the removed ones.
                None
            } else if a == eb {
                // The anchor's tail was merged into the start block.
                Some(sb as i32)
            } else {
                Some(after - (eb - sb) as i32)
            }
        }
        Operation::SplitBlock { position } => {
            // "After block i" means after its tail once i is split.
            if a >= position.block_index {
                Some(after + 1)
            } else {
                Some(after)
            }
        }
        Operation::MergeBlock { block_index: m } => {
            if a.saturating_add(1) <= *m {
                Some(after)
            } else if a == *m {
                Some(*m as i32 - 1)
            } else {
                Some(after - 1)
            }
        }
        Operation::InsertBlock {
            after_block_index: other,
            ..
        } => {
            // Equal anchors are resolved by the tie rule upstream.
            if after > *other {
                Some(after + 1)
            } else {
                Some(after)
            }
        }
        Operation::DeleteBlock { block_index: d } => {
            if a < *d {
                Some(after)
            } else {
                // Anchor gone or shifted: fall back one slot (possibly to
                // the document top).
                Some(after - 1)
            }
        }
        _ => Some(after),
    }
}

/// Transform delete_block. When the target was concurrently split or
/// merged its text lives on in a known place, so the delete follows it as
/// a delete_text; when the target's identity is simply gone, the delete
/// dies.
fn transform_delete_block(idx: u32, against: &Operation, ctx: OpContext) -> Operation {
    match against {
        Operation::SplitBlock { position } if position.block_index == idx => {
            // The block was split in two; delete both halves' text. One
            // empty block remains where the pair stood.
            let Some(len) = ctx.block_len else {
                return Operation::DeleteBlock {
                    block_index: DEAD_INDEX,
                };
            };
            let tail = len.saturating_sub(position.offset.min(len));
            debug!(block = idx, "delete_block follows a concurrent split");
            return Operation::DeleteText {
                range: Range::new(
                    Position::new(idx, 0),
                    Position::new(idx.saturating_add(1), tail),
                ),
            };
        }
        Operation::MergeBlock { block_index: m } if *m != 0 && (idx == *m || idx + 1 == *m) => {
            let (Some(join), Some(merged_len)) = (ctx.join_offset, ctx.block_len) else {
                return Operation::DeleteBlock {
                    block_index: DEAD_INDEX,
                };
            };
            let range = if idx == *m {
                // Deleting the merged-away block: its text now sits after
                // the join point.
                Range::new(
                    Position::new(m - 1, join),
                    Position::new(m - 1, join.saturating_add(merged_len)),
                )
            } else {
                // Deleting the block that was merged into: its original
                // text is the part before the join point.
                Range::new(Position::new(m - 1, 0), Position::new(m - 1, join))
            };
            debug!(block = idx, "delete_block follows a concurrent merge");
            return Operation::DeleteText { range };
        }
        Operation::DeleteText { range } => {
            let o = range.normalized();
            if o.spans_blocks() {
                let sb = o.start.block_index;
                let eb = o.end.block_index;
                if idx == sb {
                    // The target survives holding its own head plus the end
                    // block's tail; delete only what was originally ours.
                    return Operation::DeleteText {
                        range: Range::new(Position::new(sb, 0), Position::new(sb, o.start.offset)),
                    };
                }
                if idx == eb {
                    // The target's tail was merged into the start block.
                    let Some(end_len) = ctx.block_len else {
                        return Operation::DeleteBlock {
                            block_index: DEAD_INDEX,
                        };
                    };
                    let tail = end_len.saturating_sub(o.end.offset.min(end_len));
                    return Operation::DeleteText {
                        range: Range::new(
                            Position::new(sb, o.start.offset),
                            Position::new(sb, o.start.offset.saturating_add(tail)),
                        ),
                    };
                }
            }
        }
        _ => {}
    }
    match map_index(idx, against, IdxRole::DeleteBlk) {
        Some(i) => Operation::DeleteBlock { block_index: i },
        None => Operation::DeleteBlock {
            block_index: DEAD_INDEX,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_model::{apply, TextStyle};

    fn p(b: u32, o: u32) -> Position {
        Position::new(b, o)
    }

    fn ins(b: u32, o: u32, text: &str) -> Operation {
        Operation::InsertText {
            position: p(b, o),
            text: text.into(),
        }
    }

    fn del(s: (u32, u32), e: (u32, u32)) -> Operation {
        Operation::DeleteText {
            range: Range::new(p(s.0, s.1), p(e.0, e.1)),
        }
    }

    fn bold() -> TextStyle {
        TextStyle {
            bold: Some(true),
            ..Default::default()
        }
    }

    // ── transform_single is the second pair component ───────────────────

    #[test]
    fn test_transform_single_matches_pair() {
        let base = Document::with_text("d", "t", "Hello");
        let prior = ins(0, 1, "AA");
        let op = ins(0, 1, "B");
        let ctx = OpContext::capture(&base, &prior);
        let (_, second) = transform_pair(&prior, &op, &base);
        assert_eq!(transform_single(&op, &prior, ctx), second);
    }

    // ── insert vs delete boundaries ─────────────────────────────────────

    #[test]
    fn test_insert_strictly_inside_delete_is_swallowed() {
        let out = transform_single(&ins(0, 2, "Z"), &del((0, 1), (0, 4)), OpContext::default());
        assert_eq!(out, ins(0, 1, ""));
        assert!(out.is_noop());
    }

    #[test]
    fn test_insert_at_delete_start_survives() {
        let out = transform_single(&ins(0, 1, "Z"), &del((0, 1), (0, 4)), OpContext::default());
        assert_eq!(out, ins(0, 1, "Z"));
    }

    #[test]
    fn test_insert_at_delete_end_survives_at_collapse_point() {
        let out = transform_single(&ins(0, 4, "Z"), &del((0, 1), (0, 4)), OpContext::default());
        assert_eq!(out, ins(0, 1, "Z"));
    }

    #[test]
    fn test_delete_expands_over_interior_insert_only() {
        // Insert strictly inside: the delete grows to cover it.
        let (_, d1) = transform_pair(&ins(0, 2, "ZZ"), &del((0, 1), (0, 4)), &base5());
        assert_eq!(
            d1,
            Operation::DeleteText {
                range: Range::new(p(0, 1), p(0, 6))
            }
        );
        // Insert at the end boundary: the delete does not grow.
        let (_, d2) = transform_pair(&ins(0, 4, "ZZ"), &del((0, 1), (0, 4)), &base5());
        assert_eq!(
            d2,
            Operation::DeleteText {
                range: Range::new(p(0, 1), p(0, 4))
            }
        );
    }

    fn base5() -> Document {
        Document::with_text("d", "t", "abcde")
    }

    // ── attribute adoption ──────────────────────────────────────────────

    #[test]
    fn test_same_block_setter_adopts_priority_value() {
        let winner = Operation::SetIndent {
            block_index: 0,
            indent_level: 4,
        };
        let loser = Operation::SetIndent {
            block_index: 0,
            indent_level: 7,
        };
        let out = transform_single(&loser, &winner, OpContext::default());
        assert_eq!(
            out,
            Operation::SetIndent {
                block_index: 0,
                indent_level: 4
            }
        );
        // Without priority on the other side, the value is kept.
        let (kept, _) = transform_pair(&loser, &winner, &base5());
        assert_eq!(
            kept,
            Operation::SetIndent {
                block_index: 0,
                indent_level: 7
            }
        );
    }

    // ── killed operations ───────────────────────────────────────────────

    #[test]
    fn test_ops_targeting_deleted_block_die() {
        let db = Operation::DeleteBlock { block_index: 1 };
        let ctx = OpContext::default();
        assert!(transform_single(&ins(1, 0, "x"), &db, ctx).is_noop());
        assert!(transform_single(
            &Operation::SplitBlock { position: p(1, 0) },
            &db,
            ctx
        )
        .is_noop());
        assert!(transform_single(
            &Operation::ChangeBlockAlignment {
                block_index: 1,
                new_alignment: vellum_model::Alignment::Center,
            },
            &db,
            ctx
        )
        .is_noop());
        assert!(transform_single(&db, &db, ctx).is_noop());
    }

    #[test]
    fn test_merge_into_deleted_block_dies() {
        let out = transform_single(
            &Operation::MergeBlock { block_index: 2 },
            &Operation::DeleteBlock { block_index: 1 },
            OpContext::default(),
        );
        assert!(out.is_noop());
    }

    #[test]
    fn test_second_merge_of_same_pair_dies() {
        let m = Operation::MergeBlock { block_index: 1 };
        let out = transform_single(&m, &m, OpContext::default());
        assert_eq!(out, Operation::MergeBlock { block_index: 0 });
    }

    // ── delete_block follows its text ───────────────────────────────────

    #[test]
    fn test_delete_block_follows_merged_away_text() {
        // Block 1 ("World") was merged into block 0 ("Hello"); deleting
        // block 1 becomes deleting its text inside the merged block.
        let base = Document::with_paragraphs("d", "t", &["Hello", "World"]);
        let merge = Operation::MergeBlock { block_index: 1 };
        let ctx = OpContext::capture(&base, &merge);
        let out = transform_single(&Operation::DeleteBlock { block_index: 1 }, &merge, ctx);
        assert_eq!(
            out,
            Operation::DeleteText {
                range: Range::new(p(0, 5), p(0, 10))
            }
        );
        let merged = apply(&base, &merge);
        assert_eq!(apply(&merged, &out).block_text(0).unwrap(), "Hello");
    }

    #[test]
    fn test_delete_block_follows_split_halves() {
        let base = Document::with_text("d", "t", "abcdef");
        let split = Operation::SplitBlock { position: p(0, 2) };
        let ctx = OpContext::capture(&base, &split);
        let out = transform_single(&Operation::DeleteBlock { block_index: 0 }, &split, ctx);
        assert_eq!(
            out,
            Operation::DeleteText {
                range: Range::new(p(0, 0), p(1, 4))
            }
        );
        let split_doc = apply(&base, &split);
        let after = apply(&split_doc, &out);
        assert_eq!(after.block_count(), 1);
        assert_eq!(after.block_text(0).unwrap(), "");
    }

    // ── formatting conflict policy ──────────────────────────────────────

    #[test]
    fn test_overlapping_formatting_drops_contested_attrs() {
        let winner = Operation::ApplyFormatting {
            range: Range::new(p(0, 0), p(0, 4)),
            style: bold(),
        };
        let loser = Operation::ApplyFormatting {
            range: Range::new(p(0, 2), p(0, 6)),
            style: TextStyle {
                bold: Some(false),
                italic: Some(true),
                ..Default::default()
            },
        };
        let out = transform_single(&loser, &winner, OpContext::default());
        let Operation::ApplyFormatting { style, .. } = out else {
            panic!("variant changed");
        };
        assert!(style.bold.is_none());
        assert_eq!(style.italic, Some(true));
    }

    #[test]
    fn test_disjoint_formatting_keeps_attrs() {
        let a = Operation::ApplyFormatting {
            range: Range::new(p(0, 0), p(0, 2)),
            style: bold(),
        };
        let b = Operation::ApplyFormatting {
            range: Range::new(p(0, 4), p(0, 6)),
            style: TextStyle {
                bold: Some(false),
                ..Default::default()
            },
        };
        let out = transform_single(&b, &a, OpContext::default());
        let Operation::ApplyFormatting { style, .. } = out else {
            panic!("variant changed");
        };
        assert_eq!(style.bold, Some(false));
    }
}
