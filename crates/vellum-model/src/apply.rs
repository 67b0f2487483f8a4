//! The pure apply function.
//!
//! `apply(doc, op)` returns a new document; the input is never observably
//! changed and the same inputs always produce the same output. There is no
//! error path: out-of-range indices and malformed operations yield the
//! document unchanged, which is what lets the transform engine kill an
//! operation by pushing its target out of range.

use crate::block::{table_data_is_valid, Block, BlockType, MAX_INDENT_LEVEL};
use crate::document::Document;
use crate::op::Operation;
use crate::run::{
    apply_to_style_range, delete_in_runs, insert_in_runs, normalize_runs, split_runs_at,
};
use crate::style::TextStyle;

/// Apply one operation to a document, producing the next document.
pub fn apply(doc: &Document, op: &Operation) -> Document {
    let mut next = doc.clone();
    match op {
        Operation::InsertText { position, text } => {
            if text.is_empty() {
                return next;
            }
            let Some(block) = next.blocks.get_mut(position.block_index as usize) else {
                return next;
            };
            let offset = position.offset.min(block.len_utf16());
            insert_in_runs(&mut block.runs, offset, text);
        }

        Operation::DeleteText { range } => {
            let range = range.normalized();
            if range.is_empty() {
                return next;
            }
            let si = range.start.block_index as usize;
            let ei = range.end.block_index as usize;
            if si >= next.blocks.len() || ei >= next.blocks.len() {
                return next;
            }
            if si == ei {
                let block = &mut next.blocks[si];
                let len = block.len_utf16();
                delete_in_runs(
                    &mut block.runs,
                    range.start.offset.min(len),
                    range.end.offset.min(len),
                );
            } else {
                // Keep the head of the start block, append the tail of the
                // end block, then drop everything in between.
                let (keep, _) = split_runs_at(
                    &next.blocks[si].runs,
                    range.start.offset.min(next.blocks[si].len_utf16()),
                );
                let (_, tail) = split_runs_at(
                    &next.blocks[ei].runs,
                    range.end.offset.min(next.blocks[ei].len_utf16()),
                );
                let start_block = &mut next.blocks[si];
                start_block.runs = keep;
                start_block.runs.extend(tail);
                normalize_runs(&mut start_block.runs);
                next.blocks.drain(si + 1..=ei);
            }
        }

        Operation::ApplyFormatting { range, style } => {
            format_range(&mut next, range, |s| s.merge(style));
        }

        Operation::RemoveFormatting { range, style } => {
            format_range(&mut next, range, |s| s.clear_named(style));
        }

        Operation::SplitBlock { position } => {
            let idx = position.block_index as usize;
            let Some(origin) = next.blocks.get_mut(idx) else {
                return next;
            };
            let offset = position.offset.min(origin.len_utf16());
            let (head, tail) = split_runs_at(&origin.runs, offset);
            origin.runs = head;
            normalize_runs(&mut origin.runs);

            // Enter in a heading yields a body paragraph: the new block
            // never inherits the origin's type, only its presentation.
            let mut new_block = Block::paragraph();
            new_block.alignment = origin.alignment;
            new_block.indent_level = origin.indent_level;
            new_block.line_spacing = origin.line_spacing;
            new_block.runs = tail;
            normalize_runs(&mut new_block.runs);
            next.blocks.insert(idx + 1, new_block);
        }

        Operation::MergeBlock { block_index } => {
            let idx = *block_index as usize;
            if idx == 0 || idx >= next.blocks.len() {
                return next;
            }
            let removed = next.blocks.remove(idx);
            let prev = &mut next.blocks[idx - 1];
            prev.runs.extend(removed.runs);
            normalize_runs(&mut prev.runs);
        }

        Operation::ChangeBlockType {
            block_index,
            new_type,
        } => {
            let Some(block) = next.blocks.get_mut(*block_index as usize) else {
                return next;
            };
            block.block_type = *new_type;
            if *new_type == BlockType::Table && block.table_data.is_none() {
                block.table_data = Some(crate::block::default_table_data());
            }
        }

        Operation::ChangeBlockAlignment {
            block_index,
            new_alignment,
        } => {
            if let Some(block) = next.blocks.get_mut(*block_index as usize) {
                block.alignment = *new_alignment;
            }
        }

        Operation::InsertBlock {
            after_block_index,
            block_type,
        } => {
            let at = *after_block_index as i64 + 1;
            if at < 0 || at as usize > next.blocks.len() {
                return next;
            }
            next.blocks.insert(at as usize, Block::new(*block_type));
        }

        Operation::SetIndent {
            block_index,
            indent_level,
        } => {
            if let Some(block) = next.blocks.get_mut(*block_index as usize) {
                block.indent_level = (*indent_level).min(MAX_INDENT_LEVEL);
            }
        }

        Operation::SetImage {
            block_index,
            image_url,
        } => {
            if let Some(block) = next.blocks.get_mut(*block_index as usize) {
                if block.block_type == BlockType::Image {
                    block.image_url = Some(image_url.clone());
                }
            }
        }

        Operation::SetLineSpacing {
            block_index,
            line_spacing,
        } => {
            if let Some(block) = next.blocks.get_mut(*block_index as usize) {
                block.line_spacing = Some(*line_spacing);
            }
        }

        Operation::DeleteBlock { block_index } => {
            let idx = *block_index as usize;
            if idx >= next.blocks.len() {
                return next;
            }
            if next.blocks.len() == 1 {
                next.blocks[0] = Block::paragraph();
            } else {
                next.blocks.remove(idx);
            }
        }

        Operation::SetTableData {
            block_index,
            table_data,
        } => {
            let Some(block) = next.blocks.get_mut(*block_index as usize) else {
                return next;
            };
            if block.block_type != BlockType::Table || !table_data_is_valid(table_data) {
                return next;
            }
            let mut data = table_data.clone();
            for cell in data.iter_mut().flatten() {
                normalize_runs(&mut cell.runs);
            }
            block.table_data = Some(data);
        }
    }
    next
}

/// Visit every block a range touches and rewrite styles over the covered
/// sub-range of each.
fn format_range(doc: &mut Document, range: &crate::Range, transform: impl Fn(&mut TextStyle)) {
    let range = range.normalized();
    if range.is_empty() {
        return;
    }
    let si = range.start.block_index as usize;
    let ei = range.end.block_index as usize;
    if si >= doc.blocks.len() || ei >= doc.blocks.len() {
        return;
    }
    for idx in si..=ei {
        let block = &mut doc.blocks[idx];
        let len = block.len_utf16();
        let from = if idx == si {
            range.start.offset.min(len)
        } else {
            0
        };
        let to = if idx == ei { range.end.offset.min(len) } else { len };
        apply_to_style_range(&mut block.runs, from, to, &transform);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Alignment, TableCell};
    use crate::position::{Position, Range};
    use crate::run::TextRun;

    fn doc(texts: &[&str]) -> Document {
        Document::with_paragraphs("d1", "T", texts)
    }

    fn bold() -> TextStyle {
        TextStyle {
            bold: Some(true),
            ..Default::default()
        }
    }

    fn insert(block: u32, offset: u32, text: &str) -> Operation {
        Operation::InsertText {
            position: Position::new(block, offset),
            text: text.into(),
        }
    }

    fn delete(start: (u32, u32), end: (u32, u32)) -> Operation {
        Operation::DeleteText {
            range: Range::new(
                Position::new(start.0, start.1),
                Position::new(end.0, end.1),
            ),
        }
    }

    // ── insert_text ─────────────────────────────────────────────────────

    #[test]
    fn test_insert_text_basic() {
        let d = apply(&doc(&["Hello"]), &insert(0, 5, " World"));
        assert_eq!(d.block_text(0).unwrap(), "Hello World");
    }

    #[test]
    fn test_insert_text_is_pure() {
        let base = doc(&["Hello"]);
        let _ = apply(&base, &insert(0, 0, "X"));
        assert_eq!(base.block_text(0).unwrap(), "Hello");
    }

    #[test]
    fn test_insert_text_out_of_range_block_is_noop() {
        let base = doc(&["Hello"]);
        let d = apply(&base, &insert(5, 0, "X"));
        assert!(d.content_eq(&base));
    }

    #[test]
    fn test_insert_text_offset_clamps_to_end() {
        let d = apply(&doc(&["ab"]), &insert(0, 99, "X"));
        assert_eq!(d.block_text(0).unwrap(), "abX");
    }

    #[test]
    fn test_insert_text_inherits_bold_inside_bold_run() {
        let mut base = doc(&["ab"]);
        base.blocks[0].runs = vec![TextRun::new("ab", bold())];
        let d = apply(&base, &insert(0, 1, "X"));
        assert_eq!(d.blocks[0].runs.len(), 1);
        assert!(d.blocks[0].runs[0].style.same_as(&bold()));
        assert_eq!(d.blocks[0].runs[0].text, "aXb");
    }

    // ── delete_text ─────────────────────────────────────────────────────

    #[test]
    fn test_delete_text_same_block() {
        let d = apply(&doc(&["Hello World"]), &delete((0, 5), (0, 11)));
        assert_eq!(d.block_text(0).unwrap(), "Hello");
    }

    #[test]
    fn test_delete_text_whole_block_restores_sentinel() {
        let d = apply(&doc(&["Hello"]), &delete((0, 0), (0, 5)));
        assert_eq!(d.blocks[0].runs, vec![TextRun::sentinel()]);
    }

    #[test]
    fn test_delete_text_multi_block() {
        let d = apply(&doc(&["Hello", "middle", "World"]), &delete((0, 3), (2, 2)));
        assert_eq!(d.block_count(), 1);
        assert_eq!(d.block_text(0).unwrap(), "Helrld");
    }

    #[test]
    fn test_delete_text_multi_block_keeps_start_block_metadata() {
        let mut base = doc(&["Hello", "World"]);
        base.blocks[0].block_type = BlockType::Heading1;
        base.blocks[0].alignment = Alignment::Center;
        let d = apply(&base, &delete((0, 2), (1, 3)));
        assert_eq!(d.block_count(), 1);
        assert_eq!(d.blocks[0].block_type, BlockType::Heading1);
        assert_eq!(d.blocks[0].alignment, Alignment::Center);
        assert_eq!(d.block_text(0).unwrap(), "Held");
    }

    #[test]
    fn test_delete_text_backwards_range_normalizes() {
        let d = apply(&doc(&["Hello"]), &delete((0, 4), (0, 1)));
        assert_eq!(d.block_text(0).unwrap(), "Ho");
    }

    #[test]
    fn test_delete_text_out_of_range_end_block_is_noop() {
        let base = doc(&["Hello"]);
        let d = apply(&base, &delete((0, 0), (3, 1)));
        assert!(d.content_eq(&base));
    }

    // ── formatting ──────────────────────────────────────────────────────

    #[test]
    fn test_apply_formatting_subrange() {
        let d = apply(
            &doc(&["Hello"]),
            &Operation::ApplyFormatting {
                range: Range::new(Position::new(0, 1), Position::new(0, 3)),
                style: bold(),
            },
        );
        assert_eq!(d.blocks[0].runs.len(), 3);
        assert_eq!(d.blocks[0].runs[1].text, "el");
        assert!(d.blocks[0].runs[1].style.same_as(&bold()));
    }

    #[test]
    fn test_apply_formatting_across_blocks() {
        let d = apply(
            &doc(&["Hello", "World"]),
            &Operation::ApplyFormatting {
                range: Range::new(Position::new(0, 3), Position::new(1, 2)),
                style: bold(),
            },
        );
        assert_eq!(d.blocks[0].runs[1].text, "lo");
        assert!(d.blocks[0].runs[1].style.same_as(&bold()));
        assert_eq!(d.blocks[1].runs[0].text, "Wo");
        assert!(d.blocks[1].runs[0].style.same_as(&bold()));
    }

    #[test]
    fn test_remove_formatting_clears_named_attrs() {
        let mut base = doc(&["Hi"]);
        base.blocks[0].runs = vec![TextRun::new("Hi", bold())];
        let d = apply(
            &base,
            &Operation::RemoveFormatting {
                range: Range::new(Position::new(0, 0), Position::new(0, 2)),
                style: TextStyle {
                    bold: Some(true),
                    ..Default::default()
                },
            },
        );
        assert_eq!(d.blocks[0].runs, vec![TextRun::plain("Hi")]);
    }

    // ── split / merge ───────────────────────────────────────────────────

    #[test]
    fn test_split_block_moves_tail() {
        let d = apply(
            &doc(&["HelloWorld"]),
            &Operation::SplitBlock {
                position: Position::new(0, 5),
            },
        );
        assert_eq!(d.block_count(), 2);
        assert_eq!(d.block_text(0).unwrap(), "Hello");
        assert_eq!(d.block_text(1).unwrap(), "World");
    }

    #[test]
    fn test_split_heading_yields_paragraph_with_presentation() {
        let mut base = doc(&["Title"]);
        base.blocks[0].block_type = BlockType::Heading1;
        base.blocks[0].alignment = Alignment::Center;
        base.blocks[0].indent_level = 2;
        base.blocks[0].line_spacing = Some(1.5);
        let d = apply(
            &base,
            &Operation::SplitBlock {
                position: Position::new(0, 2),
            },
        );
        assert_eq!(d.blocks[0].block_type, BlockType::Heading1);
        assert_eq!(d.blocks[1].block_type, BlockType::Paragraph);
        assert_eq!(d.blocks[1].alignment, Alignment::Center);
        assert_eq!(d.blocks[1].indent_level, 2);
        assert_eq!(d.blocks[1].line_spacing, Some(1.5));
    }

    #[test]
    fn test_split_at_end_makes_empty_paragraph() {
        let d = apply(
            &doc(&["ab"]),
            &Operation::SplitBlock {
                position: Position::new(0, 2),
            },
        );
        assert_eq!(d.block_count(), 2);
        assert_eq!(d.blocks[1].runs, vec![TextRun::sentinel()]);
    }

    #[test]
    fn test_split_gives_new_block_a_fresh_id() {
        let d = apply(
            &doc(&["ab"]),
            &Operation::SplitBlock {
                position: Position::new(0, 1),
            },
        );
        assert_ne!(d.blocks[0].id, d.blocks[1].id);
    }

    #[test]
    fn test_merge_block_concatenates_runs() {
        let d = apply(&doc(&["Hello", "World"]), &Operation::MergeBlock { block_index: 1 });
        assert_eq!(d.block_count(), 1);
        assert_eq!(d.block_text(0).unwrap(), "HelloWorld");
    }

    #[test]
    fn test_merge_block_keeps_previous_metadata() {
        let mut base = doc(&["a", "b"]);
        base.blocks[0].block_type = BlockType::Blockquote;
        base.blocks[1].block_type = BlockType::Heading2;
        let d = apply(&base, &Operation::MergeBlock { block_index: 1 });
        assert_eq!(d.blocks[0].block_type, BlockType::Blockquote);
    }

    #[test]
    fn test_merge_block_zero_and_out_of_range_are_noops() {
        let base = doc(&["a", "b"]);
        assert!(apply(&base, &Operation::MergeBlock { block_index: 0 }).content_eq(&base));
        assert!(apply(&base, &Operation::MergeBlock { block_index: 2 }).content_eq(&base));
    }

    #[test]
    fn test_split_then_merge_restores_document() {
        let base = doc(&["HelloWorld"]);
        let split = apply(
            &base,
            &Operation::SplitBlock {
                position: Position::new(0, 5),
            },
        );
        let merged = apply(&split, &Operation::MergeBlock { block_index: 1 });
        assert!(merged.content_eq(&base));
    }

    // ── block attribute ops ─────────────────────────────────────────────

    #[test]
    fn test_change_block_type() {
        let d = apply(
            &doc(&["x"]),
            &Operation::ChangeBlockType {
                block_index: 0,
                new_type: BlockType::Heading2,
            },
        );
        assert_eq!(d.blocks[0].block_type, BlockType::Heading2);
    }

    #[test]
    fn test_change_block_type_to_table_materializes_matrix() {
        let d = apply(
            &doc(&["x"]),
            &Operation::ChangeBlockType {
                block_index: 0,
                new_type: BlockType::Table,
            },
        );
        assert!(table_data_is_valid(d.blocks[0].table_data.as_ref().unwrap()));
    }

    #[test]
    fn test_set_indent_clamps() {
        let d = apply(
            &doc(&["x"]),
            &Operation::SetIndent {
                block_index: 0,
                indent_level: 99,
            },
        );
        assert_eq!(d.blocks[0].indent_level, MAX_INDENT_LEVEL);
    }

    #[test]
    fn test_set_image_ignored_on_non_image_block() {
        let d = apply(
            &doc(&["x"]),
            &Operation::SetImage {
                block_index: 0,
                image_url: "https://example.com/a.png".into(),
            },
        );
        assert!(d.blocks[0].image_url.is_none());
    }

    #[test]
    fn test_set_image_on_image_block() {
        let mut base = doc(&["x"]);
        base.blocks[0].block_type = BlockType::Image;
        let d = apply(
            &base,
            &Operation::SetImage {
                block_index: 0,
                image_url: "https://example.com/a.png".into(),
            },
        );
        assert_eq!(
            d.blocks[0].image_url.as_deref(),
            Some("https://example.com/a.png")
        );
    }

    #[test]
    fn test_set_line_spacing() {
        let d = apply(
            &doc(&["x"]),
            &Operation::SetLineSpacing {
                block_index: 0,
                line_spacing: 1.15,
            },
        );
        assert_eq!(d.blocks[0].line_spacing, Some(1.15));
    }

    // ── insert_block / delete_block ─────────────────────────────────────

    #[test]
    fn test_insert_block_after_index() {
        let d = apply(
            &doc(&["a", "b"]),
            &Operation::InsertBlock {
                after_block_index: 0,
                block_type: BlockType::Blockquote,
            },
        );
        assert_eq!(d.block_count(), 3);
        assert_eq!(d.blocks[1].block_type, BlockType::Blockquote);
        assert_eq!(d.block_text(2).unwrap(), "b");
    }

    #[test]
    fn test_insert_table_block_gets_default_matrix() {
        let d = apply(
            &doc(&["a"]),
            &Operation::InsertBlock {
                after_block_index: 0,
                block_type: BlockType::Table,
            },
        );
        assert!(table_data_is_valid(d.blocks[1].table_data.as_ref().unwrap()));
    }

    #[test]
    fn test_insert_block_at_top() {
        let d = apply(
            &doc(&["a"]),
            &Operation::InsertBlock {
                after_block_index: -1,
                block_type: BlockType::Paragraph,
            },
        );
        assert_eq!(d.block_count(), 2);
        assert_eq!(d.block_text(1).unwrap(), "a");
    }

    #[test]
    fn test_insert_block_out_of_range_is_noop() {
        let base = doc(&["a"]);
        let d = apply(
            &base,
            &Operation::InsertBlock {
                after_block_index: 1,
                block_type: BlockType::Paragraph,
            },
        );
        assert!(d.content_eq(&base));
        let d = apply(
            &base,
            &Operation::InsertBlock {
                after_block_index: -5,
                block_type: BlockType::Paragraph,
            },
        );
        assert!(d.content_eq(&base));
    }

    #[test]
    fn test_delete_block() {
        let d = apply(&doc(&["a", "b", "c"]), &Operation::DeleteBlock { block_index: 1 });
        assert_eq!(d.block_count(), 2);
        assert_eq!(d.full_text(), "a\nc");
    }

    #[test]
    fn test_delete_only_block_leaves_empty_paragraph() {
        let mut base = doc(&["content"]);
        base.blocks[0].block_type = BlockType::Heading1;
        let d = apply(&base, &Operation::DeleteBlock { block_index: 0 });
        assert_eq!(d.block_count(), 1);
        assert_eq!(d.blocks[0].block_type, BlockType::Paragraph);
        assert_eq!(d.blocks[0].text(), "");
    }

    #[test]
    fn test_insert_block_then_delete_restores_document() {
        let base = doc(&["a", "b"]);
        let inserted = apply(
            &base,
            &Operation::InsertBlock {
                after_block_index: 0,
                block_type: BlockType::Paragraph,
            },
        );
        let deleted = apply(&inserted, &Operation::DeleteBlock { block_index: 1 });
        assert!(deleted.content_eq(&base));
    }

    #[test]
    fn test_insert_then_delete_text_restores_document() {
        let base = doc(&["Hello"]);
        let inserted = apply(&base, &insert(0, 2, "XYZ"));
        let deleted = apply(&inserted, &delete((0, 2), (0, 5)));
        assert!(deleted.content_eq(&base));
    }

    // ── tables ──────────────────────────────────────────────────────────

    #[test]
    fn test_set_table_data_replaces_matrix() {
        let mut base = doc(&["x"]);
        base.blocks[0].block_type = BlockType::Table;
        base.blocks[0].table_data = Some(crate::block::default_table_data());
        let matrix = vec![
            vec![TableCell::text("a"), TableCell::text("b"), TableCell::text("c")],
            vec![TableCell::text("d"), TableCell::text("e"), TableCell::text("f")],
        ];
        let d = apply(
            &base,
            &Operation::SetTableData {
                block_index: 0,
                table_data: matrix.clone(),
            },
        );
        assert_eq!(d.blocks[0].table_data.as_ref().unwrap(), &matrix);
    }

    #[test]
    fn test_set_table_data_rejects_ragged_matrix() {
        let mut base = doc(&["x"]);
        base.blocks[0].block_type = BlockType::Table;
        base.blocks[0].table_data = Some(crate::block::default_table_data());
        let d = apply(
            &base,
            &Operation::SetTableData {
                block_index: 0,
                table_data: vec![vec![TableCell::empty()], vec![]],
            },
        );
        assert!(d.content_eq(&base));
    }

    #[test]
    fn test_set_table_data_ignored_on_non_table_block() {
        let base = doc(&["x"]);
        let d = apply(
            &base,
            &Operation::SetTableData {
                block_index: 0,
                table_data: crate::block::default_table_data(),
            },
        );
        assert!(d.content_eq(&base));
    }

    // ── structural ops on void blocks ───────────────────────────────────

    #[test]
    fn test_void_blocks_are_valid_structural_operands() {
        let mut base = doc(&["a", "b"]);
        base.blocks[0].block_type = BlockType::HorizontalRule;
        base.blocks[0].runs = vec![TextRun::sentinel()];
        let merged = apply(&base, &Operation::MergeBlock { block_index: 1 });
        assert_eq!(merged.block_count(), 1);
        assert_eq!(merged.blocks[0].block_type, BlockType::HorizontalRule);
        assert_eq!(merged.block_text(0).unwrap(), "b");

        let deleted = apply(&base, &Operation::DeleteBlock { block_index: 0 });
        assert_eq!(deleted.block_count(), 1);
        assert_eq!(deleted.block_text(0).unwrap(), "b");
    }
}
