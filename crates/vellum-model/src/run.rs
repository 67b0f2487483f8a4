//! Text runs and run arithmetic.
//!
//! A run is a maximal contiguous fragment of uniform style within a block.
//! All range-based operations reduce to three primitives here: splitting the
//! run list at an offset, rewriting styles over a sub-range, and
//! normalization. Offsets are UTF-16 code units into the concatenation of
//! the block's run texts.

use serde::{Deserialize, Serialize};

use crate::style::TextStyle;
use crate::text::{split_at_utf16, utf16_len};

/// A contiguous fragment of uniformly-styled text.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(default, skip_serializing_if = "TextStyle::is_plain")]
    pub style: TextStyle,
}

impl TextRun {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Unstyled run with the given text.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, TextStyle::default())
    }

    /// The empty sentinel run carried by blocks with no text.
    pub fn sentinel() -> Self {
        Self::plain("")
    }

    pub fn len_utf16(&self) -> u32 {
        utf16_len(&self.text)
    }
}

/// Concatenated text of a run list.
pub fn runs_text(runs: &[TextRun]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}

/// Total UTF-16 length of a run list.
pub fn runs_len_utf16(runs: &[TextRun]) -> u32 {
    runs.iter().map(TextRun::len_utf16).sum()
}

/// Drop zero-length runs, merge adjacent runs with equal styles, and restore
/// the sentinel when the list would empty out. Idempotent.
pub fn normalize_runs(runs: &mut Vec<TextRun>) {
    let mut merged: Vec<TextRun> = Vec::with_capacity(runs.len());
    for run in runs.drain(..) {
        if run.text.is_empty() {
            continue;
        }
        match merged.last_mut() {
            Some(prev) if prev.style.same_as(&run.style) => prev.text.push_str(&run.text),
            _ => merged.push(run),
        }
    }
    if merged.is_empty() {
        merged.push(TextRun::sentinel());
    }
    *runs = merged;
}

/// Split a run list at a UTF-16 offset, preserving style boundaries.
///
/// A split inside a run produces two runs of the same style; a split at a
/// run boundary produces no zero-length runs. The offset clamps to the total
/// length.
pub fn split_runs_at(runs: &[TextRun], offset: u32) -> (Vec<TextRun>, Vec<TextRun>) {
    let mut before = Vec::new();
    let mut after = Vec::new();
    let mut consumed = 0u32;
    for run in runs {
        let len = run.len_utf16();
        if consumed + len <= offset {
            before.push(run.clone());
        } else if consumed >= offset {
            after.push(run.clone());
        } else {
            let (head, tail) = split_at_utf16(&run.text, offset - consumed);
            if !head.is_empty() {
                before.push(TextRun::new(head, run.style.clone()));
            }
            if !tail.is_empty() {
                after.push(TextRun::new(tail, run.style.clone()));
            }
        }
        consumed += len;
    }
    (before, after)
}

/// Style of the run containing `offset`, right-biased: at a run boundary
/// this is the run that starts there, and at the very end of the block it
/// is the last run. Used for insert-text style inheritance.
pub fn style_at(runs: &[TextRun], offset: u32) -> TextStyle {
    let mut consumed = 0u32;
    for run in runs {
        let len = run.len_utf16();
        if offset < consumed + len || len == 0 {
            return run.style.clone();
        }
        consumed += len;
    }
    runs.last().map(|r| r.style.clone()).unwrap_or_default()
}

/// Insert `text` at `offset`, inheriting the style at that offset.
pub fn insert_in_runs(runs: &mut Vec<TextRun>, offset: u32, text: &str) {
    if text.is_empty() {
        return;
    }
    let style = style_at(runs, offset);
    let (mut before, after) = split_runs_at(runs, offset);
    before.push(TextRun::new(text, style));
    before.extend(after);
    *runs = before;
    normalize_runs(runs);
}

/// Delete the UTF-16 range `start..end` (clamped, no-op when degenerate).
pub fn delete_in_runs(runs: &mut Vec<TextRun>, start: u32, end: u32) {
    if end <= start {
        return;
    }
    let (mut before, rest) = split_runs_at(runs, start);
    let (_, after) = split_runs_at(&rest, end - start);
    before.extend(after);
    *runs = before;
    normalize_runs(runs);
}

/// Apply `transform` to the style of every part of the range `start..end`,
/// splitting straddling runs at the edges, then normalize.
pub fn apply_to_style_range(
    runs: &mut Vec<TextRun>,
    start: u32,
    end: u32,
    transform: impl Fn(&mut TextStyle),
) {
    if end <= start {
        return;
    }
    let (mut before, rest) = split_runs_at(runs, start);
    let (mut middle, after) = split_runs_at(&rest, end - start);
    for run in &mut middle {
        transform(&mut run.style);
    }
    before.extend(middle);
    before.extend(after);
    *runs = before;
    normalize_runs(runs);
}
