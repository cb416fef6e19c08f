//! Detect whether the caret sits in an `@query` that should drive autocomplete.

use std::ops::Range;

use crate::document::Document;
use crate::document::Selection;

/// An active `@` trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    /// From the `@` up to the caret.
    pub span: Range<usize>,
    /// Text typed after the `@`; may be empty.
    pub query: String,
}

/// Return the trigger implied by `selection` in `document`, if any.
///
/// Rules:
/// - The selection must be collapsed.
/// - The caret must sit in a text run and must not touch a mention.
/// - The nearest `@` before the caret on the same line anchors the trigger
///   (rightmost wins when several precede the caret).
/// - A space between that `@` and the caret means the `@` belongs to some
///   earlier word, so there is no trigger. Other whitespace (tabs, the
///   mention spacer) is part of the query.
pub fn detect_trigger(document: &Document, selection: &Selection) -> Option<Trigger> {
    if !selection.is_collapsed() {
        return None;
    }
    let cursor = selection.cursor();
    let run = document.text_run_at(cursor)?;
    let before = run.text.get(..cursor - run.start)?;

    let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
    let at = line_start + before[line_start..].rfind('@')?;
    let query = &before[at + '@'.len_utf8()..];
    if query.contains(' ') {
        return None;
    }

    Some(Trigger {
        span: run.start + at..cursor,
        query: query.to_string(),
    })
}
