//! Logical content of the editor: an ordered run of text and mention segments.
//!
//! Positions are byte offsets into the *rendered* text, where a mention renders
//! as `@` followed by its display name. A mention's rendered span is atomic: a
//! cursor never sits strictly inside it, and any deletion that touches it
//! removes all of it.
//!
//! The segment list is kept in normal form after every mutation: no two
//! `PlainText` segments next to each other, and no empty `PlainText` except
//! the anchor that always separates two consecutive mentions.

use std::ops::Range;

use mention_protocol::Candidate;
use mention_protocol::Segment;
use mention_protocol::wire;
use unicode_segmentation::UnicodeSegmentation;

/// Spacer inserted after every committed mention so typing continues outside it.
pub const MENTION_SPACER: char = '\u{a0}';

/// Host selection. Collapsed when `anchor == head`; `head` is the caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn collapsed(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    pub fn cursor(&self) -> usize {
        self.head
    }

    pub fn range(&self) -> Range<usize> {
        self.anchor.min(self.head)..self.anchor.max(self.head)
    }
}

/// A `PlainText` segment together with its rendered start offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRun<'a> {
    pub start: usize,
    pub text: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    segments: Vec<Segment>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        let mut document = Self { segments };
        document.normalize();
        document
    }

    pub fn from_wire(wire: &str) -> Self {
        Self::from_segments(wire::deserialize(wire))
    }

    pub fn to_wire(&self) -> String {
        wire::serialize(&self.segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn to_segments(&self) -> Vec<Segment> {
        self.segments.clone()
    }

    /// Length of the rendered text in bytes.
    pub fn len(&self) -> usize {
        self.segments.iter().map(Segment::rendered_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn rendered_text(&self) -> String {
        let mut out = String::with_capacity(self.len());
        for segment in &self.segments {
            match segment {
                Segment::PlainText { value } => out.push_str(value),
                Segment::Mention { display_name, .. } => {
                    out.push('@');
                    out.push_str(display_name);
                }
            }
        }
        out
    }

    /// Rendered byte ranges of every mention, in document order.
    pub fn mention_spans(&self) -> Vec<Range<usize>> {
        self.spans()
            .filter(|(_, segment)| segment.is_mention())
            .map(|(span, _)| span)
            .collect()
    }

    /// Snap `pos` to the nearest valid cursor position.
    ///
    /// Out-of-range positions clamp to the end, positions inside a mention snap
    /// to its nearer edge, and positions inside a UTF-8 sequence move back to
    /// the start of that char.
    pub fn clamp_position(&self, pos: usize) -> usize {
        let pos = pos.min(self.len());
        for (span, segment) in self.spans() {
            if pos <= span.start {
                break;
            }
            if pos < span.end {
                return match segment {
                    Segment::Mention { .. } if pos - span.start < span.end - pos => span.start,
                    Segment::Mention { .. } => span.end,
                    Segment::PlainText { value } => {
                        span.start + floor_char_boundary(value, pos - span.start)
                    }
                };
            }
        }
        pos
    }

    /// Insert `text` at `pos`, returning the position just after it.
    pub fn insert_text(&mut self, pos: usize, text: &str) -> usize {
        let pos = self.clamp_position(pos);
        if text.is_empty() {
            return pos;
        }
        let idx = self.split_at(pos);
        self.segments.insert(idx, Segment::text(text));
        self.normalize();
        pos + text.len()
    }

    /// Insert a mention for `candidate` at `pos` followed by a [`MENTION_SPACER`].
    ///
    /// Returns the position after the spacer.
    pub fn insert_mention(&mut self, pos: usize, candidate: &Candidate) -> usize {
        let pos = self.clamp_position(pos);
        let idx = self.split_at(pos);
        let mention = candidate.to_segment();
        let mention_len = mention.rendered_len();
        self.segments.insert(idx, mention);
        self.segments.insert(idx + 1, Segment::text(MENTION_SPACER));
        self.normalize();
        pos + mention_len + MENTION_SPACER.len_utf8()
    }

    /// Delete `range`, first widening it so it never cuts through a mention or
    /// a UTF-8 sequence. Returns the range that was actually removed.
    pub fn delete_range(&mut self, range: Range<usize>) -> Range<usize> {
        let range = self.widen_range(range);
        if range.is_empty() {
            return range;
        }

        let mut kept = Vec::with_capacity(self.segments.len());
        let mut start = 0;
        for segment in std::mem::take(&mut self.segments) {
            let span = start..start + segment.rendered_len();
            start = span.end;
            if span.end <= range.start || span.start >= range.end {
                kept.push(segment);
                continue;
            }
            // Mentions reaching this point lie fully inside the widened range.
            if let Segment::PlainText { mut value } = segment {
                let cut_from = range.start.saturating_sub(span.start);
                let cut_to = (range.end - span.start).min(value.len());
                value.replace_range(cut_from..cut_to, "");
                kept.push(Segment::PlainText { value });
            }
        }
        self.segments = kept;
        self.normalize();
        range
    }

    /// Delete `range` (widened as in [`Document::delete_range`]) and insert
    /// `text` in its place. Returns the position after the inserted text.
    pub fn replace_range(&mut self, range: Range<usize>, text: &str) -> usize {
        let removed = self.delete_range(range);
        self.insert_text(removed.start, text)
    }

    /// Expand `range` so both ends sit on valid cursor positions, covering any
    /// mention it partially overlaps.
    pub fn widen_range(&self, range: Range<usize>) -> Range<usize> {
        let len = self.len();
        let mut start = range.start.min(range.end).min(len);
        let mut end = range.start.max(range.end).min(len);
        for (span, segment) in self.spans() {
            let cuts_start = span.start < start && start < span.end;
            let cuts_end = span.start < end && end < span.end;
            match segment {
                Segment::Mention { .. } => {
                    if cuts_start {
                        start = span.start;
                    }
                    if cuts_end {
                        end = span.end;
                    }
                }
                Segment::PlainText { value } => {
                    if cuts_start {
                        start = span.start + floor_char_boundary(value, start - span.start);
                    }
                    if cuts_end {
                        end = span.start + ceil_char_boundary(value, end - span.start);
                    }
                }
            }
        }
        start..end
    }

    /// Position one grapheme (or one whole mention) before `pos`.
    pub fn prev_boundary(&self, pos: usize) -> usize {
        let pos = self.clamp_position(pos);
        for (span, segment) in self.spans() {
            if span.start < pos && pos <= span.end {
                return match segment {
                    Segment::Mention { .. } => span.start,
                    Segment::PlainText { value } => value[..pos - span.start]
                        .grapheme_indices(true)
                        .next_back()
                        .map_or(span.start, |(idx, _)| span.start + idx),
                };
            }
        }
        0
    }

    /// Position one grapheme (or one whole mention) after `pos`.
    pub fn next_boundary(&self, pos: usize) -> usize {
        let pos = self.clamp_position(pos);
        for (span, segment) in self.spans() {
            if span.start <= pos && pos < span.end {
                return match segment {
                    Segment::Mention { .. } => span.end,
                    Segment::PlainText { value } => value[pos - span.start..]
                        .graphemes(true)
                        .next()
                        .map_or(span.end, |grapheme| pos + grapheme.len()),
                };
            }
        }
        pos
    }

    pub fn line_start(&self, pos: usize) -> usize {
        let pos = self.clamp_position(pos);
        let text = self.rendered_text();
        let start = text[..pos].rfind('\n').map_or(0, |idx| idx + 1);
        self.clamp_position(start)
    }

    pub fn line_end(&self, pos: usize) -> usize {
        let pos = self.clamp_position(pos);
        let text = self.rendered_text();
        let end = text[pos..].find('\n').map_or(text.len(), |idx| pos + idx);
        self.clamp_position(end)
    }

    /// The text run containing `pos`, or `None` when `pos` touches a mention
    /// (inside it or at either edge) or the document has no text there.
    pub fn text_run_at(&self, pos: usize) -> Option<TextRun<'_>> {
        let mut run = None;
        for (span, segment) in self.spans() {
            if span.start > pos {
                break;
            }
            if pos > span.end {
                continue;
            }
            match segment {
                Segment::Mention { .. } => return None,
                Segment::PlainText { value } => {
                    run = Some(TextRun {
                        start: span.start,
                        text: value,
                    });
                }
            }
        }
        run
    }

    fn spans(&self) -> impl Iterator<Item = (Range<usize>, &Segment)> + '_ {
        let mut start = 0;
        self.segments.iter().map(move |segment| {
            let span = start..start + segment.rendered_len();
            start = span.end;
            (span, segment)
        })
    }

    /// Ensure a segment boundary exists at `pos` and return the segment index
    /// where new content at `pos` belongs. `pos` must already be clamped.
    fn split_at(&mut self, pos: usize) -> usize {
        let mut start = 0;
        for idx in 0..self.segments.len() {
            if pos == start {
                return idx;
            }
            let end = start + self.segments[idx].rendered_len();
            if pos < end {
                if let Segment::PlainText { value } = &mut self.segments[idx] {
                    let tail = value.split_off(pos - start);
                    self.segments.insert(idx + 1, Segment::PlainText { value: tail });
                }
                return idx + 1;
            }
            start = end;
        }
        self.segments.len()
    }

    fn normalize(&mut self) {
        let mut normalized: Vec<Segment> = Vec::with_capacity(self.segments.len());
        for segment in std::mem::take(&mut self.segments) {
            match segment {
                Segment::PlainText { value } => match normalized.last_mut() {
                    Some(Segment::PlainText { value: prev }) => prev.push_str(&value),
                    _ if value.is_empty() => {}
                    _ => normalized.push(Segment::PlainText { value }),
                },
                mention => {
                    // Consecutive mentions keep an empty text anchor between them.
                    if matches!(normalized.last(), Some(Segment::Mention { .. })) {
                        normalized.push(Segment::text(""));
                    }
                    normalized.push(mention);
                }
            }
        }
        self.segments = normalized;
    }
}

fn floor_char_boundary(text: &str, pos: usize) -> usize {
    let mut pos = pos.min(text.len());
    while pos > 0 && !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

fn ceil_char_boundary(text: &str, pos: usize) -> usize {
    let mut pos = pos.min(text.len());
    while pos < text.len() && !text.is_char_boundary(pos) {
        pos += 1;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bob() -> Candidate {
        Candidate::new(42, "Bob")
    }

    /// `ab@Bobcd`, with the mention spanning 2..6.
    fn doc_with_mention() -> Document {
        Document::from_segments(vec![
            Segment::text("ab"),
            Segment::mention(42, "Bob"),
            Segment::text("cd"),
        ])
    }

    fn assert_normal_form(document: &Document) {
        let segments = document.segments();
        for pair in segments.windows(2) {
            assert!(
                !(matches!(pair[0], Segment::PlainText { .. })
                    && matches!(pair[1], Segment::PlainText { .. })),
                "adjacent text segments in {document:?}"
            );
            assert!(
                !(pair[0].is_mention() && pair[1].is_mention()),
                "adjacent mentions in {document:?}"
            );
        }
        for (idx, segment) in segments.iter().enumerate() {
            if *segment != Segment::text("") {
                continue;
            }
            let between_mentions = idx > 0
                && segments[idx - 1].is_mention()
                && segments.get(idx + 1).is_some_and(Segment::is_mention);
            assert!(between_mentions, "stray empty text segment in {document:?}");
        }
    }

    #[test]
    fn insert_text_into_empty_and_middle() {
        let mut document = Document::new();
        assert_eq!(document.insert_text(0, "Hllo"), 4);
        assert_eq!(document.insert_text(1, "e"), 2);
        assert_eq!(document.segments(), &[Segment::text("Hello")]);
        assert_eq!(document.insert_text(0, ""), 0);
    }

    #[test]
    fn insert_mention_appends_spacer_and_moves_cursor_past_it() {
        let mut document = Document::from_wire("Hi ");
        let cursor = document.insert_mention(3, &bob());
        assert_eq!(
            document.segments(),
            &[
                Segment::text("Hi "),
                Segment::mention(42, "Bob"),
                Segment::text("\u{a0}"),
            ]
        );
        assert_eq!(cursor, "Hi @Bob\u{a0}".len());
        assert_eq!(cursor, document.len());
    }

    #[test]
    fn insert_mention_splits_text_and_merges_spacer_with_tail() {
        let mut document = Document::from_wire("ab");
        let cursor = document.insert_mention(1, &bob());
        assert_eq!(
            document.segments(),
            &[
                Segment::text("a"),
                Segment::mention(42, "Bob"),
                Segment::text("\u{a0}b"),
            ]
        );
        assert_eq!(&document.rendered_text()[cursor..], "b");
        assert_normal_form(&document);
    }

    #[test]
    fn back_to_back_mentions_are_separated_by_spacers() {
        let mut document = Document::new();
        let cursor = document.insert_mention(0, &bob());
        document.insert_mention(cursor, &Candidate::new(7, "Al"));
        assert_eq!(
            document.segments(),
            &[
                Segment::mention(42, "Bob"),
                Segment::text("\u{a0}"),
                Segment::mention(7, "Al"),
                Segment::text("\u{a0}"),
            ]
        );
    }

    #[test]
    fn deleting_the_spacer_between_mentions_leaves_an_anchor() {
        let mut document = Document::new();
        let cursor = document.insert_mention(0, &Candidate::new(1, "A"));
        document.insert_mention(cursor, &Candidate::new(2, "B"));
        assert_eq!(document.rendered_text(), "@A\u{a0}@B\u{a0}");

        assert_eq!(document.delete_range(2..4), 2..4);
        assert_eq!(
            document.segments(),
            &[
                Segment::mention(1, "A"),
                Segment::text(""),
                Segment::mention(2, "B"),
                Segment::text("\u{a0}"),
            ]
        );
        assert_normal_form(&document);
        assert_eq!(Document::from_wire(&document.to_wire()), document);

        assert_eq!(document.insert_text(2, "x"), 3);
        assert_eq!(document.rendered_text(), "@Ax@B\u{a0}");
        assert_normal_form(&document);
    }

    #[test]
    fn from_segments_separates_adjacent_mentions() {
        let document = Document::from_segments(vec![
            Segment::text(""),
            Segment::mention(1, "A"),
            Segment::mention(2, "B"),
            Segment::text(""),
        ]);
        assert_eq!(
            document.segments(),
            &[
                Segment::mention(1, "A"),
                Segment::text(""),
                Segment::mention(2, "B"),
            ]
        );
        assert_eq!(document.text_run_at(2), None);
        assert_eq!(document.prev_boundary(4), 2);
        assert_eq!(document.next_boundary(2), 4);
    }

    #[test]
    fn text_with_token_fragments_round_trips() {
        let mut document = Document::new();
        let cursor = document.insert_text(0, "see {\"a\":1} and @{\"id\":1,\"name\":\"x\" ");
        let cursor = document.insert_mention(cursor, &Candidate::new(2, "Bob"));
        document.insert_text(cursor, "done");

        let reloaded = Document::from_wire(&document.to_wire());
        assert_eq!(reloaded, document);
        assert_eq!(reloaded.mention_spans().len(), 1);
    }

    #[test]
    fn positions_inside_a_mention_snap_to_the_nearer_edge() {
        let document = doc_with_mention();
        assert_eq!(document.clamp_position(3), 2);
        assert_eq!(document.clamp_position(4), 6);
        assert_eq!(document.clamp_position(5), 6);
        assert_eq!(document.clamp_position(100), 8);

        let mut document = doc_with_mention();
        assert_eq!(document.insert_text(3, "x"), 3);
        assert_eq!(document.rendered_text(), "abx@Bobcd");
    }

    #[test]
    fn positions_inside_multibyte_chars_move_back() {
        let document = Document::from_wire("é!");
        assert_eq!(document.clamp_position(1), 0);
        assert_eq!(document.clamp_position(2), 2);
    }

    #[test]
    fn deleting_any_range_overlapping_a_mention_removes_it_whole() {
        let original = doc_with_mention();
        let rendered = original.rendered_text();
        let len = original.len();
        for start in 0..len {
            for end in start + 1..=len {
                if end <= 2 || start >= 6 {
                    continue;
                }
                let mut document = original.clone();
                let removed = document.delete_range(start..end);
                let widened_start = if (2..6).contains(&start) { 2 } else { start };
                let widened_end = if end > 2 && end < 6 { 6 } else { end };
                assert_eq!(removed, widened_start..widened_end, "{start}..{end}");
                assert!(
                    !document.segments().iter().any(Segment::is_mention),
                    "mention survived deleting {start}..{end}"
                );
                assert_eq!(
                    document.rendered_text(),
                    format!("{}{}", &rendered[..widened_start], &rendered[widened_end..])
                );
                assert_normal_form(&document);
            }
        }
    }

    #[test]
    fn deleting_text_next_to_a_mention_keeps_it() {
        let mut document = doc_with_mention();
        assert_eq!(document.delete_range(0..2), 0..2);
        assert_eq!(
            document.segments(),
            &[Segment::mention(42, "Bob"), Segment::text("cd")]
        );
    }

    #[test]
    fn reversed_range_is_normalized() {
        let mut document = Document::from_wire("hello");
        assert_eq!(document.delete_range(4..1), 1..4);
        assert_eq!(document.rendered_text(), "ho");
    }

    #[test]
    fn replace_range_over_a_mention() {
        let mut document = doc_with_mention();
        let cursor = document.replace_range(1..3, "Z");
        assert_eq!(document.rendered_text(), "aZcd");
        assert_eq!(cursor, 2);
    }

    #[test]
    fn boundaries_step_over_mentions_and_graphemes() {
        let document = doc_with_mention();
        assert_eq!(document.prev_boundary(6), 2);
        assert_eq!(document.next_boundary(2), 6);
        assert_eq!(document.prev_boundary(2), 1);
        assert_eq!(document.next_boundary(8), 8);
        assert_eq!(document.prev_boundary(0), 0);

        let accented = Document::from_wire("e\u{301}x");
        assert_eq!(accented.prev_boundary(3), 0);
        assert_eq!(accented.next_boundary(0), 3);
    }

    #[test]
    fn line_bounds_follow_newlines() {
        let document = Document::from_wire("one\ntwo\nthree");
        assert_eq!(document.line_start(6), 4);
        assert_eq!(document.line_end(5), 7);
        assert_eq!(document.line_end(9), 13);
        assert_eq!(document.line_start(2), 0);
    }

    #[test]
    fn text_run_is_unavailable_next_to_a_mention() {
        let document = doc_with_mention();
        assert_eq!(document.text_run_at(2), None);
        assert_eq!(document.text_run_at(6), None);
        assert_eq!(
            document.text_run_at(1),
            Some(TextRun {
                start: 0,
                text: "ab"
            })
        );
        assert_eq!(
            document.text_run_at(7),
            Some(TextRun {
                start: 6,
                text: "cd"
            })
        );
        assert_eq!(Document::new().text_run_at(0), None);
    }

    #[test]
    fn documents_built_by_mutation_round_trip_through_the_wire() {
        let mut document = Document::new();
        let mut cursor = document.insert_text(0, "Hey ");
        cursor = document.insert_mention(cursor, &Candidate::new(1, "Ada \"Countess\" L."));
        cursor = document.insert_text(cursor, "and\n");
        cursor = document.insert_mention(cursor, &Candidate::new(2, "Linus"));
        cursor = document.insert_mention(cursor, &Candidate::new(3, "Grace"));
        document.insert_text(cursor, "!");
        let before_delete = document.clone();
        document.delete_range(1..2);
        assert_normal_form(&document);

        for doc in [before_delete, document] {
            assert_eq!(Document::from_wire(&doc.to_wire()), doc);
        }
    }

    #[test]
    fn selection_helpers() {
        let selection = Selection { anchor: 5, head: 2 };
        assert!(!selection.is_collapsed());
        assert_eq!(selection.range(), 2..5);
        assert_eq!(selection.cursor(), 2);
        assert!(Selection::collapsed(3).is_collapsed());
    }
}
