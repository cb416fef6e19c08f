//! Plain-text rendering of the editor state for the script runner.
//!
//! Mentions are bracketed (`[@Bob]`), the caret is `|`, the mention spacer is
//! shown as `·` and newlines as `⏎` so each state fits on one line.

use std::fmt::Write as _;

use mention_editor::EditorView;
use mention_editor::MENTION_SPACER;
use mention_editor::PopupView;

const CURSOR: char = '|';
const SPACER_GLYPH: char = '·';
const NEWLINE_GLYPH: char = '⏎';

pub fn render(view: &EditorView, wire: &str) -> String {
    let mut out = String::new();
    out.push_str("text: ");
    out.push_str(&render_text(view));
    out.push('\n');
    if let Some(popup) = &view.popup {
        render_popup(&mut out, popup);
    }
    out.push_str("wire: ");
    out.push_str(&escape_wire(wire));
    out.push('\n');
    out
}

fn render_text(view: &EditorView) -> String {
    let selection = view.selection.range();
    let mut out = String::with_capacity(view.text.len() + 8);
    let mark = |out: &mut String, pos: usize| {
        if view.mention_spans.iter().any(|span| span.end == pos) {
            out.push(']');
        }
        if pos == selection.start && !view.selection.is_collapsed() {
            out.push('{');
        }
        if pos == selection.end && !view.selection.is_collapsed() {
            out.push('}');
        }
        if pos == view.selection.cursor() {
            out.push(CURSOR);
        }
        if view.mention_spans.iter().any(|span| span.start == pos) {
            out.push('[');
        }
    };

    for (pos, ch) in view.text.char_indices() {
        mark(&mut out, pos);
        match ch {
            '\n' => out.push(NEWLINE_GLYPH),
            MENTION_SPACER => out.push(SPACER_GLYPH),
            ch => out.push(ch),
        }
    }
    mark(&mut out, view.text.len());
    out
}

fn render_popup(out: &mut String, popup: &PopupView) {
    let _ = writeln!(out, "popup @{}:", popup.query);
    if let Some(message) = popup.empty_message {
        let _ = writeln!(out, "  ({message})");
        return;
    }
    for (idx, row) in popup.rows.iter().enumerate() {
        let marker = if popup.selected == Some(idx) { '>' } else { ' ' };
        let _ = writeln!(out, "{marker} {} ({})", row.label, row.candidate.id);
    }
}

fn escape_wire(wire: &str) -> String {
    let mut out = String::with_capacity(wire.len());
    for ch in wire.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            MENTION_SPACER => out.push_str("\\u{a0}"),
            ch => out.push(ch),
        }
    }
    out
}
