//! The mention editor is the host-facing state machine.
//!
//! It owns the [`Document`] (the single source of truth for content), the
//! caret/selection, and the [`MentionCompletion`] session, and it turns host
//! input into edits:
//!
//! - Key events go through [`MentionEditor::handle_key_event`], which routes to
//!   the completion handler while a session is open and to plain editing
//!   otherwise. After every handled key the trigger is recomputed
//!   ([`MentionEditor::sync_completion`]) so the session follows the latest
//!   text and caret.
//! - Every content mutation emits [`EditorEvent::ValueChanged`] with the
//!   serialized wire string; every new query emits
//!   [`EditorEvent::StartUserSearch`].
//! - Pointer selection of a candidate commits on press
//!   ([`MentionEditor::handle_candidate_pointer_down`]).
//!
//! # Blur
//!
//! Losing focus schedules a deferred close instead of closing right away, so a
//! pointer press on a candidate that caused the blur still gets to commit. The
//! host drives the deadline with [`MentionEditor::close_if_due`] from its tick
//! loop; a commit or refocus cancels the pending close.
//!
//! The rendered surface is derived from the document via
//! [`MentionEditor::view`]; nothing is ever read back from it.

use std::ops::Range;
use std::time::Duration;
use std::time::Instant;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use mention_protocol::Candidate;
use mention_protocol::UserSearchError;

use crate::completion::MentionCompletion;
use crate::completion::PopupView;
use crate::deferred_close::DEFAULT_BLUR_CLOSE_DELAY;
use crate::deferred_close::DeferredClose;
use crate::document::Document;
use crate::document::Selection;
use crate::editor_event::EditorEvent;
use crate::editor_event_sender::EditorEventSender;
use crate::insertion::commit_mention;
use crate::trigger::detect_trigger;

/// Whether the host should still run its default action for an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// The editor consumed the input; suppress the host default (focus
    /// traversal, form submission, ...).
    Handled,
    /// The editor did nothing; the host may apply its default.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorConfig {
    pub blur_close_delay: Duration,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            blur_close_delay: DEFAULT_BLUR_CLOSE_DELAY,
        }
    }
}

/// Everything a host needs to draw the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorView {
    pub text: String,
    pub mention_spans: Vec<Range<usize>>,
    pub selection: Selection,
    pub popup: Option<PopupView>,
}

pub struct MentionEditor {
    document: Document,
    selection: Selection,
    completion: MentionCompletion,
    blur_close: DeferredClose,
    config: EditorConfig,
    has_focus: bool,
    event_tx: EditorEventSender,
}

impl MentionEditor {
    /// Create an editor holding `initial_value` (wire format), caret at the end.
    pub fn new(initial_value: &str, event_tx: EditorEventSender, config: EditorConfig) -> Self {
        let document = Document::from_wire(initial_value);
        let selection = Selection::collapsed(document.len());
        Self {
            document,
            selection,
            completion: MentionCompletion::new(),
            blur_close: DeferredClose::new(),
            config,
            has_focus: true,
            event_tx,
        }
    }

    /// Current content in wire format.
    pub fn value(&self) -> String {
        self.document.to_wire()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn completion(&self) -> &MentionCompletion {
        &self.completion
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    pub fn recommended_blur_close_delay(&self) -> Duration {
        self.config.blur_close_delay
    }

    /// Replace the whole content from the host.
    pub fn set_value(&mut self, value: &str) {
        self.document = Document::from_wire(value);
        self.selection = Selection::collapsed(self.document.len());
        self.completion.close();
        self.blur_close.cancel();
        self.emit_change();
    }

    /// Host-driven caret/selection change (pointer placement, select-all, ...).
    pub fn set_selection(&mut self, anchor: usize, head: usize) {
        self.selection = Selection {
            anchor: self.document.clamp_position(anchor),
            head: self.document.clamp_position(head),
        };
        self.sync_completion();
    }

    pub fn set_cursor(&mut self, pos: usize) {
        self.set_selection(pos, pos);
    }

    /// Handle a key event coming from the host.
    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> KeyDisposition {
        if key_event.kind == KeyEventKind::Release {
            return KeyDisposition::Ignored;
        }

        let disposition = if self.completion.is_open() {
            self.handle_key_event_with_completion(key_event)
        } else {
            self.handle_key_event_without_completion(key_event)
        };

        if disposition == KeyDisposition::Handled {
            self.sync_completion();
        }
        disposition
    }

    /// Insert pasted text at the caret, replacing any selection.
    pub fn handle_paste(&mut self, pasted: String) -> KeyDisposition {
        let text = pasted.replace("\r\n", "\n").replace('\r', "\n");
        self.replace_selection(&text);
        self.sync_completion();
        KeyDisposition::Handled
    }

    /// Pointer press on the candidate row at `index`.
    ///
    /// Bound to the press phase so the commit lands before any blur-triggered
    /// close; a `Handled` result tells the host to prevent the default action.
    pub fn handle_candidate_pointer_down(&mut self, index: usize) -> KeyDisposition {
        let Some(candidate) = self.completion.candidate_at(index).cloned() else {
            return KeyDisposition::Ignored;
        };
        self.commit(&candidate);
        KeyDisposition::Handled
    }

    pub fn handle_focus(&mut self) {
        self.has_focus = true;
        self.blur_close.cancel();
    }

    /// A repeated blur keeps the deadline set by the first one.
    pub fn handle_blur(&mut self, now: Instant) {
        if !self.has_focus {
            return;
        }
        self.has_focus = false;
        if self.completion.is_open() {
            self.blur_close.schedule(now, self.config.blur_close_delay);
        }
    }

    /// Close the session if a blur-triggered close is due. Returns `true` when
    /// the view changed.
    pub fn close_if_due(&mut self, now: Instant) -> bool {
        if !self.blur_close.take_if_due(now) || !self.completion.is_open() {
            return false;
        }
        self.completion.close();
        true
    }

    /// Integrate results from an asynchronous user lookup.
    pub fn on_user_search_result(
        &mut self,
        query: &str,
        result: Result<Vec<Candidate>, UserSearchError>,
    ) -> bool {
        self.completion.apply_results(query, result)
    }

    pub fn view(&self) -> EditorView {
        EditorView {
            text: self.document.rendered_text(),
            mention_spans: self.document.mention_spans(),
            selection: self.selection,
            popup: self.completion.popup_view(),
        }
    }

    /// Handle key events while a completion session is open.
    fn handle_key_event_with_completion(&mut self, key_event: KeyEvent) -> KeyDisposition {
        let has_candidates = self.completion.has_candidates();
        match key_event.code {
            KeyCode::Esc => {
                self.completion.dismiss();
                KeyDisposition::Handled
            }
            KeyCode::Up => {
                self.completion.move_up();
                KeyDisposition::Handled
            }
            KeyCode::Down => {
                self.completion.move_down();
                KeyDisposition::Handled
            }
            KeyCode::Tab | KeyCode::Enter => {
                if has_candidates
                    && let Some(candidate) = self.completion.selected_candidate().cloned()
                {
                    self.commit(&candidate);
                }
                KeyDisposition::Handled
            }
            _ => self.handle_key_event_without_completion(key_event),
        }
    }

    /// Handle plain editing keys.
    fn handle_key_event_without_completion(&mut self, key_event: KeyEvent) -> KeyDisposition {
        let KeyEvent {
            code, modifiers, ..
        } = key_event;
        let extend = modifiers.contains(KeyModifiers::SHIFT);
        match code {
            KeyCode::Char(c) if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                let mut buf = [0u8; 4];
                self.replace_selection(c.encode_utf8(&mut buf));
                KeyDisposition::Handled
            }
            KeyCode::Enter if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.replace_selection("\n");
                KeyDisposition::Handled
            }
            KeyCode::Backspace => {
                let range = if self.selection.is_collapsed() {
                    let cursor = self.selection.cursor();
                    self.document.prev_boundary(cursor)..cursor
                } else {
                    self.selection.range()
                };
                self.delete(range);
                KeyDisposition::Handled
            }
            KeyCode::Delete => {
                let range = if self.selection.is_collapsed() {
                    let cursor = self.selection.cursor();
                    cursor..self.document.next_boundary(cursor)
                } else {
                    self.selection.range()
                };
                self.delete(range);
                KeyDisposition::Handled
            }
            KeyCode::Left => {
                let target = if !extend && !self.selection.is_collapsed() {
                    self.selection.range().start
                } else {
                    self.document.prev_boundary(self.selection.cursor())
                };
                self.move_caret(target, extend);
                KeyDisposition::Handled
            }
            KeyCode::Right => {
                let target = if !extend && !self.selection.is_collapsed() {
                    self.selection.range().end
                } else {
                    self.document.next_boundary(self.selection.cursor())
                };
                self.move_caret(target, extend);
                KeyDisposition::Handled
            }
            KeyCode::Home => {
                let target = self.document.line_start(self.selection.cursor());
                self.move_caret(target, extend);
                KeyDisposition::Handled
            }
            KeyCode::End => {
                let target = self.document.line_end(self.selection.cursor());
                self.move_caret(target, extend);
                KeyDisposition::Handled
            }
            _ => KeyDisposition::Ignored,
        }
    }

    fn move_caret(&mut self, target: usize, extend: bool) {
        if extend {
            self.selection.head = target;
        } else {
            self.selection = Selection::collapsed(target);
        }
    }

    fn replace_selection(&mut self, text: &str) {
        let cursor = if self.selection.is_collapsed() {
            self.document.insert_text(self.selection.cursor(), text)
        } else {
            self.document.replace_range(self.selection.range(), text)
        };
        self.selection = Selection::collapsed(cursor);
        self.emit_change();
    }

    fn delete(&mut self, range: Range<usize>) {
        if range.is_empty() {
            self.selection = Selection::collapsed(range.start);
            return;
        }
        let removed = self.document.delete_range(range);
        self.selection = Selection::collapsed(removed.start);
        self.emit_change();
    }

    fn commit(&mut self, candidate: &Candidate) {
        let Some(committed) = commit_mention(&mut self.document, &mut self.completion, candidate)
        else {
            return;
        };
        self.blur_close.cancel();
        self.selection = Selection::collapsed(committed.cursor);
        self.event_tx.send(EditorEvent::ValueChanged(committed.value));
    }

    /// Recompute the trigger and move the completion session along with it.
    fn sync_completion(&mut self) {
        let trigger = detect_trigger(&self.document, &self.selection);
        if let Some(query) = self.completion.sync(trigger) {
            self.event_tx.send(EditorEvent::StartUserSearch(query));
        }
    }

    fn emit_change(&self) {
        self.event_tx
            .send(EditorEvent::ValueChanged(self.document.to_wire()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mention_protocol::Segment;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tokio::sync::mpsc::unbounded_channel;

    fn editor(initial: &str) -> (MentionEditor, UnboundedReceiver<EditorEvent>) {
        let (tx, rx) = unbounded_channel();
        let editor = MentionEditor::new(
            initial,
            EditorEventSender::new(tx),
            EditorConfig::default(),
        );
        (editor, rx)
    }

    fn drain(rx: &mut UnboundedReceiver<EditorEvent>) -> Vec<EditorEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn press(editor: &mut MentionEditor, code: KeyCode) -> KeyDisposition {
        editor.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_chars(editor: &mut MentionEditor, text: &str) {
        for c in text.chars() {
            press(editor, KeyCode::Char(c));
        }
    }

    fn users() -> Vec<Candidate> {
        vec![
            Candidate::new(42, "Bob"),
            Candidate::new(43, "Bobby"),
            Candidate::new(44, "Bonnie"),
        ]
    }

    /// Type `text` and answer the latest lookup with `users()`.
    fn open_popup(editor: &mut MentionEditor, text: &str) {
        type_chars(editor, text);
        let query = editor
            .completion()
            .session()
            .map(|session| session.last_issued_query.clone())
            .expect("session open");
        assert!(editor.on_user_search_result(&query, Ok(users())));
    }

    #[test]
    fn typing_emits_value_changes() {
        let (mut editor, mut rx) = editor("");
        type_chars(&mut editor, "Hi");
        assert_eq!(
            drain(&mut rx),
            vec![
                EditorEvent::ValueChanged("H".to_string()),
                EditorEvent::ValueChanged("Hi".to_string()),
            ]
        );
        assert_eq!(editor.value(), "Hi");
    }

    #[test]
    fn typing_a_trigger_issues_one_lookup_per_query() {
        let (mut editor, mut rx) = editor("Hi ");
        type_chars(&mut editor, "@bo");
        let searches: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter_map(|event| match event {
                EditorEvent::StartUserSearch(query) => Some(query),
                _ => None,
            })
            .collect();
        assert_eq!(searches, vec!["", "b", "bo"]);
        let session = editor.completion().session().expect("session");
        assert_eq!(session.trigger_span, 3..6);
        assert_eq!(session.query, "bo");
    }

    #[test]
    fn enter_commits_highlighted_candidate() {
        let (mut editor, mut rx) = editor("Hi ");
        open_popup(&mut editor, "@bo");
        drain(&mut rx);

        assert_eq!(press(&mut editor, KeyCode::Enter), KeyDisposition::Handled);

        assert_eq!(
            editor.document().segments(),
            &[
                Segment::text("Hi "),
                Segment::mention(42, "Bob"),
                Segment::text("\u{a0}"),
            ]
        );
        assert_eq!(editor.selection(), Selection::collapsed(editor.document().len()));
        assert!(!editor.completion().is_open());
        assert_eq!(
            drain(&mut rx),
            vec![EditorEvent::ValueChanged(
                "Hi @{\"id\":42,\"name\":\"Bob\",\"isNew\":true}\u{a0}".to_string()
            )]
        );
    }

    #[test]
    fn tab_commits_after_navigation() {
        let (mut editor, _rx) = editor("");
        open_popup(&mut editor, "@bo");
        press(&mut editor, KeyCode::Down);
        assert_eq!(press(&mut editor, KeyCode::Tab), KeyDisposition::Handled);
        assert_eq!(editor.view().text, "@Bobby\u{a0}");
    }

    #[test]
    fn arrow_keys_wrap_around() {
        let (mut editor, _rx) = editor("");
        open_popup(&mut editor, "@bo");
        press(&mut editor, KeyCode::Down);
        press(&mut editor, KeyCode::Down);
        assert_eq!(editor.view().popup.and_then(|p| p.selected), Some(2));
        press(&mut editor, KeyCode::Down);
        assert_eq!(editor.view().popup.and_then(|p| p.selected), Some(0));
        press(&mut editor, KeyCode::Up);
        assert_eq!(editor.view().popup.and_then(|p| p.selected), Some(2));
    }

    #[test]
    fn keys_without_candidates_are_no_ops_except_escape() {
        let (mut editor, mut rx) = editor("x ");
        type_chars(&mut editor, "@zz");
        assert!(editor.on_user_search_result("zz", Ok(Vec::new())));
        drain(&mut rx);

        for code in [KeyCode::Enter, KeyCode::Tab, KeyCode::Up, KeyCode::Down] {
            assert_eq!(press(&mut editor, code), KeyDisposition::Handled);
        }
        assert_eq!(editor.value(), "x @zz");
        assert!(editor.completion().is_open());
        assert_eq!(drain(&mut rx), Vec::new());

        assert_eq!(press(&mut editor, KeyCode::Esc), KeyDisposition::Handled);
        assert!(!editor.completion().is_open());
    }

    #[test]
    fn escape_closes_without_committing_and_stays_closed() {
        let (mut editor, mut rx) = editor("");
        open_popup(&mut editor, "@bo");
        press(&mut editor, KeyCode::Esc);
        assert!(!editor.completion().is_open());
        assert_eq!(editor.value(), "@bo");

        // A key that leaves the trigger unchanged re-detects the same query,
        // which stays dismissed.
        drain(&mut rx);
        press(&mut editor, KeyCode::End);
        assert!(!editor.completion().is_open());
        assert_eq!(drain(&mut rx), Vec::new());

        type_chars(&mut editor, "b");
        assert!(editor.completion().is_open());
    }

    #[test]
    fn keys_without_session_fall_through_to_host() {
        let (mut editor, _rx) = editor("hello");
        assert_eq!(press(&mut editor, KeyCode::Tab), KeyDisposition::Ignored);
        assert_eq!(press(&mut editor, KeyCode::Esc), KeyDisposition::Ignored);
        assert_eq!(press(&mut editor, KeyCode::Up), KeyDisposition::Ignored);
        assert_eq!(
            editor.handle_key_event(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)),
            KeyDisposition::Ignored
        );
        assert_eq!(editor.value(), "hello");
    }

    #[test]
    fn enter_without_session_inserts_newline() {
        let (mut editor, _rx) = editor("a");
        press(&mut editor, KeyCode::Enter);
        editor.handle_key_event(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));
        assert_eq!(editor.value(), "a\n\n");
    }

    #[test]
    fn space_closes_the_session() {
        let (mut editor, _rx) = editor("");
        open_popup(&mut editor, "@bo");
        press(&mut editor, KeyCode::Char(' '));
        assert!(!editor.completion().is_open());
        assert_eq!(editor.value(), "@bo ");
    }

    #[test]
    fn stale_response_is_ignored() {
        let (mut editor, _rx) = editor("");
        type_chars(&mut editor, "@a");
        type_chars(&mut editor, "l");
        let al_users = vec![Candidate::new(1, "Alice")];
        assert!(editor.on_user_search_result("al", Ok(al_users.clone())));
        assert!(!editor.on_user_search_result("a", Ok(users())));
        assert_eq!(
            editor.completion().session().map(|s| s.candidates.clone()),
            Some(al_users)
        );
    }

    #[test]
    fn late_response_never_resurrects_a_closed_session() {
        let (mut editor, _rx) = editor("");
        type_chars(&mut editor, "@al");
        press(&mut editor, KeyCode::Backspace);
        press(&mut editor, KeyCode::Backspace);
        press(&mut editor, KeyCode::Backspace);
        assert!(!editor.completion().is_open());
        assert!(!editor.on_user_search_result("al", Ok(users())));
        assert_eq!(editor.view().popup, None);
    }

    #[test]
    fn pointer_press_commits_candidate() {
        let (mut editor, _rx) = editor("cc ");
        open_popup(&mut editor, "@b");
        assert_eq!(
            editor.handle_candidate_pointer_down(2),
            KeyDisposition::Handled
        );
        assert_eq!(editor.view().text, "cc @Bonnie\u{a0}");
        assert_eq!(
            editor.handle_candidate_pointer_down(0),
            KeyDisposition::Ignored
        );
    }

    #[test]
    fn blur_closes_after_grace_delay() {
        let (mut editor, _rx) = editor("");
        open_popup(&mut editor, "@bo");
        let now = Instant::now();
        editor.handle_blur(now);
        assert!(editor.completion().is_open());
        assert!(!editor.close_if_due(now + Duration::from_millis(100)));
        assert!(editor.close_if_due(now + editor.recommended_blur_close_delay()));
        assert!(!editor.completion().is_open());
        assert_eq!(editor.value(), "@bo");
    }

    #[test]
    fn pointer_commit_during_grace_delay_wins_over_blur() {
        let (mut editor, _rx) = editor("");
        open_popup(&mut editor, "@bo");
        let now = Instant::now();
        editor.handle_blur(now);
        editor.handle_candidate_pointer_down(0);
        assert!(!editor.close_if_due(now + Duration::from_secs(1)));
        assert_eq!(editor.view().text, "@Bob\u{a0}");
    }

    #[test]
    fn repeated_blur_keeps_the_first_deadline() {
        let (mut editor, _rx) = editor("");
        open_popup(&mut editor, "@bo");
        let now = Instant::now();
        editor.handle_blur(now);
        assert!(!editor.has_focus());
        editor.handle_blur(now + Duration::from_millis(150));
        assert!(editor.close_if_due(now + editor.recommended_blur_close_delay()));
        assert!(!editor.completion().is_open());
    }

    #[test]
    fn refocus_cancels_pending_close() {
        let (mut editor, _rx) = editor("");
        open_popup(&mut editor, "@bo");
        let now = Instant::now();
        editor.handle_blur(now);
        editor.handle_focus();
        assert!(editor.has_focus());
        assert!(!editor.close_if_due(now + Duration::from_secs(1)));
        assert!(editor.completion().is_open());
    }

    #[test]
    fn backspace_removes_whole_mention() {
        let (mut editor, mut rx) =
            editor("Hi @{\"id\":42,\"name\":\"Bob\",\"isNew\":true}\u{a0}");
        press(&mut editor, KeyCode::Backspace);
        assert_eq!(editor.view().text, "Hi @Bob");
        press(&mut editor, KeyCode::Backspace);
        assert_eq!(editor.view().text, "Hi ");
        assert_eq!(editor.selection(), Selection::collapsed(3));
        assert_eq!(
            drain(&mut rx).last(),
            Some(&EditorEvent::ValueChanged("Hi ".to_string()))
        );
    }

    #[test]
    fn delete_key_removes_whole_mention() {
        let (mut editor, _rx) = editor("a@{\"id\":1,\"name\":\"Bo\",\"isNew\":true}b");
        editor.set_cursor(1);
        press(&mut editor, KeyCode::Delete);
        assert_eq!(editor.value(), "ab");
    }

    #[test]
    fn arrows_step_over_mentions() {
        let (mut editor, _rx) = editor("a@{\"id\":1,\"name\":\"Bo\",\"isNew\":true}b");
        editor.set_cursor(1);
        press(&mut editor, KeyCode::Right);
        assert_eq!(editor.selection(), Selection::collapsed(4));
        press(&mut editor, KeyCode::Left);
        assert_eq!(editor.selection(), Selection::collapsed(1));
    }

    #[test]
    fn non_collapsed_selection_closes_session() {
        let (mut editor, _rx) = editor("");
        open_popup(&mut editor, "@bo");
        editor.handle_key_event(KeyEvent::new(KeyCode::Left, KeyModifiers::SHIFT));
        assert!(!editor.completion().is_open());
        assert_eq!(editor.selection(), Selection { anchor: 3, head: 2 });
    }

    #[test]
    fn typing_over_selection_replaces_it() {
        let (mut editor, _rx) = editor("hello world");
        editor.set_selection(0, 5);
        type_chars(&mut editor, "bye");
        assert_eq!(editor.value(), "bye world");
    }

    #[test]
    fn paste_normalizes_line_endings() {
        let (mut editor, _rx) = editor("");
        editor.handle_paste("a\r\nb\rc".to_string());
        assert_eq!(editor.value(), "a\nb\nc");
    }

    #[test]
    fn paste_can_open_a_trigger() {
        let (mut editor, mut rx) = editor("");
        editor.handle_paste("hey @al".to_string());
        assert!(editor.completion().is_open());
        assert!(drain(&mut rx).contains(&EditorEvent::StartUserSearch("al".to_string())));
    }

    #[test]
    fn set_value_replaces_content_and_closes_session() {
        let (mut editor, mut rx) = editor("");
        open_popup(&mut editor, "@bo");
        drain(&mut rx);
        editor.set_value("fresh @{\"id\":9,\"name\":\"Eve\",\"isNew\":true}");
        assert!(!editor.completion().is_open());
        assert_eq!(editor.view().text, "fresh @Eve");
        assert_eq!(editor.view().mention_spans, vec![6..10]);
        assert_eq!(
            drain(&mut rx),
            vec![EditorEvent::ValueChanged(
                "fresh @{\"id\":9,\"name\":\"Eve\",\"isNew\":true}".to_string()
            )]
        );
    }

    #[test]
    fn reopened_content_reserializes_identically() {
        let stored = "Thanks @{\"id\":7,\"name\":\"Grace\",\"isNew\":true}\u{a0}!\nBye";
        let (editor, _rx) = editor(stored);
        assert_eq!(editor.value(), stored);
    }

    #[test]
    fn release_events_are_ignored() {
        let (mut editor, _rx) = editor("");
        let mut key = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(editor.handle_key_event(key), KeyDisposition::Ignored);
        assert_eq!(editor.value(), "");
    }
}
