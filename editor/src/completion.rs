//! Autocomplete controller for `@` mentions.
//!
//! The controller is a two-state machine, [`CompletionState::Closed`] and
//! [`CompletionState::Open`]. It never talks to the lookup collaborator
//! directly: [`MentionCompletion::sync`] returns the query that needs a lookup
//! and the caller issues it. Responses come back through
//! [`MentionCompletion::apply_results`], which only accepts a response for the
//! query most recently issued by a session that is still open. A late response
//! for an older query, or for a session that has since closed, is dropped.

use std::ops::Range;

use derive_more::IsVariant;
use mention_protocol::Candidate;
use mention_protocol::UserSearchError;

use crate::trigger::Trigger;

const NO_USERS_FOUND: &str = "no users found";
const SEARCHING: &str = "searching...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSession {
    pub trigger_span: Range<usize>,
    pub query: String,
    /// Replaced wholesale by each accepted lookup response.
    pub candidates: Vec<Candidate>,
    pub highlighted_index: usize,
    /// Only a response for this query is applied.
    pub last_issued_query: String,
    /// True until the response for `last_issued_query` arrives.
    pub awaiting_results: bool,
}

impl CompletionSession {
    fn new(trigger: Trigger) -> Self {
        Self {
            trigger_span: trigger.span,
            last_issued_query: trigger.query.clone(),
            query: trigger.query,
            candidates: Vec::new(),
            highlighted_index: 0,
            awaiting_results: true,
        }
    }

    pub fn highlighted(&self) -> Option<&Candidate> {
        self.candidates.get(self.highlighted_index)
    }

    fn move_up(&mut self) {
        let len = self.candidates.len();
        if len == 0 {
            return;
        }
        self.highlighted_index = if self.highlighted_index == 0 {
            len - 1
        } else {
            self.highlighted_index - 1
        };
    }

    fn move_down(&mut self) {
        let len = self.candidates.len();
        if len == 0 {
            return;
        }
        self.highlighted_index = (self.highlighted_index + 1) % len;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, IsVariant)]
pub enum CompletionState {
    #[default]
    Closed,
    Open(CompletionSession),
}

/// A render-ready snapshot of the open session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupView {
    pub query: String,
    pub rows: Vec<PopupRow>,
    pub selected: Option<usize>,
    /// Shown instead of rows when there are no candidates.
    pub empty_message: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupRow {
    pub label: String,
    pub candidate: Candidate,
}

#[derive(Debug, Default)]
pub struct MentionCompletion {
    state: CompletionState,
    /// Trigger the user closed with Esc. The same trigger does not reopen the
    /// session until the query or its position changes.
    dismissed: Option<Trigger>,
}

impl MentionCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CompletionState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn session(&self) -> Option<&CompletionSession> {
        match &self.state {
            CompletionState::Open(session) => Some(session),
            CompletionState::Closed => None,
        }
    }

    pub fn has_candidates(&self) -> bool {
        self.session()
            .is_some_and(|session| !session.candidates.is_empty())
    }

    pub fn selected_candidate(&self) -> Option<&Candidate> {
        self.session().and_then(CompletionSession::highlighted)
    }

    pub fn candidate_at(&self, index: usize) -> Option<&Candidate> {
        self.session()
            .and_then(|session| session.candidates.get(index))
    }

    /// Reconcile the session with the trigger detected after an edit or caret
    /// move. Returns the query that must be looked up, if a new one was issued.
    pub fn sync(&mut self, trigger: Option<Trigger>) -> Option<String> {
        let Some(trigger) = trigger else {
            self.dismissed = None;
            self.close();
            return None;
        };

        if self.dismissed.as_ref() == Some(&trigger) {
            return None;
        }
        self.dismissed = None;

        match &mut self.state {
            CompletionState::Open(session) => {
                session.trigger_span = trigger.span;
                if session.query == trigger.query {
                    return None;
                }
                tracing::trace!(query = %trigger.query, "mention query changed");
                session.query = trigger.query.clone();
                session.last_issued_query = trigger.query.clone();
                session.awaiting_results = true;
                Some(trigger.query)
            }
            CompletionState::Closed => {
                tracing::debug!(query = %trigger.query, "opening mention session");
                let query = trigger.query.clone();
                self.state = CompletionState::Open(CompletionSession::new(trigger));
                Some(query)
            }
        }
    }

    /// Apply a lookup response. Returns whether it was accepted.
    pub fn apply_results(
        &mut self,
        query: &str,
        result: Result<Vec<Candidate>, UserSearchError>,
    ) -> bool {
        let CompletionState::Open(session) = &mut self.state else {
            tracing::trace!(query, "dropping user search result for closed session");
            return false;
        };
        if session.last_issued_query != query {
            tracing::trace!(
                query,
                current = %session.last_issued_query,
                "dropping stale user search result"
            );
            return false;
        }

        let mut candidates = result.unwrap_or_else(|err| {
            tracing::warn!("user search for {query:?} failed: {err}");
            Vec::new()
        });
        // A nameless mention would not survive the wire format.
        candidates.retain(|candidate| !candidate.name.is_empty());

        session.candidates = candidates;
        session.highlighted_index = 0;
        session.awaiting_results = false;
        true
    }

    pub fn move_up(&mut self) {
        if let CompletionState::Open(session) = &mut self.state {
            session.move_up();
        }
    }

    pub fn move_down(&mut self) {
        if let CompletionState::Open(session) = &mut self.state {
            session.move_down();
        }
    }

    /// Close in response to Esc, remembering the trigger so it stays closed.
    pub fn dismiss(&mut self) {
        if let CompletionState::Open(session) = std::mem::take(&mut self.state) {
            tracing::debug!(query = %session.query, "mention session dismissed");
            self.dismissed = Some(Trigger {
                span: session.trigger_span,
                query: session.query,
            });
        }
    }

    pub fn close(&mut self) {
        if let CompletionState::Open(session) = std::mem::take(&mut self.state) {
            tracing::debug!(query = %session.query, "mention session closed");
        }
    }

    /// Close the session and hand it to the caller, e.g. to commit a candidate.
    pub fn take_session(&mut self) -> Option<CompletionSession> {
        match std::mem::take(&mut self.state) {
            CompletionState::Open(session) => Some(session),
            CompletionState::Closed => None,
        }
    }

    pub fn popup_view(&self) -> Option<PopupView> {
        let session = self.session()?;
        let rows = session
            .candidates
            .iter()
            .map(|candidate| PopupRow {
                label: format!("@{}", candidate.name),
                candidate: candidate.clone(),
            })
            .collect::<Vec<_>>();
        let empty_message = match (rows.is_empty(), session.awaiting_results) {
            (false, _) => None,
            (true, true) => Some(SEARCHING),
            (true, false) => Some(NO_USERS_FOUND),
        };
        Some(PopupView {
            query: session.query.clone(),
            selected: (!rows.is_empty()).then_some(session.highlighted_index),
            rows,
            empty_message,
        })
    }
}
