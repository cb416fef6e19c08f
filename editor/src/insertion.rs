//! Commit a chosen candidate into the document.

use mention_protocol::Candidate;

use crate::completion::MentionCompletion;
use crate::document::Document;

/// Outcome of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedMention {
    /// Caret position after the spacer that follows the new mention.
    pub cursor: usize,
    /// Wire string of the updated document, for the host's change callback.
    pub value: String,
}

/// Replace the session's trigger span (`@` plus the typed query) with a
/// mention for `candidate`, closing the session.
///
/// Returns `None` and leaves the document untouched when no session is open.
pub fn commit_mention(
    document: &mut Document,
    completion: &mut MentionCompletion,
    candidate: &Candidate,
) -> Option<CommittedMention> {
    let session = completion.take_session()?;
    let removed = document.delete_range(session.trigger_span);
    let cursor = document.insert_mention(removed.start, candidate);
    tracing::debug!(
        user_id = %candidate.id,
        query = %session.query,
        "committed mention"
    );
    Some(CommittedMention {
        cursor,
        value: document.to_wire(),
    })
}
