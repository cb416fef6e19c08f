//! Events the editor emits toward its host.

use mention_protocol::Candidate;
use mention_protocol::UserSearchError;

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// The content changed; carries the new wire-format string.
    ValueChanged(String),

    /// Kick off an asynchronous user lookup for the given query (text after
    /// the `@`).
    StartUserSearch(String),

    /// Result of a completed asynchronous user lookup. The `query` echoes the
    /// original search term so the editor can decide whether the results are
    /// still relevant.
    UserSearchResult {
        query: String,
        result: Result<Vec<Candidate>, UserSearchError>,
    },
}
