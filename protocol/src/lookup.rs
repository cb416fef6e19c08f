//! The seam between the editor and whatever resolves a query to users.

use crate::segment::Candidate;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserSearchError {
    #[error("user lookup failed: {0}")]
    Lookup(String),

    #[error("user lookup task did not complete: {0}")]
    TaskFailed(String),
}

/// Resolves a query string (the text typed after `@`) to candidate users.
///
/// Implementations may block; callers run them off the UI thread.
pub trait UserLookup: Send + Sync {
    fn search_users(&self, query: &str) -> Result<Vec<Candidate>, UserSearchError>;
}

impl<F> UserLookup for F
where
    F: Fn(&str) -> Result<Vec<Candidate>, UserSearchError> + Send + Sync,
{
    fn search_users(&self, query: &str) -> Result<Vec<Candidate>, UserSearchError> {
        self(query)
    }
}
