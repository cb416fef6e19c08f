//! In-memory user directory used as the mention lookup collaborator.
//!
//! Names are ranked with `nucleo`'s fuzzy matcher (case-insensitive), best
//! score first, ties broken by name and then id so results are stable.

use std::cmp::Reverse;
use std::path::Path;
use std::path::PathBuf;

use mention_protocol::Candidate;
use mention_protocol::UserLookup;
use mention_protocol::UserSearchError;
use nucleo::Config;
use nucleo::Matcher;
use nucleo::Utf32Str;
use nucleo::pattern::CaseMatching;
use nucleo::pattern::Normalization;
use nucleo::pattern::Pattern;

/// Maximum number of candidates returned per query unless overridden.
pub const DEFAULT_LIMIT: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("failed to read user directory {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid user directory JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct UserDirectory {
    /// Sorted by name, then id.
    users: Vec<Candidate>,
    limit: usize,
}

impl UserDirectory {
    pub fn new(mut users: Vec<Candidate>) -> Self {
        users.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Self {
            users,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Cap the number of results per query. A limit of zero is treated as one.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Parse a JSON array such as `[{"id":1,"name":"Ada"}]`.
    pub fn from_json_str(json: &str) -> Result<Self, DirectoryError> {
        let users: Vec<Candidate> = serde_json::from_str(json)?;
        Ok(Self::new(users))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, DirectoryError> {
        let json = std::fs::read_to_string(path).map_err(|source| DirectoryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let directory = Self::from_json_str(&json)?;
        tracing::debug!(
            "loaded {} users from {}",
            directory.users.len(),
            path.display()
        );
        Ok(directory)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Return up to `limit` users whose names fuzzy-match `query`.
    ///
    /// An empty query lists the first users in name order.
    pub fn search(&self, query: &str) -> Vec<Candidate> {
        let query = query.trim();
        if query.is_empty() {
            return self.users.iter().take(self.limit).cloned().collect();
        }

        let pattern = Pattern::parse(query, CaseMatching::Ignore, Normalization::Smart);
        let mut matcher = Matcher::new(Config::DEFAULT);
        let mut buf = Vec::new();
        let mut scored: Vec<(u32, &Candidate)> = self
            .users
            .iter()
            .filter_map(|user| {
                pattern
                    .score(Utf32Str::new(&user.name, &mut buf), &mut matcher)
                    .map(|score| (score, user))
            })
            .collect();

        // `users` is already in name/id order and the sort is stable, so
        // equal scores keep that order.
        scored.sort_by_key(|(score, _)| Reverse(*score));
        scored
            .into_iter()
            .take(self.limit)
            .map(|(_, user)| user.clone())
            .collect()
    }
}

impl UserLookup for UserDirectory {
    fn search_users(&self, query: &str) -> Result<Vec<Candidate>, UserSearchError> {
        Ok(self.search(query))
    }
}
