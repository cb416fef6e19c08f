//! Runs user lookups off the UI thread and reports results as editor events.
//!
//! Queries are debounced: while a search is scheduled, newer queries only
//! replace the pending one, so bursts of typing turn into a single lookup for
//! the latest text. Each finished lookup is posted as
//! [`EditorEvent::UserSearchResult`] tagged with the query that produced it;
//! deciding whether that result is still relevant is the editor's job.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;

use mention_protocol::UserLookup;
use mention_protocol::UserSearchError;
use tokio::runtime::Handle;

use crate::editor_event::EditorEvent;
use crate::editor_event_sender::EditorEventSender;

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(100);

#[derive(Debug, Default)]
struct SearchState {
    latest_query: String,
    is_search_scheduled: bool,
}

pub struct UserSearchManager {
    state: Arc<Mutex<SearchState>>,
    lookup: Arc<dyn UserLookup>,
    debounce: Duration,
    runtime: Handle,
    event_tx: EditorEventSender,
}

impl UserSearchManager {
    pub fn new(
        lookup: Arc<dyn UserLookup>,
        debounce: Duration,
        runtime: Handle,
        event_tx: EditorEventSender,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(SearchState::default())),
            lookup,
            debounce,
            runtime,
            event_tx,
        }
    }

    /// Call whenever the editor asks for a lookup.
    pub fn on_user_query(&self, query: String) {
        {
            let mut state = lock(&self.state);
            state.latest_query = query;
            if state.is_search_scheduled {
                return;
            }
            state.is_search_scheduled = true;
        }

        let state = Arc::clone(&self.state);
        let lookup = Arc::clone(&self.lookup);
        let event_tx = self.event_tx.clone();
        let debounce = self.debounce;
        self.runtime.spawn(async move {
            tokio::time::sleep(debounce).await;

            let query = {
                let mut state = lock(&state);
                state.is_search_scheduled = false;
                state.latest_query.clone()
            };

            let search_query = query.clone();
            let result =
                match tokio::task::spawn_blocking(move || lookup.search_users(&search_query)).await
                {
                    Ok(result) => result,
                    Err(err) => Err(UserSearchError::TaskFailed(err.to_string())),
                };
            tracing::trace!(query = %query, ok = result.is_ok(), "user search finished");
            event_tx.send(EditorEvent::UserSearchResult { query, result });
        });
    }
}

fn lock(state: &Mutex<SearchState>) -> MutexGuard<'_, SearchState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
