//! Drives a [`MentionEditor`] from script steps and pumps its event channel.
//!
//! The session plays the host role: it forwards `StartUserSearch` to the
//! [`UserSearchManager`], feeds finished lookups back into the editor, keeps
//! the last value reported through `ValueChanged`, and ticks the blur
//! deadline while waiting.

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use mention_editor::EditorConfig;
use mention_editor::EditorEvent;
use mention_editor::EditorEventSender;
use mention_editor::KeyDisposition;
use mention_editor::MentionEditor;
use mention_editor::UserLookup;
use mention_editor::UserSearchManager;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::unbounded_channel;

use crate::config::Settings;
use crate::render::render;
use crate::script::ScriptError;
use crate::script::ScriptStep;
use crate::script::parse_line;

const TICK: Duration = Duration::from_millis(10);

enum Wake {
    Event(EditorEvent),
    Tick,
    Done,
}

pub struct Session {
    editor: MentionEditor,
    search: UserSearchManager,
    events: UnboundedReceiver<EditorEvent>,
    /// Last value reported through `ValueChanged`.
    value: String,
}

impl Session {
    /// Must be called from within a tokio runtime.
    pub fn new(initial_value: &str, lookup: Arc<dyn UserLookup>, settings: Settings) -> Self {
        let (event_tx, events) = unbounded_channel();
        let event_tx = EditorEventSender::new(event_tx);
        let editor = MentionEditor::new(
            initial_value,
            event_tx.clone(),
            EditorConfig {
                blur_close_delay: settings.blur_close_delay,
            },
        );
        let search = UserSearchManager::new(
            lookup,
            settings.search_debounce,
            Handle::current(),
            event_tx,
        );
        let value = editor.value();
        Self {
            editor,
            search,
            events,
            value,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Run one script line and return the rendered state afterwards.
    pub async fn run_line(&mut self, line: &str) -> Result<String, ScriptError> {
        for step in parse_line(line)? {
            self.run_step(step).await;
        }
        Ok(self.render())
    }

    pub fn render(&self) -> String {
        render(&self.editor.view(), &self.value)
    }

    pub async fn run_step(&mut self, step: ScriptStep) {
        match step {
            ScriptStep::Key(key_event) => {
                if self.editor.handle_key_event(key_event) == KeyDisposition::Ignored {
                    tracing::debug!(?key_event, "key ignored by editor");
                }
            }
            ScriptStep::Pick(index) => {
                if self.editor.handle_candidate_pointer_down(index) == KeyDisposition::Ignored {
                    tracing::debug!(index, "no candidate to pick");
                }
            }
            ScriptStep::Blur => self.editor.handle_blur(Instant::now()),
            ScriptStep::Focus => self.editor.handle_focus(),
            ScriptStep::Wait(duration) => self.wait(duration).await,
        }
        self.drain_events();
    }

    /// Handle whatever is already queued without blocking.
    fn drain_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(event) => self.handle_event(event),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
    }

    async fn wait(&mut self, duration: Duration) {
        let deadline = tokio::time::Instant::now() + duration;
        let mut ticker = tokio::time::interval(TICK);
        loop {
            let wake = tokio::select! {
                Some(event) = self.events.recv() => Wake::Event(event),
                _ = ticker.tick() => Wake::Tick,
                _ = tokio::time::sleep_until(deadline) => Wake::Done,
            };
            match wake {
                Wake::Event(event) => self.handle_event(event),
                Wake::Tick => {
                    if self.editor.close_if_due(Instant::now()) {
                        tracing::debug!("popup closed after blur");
                    }
                }
                Wake::Done => break,
            }
        }
        self.editor.close_if_due(Instant::now());
    }

    fn handle_event(&mut self, event: EditorEvent) {
        match event {
            EditorEvent::ValueChanged(value) => self.value = value,
            EditorEvent::StartUserSearch(query) => self.search.on_user_query(query),
            EditorEvent::UserSearchResult { query, result } => {
                if !self.editor.on_user_search_result(&query, result) {
                    tracing::trace!(query = %query, "ignored stale user search result");
                }
            }
        }
    }
}
