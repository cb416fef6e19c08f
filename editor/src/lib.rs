//! Mention-aware text editing core.
//!
//! The editor keeps its content as a [`Document`] of text and mention segments,
//! serializes it to the wire format on every change, and runs an `@`
//! autocomplete session against an external user lookup.

mod completion;
mod deferred_close;
mod document;
mod editor_event;
mod editor_event_sender;
mod insertion;
mod mention_editor;
mod trigger;
mod user_search;

pub use completion::CompletionSession;
pub use completion::CompletionState;
pub use completion::MentionCompletion;
pub use completion::PopupRow;
pub use completion::PopupView;
pub use deferred_close::DEFAULT_BLUR_CLOSE_DELAY;
pub use deferred_close::DeferredClose;
pub use document::Document;
pub use document::MENTION_SPACER;
pub use document::Selection;
pub use document::TextRun;
pub use editor_event::EditorEvent;
pub use editor_event_sender::EditorEventSender;
pub use insertion::CommittedMention;
pub use insertion::commit_mention;
pub use mention_editor::EditorConfig;
pub use mention_editor::EditorView;
pub use mention_editor::KeyDisposition;
pub use mention_editor::MentionEditor;
pub use trigger::Trigger;
pub use trigger::detect_trigger;
pub use user_search::DEFAULT_SEARCH_DEBOUNCE;
pub use user_search::UserSearchManager;

pub use mention_protocol::Candidate;
pub use mention_protocol::Segment;
pub use mention_protocol::UserId;
pub use mention_protocol::UserLookup;
pub use mention_protocol::UserSearchError;
