use tokio::sync::mpsc::UnboundedSender;

use crate::editor_event::EditorEvent;

#[derive(Clone, Debug)]
pub struct EditorEventSender {
    event_tx: UnboundedSender<EditorEvent>,
}

impl EditorEventSender {
    pub fn new(event_tx: UnboundedSender<EditorEvent>) -> Self {
        Self { event_tx }
    }

    /// Send an event to the host channel. If it fails, we swallow the error and
    /// log it.
    pub fn send(&self, event: EditorEvent) {
        if let Err(err) = self.event_tx.send(event) {
            tracing::warn!("failed to send editor event: {err}");
        }
    }
}
