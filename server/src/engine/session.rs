use tokio::sync::mpsc;

use super::events::{ChatEvent, SessionId};

/// Maximum queued outbound events per session (prevents memory exhaustion
/// from slow clients).
pub const MAX_OUTBOUND_QUEUE: usize = 1024;

/// A connected presentation session. The engine doesn't care what kind of
/// client sits on the other end of the feed.
#[derive(Debug)]
pub struct Subscriber {
    pub id: SessionId,
    /// Outbound events to this session's write loop.
    pub outbound: mpsc::Sender<ChatEvent>,
}

impl Subscriber {
    pub fn new(id: SessionId, outbound: mpsc::Sender<ChatEvent>) -> Self {
        Self { id, outbound }
    }

    /// Send an event to this session. Returns false if the channel is closed
    /// or the queue is full — the event is dropped rather than blocking the
    /// engine.
    pub fn send(&self, event: ChatEvent) -> bool {
        self.outbound.try_send(event).is_ok()
    }
}
