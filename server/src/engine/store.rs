use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use super::roster::Participant;

/// Unique identifier for a message.
pub type MessageId = Uuid;

/// A single chat message. Id, author, content, and timestamp are immutable
/// once created — the log has no edit or delete path.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: MessageId,
    /// Shared, not owned: every message by the same author points at the
    /// same participant record.
    pub author: Arc<Participant>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Set when the message was produced by the AI turn orchestrator.
    pub is_ai_response: bool,
}

impl Message {
    pub fn new(author: Arc<Participant>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author,
            content: content.into(),
            timestamp: Utc::now(),
            is_ai_response: false,
        }
    }

    pub fn ai_response(author: Arc<Participant>, content: impl Into<String>) -> Self {
        Self {
            is_ai_response: true,
            ..Self::new(author, content)
        }
    }
}

/// Per-channel append-only message log. A channel's sequence is created
/// lazily on first append and is never reordered or truncated afterwards.
#[derive(Debug, Default)]
pub struct MessageStore {
    logs: DashMap<String, Vec<Message>>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self {
            logs: DashMap::new(),
        }
    }

    /// Append a message to the end of the channel's sequence. The store
    /// never rejects a structurally valid message — content validation
    /// happens before this point.
    pub fn append(&self, channel_id: &str, message: Message) {
        self.logs
            .entry(channel_id.to_string())
            .or_default()
            .push(message);
    }

    /// The full ordered sequence for a channel, or empty if nothing has
    /// been sent there yet.
    pub fn read(&self, channel_id: &str) -> Vec<Message> {
        self.logs
            .get(channel_id)
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    /// The trailing `n` messages of a channel, oldest first.
    pub fn read_last(&self, channel_id: &str, n: usize) -> Vec<Message> {
        self.logs
            .get(channel_id)
            .map(|log| {
                let start = log.len().saturating_sub(n);
                log[start..].to_vec()
            })
            .unwrap_or_default()
    }

    pub fn len(&self, channel_id: &str) -> usize {
        self.logs.get(channel_id).map(|log| log.len()).unwrap_or(0)
    }
}
