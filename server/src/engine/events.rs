use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::store::Message;

/// Unique identifier for a connected session (one per connection).
pub type SessionId = Uuid;

/// Event pushed to connected presentation sessions as state changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A message was appended to a channel's log.
    Message {
        channel_id: String,
        message: MessageInfo,
    },

    /// The AI participant started composing a reply in a channel.
    TypingStart { channel_id: String },

    /// The AI participant finished its turn, successfully or not.
    TypingStop { channel_id: String },
}

/// Wire shape of a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageInfo {
    pub id: Uuid,
    pub author_id: String,
    pub author_name: String,
    pub author_avatar_url: String,
    pub author_is_bot: bool,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_ai_response: bool,
}

impl MessageInfo {
    pub fn from_message(msg: &Message) -> Self {
        Self {
            id: msg.id,
            author_id: msg.author.id.clone(),
            author_name: msg.author.username.clone(),
            author_avatar_url: msg.author.avatar_url.clone(),
            author_is_bot: msg.author.is_bot,
            content: msg.content.clone(),
            timestamp: msg.timestamp,
            is_ai_response: msg.is_ai_response,
        }
    }
}
