use std::sync::Arc;

use serde::Serialize;

/// Presence status shown next to a participant in the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Online,
    Idle,
    Dnd,
    Offline,
}

/// A chat participant. Immutable once created — every message an author
/// sends shares the same `Arc<Participant>`.
#[derive(Debug, Clone, Serialize)]
pub struct Participant {
    pub id: String,
    pub username: String,
    pub discriminator: String,
    pub avatar_url: String,
    pub status: Presence,
    pub is_bot: bool,
}

/// The fixed set of identities known to this process: the human user and
/// the resident AI agent.
#[derive(Debug)]
pub struct Roster {
    pub user: Arc<Participant>,
    pub agent: Arc<Participant>,
}

impl Roster {
    pub fn seed() -> Self {
        Self {
            user: Arc::new(Participant {
                id: "user-1".into(),
                username: "ada".into(),
                discriminator: "1337".into(),
                avatar_url: "https://picsum.photos/id/64/100/100".into(),
                status: Presence::Online,
                is_bot: false,
            }),
            agent: Arc::new(Participant {
                id: "bot-gemini".into(),
                username: "Gemini".into(),
                discriminator: "0001".into(),
                avatar_url:
                    "https://upload.wikimedia.org/wikipedia/commons/8/8a/Google_Gemini_logo.svg"
                        .into(),
                status: Presence::Online,
                is_bot: true,
            }),
        }
    }

    /// All participants, user first.
    pub fn all(&self) -> Vec<Arc<Participant>> {
        vec![self.user.clone(), self.agent.clone()]
    }
}
