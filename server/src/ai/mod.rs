//! Completion-provider boundary for the resident AI participant.
//!
//! The orchestrator only ever talks to the [`CompletionProvider`] trait, so
//! tests substitute their own backend and the Gemini client stays swappable.

mod gemini;

pub use gemini::{DEFAULT_MODEL, GeminiProvider};

use async_trait::async_trait;

/// Role tag for one turn of bounded conversation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// One prior message translated for the provider.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

/// A generative-AI completion backend.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate a reply to `prompt` given the bounded `history`, oldest
    /// turn first. An empty string is a valid success — the caller decides
    /// what to do with it.
    async fn complete(&self, prompt: &str, history: &[ChatTurn]) -> Result<String, String>;
}
