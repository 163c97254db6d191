use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::ai::{ChatTurn, CompletionProvider, Role};

use super::roster::Participant;
use super::store::Message;

/// Fallback reply when the provider succeeds but returns nothing.
pub const EMPTY_REPLY_FALLBACK: &str = "I'm sorry, I couldn't generate a response.";

/// Diagnostic appended in place of a reply when the provider call fails.
/// Failures degrade to a visible chat message, never to a crash or a
/// silent drop.
pub const PROVIDER_FAILURE_NOTICE: &str =
    "Error: Failed to connect to my brain. Check your API configuration.";

/// Tunables for when and how the AI participant takes a turn.
#[derive(Debug, Clone)]
pub struct TurnSettings {
    /// Channel name in which every submission gets a reply.
    pub ai_channel: String,
    /// Mention token that summons the agent from any channel
    /// (case-insensitive substring match).
    pub mention: String,
    /// How many prior messages prime the provider per turn.
    pub history_window: usize,
    /// Upper bound on one provider call; elapsing it takes the failure path.
    pub request_timeout: Duration,
}

impl Default for TurnSettings {
    fn default() -> Self {
        Self {
            ai_channel: "ai-chat".into(),
            mention: "@gemini".into(),
            history_window: 10,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Per-channel phase of the reply state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    AwaitingResponse,
}

/// Decides when the AI participant replies, builds the bounded history,
/// drives the provider call, and shapes the outcome into a message.
///
/// At most one turn is in flight per channel — a second trigger for the
/// same channel waits its turn. Channels are independent.
pub struct Orchestrator {
    provider: Arc<dyn CompletionProvider>,
    agent: Arc<Participant>,
    settings: TurnSettings,
    /// Serializes turns per channel key.
    turn_locks: DashMap<String, Arc<Mutex<()>>>,
    /// Current phase per channel; absent means idle.
    phases: DashMap<String, TurnPhase>,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        agent: Arc<Participant>,
        mut settings: TurnSettings,
    ) -> Self {
        settings.mention = settings.mention.to_lowercase();
        Self {
            provider,
            agent,
            settings,
            turn_locks: DashMap::new(),
            phases: DashMap::new(),
        }
    }

    pub fn history_window(&self) -> usize {
        self.settings.history_window
    }

    /// Trigger predicate, evaluated once per submission: reply when the
    /// channel is the designated AI channel, or when the text mentions the
    /// agent anywhere.
    pub fn should_respond(&self, channel_name: &str, text: &str) -> bool {
        channel_name == self.settings.ai_channel
            || text.to_lowercase().contains(&self.settings.mention)
    }

    /// Translate the already-sent tail of a channel into role-tagged turns,
    /// oldest first, bounded to the configured window. `prior` must exclude
    /// the triggering submission.
    pub fn build_history(&self, prior: &[Message]) -> Vec<ChatTurn> {
        let start = prior.len().saturating_sub(self.settings.history_window);
        prior[start..]
            .iter()
            .map(|msg| ChatTurn {
                role: if msg.author.id == self.agent.id {
                    Role::Model
                } else {
                    Role::User
                },
                text: msg.content.clone(),
            })
            .collect()
    }

    pub fn phase(&self, channel_id: &str) -> TurnPhase {
        self.phases
            .get(channel_id)
            .map(|p| *p)
            .unwrap_or(TurnPhase::Idle)
    }

    /// Typing indicator: asserted exactly while a turn awaits the provider.
    pub fn is_typing(&self, channel_id: &str) -> bool {
        self.phase(channel_id) == TurnPhase::AwaitingResponse
    }

    fn turn_lock(&self, channel_id: &str) -> Arc<Mutex<()>> {
        self.turn_locks
            .entry(channel_id.to_string())
            .or_default()
            .clone()
    }

    /// Run one full turn: wait for the channel to be free, call the
    /// provider with a bounded timeout, and shape the outcome into the
    /// reply message. Every path leaves the channel idle again.
    pub async fn run_turn(
        &self,
        channel_id: &str,
        prompt: &str,
        history: Vec<ChatTurn>,
    ) -> Message {
        let lock = self.turn_lock(channel_id);
        let _guard = lock.lock().await;

        self.phases
            .insert(channel_id.to_string(), TurnPhase::AwaitingResponse);

        let outcome = tokio::time::timeout(
            self.settings.request_timeout,
            self.provider.complete(prompt, &history),
        )
        .await;

        let content = match outcome {
            Ok(Ok(text)) if !text.trim().is_empty() => text,
            Ok(Ok(_)) => {
                info!(%channel_id, "provider returned an empty reply");
                EMPTY_REPLY_FALLBACK.to_string()
            }
            Ok(Err(e)) => {
                warn!(%channel_id, error = %e, "provider call failed");
                PROVIDER_FAILURE_NOTICE.to_string()
            }
            Err(_) => {
                warn!(%channel_id, timeout = ?self.settings.request_timeout, "provider call timed out");
                PROVIDER_FAILURE_NOTICE.to_string()
            }
        };

        self.phases.insert(channel_id.to_string(), TurnPhase::Idle);

        Message::ai_response(self.agent.clone(), content)
    }
}
