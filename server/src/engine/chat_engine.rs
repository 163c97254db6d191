use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::ai::{ChatTurn, CompletionProvider};

use super::directory::{ChannelKind, Directory};
use super::events::{ChatEvent, MessageInfo, SessionId};
use super::orchestrator::{Orchestrator, TurnSettings};
use super::roster::Roster;
use super::session::{MAX_OUTBOUND_QUEUE, Subscriber};
use super::store::{Message, MessageId, MessageStore};
use super::validation;

/// Greeting seeded into the default channel at startup.
const WELCOME_MESSAGE: &str = "Welcome! Feel free to ask me anything in #ai-chat.";

/// The central hub that manages all chat state. Protocol-agnostic — the
/// REST and WebSocket adapters both call into this.
pub struct ChatEngine {
    roster: Roster,
    directory: Directory,
    store: Arc<MessageStore>,
    orchestrator: Arc<Orchestrator>,
    /// All currently connected sessions, keyed by session ID.
    sessions: Arc<DashMap<SessionId, Subscriber>>,
}

impl ChatEngine {
    pub fn new(provider: Arc<dyn CompletionProvider>, settings: TurnSettings) -> Self {
        let roster = Roster::seed();
        let orchestrator = Arc::new(Orchestrator::new(provider, roster.agent.clone(), settings));
        Self {
            roster,
            directory: Directory::seed(),
            store: Arc::new(MessageStore::new()),
            orchestrator,
            sessions: Arc::new(DashMap::new()),
        }
    }

    /// Seed the default channel with the agent's greeting.
    pub fn seed_welcome(&self) {
        let channel = self.directory.default_channel();
        self.store
            .append(&channel.id, Message::new(self.roster.agent.clone(), WELCOME_MESSAGE));
        info!(channel = %channel.name, "seeded welcome message");
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// The full ordered message sequence of a channel.
    pub fn messages(&self, channel_id: &str) -> Vec<Message> {
        self.store.read(channel_id)
    }

    /// Whether the agent is composing a reply in this channel.
    pub fn is_typing(&self, channel_id: &str) -> bool {
        self.orchestrator.is_typing(channel_id)
    }

    // ── Session management ──────────────────────────────────────────

    /// Register a presentation session. Returns its ID and the event feed.
    pub fn subscribe(&self) -> (SessionId, mpsc::Receiver<ChatEvent>) {
        let session_id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(MAX_OUTBOUND_QUEUE);
        self.sessions
            .insert(session_id, Subscriber::new(session_id, tx));
        info!(%session_id, "session subscribed");
        (session_id, rx)
    }

    pub fn unsubscribe(&self, session_id: SessionId) {
        if self.sessions.remove(&session_id).is_some() {
            info!(%session_id, "session unsubscribed");
        }
    }

    // ── Submission ──────────────────────────────────────────────────

    /// Submit a message from the human user into a channel.
    ///
    /// The message is validated and appended synchronously, so it is visible
    /// to reads before this returns. When the submission summons the agent,
    /// the reply turn runs on its own task — the caller never waits on the
    /// provider.
    pub fn submit(&self, channel_id: &str, content: &str) -> Result<MessageId, String> {
        validation::validate_message(content)?;

        let channel = self
            .directory
            .find_channel(channel_id)
            .ok_or_else(|| format!("No such channel: {channel_id}"))?;
        if channel.kind != ChannelKind::Text {
            return Err(format!("Channel {} does not accept messages", channel.name));
        }

        let triggered = self.orchestrator.should_respond(&channel.name, content);

        // History for a triggered turn is the channel tail as of submission
        // time, without the triggering message itself.
        let history = if triggered {
            let prior = self
                .store
                .read_last(channel_id, self.orchestrator.history_window());
            Some(self.orchestrator.build_history(&prior))
        } else {
            None
        };

        let message = Message::new(self.roster.user.clone(), content);
        let message_id = message.id;
        self.store.append(channel_id, message.clone());
        broadcast(
            &self.sessions,
            ChatEvent::Message {
                channel_id: channel_id.to_string(),
                message: MessageInfo::from_message(&message),
            },
        );

        if let Some(history) = history {
            let orchestrator = self.orchestrator.clone();
            let store = self.store.clone();
            let sessions = self.sessions.clone();
            let channel_id = channel_id.to_string();
            let prompt = content.to_string();
            tokio::spawn(async move {
                run_ai_turn(orchestrator, store, sessions, channel_id, prompt, history).await;
            });
        }

        Ok(message_id)
    }
}

/// Drive one AI turn and merge the outcome back into the timeline. The
/// typing indicator is cleared on every path.
async fn run_ai_turn(
    orchestrator: Arc<Orchestrator>,
    store: Arc<MessageStore>,
    sessions: Arc<DashMap<SessionId, Subscriber>>,
    channel_id: String,
    prompt: String,
    history: Vec<ChatTurn>,
) {
    broadcast(
        &sessions,
        ChatEvent::TypingStart {
            channel_id: channel_id.clone(),
        },
    );

    let reply = orchestrator.run_turn(&channel_id, &prompt, history).await;

    store.append(&channel_id, reply.clone());
    broadcast(
        &sessions,
        ChatEvent::Message {
            channel_id: channel_id.clone(),
            message: MessageInfo::from_message(&reply),
        },
    );
    broadcast(&sessions, ChatEvent::TypingStop { channel_id });
}

/// Push an event to every connected session.
fn broadcast(sessions: &DashMap<SessionId, Subscriber>, event: ChatEvent) {
    for session in sessions.iter() {
        if !session.send(event.clone()) {
            warn!(session_id = %session.id, "failed to send event to session (queue closed or full)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::Role;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::time::timeout;

    struct StubProvider {
        reply: Result<String, String>,
    }

    #[async_trait]
    impl CompletionProvider for StubProvider {
        async fn complete(&self, _prompt: &str, _history: &[ChatTurn]) -> Result<String, String> {
            self.reply.clone()
        }
    }

    fn engine_with_reply(reply: &str) -> ChatEngine {
        ChatEngine::new(
            Arc::new(StubProvider {
                reply: Ok(reply.to_string()),
            }),
            TurnSettings::default(),
        )
    }

    async fn next_event(rx: &mut mpsc::Receiver<ChatEvent>) -> ChatEvent {
        timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event feed closed")
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_input() {
        let engine = engine_with_reply("ok");
        assert!(engine.submit("chan-1", "").is_err());
        assert!(engine.submit("chan-1", "   ").is_err());
        assert!(engine.submit("chan-999", "hello").is_err());
        // voice-lounge takes no messages
        assert!(engine.submit("chan-4", "hello").is_err());
        assert_eq!(engine.messages("chan-1").len(), 0);
    }

    #[tokio::test]
    async fn test_plain_submission_does_not_summon_agent() {
        let engine = engine_with_reply("should never appear");
        let (_sid, mut rx) = engine.subscribe();

        engine.submit("chan-1", "hi").unwrap();

        match next_event(&mut rx).await {
            ChatEvent::Message { message, .. } => assert_eq!(message.content, "hi"),
            other => panic!("expected message event, got {other:?}"),
        }

        // No turn was started: nothing else arrives and the indicator is off.
        assert!(!engine.is_typing("chan-1"));
        let extra = timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(extra.is_err(), "unexpected extra event");
        assert_eq!(engine.messages("chan-1").len(), 1);
    }

    #[tokio::test]
    async fn test_ai_channel_submission_gets_reply() {
        let engine = engine_with_reply("Recursion is...");
        let (_sid, mut rx) = engine.subscribe();

        engine.submit("chan-2", "explain recursion").unwrap();

        match next_event(&mut rx).await {
            ChatEvent::Message { message, .. } => assert!(!message.is_ai_response),
            other => panic!("expected user message, got {other:?}"),
        }
        assert!(matches!(
            next_event(&mut rx).await,
            ChatEvent::TypingStart { .. }
        ));
        match next_event(&mut rx).await {
            ChatEvent::Message { message, .. } => {
                assert_eq!(message.content, "Recursion is...");
                assert!(message.is_ai_response);
                assert!(message.author_is_bot);
            }
            other => panic!("expected AI reply, got {other:?}"),
        }
        assert!(matches!(
            next_event(&mut rx).await,
            ChatEvent::TypingStop { .. }
        ));

        let messages = engine.messages("chan-2");
        assert_eq!(messages.len(), 2);
        assert!(messages[1].is_ai_response);
        assert!(!engine.is_typing("chan-2"));
    }

    #[tokio::test]
    async fn test_mention_summons_agent_outside_ai_channel() {
        let engine = engine_with_reply("you rang?");
        let (_sid, mut rx) = engine.subscribe();

        engine.submit("chan-1", "hey @Gemini, you there?").unwrap();

        // user message, typing start, reply, typing stop
        let _ = next_event(&mut rx).await;
        let _ = next_event(&mut rx).await;
        match next_event(&mut rx).await {
            ChatEvent::Message { message, .. } => assert_eq!(message.content, "you rang?"),
            other => panic!("expected AI reply, got {other:?}"),
        }
    }

    /// Records what the provider was primed with.
    struct RecordingProvider {
        calls: std::sync::Mutex<Vec<(String, Vec<ChatTurn>)>>,
    }

    #[async_trait]
    impl CompletionProvider for RecordingProvider {
        async fn complete(&self, prompt: &str, history: &[ChatTurn]) -> Result<String, String> {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), history.to_vec()));
            Ok("noted".into())
        }
    }

    #[tokio::test]
    async fn test_turn_history_excludes_submission_and_tags_roles() {
        let provider = Arc::new(RecordingProvider {
            calls: std::sync::Mutex::new(Vec::new()),
        });
        let engine = ChatEngine::new(provider.clone(), TurnSettings::default());
        let (_sid, mut rx) = engine.subscribe();

        // First triggered exchange: no history yet.
        engine.submit("chan-2", "q1").unwrap();
        for _ in 0..4 {
            let _ = next_event(&mut rx).await;
        }

        // Second exchange sees q1 (user) and the reply (model).
        engine.submit("chan-2", "q2").unwrap();
        for _ in 0..4 {
            let _ = next_event(&mut rx).await;
        }

        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);

        let (first_prompt, first_history) = &calls[0];
        assert_eq!(first_prompt, "q1");
        assert!(first_history.is_empty());

        let (second_prompt, second_history) = &calls[1];
        assert_eq!(second_prompt, "q2");
        assert_eq!(second_history.len(), 2);
        assert_eq!(second_history[0].text, "q1");
        assert_eq!(second_history[0].role, Role::User);
        assert_eq!(second_history[1].text, "noted");
        assert_eq!(second_history[1].role, Role::Model);
    }

    #[tokio::test]
    async fn test_provider_failure_appends_diagnostic() {
        let engine = ChatEngine::new(
            Arc::new(StubProvider {
                reply: Err("connection refused".into()),
            }),
            TurnSettings::default(),
        );
        let (_sid, mut rx) = engine.subscribe();

        engine.submit("chan-2", "hello").unwrap();
        let _ = next_event(&mut rx).await; // user message
        let _ = next_event(&mut rx).await; // typing start
        match next_event(&mut rx).await {
            ChatEvent::Message { message, .. } => {
                assert!(message.content.starts_with("Error:"));
                assert!(message.is_ai_response);
            }
            other => panic!("expected diagnostic, got {other:?}"),
        }
        let _ = next_event(&mut rx).await; // typing stop

        assert_eq!(engine.messages("chan-2").len(), 2);
        assert!(!engine.is_typing("chan-2"));
    }

    #[tokio::test]
    async fn test_seed_welcome_populates_default_channel() {
        let engine = engine_with_reply("ok");
        engine.seed_welcome();

        let messages = engine.messages("chan-1");
        assert_eq!(messages.len(), 1);
        assert!(messages[0].author.is_bot);
        assert!(!messages[0].is_ai_response);
    }
}
