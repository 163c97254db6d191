use serde::Serialize;

/// What kind of traffic a channel carries. Only text channels accept
/// messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Text,
    Voice,
}

#[derive(Debug, Clone, Serialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub kind: ChannelKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Server {
    pub id: String,
    pub name: String,
    pub icon_url: String,
    /// Channel order is display order.
    pub channels: Vec<Channel>,
}

/// Static grouping of channels under servers. Fixed for the lifetime of the
/// process; the message log is keyed by the channel ids listed here.
#[derive(Debug)]
pub struct Directory {
    servers: Vec<Server>,
}

fn text_channel(id: &str, name: &str, topic: Option<&str>) -> Channel {
    Channel {
        id: id.into(),
        name: name.into(),
        kind: ChannelKind::Text,
        topic: topic.map(Into::into),
    }
}

fn voice_channel(id: &str, name: &str) -> Channel {
    Channel {
        id: id.into(),
        name: name.into(),
        kind: ChannelKind::Voice,
        topic: None,
    }
}

impl Directory {
    pub fn seed() -> Self {
        Self {
            servers: vec![
                Server {
                    id: "server-1".into(),
                    name: "Parley HQ".into(),
                    icon_url: "https://picsum.photos/id/1/100/100".into(),
                    channels: vec![
                        text_channel("chan-1", "general", None),
                        text_channel("chan-2", "ai-chat", Some("Chat with the resident Gemini bot")),
                        text_channel("chan-3", "showcase", None),
                        voice_channel("chan-4", "voice-lounge"),
                    ],
                },
                Server {
                    id: "server-2".into(),
                    name: "Rustaceans".into(),
                    icon_url: "https://picsum.photos/id/2/100/100".into(),
                    channels: vec![
                        text_channel("chan-5", "help", None),
                        text_channel("chan-6", "resources", None),
                    ],
                },
                Server {
                    id: "server-3".into(),
                    name: "Game Den".into(),
                    icon_url: "https://picsum.photos/id/3/100/100".into(),
                    channels: vec![text_channel("chan-7", "lobby", None)],
                },
            ],
        }
    }

    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    /// Look up a channel anywhere in the directory by its id.
    pub fn find_channel(&self, channel_id: &str) -> Option<&Channel> {
        self.servers
            .iter()
            .flat_map(|s| s.channels.iter())
            .find(|c| c.id == channel_id)
    }

    /// Look up a channel by display name (first match in display order).
    pub fn find_channel_named(&self, name: &str) -> Option<&Channel> {
        self.servers
            .iter()
            .flat_map(|s| s.channels.iter())
            .find(|c| c.name == name)
    }

    /// The channel seeded with the welcome message on startup: the first
    /// text channel of the first server.
    pub fn default_channel(&self) -> &Channel {
        self.servers
            .iter()
            .flat_map(|s| s.channels.iter())
            .find(|c| c.kind == ChannelKind::Text)
            .expect("directory seeds at least one text channel")
    }
}
