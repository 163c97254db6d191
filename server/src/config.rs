use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::engine::orchestrator::TurnSettings;

/// Top-level server configuration, loaded from parley.toml.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub ai: AiSection,
}

#[derive(Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub web_address: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            web_address: "0.0.0.0:8080".into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
pub struct AiSection {
    /// Channel name in which every submission gets an AI reply.
    pub channel: String,
    /// Mention token that summons the agent from any channel.
    pub mention: String,
    /// Prior messages sent to the provider per turn.
    pub history_window: usize,
    /// Seconds before an in-flight provider call is abandoned.
    pub request_timeout_secs: u64,
    /// Gemini model name.
    pub model: String,
    /// API key. When unset, the GEMINI_API_KEY environment variable is
    /// consulted at call time.
    pub api_key: Option<String>,
}

impl Default for AiSection {
    fn default() -> Self {
        Self {
            channel: "ai-chat".into(),
            mention: "@gemini".into(),
            history_window: 10,
            request_timeout_secs: 30,
            model: crate::ai::DEFAULT_MODEL.into(),
            api_key: None,
        }
    }
}

impl ServerConfig {
    /// Load config from a TOML file. Falls back to defaults if the file
    /// doesn't exist. Environment variables override TOML values.
    pub fn load(path: &str) -> Self {
        let mut config = if Path::new(path).exists() {
            let contents = std::fs::read_to_string(path)
                .unwrap_or_else(|e| panic!("failed to read config file {}: {}", path, e));
            toml::from_str(&contents)
                .unwrap_or_else(|e| panic!("failed to parse config file {}: {}", path, e))
        } else {
            info!("No config file found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("WEB_ADDRESS") {
            self.server.web_address = v;
        }
        if let Ok(v) = std::env::var("AI_CHANNEL") {
            self.ai.channel = v;
        }
        if let Ok(v) = std::env::var("AI_MENTION") {
            self.ai.mention = v;
        }
        if let Ok(v) = std::env::var("AI_HISTORY_WINDOW")
            && let Ok(n) = v.parse()
        {
            self.ai.history_window = n;
        }
        if let Ok(v) = std::env::var("AI_REQUEST_TIMEOUT_SECS")
            && let Ok(secs) = v.parse()
        {
            self.ai.request_timeout_secs = secs;
        }
        if let Ok(v) = std::env::var("GEMINI_MODEL") {
            self.ai.model = v;
        }
    }

    /// Convert the AI section into orchestrator settings.
    pub fn turn_settings(&self) -> TurnSettings {
        TurnSettings {
            ai_channel: self.ai.channel.clone(),
            mention: self.ai.mention.clone(),
            history_window: self.ai.history_window,
            request_timeout: Duration::from_secs(self.ai.request_timeout_secs),
        }
    }
}
