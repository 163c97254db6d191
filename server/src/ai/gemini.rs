use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatTurn, CompletionProvider};

/// Persona sent with every call.
const SYSTEM_INSTRUCTION: &str = "You are a helpful, witty, and friendly AI assistant integrated \
     into a chat application. Keep your responses relatively concise and formatted using \
     Markdown, similar to how users chat. Use emojis occasionally.";

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiProvider {
    client: reqwest::Client,
    model: String,
    api_key: Option<String>,
}

impl GeminiProvider {
    pub fn new(model: &str, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            model: model.to_string(),
            api_key,
        }
    }

    /// Resolve the credential at call time. A missing key is a call-time
    /// failure, not a startup error.
    fn resolve_key(&self) -> Result<String, String> {
        if let Some(key) = &self.api_key {
            return Ok(key.clone());
        }
        std::env::var("GEMINI_API_KEY").map_err(|_| "Missing GEMINI_API_KEY".to_string())
    }

    fn build_request(&self, prompt: &str, history: &[ChatTurn]) -> GenerateRequest {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|turn| Content {
                role: Some(turn.role.as_str().to_string()),
                parts: vec![Part {
                    text: turn.text.clone(),
                }],
            })
            .collect();
        contents.push(Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: prompt.to_string(),
            }],
        });

        GenerateRequest {
            contents,
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: SYSTEM_INSTRUCTION.to_string(),
                }],
            },
            generation_config: GenerationConfig {
                temperature: 0.8,
                top_p: 0.95,
            },
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction")]
    system_instruction: Content,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "topP")]
    top_p: f64,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    async fn complete(&self, prompt: &str, history: &[ChatTurn]) -> Result<String, String> {
        let api_key = self.resolve_key()?;
        let request = self.build_request(prompt, history);

        let url = format!("{API_BASE}/{}:generateContent?key={}", self.model, api_key);
        debug!(model = %self.model, turns = history.len(), "calling completion provider");

        let resp = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("Network error: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(format!("API error {status}: {text}"));
        }

        let body: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| format!("Parse error: {e}"))?;

        // An answer without candidates or text is a valid (empty) success.
        let text = body
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.as_ref())
            .and_then(|p| p.first())
            .and_then(|p| p.text.clone())
            .unwrap_or_default();

        Ok(text)
    }
}
