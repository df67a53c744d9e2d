//! HTTP client for the advisory service, an OpenAI-compatible chat
//! completions gateway. The fast model handles daily commentary and
//! summaries; the quality model handles the weekly cadence.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::error::DomainError;
use crate::domain::ports::advisory::{
    AdvisoryComment, AdvisoryContext, AdvisoryService, ModelTier,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_TOKENS: u32 = 1200;

const COMMENT_SYSTEM_PROMPT: &str = "You are a conservative investment analyst focused on risk \
management. Assess the position described by the user and respond with strict JSON only, no \
other text, using this structure:\n\
{\"short_comment\": \"one-sentence assessment\", \"action\": \"hold|add|reduce|sell\", \
\"detail\": \"2-3 sentence markdown rationale\"}";

const SUMMARY_SYSTEM_PROMPT: &str = "You are a portfolio assistant. Respond with the requested \
summary as plain text, no preamble and no markdown fences.";

/// Loaded once at process start and treated as immutable.
#[derive(Debug, Clone)]
pub struct AdvisoryConfig {
    pub base_url: String,
    pub api_key: String,
    pub fast_model: String,
    pub quality_model: String,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            fast_model: "gemini-2.5-flash".to_string(),
            quality_model: "claude-4.5-opus".to_string(),
        }
    }
}

pub struct GatewayAdvisor {
    config: AdvisoryConfig,
    client: Client,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct CommentPayload {
    #[serde(default)]
    short_comment: String,
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

impl GatewayAdvisor {
    pub fn new(config: AdvisoryConfig) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { config, client }
    }

    fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => &self.config.fast_model,
            ModelTier::Quality => &self.config.quality_model,
        }
    }

    async fn chat(
        &self,
        system: &'static str,
        user: String,
        tier: ModelTier,
    ) -> Result<String, DomainError> {
        if self.config.base_url.is_empty() {
            return Err(DomainError::Advisory("advisory gateway not configured".into()));
        }

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let request = ChatRequest {
            model: self.model_for(tier).to_string(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.7,
            max_tokens: MAX_TOKENS,
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::Advisory(format!("gateway request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::Advisory(format!("gateway {status}: {body}")));
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::Advisory(format!("gateway response parse: {e}")))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(DomainError::Advisory("empty gateway response".into()));
        }
        Ok(content)
    }
}

/// Drop a leading/trailing markdown code fence if the model wrapped its
/// JSON in one.
fn strip_markdown_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let inner = trimmed
        .trim_start_matches("```json")
        .trim_start_matches("```");
    inner.trim_end_matches("```").trim()
}

#[async_trait]
impl AdvisoryService for GatewayAdvisor {
    async fn comment(
        &self,
        context: &AdvisoryContext,
        tier: ModelTier,
    ) -> Result<AdvisoryComment, DomainError> {
        let user = format!(
            "Assess the following position:\n{}",
            context.lines.join("\n")
        );
        let raw = self.chat(COMMENT_SYSTEM_PROMPT, user, tier).await?;

        let payload: CommentPayload = serde_json::from_str(strip_markdown_fences(&raw))
            .map_err(|e| DomainError::Parse(format!("advisory JSON: {e}")))?;

        let action_label = payload.action.and_then(|a| {
            let a = a.to_lowercase();
            matches!(a.as_str(), "hold" | "add" | "reduce" | "sell").then_some(a)
        });

        Ok(AdvisoryComment {
            short_comment: payload.short_comment,
            action_label,
            detail_markdown: payload.detail.filter(|d| !d.trim().is_empty()),
        })
    }

    async fn summarize(&self, prompt: &str, tier: ModelTier) -> Result<String, DomainError> {
        let raw = self.chat(SUMMARY_SYSTEM_PROMPT, prompt.to_string(), tier).await?;
        Ok(raw.trim().trim_matches('"').to_string())
    }
}
