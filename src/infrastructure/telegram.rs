//! Telegram Bot API notifier.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::domain::error::DomainError;
use crate::domain::ports::notifier::Notifier;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Loaded once at process start and treated as immutable.
#[derive(Debug, Clone, Default)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub enabled: bool,
}

pub struct TelegramNotifier {
    config: TelegramConfig,
    client: Client,
}

/// Payload for the Telegram `sendMessage` endpoint.
#[derive(Serialize)]
struct TelegramMessage {
    chat_id: String,
    text: String,
    parse_mode: String,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Self {
        let client = Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { config, client }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn is_enabled(&self) -> bool {
        self.config.enabled
            && !self.config.bot_token.is_empty()
            && !self.config.chat_id.is_empty()
    }

    async fn send(&self, text: &str) -> Result<(), DomainError> {
        let url = format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.config.bot_token
        );

        let payload = TelegramMessage {
            chat_id: self.config.chat_id.clone(),
            text: text.to_string(),
            parse_mode: "Markdown".to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DomainError::Notification(format!("Telegram request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::Notification(format!(
                "Telegram API {status}: {body}"
            )));
        }

        Ok(())
    }
}
