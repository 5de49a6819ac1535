//! Telegram Bot API client.
//!
//! Sends and edits messages via the Bot API. Replies use Markdown with link
//! previews disabled so proxy URLs don't unfurl into the chat.

use serde_json::{json, Value};
use thiserror::Error;

pub const TELEGRAM_DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";

/// Errors from Bot API calls.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("telegram api error: {0}")]
    Api(String),
}

impl BotError {
    /// True when an edit failed because the placeholder message is gone
    /// (deleted by the user mid-extraction). That race is non-critical and
    /// callers fall back to sending a fresh message.
    pub fn is_message_missing(&self) -> bool {
        matches!(self, BotError::Api(desc) if desc.contains("message to edit not found"))
    }
}

/// A client delivering messages via the Telegram Bot API.
pub struct TelegramBot {
    client: reqwest::Client,
    base_url: String,
    bot_token: String,
}

impl TelegramBot {
    /// Create a new bot client targeting the given Bot API base URL.
    pub fn new(client: reqwest::Client, base_url: String, bot_token: String) -> Self {
        Self {
            client,
            base_url,
            bot_token,
        }
    }

    /// Build the API endpoint URL for a method.
    pub(crate) fn api_url(&self, method: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{}/bot{}/{}", base, self.bot_token, method)
    }

    /// Send a Markdown message; returns the new message id.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<i64, BotError> {
        let body = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
            "disable_web_page_preview": true,
        });

        let resp = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .send()
            .await?;
        let result = Self::parse_response(resp).await?;

        Ok(result
            .get("message_id")
            .and_then(Value::as_i64)
            .unwrap_or_default())
    }

    /// Edit a previously sent message in place.
    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), BotError> {
        let body = json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
            "parse_mode": "Markdown",
            "disable_web_page_preview": true,
        });

        let resp = self
            .client
            .post(self.api_url("editMessageText"))
            .json(&body)
            .send()
            .await?;
        Self::parse_response(resp).await?;
        Ok(())
    }

    /// Interpret a Bot API response envelope ({ok, result, description}).
    async fn parse_response(resp: reqwest::Response) -> Result<Value, BotError> {
        let status = resp.status();
        let body_text = resp.text().await.unwrap_or_default();
        let parsed: Value = serde_json::from_str(&body_text).unwrap_or(Value::Null);

        let ok = parsed
            .get("ok")
            .and_then(Value::as_bool)
            .unwrap_or(status.is_success());

        if ok {
            return Ok(parsed.get("result").cloned().unwrap_or(Value::Null));
        }

        let description = parsed
            .get("description")
            .and_then(Value::as_str)
            .map(|s| s.to_string())
            .or_else(|| {
                if body_text.is_empty() {
                    None
                } else {
                    Some(body_text.clone())
                }
            })
            .unwrap_or_else(|| "request failed".to_string());

        Err(BotError::Api(description))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_bot() -> TelegramBot {
        TelegramBot::new(
            reqwest::Client::new(),
            "http://localhost:8080".to_string(),
            "token".to_string(),
        )
    }

    #[test]
    fn test_api_url() {
        let bot = test_bot();
        assert_eq!(
            bot.api_url("sendMessage"),
            "http://localhost:8080/bottoken/sendMessage"
        );
    }

    #[test]
    fn test_api_url_trims_trailing_slash() {
        let bot = TelegramBot::new(
            reqwest::Client::new(),
            "https://api.telegram.org/".to_string(),
            "token".to_string(),
        );
        assert_eq!(
            bot.api_url("getUpdates"),
            "https://api.telegram.org/bottoken/getUpdates"
        );
    }

    #[test]
    fn test_is_message_missing() {
        let err = BotError::Api("Bad Request: message to edit not found".to_string());
        assert!(err.is_message_missing());

        let err = BotError::Api("Bad Request: chat not found".to_string());
        assert!(!err.is_message_missing());
    }

    #[tokio::test]
    async fn test_send_message_connection_failure() {
        let bot = TelegramBot::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1".to_string(),
            "token".to_string(),
        );
        let result = bot.send_message(123, "hello").await;
        assert!(matches!(result, Err(BotError::Request(_))));
    }
}
