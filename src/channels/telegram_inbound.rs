//! Telegram inbound update parsing helpers.

use serde::Deserialize;

/// Telegram update payload.
#[derive(Debug, Deserialize)]
pub struct TelegramUpdate {
    #[serde(default)]
    pub update_id: Option<i64>,
    #[serde(default)]
    pub message: Option<TelegramMessage>,
}

/// Telegram message payload.
#[derive(Debug, Deserialize)]
pub struct TelegramMessage {
    #[serde(default)]
    pub text: Option<String>,
    pub chat: TelegramChat,
    #[serde(default)]
    pub from: Option<TelegramUser>,
}

/// Telegram chat metadata.
#[derive(Debug, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

/// Telegram user metadata.
#[derive(Debug, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
}

/// Parsed inbound text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramInbound {
    pub chat_id: i64,
    pub text: String,
}

/// Extract a text-bearing inbound message from a Telegram update.
///
/// Messages from other bots and non-text updates are skipped.
pub fn extract_inbound(update: &TelegramUpdate) -> Option<TelegramInbound> {
    let message = update.message.as_ref()?;

    if let Some(from) = message.from.as_ref() {
        if from.is_bot {
            return None;
        }
    }

    let text = message.text.as_ref().filter(|t| !t.is_empty())?.to_string();

    Some(TelegramInbound {
        chat_id: message.chat.id,
        text,
    })
}
