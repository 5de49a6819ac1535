//! Telegram inbound receive loop.
//!
//! Uses Bot API long polling (`getUpdates`) and answers recognized share
//! links with extraction results. The reply flow sends a placeholder
//! message first and edits it in place once extraction settles, so the chat
//! shows progress without accumulating messages.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::channels::telegram::TelegramBot;
use crate::channels::telegram_inbound::{self, TelegramInbound};
use crate::extract::FileMetadata;
use crate::service::RelayService;

/// Long-poll timeout passed to Telegram getUpdates.
const POLL_TIMEOUT_SECS: u64 = 30;
/// Client-side request timeout (must exceed the poll timeout).
const REQUEST_TIMEOUT: Duration = Duration::from_secs(POLL_TIMEOUT_SECS + 10);
/// Backoff between failed poll attempts.
const ERROR_BACKOFF: Duration = Duration::from_secs(3);

/// Greeting sent in reply to /start.
const GREETING: &str = "Welcome to the TeraBox Extractor Bot! \u{1F4E6}\n\
Send a TeraBox link to extract file details and get a download link.";

#[derive(Debug, Deserialize)]
struct TelegramGetUpdatesResponse {
    ok: bool,
    #[serde(default)]
    result: Vec<telegram_inbound::TelegramUpdate>,
    #[serde(default)]
    description: Option<String>,
}

/// Run the Telegram long-polling receive loop until shutdown.
///
/// `proxy_base_url` is the externally reachable base the proxy links in
/// replies are built against (the bot path has no Host header to derive it
/// from).
pub async fn telegram_receive_loop(
    base_url: String,
    bot_token: String,
    service: Arc<RelayService>,
    proxy_base_url: String,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .expect("failed to build Telegram receive HTTP client");
    let bot = TelegramBot::new(client.clone(), base_url.clone(), bot_token);
    let updates_url = bot.api_url("getUpdates");

    info!(base_url = %base_url, "Telegram receive loop started");

    let mut offset: Option<i64> = None;
    let mut consecutive_errors: u32 = 0;

    loop {
        if *shutdown.borrow() {
            info!("Telegram receive loop shutting down");
            break;
        }

        let mut had_error = false;
        let request_url = build_poll_request_url(&updates_url, offset);
        match client.get(&request_url).send().await {
            Ok(resp) if resp.status().is_success() => {
                match resp.json::<TelegramGetUpdatesResponse>().await {
                    Ok(payload) => {
                        if !payload.ok {
                            had_error = true;
                            consecutive_errors += 1;
                            if consecutive_errors <= 3 {
                                let description = payload.description.unwrap_or_else(|| {
                                    "telegram getUpdates returned ok=false".to_string()
                                });
                                warn!("Telegram getUpdates returned error: {}", description);
                            }
                        } else {
                            if consecutive_errors > 0 {
                                info!(
                                    "Telegram receive loop recovered after {} errors",
                                    consecutive_errors
                                );
                                consecutive_errors = 0;
                            }

                            for update in payload.result {
                                offset = next_offset_after_update(offset, update.update_id);
                                let Some(inbound) = telegram_inbound::extract_inbound(&update)
                                else {
                                    continue;
                                };
                                handle_message(&bot, &service, &proxy_base_url, inbound).await;
                            }
                        }
                    }
                    Err(err) => {
                        had_error = true;
                        consecutive_errors += 1;
                        if consecutive_errors <= 3 {
                            warn!("Telegram getUpdates response parse failed: {}", err);
                        }
                    }
                }
            }
            Ok(resp) => {
                had_error = true;
                consecutive_errors += 1;
                if consecutive_errors <= 3 {
                    warn!("Telegram getUpdates HTTP {}", resp.status());
                }
            }
            Err(err) => {
                had_error = true;
                consecutive_errors += 1;
                if consecutive_errors <= 3 {
                    warn!("Telegram getUpdates request failed: {}", err);
                } else if consecutive_errors == 4 {
                    warn!("Telegram receive errors continuing (suppressing further logs until recovery)");
                }
            }
        }

        if had_error {
            tokio::select! {
                _ = tokio::time::sleep(ERROR_BACKOFF) => {}
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Telegram receive loop shutting down");
                        break;
                    }
                }
            }
        } else {
            debug!("Telegram long-poll request completed");
        }
    }
}

/// Handle one inbound text message.
async fn handle_message(
    bot: &TelegramBot,
    service: &RelayService,
    proxy_base_url: &str,
    inbound: TelegramInbound,
) {
    let chat_id = inbound.chat_id;
    let text = inbound.text.trim();

    if text.starts_with("/start") {
        if let Err(err) = bot.send_message(chat_id, GREETING).await {
            warn!(chat_id, "failed to send greeting: {}", err);
        }
        return;
    }
    // Other commands and non-link chatter are not ours to answer.
    if text.starts_with('/') || !is_share_link(text) {
        return;
    }

    if let Some(meta) = service.cached(text) {
        let reply = format!("\u{2705} Loaded from cache:\n{}", format_file_message(&meta));
        if let Err(err) = bot.send_message(chat_id, &reply).await {
            warn!(chat_id, "failed to send cached reply: {}", err);
        }
        return;
    }

    let loading_id = match bot
        .send_message(chat_id, "\u{23F3} Extracting file details...")
        .await
    {
        Ok(id) => id,
        Err(err) => {
            warn!(chat_id, "failed to send placeholder: {}", err);
            return;
        }
    };

    let reply = match service.resolve(text, proxy_base_url).await {
        Ok(meta) => format!(
            "\u{2705} File extracted successfully:\n{}",
            format_file_message(&meta)
        ),
        Err(err) => format!("\u{274C} Error: {err}"),
    };

    match bot.edit_message_text(chat_id, loading_id, &reply).await {
        Ok(()) => {}
        Err(err) if err.is_message_missing() => {
            // Placeholder was deleted mid-extraction; deliver fresh instead.
            if let Err(err) = bot.send_message(chat_id, &reply).await {
                warn!(chat_id, "failed to send reply: {}", err);
            }
        }
        Err(err) => warn!(chat_id, "failed to edit reply: {}", err),
    }
}

/// Whether a plain-text message carries a link the relay recognizes.
fn is_share_link(text: &str) -> bool {
    text.contains("terabox")
}

/// Format the reply body for one extracted file.
fn format_file_message(meta: &FileMetadata) -> String {
    let extension = meta
        .file_name
        .rsplit('.')
        .next()
        .unwrap_or("")
        .to_uppercase();
    let fetched_at = meta
        .fetched_at
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    let mut message = format!("\u{1F4C4} *File:* {}\n", meta.file_name);
    message.push_str(&format!("\u{1F4C2} *Type:* {extension}\n"));
    message.push_str(&format!("\u{1F552} *Fetched At:* {fetched_at}\n"));
    if meta.has_download() {
        message.push_str(&format!("\u{1F517} [Download File]({})\n", meta.proxy_url));
    } else {
        message.push_str("\u{26A0}\u{FE0F} No download link available.\n");
    }
    message
}

fn build_poll_request_url(updates_url: &str, offset: Option<i64>) -> String {
    let mut url = format!("{updates_url}?timeout={POLL_TIMEOUT_SECS}");
    if let Some(offset) = offset {
        url.push_str("&offset=");
        url.push_str(&offset.to_string());
    }
    url
}

fn next_offset_after_update(current: Option<i64>, update_id: Option<i64>) -> Option<i64> {
    let Some(update_id) = update_id else {
        return current;
    };
    let next = update_id.saturating_add(1);
    Some(current.map_or(next, |current_value| current_value.max(next)))
}
