//! Chat-channel surface.
//!
//! The Telegram bot is a thin consumer of the same relay service the HTTP
//! routes use: an outbound Bot API client, inbound update parsing, and a
//! long-poll receive loop.

pub mod telegram;
pub mod telegram_inbound;
pub mod telegram_receive;

pub use telegram::{BotError, TelegramBot};
pub use telegram_inbound::{extract_inbound, TelegramInbound, TelegramUpdate};
pub use telegram_receive::telegram_receive_loop;
