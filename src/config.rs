//! Environment-driven configuration.
//!
//! All knobs come from the environment, matching how the relay is deployed
//! (container with an env file). `TELEGRAM_BOT_TOKEN` is required; startup
//! fails immediately when it is absent.
//!
//! # Environment Variables
//!
//! - `TELEGRAM_BOT_TOKEN` - bot credential (required)
//! - `PORT` - HTTP listen port (default 3000)
//! - `BIND` - HTTP listen address (default 127.0.0.1)
//! - `PUBLIC_BASE_URL` - externally reachable base URL used in proxy links;
//!   when unset, the HTTP surface derives it per-request from the Host header
//! - `TERABOX_COOKIE` - session cookie sent on upstream requests (defaults to
//!   the built-in value; the scrape is tied to the third-party page and
//!   breaks without a valid cookie)
//! - `TELEGRAM_API_BASE_URL` - Bot API base (default https://api.telegram.org)
//! - `CONNECT_TIMEOUT_SECS` / `REQUEST_TIMEOUT_SECS` - outbound HTTP bounds

use std::net::IpAddr;
use std::time::Duration;

use thiserror::Error;

use crate::channels::telegram::TELEGRAM_DEFAULT_API_BASE_URL;
use crate::extract::headers::DEFAULT_COOKIE;

/// Default HTTP listen port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default connect timeout for outbound requests.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default total timeout for outbound metadata requests. The proxy body
/// transfer is exempt (it may legitimately run for the length of a download).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while reading configuration from the environment.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is not set in the environment")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime configuration for the relay.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot credential.
    pub bot_token: String,
    /// HTTP listen address.
    pub bind: IpAddr,
    /// HTTP listen port.
    pub port: u16,
    /// Externally reachable base URL, e.g. `https://relay.example.com`.
    pub public_base_url: Option<String>,
    /// Session cookie for upstream share-page and download requests.
    pub cookie: String,
    /// Telegram Bot API base URL.
    pub telegram_api_base_url: String,
    /// Connect timeout for all outbound requests.
    pub connect_timeout: Duration,
    /// Total timeout for metadata requests.
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;

        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let bind = match std::env::var("BIND") {
            Ok(raw) => raw.parse::<IpAddr>().map_err(|_| ConfigError::Invalid {
                name: "BIND",
                value: raw,
            })?,
            Err(_) => IpAddr::from([127, 0, 0, 1]),
        };

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .ok()
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());

        let cookie =
            std::env::var("TERABOX_COOKIE").unwrap_or_else(|_| DEFAULT_COOKIE.to_string());

        let telegram_api_base_url = std::env::var("TELEGRAM_API_BASE_URL")
            .unwrap_or_else(|_| TELEGRAM_DEFAULT_API_BASE_URL.to_string());

        let connect_timeout = duration_var("CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT)?;
        let request_timeout = duration_var("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT)?;

        Ok(Config {
            bot_token,
            bind,
            port,
            public_base_url,
            cookie,
            telegram_api_base_url,
            connect_timeout,
            request_timeout,
        })
    }

    /// Base URL the Telegram surface embeds in proxy links (there is no Host
    /// header to derive it from on that path).
    pub fn bot_base_url(&self) -> String {
        self.public_base_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.bind, self.port))
    }
}

fn duration_var(name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}
