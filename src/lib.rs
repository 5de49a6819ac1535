//! Terarelay - a TeraBox link-extraction relay.
//!
//! Accepts a public TeraBox share link, scrapes the API tokens embedded in
//! the share page, queries the internal listing endpoint for the direct
//! download URL, and re-exposes that URL through a same-origin streaming
//! proxy and a Telegram bot.
//!
//! # Module Structure
//!
//! - `extract`: share-page scrape and listing fetch (the extraction core)
//! - `proxy`: streaming download proxy with Range passthrough
//! - `cache` / `service`: session cache and the relay service both
//!   transports consume
//! - `server`: HTTP surface (extraction route, proxy route, health)
//! - `channels`: Telegram bot surface (outbound client, long-poll receive)

pub mod cache;
pub mod channels;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod format;
pub mod logging;
pub mod proxy;
pub mod server;
pub mod service;

// Re-export main types for convenience
pub use cache::SessionCache;
pub use config::Config;
pub use error::{ExtractError, ProxyError};
pub use extract::{FileMetadata, MetadataFetcher};
pub use service::RelayService;
