use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};

use terarelay::cache::SessionCache;
use terarelay::channels::telegram_receive::telegram_receive_loop;
use terarelay::cli::{self, Cli, Command};
use terarelay::config::Config;
use terarelay::extract::MetadataFetcher;
use terarelay::logging;
use terarelay::proxy::StreamProxy;
use terarelay::server::{run_server_with_config, AppState, ServerConfig};
use terarelay::service::RelayService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        // No subcommand or explicit `start` both launch the server.
        None | Some(Command::Start) => run_server().await,

        Some(Command::Version) => {
            cli::handle_version();
            Ok(())
        }
    }
}

async fn run_server() -> Result<(), Box<dyn std::error::Error>> {
    logging::init()?;

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            return Err(err.into());
        }
    };

    // Metadata requests get a total timeout; the proxy client only bounds
    // the connect phase, because a proxied body transfer legitimately runs
    // for the length of a download.
    let metadata_client = reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .build()?;
    let proxy_client = reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .build()?;

    let cache = Arc::new(SessionCache::new());
    let fetcher = MetadataFetcher::new(metadata_client, config.cookie.clone());
    let service = Arc::new(RelayService::new(fetcher, cache));
    let proxy = Arc::new(StreamProxy::new(proxy_client, config.cookie.clone()));

    let state = AppState {
        service: service.clone(),
        proxy,
        public_base_url: config.public_base_url.clone(),
        start_time: chrono::Utc::now().timestamp(),
    };

    let bind_address = SocketAddr::new(config.bind, config.port);
    let handle = run_server_with_config(ServerConfig {
        state,
        bind_address,
    })
    .await?;
    info!(addr = %handle.local_addr(), "terarelay running");

    let shutdown_tx = handle.shutdown_sender();
    let bot_task = tokio::spawn(telegram_receive_loop(
        config.telegram_api_base_url.clone(),
        config.bot_token.clone(),
        service,
        config.bot_base_url(),
        shutdown_tx.subscribe(),
    ));

    wait_for_signal().await;
    info!("Shutting down...");
    handle.shutdown().await;
    if tokio::time::timeout(Duration::from_secs(5), bot_task)
        .await
        .is_err()
    {
        warn!("Telegram receive loop did not stop within 5s timeout");
    }

    Ok(())
}

/// Wait for ctrl-c or SIGTERM.
async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(err) => {
                warn!("failed to install SIGTERM handler: {}", err);
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
