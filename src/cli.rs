//! CLI subcommand definitions.
//!
//! - `start` (default) -- start the relay server
//! - `version` -- print build/version info

use clap::{Parser, Subcommand};

/// TeraBox link-extraction relay.
#[derive(Parser, Debug)]
#[command(
    name = "terarelay",
    version = env!("CARGO_PKG_VERSION"),
    about = "Terarelay: TeraBox link-extraction relay with streaming proxy and Telegram bot"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the relay server (default when no subcommand is given).
    Start,

    /// Print version information.
    Version,
}

pub fn handle_version() {
    println!("terarelay {}", env!("CARGO_PKG_VERSION"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_is_start() {
        let cli = Cli::parse_from(["terarelay"]);
        assert!(cli.command.is_none());
    }
}
