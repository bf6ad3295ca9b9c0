//! Command-line interface for Kitchen.
//!
//! # Available Commands
//!
//! - `serve` - run the HTTP build/proxy server
//! - `resolve` - resolve symbols against a `deps.js` manifest and print the bundle
//! - `config` - create or show the configuration file
//!
//! # Global Options
//!
//! - `--verbose` - debug logging
//! - `--quiet` - errors only
//! - `--config <path>` - configuration file (else `$KITCHEN_CONFIG_PATH`, else `~/.kitchen/config.toml`)
//!
//! Logs go to stderr so `kitchen resolve` output can be piped.
//!
//! ```bash
//! kitchen --config ./kitchen.toml serve --port 9000
//! kitchen resolve goog.ui.Button goog.dom > bundle.js
//! kitchen config init
//! ```

pub mod config;
pub mod resolve;
pub mod serve;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::KitchenConfig;

/// Main CLI structure.
#[derive(Parser, Debug)]
#[command(
    name = "kitchen",
    about = "Dependency bundler and caching proxy for the Closure Kitchen playground",
    version,
    long_about = "Resolves Closure Library symbols into ordered bundles, fronts the Closure \
                  Compiler service and proxies the library documentation, caching each behind \
                  a shared TTL cache."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(serve::ServeCommand),

    /// Resolve symbols into an ordered bundle
    Resolve(resolve::ResolveCommand),

    /// Manage the configuration file
    Config(config::ConfigCommand),
}

impl Cli {
    /// Execute the parsed command.
    pub async fn execute(self) -> Result<()> {
        self.init_logging();

        match self.command {
            Commands::Config(cmd) => cmd.execute(self.config).await,
            Commands::Serve(cmd) => {
                let config = KitchenConfig::load_with_optional(self.config).await?;
                cmd.execute(config).await
            }
            Commands::Resolve(cmd) => {
                let config = KitchenConfig::load_with_optional(self.config).await?;
                cmd.execute(config).await
            }
        }
    }

    /// Default log filter for the chosen verbosity; `RUST_LOG` takes precedence.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }

    fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.log_level()));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}
