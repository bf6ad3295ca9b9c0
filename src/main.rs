//! Kitchen CLI entry point
//!
//! Parses the command line, runs the command and renders failures through
//! the user-friendly error layer:
//! - `serve` - run the HTTP server
//! - `resolve` - print a resolved bundle
//! - `config` - manage the configuration file

use anyhow::Result;
use clap::Parser;
use kitchen_proxy::cli;
use kitchen_proxy::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
