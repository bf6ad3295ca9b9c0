//! `kitchen config`: create or show the configuration file.
//!
//! ```bash
//! kitchen config init            # write an example file to the default location
//! kitchen config init --force    # overwrite it
//! kitchen config show            # print the effective configuration
//! kitchen config path            # print where the file is looked up
//! ```
//!
//! `show` masks the administrator token.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::KitchenConfig;

/// Manage the configuration file.
#[derive(Args, Debug)]
pub struct ConfigCommand {
    /// Operation to perform; defaults to `show`
    #[command(subcommand)]
    command: Option<ConfigSubcommands>,
}

#[derive(Subcommand, Debug)]
enum ConfigSubcommands {
    /// Write an example configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,

    /// Print the configuration file location
    Path,
}

impl ConfigCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        match self.command {
            Some(ConfigSubcommands::Init {
                force,
            }) => Self::init(force, config_path).await,
            Some(ConfigSubcommands::Show) | None => Self::show(config_path).await,
            Some(ConfigSubcommands::Path) => Self::show_path(config_path),
        }
    }

    fn resolve_path(config_path: Option<PathBuf>) -> Result<PathBuf> {
        match config_path {
            Some(path) => Ok(path),
            None => match std::env::var_os(crate::constants::CONFIG_PATH_ENV) {
                Some(path) => Ok(PathBuf::from(path)),
                None => KitchenConfig::default_path(),
            },
        }
    }

    async fn init(force: bool, config_path: Option<PathBuf>) -> Result<()> {
        let config_path = Self::resolve_path(config_path)?;

        if config_path.exists() && !force {
            println!("❌ Config already exists at: {}", config_path.display());
            println!("   Use --force to overwrite");
            return Ok(());
        }

        let config = KitchenConfig::init_example();
        config.save_to(&config_path).await?;

        println!("✅ Created config at: {}", config_path.display());
        println!("\n{}", "Next steps:".yellow());
        println!("  1. Point [deps].manifest at your Closure Library deps.js");
        println!("  2. Replace the admin_token 'change-me' with a secret");
        Ok(())
    }

    async fn show(config_path: Option<PathBuf>) -> Result<()> {
        let location = Self::resolve_path(config_path.clone())?;
        let mut config = KitchenConfig::load_with_optional(config_path).await?;
        if config.server.admin_token.is_some() {
            config.server.admin_token = Some("********".to_string());
        }

        println!("{}", "Kitchen Configuration".bold());
        println!("Location: {}", location.display());
        if !location.exists() {
            println!("{}", "(file not found, showing defaults)".dimmed());
        }
        println!();
        println!("{}", toml::to_string_pretty(&config)?);
        Ok(())
    }

    fn show_path(config_path: Option<PathBuf>) -> Result<()> {
        println!("{}", Self::resolve_path(config_path)?.display());
        Ok(())
    }
}
