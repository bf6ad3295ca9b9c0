//! `kitchen resolve`: resolve symbols offline and print the bundle.
//!
//! Prints the concatenated source to stdout and one line per unresolved
//! symbol to stderr. `--files` prints the file order instead of the source,
//! and `--json` prints the same `{ "code", "errors" }` body the server returns.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::KitchenConfig;
use crate::resolver::{ResolutionRequest, ResolutionResult, Resolver};
use crate::symbols::load_symbol_table;

/// Resolve symbols against a `deps.js` manifest.
#[derive(Args, Debug)]
pub struct ResolveCommand {
    /// Symbols to resolve, e.g. goog.ui.Button
    symbols: Vec<String>,

    /// Manifest to read, overriding `[deps].manifest`
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Print the file order instead of the source
    #[arg(long, conflicts_with = "json")]
    files: bool,

    /// Print the JSON response body
    #[arg(long)]
    json: bool,
}

impl ResolveCommand {
    pub async fn execute(self, mut config: KitchenConfig) -> Result<()> {
        if let Some(manifest) = &self.manifest {
            config.deps.manifest = manifest.clone();
        }

        let table = load_symbol_table(&config.deps).await?;
        let resolver = Resolver::new(Arc::new(table), config.deps.bootstrap.clone());
        let result = resolver.resolve(&ResolutionRequest::new(self.symbols.iter().cloned()));

        print!("{}", self.render(&result)?);

        if !self.json {
            for diagnostic in &result.diagnostics {
                eprintln!("{}: {}", "warning".yellow().bold(), diagnostic);
            }
        }
        Ok(())
    }

    fn render(&self, result: &ResolutionResult) -> Result<String> {
        if self.json {
            let json = serde_json::to_string_pretty(&result.to_response())
                .context("Failed to serialize bundle")?;
            Ok(format!("{json}\n"))
        } else if self.files {
            Ok(result.files.iter().map(|f| format!("{f}\n")).collect())
        } else {
            Ok(result.code())
        }
    }
}
