//! Loader for Closure Library `deps.js` manifests.
//!
//! Each dependency edge is declared by one call:
//!
//! ```text
//! goog.addDependency('ui/button.js', ['goog.ui.Button'], ['goog.ui.Control', 'goog.events']);
//! ```
//!
//! The first argument is a path relative to the source root, the second the
//! symbols the file provides and the third the symbols it requires. Trailing
//! arguments written by newer generators (module type, language level) are
//! ignored. Lines without `addDependency` are comments or bootstrapping code
//! and are skipped.

use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use tokio::fs;

use super::{SourceFile, SymbolTable};
use crate::config::DepsSection;
use crate::core::KitchenError;

/// One parsed `goog.addDependency` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Path relative to the source root.
    pub path: String,
    /// Provided symbols in declaration order.
    pub provides: Vec<String>,
    /// Required symbols in declaration order.
    pub requires: Vec<String>,
}

/// Parse the text of a `deps.js` manifest.
///
/// `file` only labels errors. A line mentioning `addDependency(` that does
/// not have the expected shape is an error rather than being skipped, since
/// silently losing an edge would produce bundles that fail in the browser.
pub fn parse_deps(text: &str, file: &str) -> Result<Vec<ManifestEntry>, KitchenError> {
    let parse_error = |reason: String| KitchenError::ManifestParseError {
        file: file.to_string(),
        reason,
    };

    let call = Regex::new(
        r#"goog\.addDependency\(\s*['"]([^'"]+)['"]\s*,\s*\[([^\]]*)\]\s*,\s*\[([^\]]*)\]"#,
    )
    .map_err(|e| parse_error(e.to_string()))?;
    let item = Regex::new(r#"['"]([^'"]+)['"]"#).map_err(|e| parse_error(e.to_string()))?;

    let list = |raw: &str| -> Vec<String> {
        item.captures_iter(raw).map(|c| c[1].to_string()).collect()
    };

    let mut entries = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("//") || !trimmed.contains("addDependency(") {
            continue;
        }

        let captures = call.captures(line).ok_or_else(|| {
            parse_error(format!("line {}: malformed addDependency call", line_no + 1))
        })?;

        entries.push(ManifestEntry {
            path: captures[1].to_string(),
            provides: list(&captures[2]),
            requires: list(&captures[3]),
        });
    }

    Ok(entries)
}

/// Build the symbol table described by the `[deps]` configuration.
///
/// Reads the manifest, then the contents of every listed file and of the
/// base runtime file, relative to [`DepsSection::source_root`].
pub async fn load_symbol_table(deps: &DepsSection) -> Result<SymbolTable> {
    let manifest_label = deps.manifest.display().to_string();
    let text = fs::read_to_string(&deps.manifest)
        .await
        .with_context(|| format!("Failed to read dependency manifest {manifest_label}"))?;

    let entries = parse_deps(&text, &manifest_label)?;
    let root = deps.source_root();

    let mut files = Vec::with_capacity(entries.len());
    for entry in entries {
        let content = read_source(&root, &entry.path).await?;
        files.push(SourceFile::new(entry.path, entry.provides, entry.requires, content));
    }

    let mut table = SymbolTable::new(files)?;
    if let Some(base) = &deps.base_file {
        let path = base.to_string_lossy().into_owned();
        let content = read_source(&root, &path).await?;
        table = table.with_base(SourceFile::new(path, Vec::new(), Vec::new(), content));
    }

    tracing::info!(
        "Loaded {} files providing {} symbols from {}",
        table.len(),
        table.symbol_count(),
        manifest_label
    );
    Ok(table)
}

async fn read_source(root: &Path, path: &str) -> Result<String, KitchenError> {
    fs::read_to_string(root.join(path)).await.map_err(|e| KitchenError::SourceFileNotFound {
        path: path.to_string(),
        reason: e.to_string(),
    })
}
