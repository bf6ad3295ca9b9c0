//! Symbol table and `deps.js` fixtures.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use crate::config::DepsSection;
use crate::resolver::Resolver;
use crate::symbols::{SourceFile, SymbolTable};

/// Contents given to every fixture file: `// <path>`.
pub fn fixture_content(path: &str) -> String {
    format!("// {path}")
}

fn file(path: &str, provides: &[&str], requires: &[&str]) -> SourceFile {
    SourceFile::new(
        path,
        provides.iter().map(|s| (*s).to_string()).collect(),
        requires.iter().map(|s| (*s).to_string()).collect(),
        fixture_content(path),
    )
}

/// A small library:
///
/// ```text
/// base.js (base runtime)
/// debug/logger.js  goog.debug.Logger, goog.debug.LogManager
/// a.js             a.B
/// dom.js           dom
/// widget.js        widget.Widget -> dom
/// ping.js          ping -> pong
/// pong.js          pong -> ping
/// ```
pub fn fixture_table() -> SymbolTable {
    SymbolTable::new(vec![
        file("debug/logger.js", &["goog.debug.Logger", "goog.debug.LogManager"], &[]),
        file("a.js", &["a.B"], &[]),
        file("dom.js", &["dom"], &[]),
        file("widget.js", &["widget.Widget"], &["dom"]),
        file("ping.js", &["ping"], &["pong"]),
        file("pong.js", &["pong"], &["ping"]),
    ])
    .unwrap_or_else(|e| panic!("fixture table is invalid: {e}"))
    .with_base(file("base.js", &[], &[]))
}

/// Resolver over [`fixture_table`] with the default bootstrap symbols.
pub fn fixture_resolver() -> Resolver {
    Resolver::new(
        Arc::new(fixture_table()),
        vec!["goog.debug.Logger".to_string(), "goog.debug.LogManager".to_string()],
    )
}

/// The [`fixture_table`] library written to a temporary directory as a
/// `deps.js` manifest plus source files.
pub struct DepsTree {
    dir: TempDir,
}

impl DepsTree {
    /// Write the fixture tree.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap_or_else(|e| panic!("failed to create temp dir: {e}"));
        let tree = Self {
            dir,
        };

        let table = fixture_table();
        let mut manifest = String::from("// Generated fixture manifest.\n");
        for (_, source) in table.files() {
            manifest.push_str(&format!(
                "goog.addDependency('{}', [{}], [{}]);\n",
                source.path,
                quoted(&source.provides),
                quoted(&source.requires)
            ));
            tree.write(&source.path, &source.content);
        }
        tree.write("base.js", &fixture_content("base.js"));
        tree.write("deps.js", &manifest);
        tree
    }

    /// Root directory of the tree.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the `deps.js` manifest.
    pub fn manifest(&self) -> PathBuf {
        self.root().join("deps.js")
    }

    /// `[deps]` configuration pointing at this tree.
    pub fn deps_section(&self) -> DepsSection {
        DepsSection {
            manifest: self.manifest(),
            ..DepsSection::default()
        }
    }

    fn write(&self, relative: &str, content: &str) {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("failed to create {}: {e}", parent.display()));
        }
        std::fs::write(&path, content)
            .unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));
    }
}

impl Default for DepsTree {
    fn default() -> Self {
        Self::new()
    }
}

fn quoted(symbols: &[String]) -> String {
    symbols.iter().map(|s| format!("'{s}'")).collect::<Vec<_>>().join(", ")
}
