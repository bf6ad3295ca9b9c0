//! Symbol table: which file provides each module symbol, and what each file requires.
//!
//! The table is built once at startup from a `deps.js` manifest (see [`manifest`])
//! and is read-only afterwards, so it is shared between request handlers behind
//! an [`Arc`](std::sync::Arc) without locking.
//!
//! # Invariants
//!
//! - every symbol is provided by exactly one file
//! - no file requires a symbol it provides itself
//!
//! Both are checked by [`SymbolTable::new`]; a table that exists satisfies them.

pub mod manifest;

use std::collections::HashMap;
use std::fmt;

use crate::core::KitchenError;

pub use manifest::{ManifestEntry, load_symbol_table, parse_deps};

/// Index of a file inside a [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(usize);

impl FileId {
    /// Position of the file in load order.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A JavaScript source file with its declared dependency edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the source root, as written in the manifest.
    pub path: String,
    /// Symbols this file defines, in declaration order.
    pub provides: Vec<String>,
    /// Symbols that must be loaded before this file, in declaration order.
    pub requires: Vec<String>,
    /// File contents.
    pub content: String,
}

impl SourceFile {
    /// Create a file from its path, edges and contents.
    pub fn new(
        path: impl Into<String>,
        provides: Vec<String>,
        requires: Vec<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            provides,
            requires,
            content: content.into(),
        }
    }
}

/// Immutable mapping from symbols to the files that provide them.
#[derive(Debug, Default)]
pub struct SymbolTable {
    files: Vec<SourceFile>,
    providers: HashMap<String, FileId>,
    base: Option<SourceFile>,
}

impl SymbolTable {
    /// Build a table, rejecting duplicate providers and self-requirements.
    pub fn new(files: Vec<SourceFile>) -> Result<Self, KitchenError> {
        let mut providers: HashMap<String, FileId> = HashMap::new();

        for (index, file) in files.iter().enumerate() {
            for symbol in &file.provides {
                if file.requires.contains(symbol) {
                    return Err(KitchenError::SelfRequirement {
                        path: file.path.clone(),
                        symbol: symbol.clone(),
                    });
                }
                if let Some(existing) = providers.insert(symbol.clone(), FileId(index)) {
                    // A file repeating its own provide is harmless.
                    if existing.0 != index {
                        return Err(KitchenError::DuplicateProvider {
                            symbol: symbol.clone(),
                            first: files[existing.0].path.clone(),
                            second: file.path.clone(),
                        });
                    }
                }
            }
        }

        Ok(Self {
            files,
            providers,
            base: None,
        })
    }

    /// Attach the base runtime file emitted ahead of every bundle.
    #[must_use]
    pub fn with_base(mut self, base: SourceFile) -> Self {
        self.base = Some(base);
        self
    }

    /// The base runtime file, if one was configured.
    pub fn base(&self) -> Option<&SourceFile> {
        self.base.as_ref()
    }

    /// File providing `symbol`.
    pub fn provider(&self, symbol: &str) -> Option<FileId> {
        self.providers.get(symbol).copied()
    }

    /// File by id. Ids only come from this table, so the lookup cannot miss.
    pub fn file(&self, id: FileId) -> &SourceFile {
        &self.files[id.0]
    }

    /// All files in manifest order.
    pub fn files(&self) -> impl Iterator<Item = (FileId, &SourceFile)> {
        self.files.iter().enumerate().map(|(i, f)| (FileId(i), f))
    }

    /// Number of files (excluding the base file).
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the table holds no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of distinct provided symbols.
    pub fn symbol_count(&self) -> usize {
        self.providers.len()
    }
}
