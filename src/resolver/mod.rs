//! Dependency resolution: expand requested symbols into an ordered bundle.
//!
//! The resolver walks the requires-graph of a [`SymbolTable`] depth first and
//! emits files in post-order, so every file appears after the files providing
//! what it requires. Traversal starts from the bootstrap set (the base runtime
//! file, then the configured bootstrap symbols) and continues with the
//! requested symbols in their normalized order.
//!
//! # Visited sets
//!
//! Two sets live for the duration of one [`Resolver::resolve`] call:
//! - symbols already entered, so duplicates and siblings short-circuit and a
//!   missing symbol is reported once
//! - files already entered, so a file is emitted at most once and cycles in
//!   the requires-graph terminate
//!
//! A file is marked visited *before* its requirements are explored. When a
//! cycle leads back to it, the walk simply stops there and the file is emitted
//! once its own requirements finish.
//!
//! # Failure semantics
//!
//! A symbol nobody provides is recorded as a diagnostic (`"x.Y is not exist."`)
//! and the walk carries on. A file requiring such a symbol is still emitted.
//! Resolution never fails as a whole.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::cache::{Cache, CacheKey, Namespace};
use crate::constants::SYMBOL_NOT_FOUND_SUFFIX;
use crate::symbols::{FileId, SymbolTable};

/// A normalized set of requested symbols.
///
/// Construction sorts and deduplicates, so two requests naming the same
/// symbols in any order compare equal and share a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ResolutionRequest {
    symbols: Vec<String>,
}

impl ResolutionRequest {
    /// Normalize a caller-supplied symbol list.
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut symbols: Vec<String> = symbols.into_iter().map(Into::into).collect();
        symbols.sort();
        symbols.dedup();
        Self {
            symbols,
        }
    }

    /// Symbols in traversal order.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Stable rendering of the request, one symbol per line.
    pub fn canonical(&self) -> String {
        self.symbols.join("\n")
    }

    /// Fixed-width token identifying this request in the shared cache.
    pub fn cache_key(&self) -> CacheKey {
        let digest = Sha256::digest(self.canonical().as_bytes());
        CacheKey::new(Namespace::Deps, hex::encode(digest))
    }
}

/// Ordered bundle plus diagnostics for unresolvable symbols.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolutionResult {
    /// Paths of the emitted files, base file first, in dependency order.
    pub files: Vec<String>,
    /// Contents of the emitted files, in the same order.
    pub contents: Vec<String>,
    /// One message per symbol with no provider.
    pub diagnostics: Vec<String>,
}

impl ResolutionResult {
    /// Concatenated bundle source.
    pub fn code(&self) -> String {
        let mut code = String::with_capacity(self.contents.iter().map(|c| c.len() + 1).sum());
        for content in &self.contents {
            code.push_str(content);
            if !content.ends_with('\n') {
                code.push('\n');
            }
        }
        code
    }

    /// Wire form returned to the playground.
    pub fn to_response(&self) -> BundleResponse {
        BundleResponse {
            code: self.code(),
            errors: self.diagnostics.clone(),
        }
    }
}

/// JSON body of a bundle response: `{ "code": ..., "errors": [...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleResponse {
    /// Concatenated source of every emitted file.
    pub code: String,
    /// Diagnostics for unresolvable symbols.
    pub errors: Vec<String>,
}

/// Message recorded when no file provides `symbol`.
pub fn missing_symbol_message(symbol: &str) -> String {
    format!("{symbol}{SYMBOL_NOT_FOUND_SUFFIX}")
}

/// State of one traversal.
#[derive(Default)]
struct Walk {
    seen_symbols: HashSet<String>,
    seen_files: HashSet<FileId>,
    order: Vec<FileId>,
    diagnostics: Vec<String>,
}

/// Resolves requested symbols against an immutable [`SymbolTable`].
#[derive(Debug, Clone)]
pub struct Resolver {
    table: Arc<SymbolTable>,
    bootstrap: Vec<String>,
}

impl Resolver {
    /// Create a resolver that always loads `bootstrap` after the base file.
    pub fn new(table: Arc<SymbolTable>, bootstrap: Vec<String>) -> Self {
        Self {
            table,
            bootstrap,
        }
    }

    /// The underlying table.
    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    /// Resolve a request into an ordered, deduplicated bundle.
    ///
    /// Output order is fixed by the bootstrap order, then the request's
    /// normalized order, then each file's declared requires order.
    pub fn resolve(&self, request: &ResolutionRequest) -> ResolutionResult {
        let mut walk = Walk::default();

        for symbol in self.bootstrap.iter().chain(request.symbols()) {
            self.visit(symbol, &mut walk);
        }

        let mut result = ResolutionResult {
            diagnostics: walk.diagnostics,
            ..ResolutionResult::default()
        };

        if let Some(base) = self.table.base() {
            result.files.push(base.path.clone());
            result.contents.push(base.content.clone());
        }
        for id in walk.order {
            let file = self.table.file(id);
            result.files.push(file.path.clone());
            result.contents.push(file.content.clone());
        }

        tracing::debug!(
            "Resolved {} symbols into {} files ({} unresolved)",
            request.symbols().len(),
            result.files.len(),
            result.diagnostics.len()
        );
        result
    }

    /// Resolve through the shared cache, keyed by the request's hash.
    pub async fn resolve_cached(
        &self,
        cache: &Cache,
        request: &ResolutionRequest,
        ttl: Duration,
    ) -> Arc<ResolutionResult> {
        let outcome = cache
            .get_or_compute(request.cache_key(), Some(ttl), || async {
                Ok::<_, std::convert::Infallible>(self.resolve(request))
            })
            .await;

        match outcome {
            Ok(result) => result,
            Err(never) => match never {},
        }
    }

    /// Depth-first post-order walk from `root`, on an explicit stack.
    ///
    /// Each frame holds a file and the position of the next requirement to
    /// explore; a file is emitted when its frame runs out of requirements.
    fn visit(&self, root: &str, walk: &mut Walk) {
        let Some(start) = self.enter(root, walk) else {
            return;
        };

        let mut stack: Vec<(FileId, usize)> = vec![(start, 0)];
        while let Some(&(id, next)) = stack.last() {
            let requires = &self.table.file(id).requires;
            match requires.get(next) {
                Some(symbol) => {
                    let top = stack.len() - 1;
                    stack[top].1 += 1;
                    if let Some(child) = self.enter(symbol, walk) {
                        stack.push((child, 0));
                    }
                }
                None => {
                    walk.order.push(id);
                    stack.pop();
                }
            }
        }
    }

    /// Mark `symbol` visited and return its file if that file is new.
    ///
    /// Entering a file marks every symbol it provides, so later requests for
    /// siblings in the same file short-circuit here.
    fn enter(&self, symbol: &str, walk: &mut Walk) -> Option<FileId> {
        if !walk.seen_symbols.insert(symbol.to_string()) {
            return None;
        }

        let Some(id) = self.table.provider(symbol) else {
            walk.diagnostics.push(missing_symbol_message(symbol));
            return None;
        };

        if !walk.seen_files.insert(id) {
            return None;
        }
        for provided in &self.table.file(id).provides {
            walk.seen_symbols.insert(provided.clone());
        }
        Some(id)
    }
}
