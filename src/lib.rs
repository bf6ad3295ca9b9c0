//! Kitchen - build/proxy tier of the Closure Kitchen playground
//!
//! Kitchen turns a set of Closure Library symbols into one ordered JavaScript
//! bundle, fronts the Closure Compiler service and proxies the library's
//! documentation. All three share the same shape: derive a cache key, check
//! the shared cache, and on a miss do the expensive work and store the result
//! for a bounded time.
//!
//! # Core Modules
//!
//! ## Resolution
//! - [`symbols`] - symbol table built from a `deps.js` manifest
//! - [`resolver`] - depth-first expansion of requested symbols into a bundle
//!
//! ## Caching and remote services
//! - [`cache`] - namespaced TTL cache with compute-on-miss
//! - [`compiler`] - Closure Compiler service adapter
//! - [`docs`] - documentation fetch and rewrite pipeline
//! - [`samples`] - public sample listing
//!
//! ## Collaborators and surfaces
//! - [`store`] - project storage and caller identity
//! - [`server`] - HTTP routes
//! - [`cli`] - `kitchen` command line
//!
//! ## Support
//! - [`config`] - `~/.kitchen/config.toml`
//! - [`core`] - error types and user-facing error rendering
//! - [`constants`] - deadlines, lifetimes and wire strings
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use kitchen_proxy::cache::Cache;
//! use kitchen_proxy::config::KitchenConfig;
//! use kitchen_proxy::resolver::{ResolutionRequest, Resolver};
//! use kitchen_proxy::symbols::load_symbol_table;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = KitchenConfig::load_with_optional(None).await?;
//! let table = load_symbol_table(&config.deps).await?;
//! let resolver = Resolver::new(Arc::new(table), config.deps.bootstrap.clone());
//! let cache = Cache::in_memory(config.cache.max_entries);
//!
//! let request = ResolutionRequest::new(["goog.ui.Button"]);
//! let bundle = resolver.resolve_cached(&cache, &request, config.deps.ttl()).await;
//! println!("{}", bundle.code());
//! # Ok(())
//! # }
//! ```

// Core functionality modules
pub mod cache;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod resolver;
pub mod symbols;

// Remote services
pub mod compiler;
pub mod docs;
pub mod samples;

// Collaborators and HTTP surface
pub mod server;
pub mod store;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
