//! Test utilities for Kitchen
//!
//! Helpers shared by unit tests and the integration suite:
//! - [`init_test_logging`] wires `tracing` output into the test harness
//! - [`fixtures`] builds small symbol tables and `deps.js` trees on disk
//! - [`upstream`] runs stub HTTP servers standing in for the compiler
//!   service and the documentation host
//!
//! # Example
//!
//! ```rust,no_run
//! use kitchen_proxy::test_utils::{fixtures, upstream};
//! use axum::{Router, routing::get};
//!
//! # async fn demo() {
//! let resolver = fixtures::fixture_resolver();
//! let base_url = upstream::spawn_upstream(Router::new().route("/a.html", get(|| async { "<p>a</p>" }))).await;
//! # }
//! ```

pub mod fixtures;
pub mod upstream;

pub use fixtures::{DepsTree, fixture_resolver, fixture_table};
pub use upstream::spawn_upstream;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`. With neither, tests stay
/// silent.
///
/// ```bash
/// RUST_LOG=kitchen_proxy=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
