//! Integration test suite for Kitchen
//!
//! End-to-end tests that drive the public API, the HTTP router and the
//! `kitchen` binary. Remote services are replaced by stub servers on
//! `127.0.0.1:0`, so the suite needs no network access.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **resolution**: manifest loading and bundle resolution
//! - **routes**: `/js`, `/samples`, `/admin/cache/flush` and `/health`
//! - **compile**: `/compile` against a stub compiler service
//! - **docs_proxy**: `/docs/{file}` against a stub documentation host
//! - **cli**: the `kitchen` binary

mod support;

mod cli;
mod compile;
mod docs_proxy;
mod resolution;
mod routes;
