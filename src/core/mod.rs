//! Core types for Kitchen
//!
//! Error handling shared by every other module:
//! - [`KitchenError`] - enumerated failure modes
//! - [`ErrorContext`] - user-facing wrapper with details and suggestions
//! - [`user_friendly_error`] - converts any [`anyhow::Error`] for CLI display

pub mod error;

pub use error::{ErrorContext, KitchenError, user_friendly_error};
