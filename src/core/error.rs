//! Error handling for Kitchen
//!
//! Two types carry every failure the crate can report:
//! - [`KitchenError`] - the enumerated failure modes, matched on by the HTTP layer
//! - [`ErrorContext`] - a wrapper adding user-facing details and suggestions for the CLI
//!
//! Only a few of these ever reach an HTTP client. Unresolvable symbols travel as
//! diagnostics inside a successful bundle, and remote compile failures become a
//! synthetic [`BuildResult`](crate::compiler::BuildResult). What remains are malformed
//! requests, missing upstream documents and administrative permission checks.
//!
//! # Examples
//!
//! ```rust,no_run
//! use kitchen_proxy::core::{KitchenError, user_friendly_error};
//!
//! let error = KitchenError::ConfigError {
//!     message: "port must be non-zero".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for Kitchen operations.
///
/// # Error Categories
///
/// ## Startup
/// - [`ConfigError`] - invalid configuration values
/// - [`ManifestParseError`] - unreadable `deps.js` manifest
/// - [`SourceFileNotFound`] - a manifest entry points at a missing file
/// - [`DuplicateProvider`] / [`SelfRequirement`] - symbol table invariants violated
///
/// ## Requests
/// - [`MissingField`] / [`InvalidRequestBody`] / [`UnsupportedContentType`] - caller contract violations
/// - [`InvalidDocumentPath`] / [`UpstreamNotFound`] - documentation proxy misses
/// - [`PermissionDenied`] - administrative operation without administrator identity
/// - [`ProjectNotFound`] - unknown or malformed project id
///
/// ## Transport
/// - [`NetworkError`] - transport failure or non-success status from a remote service
///
/// [`ConfigError`]: KitchenError::ConfigError
/// [`ManifestParseError`]: KitchenError::ManifestParseError
/// [`SourceFileNotFound`]: KitchenError::SourceFileNotFound
/// [`DuplicateProvider`]: KitchenError::DuplicateProvider
/// [`SelfRequirement`]: KitchenError::SelfRequirement
/// [`MissingField`]: KitchenError::MissingField
/// [`InvalidRequestBody`]: KitchenError::InvalidRequestBody
/// [`UnsupportedContentType`]: KitchenError::UnsupportedContentType
/// [`InvalidDocumentPath`]: KitchenError::InvalidDocumentPath
/// [`UpstreamNotFound`]: KitchenError::UpstreamNotFound
/// [`PermissionDenied`]: KitchenError::PermissionDenied
/// [`ProjectNotFound`]: KitchenError::ProjectNotFound
/// [`NetworkError`]: KitchenError::NetworkError
#[derive(Error, Debug)]
pub enum KitchenError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// The dependency manifest could not be parsed
    #[error("Invalid dependency manifest {file}")]
    ManifestParseError {
        /// Path to the manifest
        file: String,
        /// Specific reason for the parsing failure
        reason: String,
    },

    /// A file listed in the manifest could not be read
    #[error("Source file '{path}' listed in the manifest could not be read")]
    SourceFileNotFound {
        /// Path of the file relative to the source root
        path: String,
        /// Underlying I/O failure
        reason: String,
    },

    /// Two files claim to provide the same symbol
    #[error("Symbol '{symbol}' is provided by both '{first}' and '{second}'")]
    DuplicateProvider {
        /// The contested symbol
        symbol: String,
        /// File registered first
        first: String,
        /// File that tried to register it again
        second: String,
    },

    /// A file requires one of its own symbols
    #[error("File '{path}' requires '{symbol}', which it provides itself")]
    SelfRequirement {
        /// The offending file
        path: String,
        /// The symbol listed on both sides
        symbol: String,
    },

    /// Request body lacks a required field
    #[error("Request is missing required field '{field}'")]
    MissingField {
        /// Name of the missing field
        field: String,
    },

    /// Request body is not what the endpoint accepts
    #[error("Invalid request body: {reason}")]
    InvalidRequestBody {
        /// Why the body was rejected
        reason: String,
    },

    /// Request declared the wrong content type
    #[error("Unsupported content type '{actual}', expected {expected}")]
    UnsupportedContentType {
        /// Content type the endpoint accepts
        expected: String,
        /// Content type the caller declared
        actual: String,
    },

    /// Document path is not a single file name
    #[error("Invalid document path '{path}'")]
    InvalidDocumentPath {
        /// The rejected path
        path: String,
    },

    /// Upstream documentation host has no such document
    #[error("Upstream document '{path}' not found")]
    UpstreamNotFound {
        /// Requested path below the base URL
        path: String,
    },

    /// Remote call failed
    #[error("Network error during {operation}: {reason}")]
    NetworkError {
        /// What was being attempted
        operation: String,
        /// Transport error or status description
        reason: String,
    },

    /// Caller lacks the identity the operation needs
    #[error("Permission denied: {operation}")]
    PermissionDenied {
        /// The operation that was refused
        operation: String,
    },

    /// Project id is malformed or names no stored project
    #[error("Project '{id}' not found")]
    ProjectNotFound {
        /// The id as given by the caller
        id: String,
    },

    /// Configuration file is not valid TOML
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Anything else
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

/// Error context wrapper that adds details and suggestions to a [`KitchenError`].
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: KitchenError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context with no suggestion or details.
    #[must_use]
    pub const fn new(error: KitchenError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr: error in red, details in yellow, suggestion in green.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to an [`ErrorContext`] with actionable suggestions.
///
/// Recognises [`KitchenError`] variants, also behind added context, and
/// missing files; anything else is reported with its cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let error = match error.downcast::<ErrorContext>() {
        Ok(ctx) => return ctx,
        Err(error) => error,
    };

    let error = match error.downcast::<KitchenError>() {
        Ok(kitchen_error) => return create_error_context(kitchen_error),
        Err(error) => error,
    };

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::NotFound {
            return ErrorContext::new(KitchenError::Other {
                message: error.to_string(),
            })
            .with_suggestion("Check that the file or directory exists and the path is correct");
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(KitchenError::Other {
        message,
    })
}

fn create_error_context(error: KitchenError) -> ErrorContext {
    match &error {
        KitchenError::ConfigError { .. } => ErrorContext::new(error)
            .with_suggestion("Run 'kitchen config show' to inspect the effective configuration"),
        KitchenError::ManifestParseError { reason, .. } => {
            let reason = reason.clone();
            ErrorContext::new(error).with_details(reason).with_suggestion(
                "Each entry must look like goog.addDependency('file.js', ['a.B'], ['c.D']);",
            )
        }
        KitchenError::SourceFileNotFound { reason, .. } => {
            let reason = reason.clone();
            ErrorContext::new(error)
                .with_details(reason)
                .with_suggestion("Check that [deps].root points at the directory the manifest paths are relative to")
        }
        KitchenError::DuplicateProvider { .. } | KitchenError::SelfRequirement { .. } => {
            ErrorContext::new(error)
                .with_details("Every symbol must be provided by exactly one file, and no file may require what it provides")
                .with_suggestion("Regenerate deps.js from the library sources")
        }
        KitchenError::NetworkError { .. } => ErrorContext::new(error)
            .with_suggestion("Check your network connection and the configured endpoint"),
        KitchenError::TomlError(_) => ErrorContext::new(error)
            .with_suggestion("Check the TOML syntax of the configuration file"),
        _ => ErrorContext::new(error),
    }
}
