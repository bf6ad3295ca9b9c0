//! Global constants used throughout the Kitchen codebase.
//!
//! This module contains deadlines, cache lifetimes, namespace tags and the
//! fixed strings that appear on the wire. Defining them centrally keeps the
//! HTTP handlers, the adapters and their tests in agreement.

use std::time::Duration;

/// Deadline for a single request to the compilation service (10 seconds).
///
/// A request that exceeds the deadline is reported exactly like a
/// non-success response from the remote.
pub const COMPILE_DEADLINE: Duration = Duration::from_secs(10);

/// Deadline for fetching one upstream documentation file (30 seconds).
pub const DOCS_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Lifetime of a resolved dependency bundle (6 hours).
///
/// The symbol table never changes while the process runs, so bundles only
/// expire to keep the store from holding rarely used combinations forever.
pub const DEPS_CACHE_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// Lifetime of a rewritten documentation page (6 hours).
pub const DOCS_CACHE_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// Lifetime of the public sample listing (24 hours).
pub const SAMPLES_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default upper bound on the number of live cache entries.
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 10_000;

/// Namespace tag for resolved dependency bundles.
pub const NS_DEPS: &str = "deps";

/// Namespace tag for compiler results.
pub const NS_COMPILE: &str = "compile";

/// Namespace tag for rewritten documentation pages.
pub const NS_DOCS: &str = "docs";

/// Namespace tag for the public sample listing.
pub const NS_SAMPLES: &str = "samples";

/// Error text of the synthetic result returned when the compiler is unreachable.
pub const COMPILE_FAILED_MESSAGE: &str = "Compilation request is failed.";

/// Suffix of the diagnostic recorded for a symbol nobody provides.
pub const SYMBOL_NOT_FOUND_SUFFIX: &str = " is not exist.";

/// Plain-text body served when an upstream document does not exist.
pub const NOT_FOUND_BODY: &str = "File Not Found";

/// Default endpoint of the Closure Compiler service.
pub const DEFAULT_COMPILER_ENDPOINT: &str = "http://closure-compiler.appspot.com/compile";

/// Default upstream documentation tree.
pub const DEFAULT_DOCS_BASE_URL: &str = "http://closure-library.googlecode.com/svn/docs/";

/// Symbols loaded into every bundle after the base runtime file.
pub const DEFAULT_BOOTSTRAP_SYMBOLS: &[&str] = &["goog.debug.Logger", "goog.debug.LogManager"];

/// Environment variable that overrides the configuration file location.
pub const CONFIG_PATH_ENV: &str = "KITCHEN_CONFIG_PATH";
