//! Remote build adapter for the Closure Compiler service.
//!
//! Every request uses the same fixed configuration: advanced optimizations,
//! JSON output, the Closure Library on the compiler's classpath and pretty
//! printing. The compiled preview also gets a short prelude that forwards
//! `goog.debug` log records to the playground console.
//!
//! Failures never escape this module as errors. A non-success status, a
//! deadline overrun, a transport error or an unreadable payload all become
//! [`BuildResult::failed`], so callers always get a well-formed result.
//! Such synthetic results are not cached.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::cache::{Cache, CacheKey, Namespace};
use crate::config::CompilerSection;
use crate::constants::COMPILE_FAILED_MESSAGE;
use crate::core::KitchenError;

/// Fixed request fields sent after the source.
const FIXED_FIELDS: &[(&str, &str)] = &[
    ("compilation_level", "ADVANCED_OPTIMIZATIONS"),
    ("output_format", "json"),
    ("use_closure_library", "true"),
    ("formatting", "pretty_print"),
];

const OUTPUT_INFO: &[&str] = &["compiled_code", "warnings", "errors"];

/// Source submitted for compilation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildRequest {
    source: String,
}

impl BuildRequest {
    /// Surrounding whitespace is dropped; everything inside is kept verbatim.
    pub fn new(source: &str) -> Self {
        Self {
            source: source.trim().to_string(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// The key is the exact source text in the compile namespace.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(Namespace::Compile, self.source.clone())
    }

    /// Form body: output selectors, the optional prelude, the source, then
    /// the fixed configuration.
    fn form<'a>(&'a self, prelude: &'a str) -> Vec<(&'static str, &'a str)> {
        let mut form: Vec<(&'static str, &'a str)> =
            OUTPUT_INFO.iter().map(|info| ("output_info", *info)).collect();
        if !prelude.trim().is_empty() {
            form.push(("js_code", prelude));
        }
        form.push(("js_code", &self.source));
        form.extend_from_slice(FIXED_FIELDS);
        form
    }
}

/// One compiler error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileError {
    #[serde(default)]
    pub lineno: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charno: Option<i64>,
    pub error: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
}

impl CompileError {
    /// An error with only a line number and message.
    pub fn new(lineno: i64, error: impl Into<String>) -> Self {
        Self {
            lineno,
            charno: None,
            error: error.into(),
            kind: None,
            file: None,
            line: None,
        }
    }
}

/// One compiler warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileWarning {
    #[serde(default)]
    pub lineno: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charno: Option<i64>,
    pub warning: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
}

/// Request-level failure reported by the service itself (bad parameters,
/// oversized input, quota).
#[derive(Debug, Clone, Deserialize)]
struct ServerError {
    #[serde(default)]
    code: i64,
    error: String,
}

/// Payload as the service sends it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServicePayload {
    #[serde(default)]
    compiled_code: String,
    #[serde(default)]
    errors: Vec<CompileError>,
    #[serde(default)]
    warnings: Vec<CompileWarning>,
    #[serde(default)]
    server_errors: Vec<ServerError>,
    #[serde(default)]
    statistics: Option<serde_json::Value>,
}

/// Compiled artifact plus diagnostics, as returned to the playground.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildResult {
    pub compiled_code: String,
    pub errors: Vec<CompileError>,
    #[serde(default)]
    pub warnings: Vec<CompileWarning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<serde_json::Value>,
}

impl BuildResult {
    /// Synthetic result for a request that never got a usable answer.
    pub fn failed() -> Self {
        Self {
            compiled_code: String::new(),
            errors: vec![CompileError::new(0, COMPILE_FAILED_MESSAGE)],
            warnings: Vec::new(),
            statistics: None,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.compiled_code.is_empty()
            && self.errors.len() == 1
            && self.errors[0].error == COMPILE_FAILED_MESSAGE
    }
}

impl From<ServicePayload> for BuildResult {
    fn from(payload: ServicePayload) -> Self {
        let mut errors = payload.errors;
        errors.extend(
            payload
                .server_errors
                .into_iter()
                .map(|e| CompileError::new(0, format!("{} (code {})", e.error, e.code))),
        );
        Self {
            compiled_code: payload.compiled_code,
            errors,
            warnings: payload.warnings,
            statistics: payload.statistics,
        }
    }
}

/// Client for the compilation service.
#[derive(Debug, Clone)]
pub struct CompilerClient {
    http: reqwest::Client,
    endpoint: String,
    prelude: String,
    timeout: Duration,
}

impl CompilerClient {
    /// Build a client from the `[compiler]` section.
    pub fn new(config: &CompilerSection) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("kitchen/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client for the compiler service")?;
        Ok(Self::with_client(http, config))
    }

    /// Reuse an existing HTTP client.
    pub fn with_client(http: reqwest::Client, config: &CompilerSection) -> Self {
        Self {
            http,
            endpoint: config.endpoint.clone(),
            prelude: config.prelude.clone(),
            timeout: config.timeout(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one request and parse the reply.
    ///
    /// # Errors
    ///
    /// [`KitchenError::NetworkError`] for transport failures, deadline
    /// overruns, non-success statuses and unparseable payloads.
    pub async fn request(&self, request: &BuildRequest) -> Result<BuildResult, KitchenError> {
        let network_error = |reason: String| KitchenError::NetworkError {
            operation: "compile".to_string(),
            reason,
        };

        tracing::info!("Request to Closure Compiler Service");
        let response = self
            .http
            .post(&self.endpoint)
            .timeout(self.timeout)
            .form(&request.form(&self.prelude))
            .send()
            .await
            .map_err(|e| network_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(network_error(format!("HTTP {status}")));
        }

        let payload: ServicePayload =
            response.json().await.map_err(|e| network_error(e.to_string()))?;
        Ok(payload.into())
    }

    /// Compile without touching the cache. Never fails.
    pub async fn compile(&self, request: &BuildRequest) -> BuildResult {
        match self.request(request).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Compilation request failed: {}", e);
                BuildResult::failed()
            }
        }
    }

    /// Compile through the shared cache.
    ///
    /// Successful replies are stored without expiry, since the key is the
    /// source itself. Synthetic failures are returned but not stored.
    pub async fn compile_cached(&self, cache: &Cache, request: &BuildRequest) -> Arc<BuildResult> {
        let outcome =
            cache.get_or_compute(request.cache_key(), None, || self.request(request)).await;

        match outcome {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Compilation request failed: {}", e);
                Arc::new(BuildResult::failed())
            }
        }
    }
}
