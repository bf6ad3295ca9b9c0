//! HTTP routes.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

use super::AppState;
use super::error::ApiError;
use crate::compiler::{BuildRequest, BuildResult};
use crate::core::KitchenError;
use crate::resolver::ResolutionRequest;
use crate::store::ProjectId;

const JSON: &str = "application/json";
const JAVASCRIPT: &str = "text/javascript";

/// Create the router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/js", post(resolve_handler))
        .route("/compile", post(compile_handler).put(compile_handler))
        .route("/docs/{file}", get(docs_handler))
        .route("/samples", get(samples_handler))
        .route("/admin/cache/flush", post(flush_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Reject a request whose declared content type does not contain `expected`.
fn require_content_type(headers: &HeaderMap, expected: &str) -> Result<(), KitchenError> {
    let actual = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or_default();
    if actual.to_ascii_lowercase().contains(expected) {
        Ok(())
    } else {
        Err(KitchenError::UnsupportedContentType {
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }
}

/// Extract the `requires` list from a `/js` body.
fn parse_requires(body: &[u8]) -> Result<Vec<String>, KitchenError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| KitchenError::InvalidRequestBody {
            reason: e.to_string(),
        })?;

    let requires = value.get("requires").ok_or_else(|| KitchenError::MissingField {
        field: "requires".to_string(),
    })?;

    let invalid = || KitchenError::InvalidRequestBody {
        reason: "'requires' must be a list of strings".to_string(),
    };
    requires
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}

/// `POST /js`: resolve `{ "requires": [...] }` into `{ "code", "errors" }`.
async fn resolve_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    require_content_type(&headers, JSON)?;
    let request = ResolutionRequest::new(parse_requires(&body)?);

    let result = state.resolver.resolve_cached(&state.cache, &request, state.deps_ttl).await;
    Ok(Json(result.to_response()).into_response())
}

/// `POST|PUT /compile`: compile a JavaScript body.
async fn compile_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<BuildResult>, ApiError> {
    require_content_type(&headers, JAVASCRIPT)?;
    let source = std::str::from_utf8(&body).map_err(|e| KitchenError::InvalidRequestBody {
        reason: format!("source is not UTF-8: {e}"),
    })?;

    let result = state.compiler.compile_cached(&state.cache, &BuildRequest::new(source)).await;
    Ok(Json(BuildResult::clone(&result)))
}

/// `GET /docs/{file}`: proxied documentation.
///
/// Transport failures are served as misses, like a non-success status.
async fn docs_handler(
    State(state): State<Arc<AppState>>,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    let document = state.docs.fetch_cached(&state.cache, &file).await.map_err(|e| match e {
        KitchenError::NetworkError { .. } => {
            tracing::warn!("{}", e);
            KitchenError::UpstreamNotFound {
                path: file.clone(),
            }
        }
        other => other,
    })?;

    Ok((StatusCode::OK, [(CONTENT_TYPE, document.kind.mime())], document.body.clone())
        .into_response())
}

#[derive(Debug, Deserialize)]
struct SamplesQuery {
    selected: Option<String>,
}

/// `GET /samples?selected=<id>`: public sample listing.
async fn samples_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SamplesQuery>,
) -> Response {
    let selected = query.selected.as_deref().and_then(|id| id.parse::<ProjectId>().ok());
    let listing = state.samples.listing(&state.cache, selected).await;
    ([(CONTENT_TYPE, JSON)], String::clone(&listing)).into_response()
}

/// `POST /admin/cache/flush`: drop every cache entry. Administrators only.
async fn flush_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.identity.is_admin(&headers) {
        return Err(KitchenError::PermissionDenied {
            operation: "flush cache".to_string(),
        }
        .into());
    }

    let flushed = state.cache.flush();
    Ok(Json(json!({ "flushed": flushed })))
}

/// Health check handler.
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let stats = state.cache.stats();
    let table = state.resolver.table();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "files": table.len(),
        "symbols": table.symbol_count(),
        "cache": {
            "hits": stats.hits,
            "misses": stats.misses,
            "entries": stats.entries,
            "hit_rate": stats.hit_rate(),
        },
    }))
}
