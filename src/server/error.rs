//! Mapping of [`KitchenError`] onto HTTP responses.

use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};

use crate::constants::NOT_FOUND_BODY;
use crate::core::KitchenError;

/// A request-level failure.
///
/// Caller mistakes get a 4xx with the reason in plain text. Upstream misses
/// get the fixed `File Not Found` body, and everything else is an opaque 500.
#[derive(Debug)]
pub struct ApiError(pub KitchenError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            KitchenError::MissingField { .. }
            | KitchenError::InvalidRequestBody { .. }
            | KitchenError::UnsupportedContentType { .. } => StatusCode::BAD_REQUEST,
            KitchenError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            KitchenError::UpstreamNotFound { .. }
            | KitchenError::InvalidDocumentPath { .. }
            | KitchenError::ProjectNotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<KitchenError> for ApiError {
    fn from(error: KitchenError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match status {
            StatusCode::NOT_FOUND => NOT_FOUND_BODY.to_string(),
            StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Request failed: {}", self.0);
                "Error".to_string()
            }
            _ => {
                tracing::debug!("Rejected request: {}", self.0);
                self.0.to_string()
            }
        };

        (status, [(CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
    }
}
