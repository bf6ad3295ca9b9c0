//! Shared helpers: a fully wired router with stub upstreams.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, Response};
use kitchen_proxy::config::KitchenConfig;
use kitchen_proxy::server::{AppState, create_router};
use kitchen_proxy::store::{MemoryProjectStore, ProjectStore};
use kitchen_proxy::test_utils::{fixture_table, init_test_logging, spawn_upstream};
use tower::ServiceExt;

pub const ADMIN_TOKEN: &str = "test-admin-token";

/// Router plus the state behind it, so tests can inspect the cache.
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub projects: Arc<MemoryProjectStore>,
}

impl TestApp {
    /// Wire the fixture symbol table to stub compiler and docs upstreams.
    pub async fn new(compiler: Router, docs: Router) -> Self {
        let compiler_base = spawn_upstream(compiler).await;
        let docs_base = spawn_upstream(docs).await;
        Self::with_base_urls(compiler_base, docs_base)
    }

    /// Wire the fixture symbol table to upstreams at the given base URLs.
    pub fn with_base_urls(compiler_base: String, docs_base: String) -> Self {
        init_test_logging(None);

        let mut config = KitchenConfig::default();
        config.server.admin_token = Some(ADMIN_TOKEN.to_string());
        config.compiler.endpoint = format!("{compiler_base}compile");
        config.compiler.timeout_secs = 2;
        config.docs.base_url = docs_base;
        config.docs.timeout_secs = 2;
        config.docs.extra = "<!--kitchen-->".to_string();

        let projects = Arc::new(MemoryProjectStore::new());
        let store: Arc<dyn ProjectStore> = projects.clone();
        let state = Arc::new(
            AppState::new(&config, fixture_table(), store).expect("state should build"),
        );

        Self {
            router: create_router(state.clone()),
            state,
            projects,
        }
    }

    /// App whose upstreams answer nothing but 404.
    pub async fn offline() -> Self {
        Self::new(Router::new(), Router::new()).await
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.expect("router is infallible")
    }
}

pub fn post(uri: &str, content_type: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, content_type)
        .body(body.into())
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

pub fn content_type(response: &Response<Body>) -> String {
    response.headers()[CONTENT_TYPE].to_str().unwrap().to_string()
}
