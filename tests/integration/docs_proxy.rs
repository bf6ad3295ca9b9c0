//! `/docs/{file}` against a stub documentation host.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::get as route_get;
use kitchen_proxy::test_utils::spawn_upstream;
use kitchen_proxy::test_utils::upstream::unreachable_url;

use crate::support::{TestApp, body_text, content_type, get};

const PAGE: &str = r#"<html><head><link rel="stylesheet" href="static/css/base.css"><script src="x.js"></script></head>
<body><a href="class_goog_Uri.html">Uri</a> <a href="http://example.com/">home</a></body></html>"#;

fn docs_host(calls: Arc<AtomicUsize>) -> Router {
    Router::new()
        .route(
            "/class_goog_Uri.html",
            route_get(move || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    PAGE
                }
            }),
        )
        .route("/static.css", route_get(|| async { "body { color: red; }" }))
}

#[tokio::test]
async fn test_html_page_is_rewritten_and_cached() -> Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = TestApp::new(Router::new(), docs_host(calls.clone())).await;
    let base = app.state.docs.rules().base_url().to_string();

    let response = app.send(get("/docs/class_goog_Uri.html")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "text/html; charset=utf-8");

    let page = body_text(response).await;
    assert!(!page.contains("<script"));
    assert!(page.contains(&format!("href=\"{base}static/css/base.css\"")));
    assert!(page.contains("<a href=\"class_goog_Uri.html\">Uri</a>"));
    assert!(page.contains("<a target=\"_blank\" href=\"http://example.com/\">"));
    assert!(page.contains("<!--kitchen--></body>"));

    let again = body_text(app.send(get("/docs/class_goog_Uri.html")).await).await;
    assert_eq!(page, again);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_non_html_passes_through() -> Result<()> {
    let app = TestApp::new(Router::new(), docs_host(Arc::default())).await;

    let response = app.send(get("/docs/static.css")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "text/css; charset=utf-8");
    assert_eq!(body_text(response).await, "body { color: red; }");
    Ok(())
}

#[tokio::test]
async fn test_missing_page_is_plain_not_found() -> Result<()> {
    let app = TestApp::new(Router::new(), docs_host(Arc::default())).await;

    let response = app.send(get("/docs/missing.html")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(content_type(&response).starts_with("text/plain"));
    assert_eq!(body_text(response).await, "File Not Found");
    assert_eq!(app.state.cache.stats().entries, 0);
    Ok(())
}

#[tokio::test]
async fn test_traversal_is_not_found() -> Result<()> {
    let app = TestApp::new(Router::new(), docs_host(Arc::default())).await;

    let response = app.send(get("/docs/..%2Fsecret.html")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "File Not Found");
    Ok(())
}

#[tokio::test]
async fn test_unreachable_host_is_plain_not_found() -> Result<()> {
    let compiler_base = spawn_upstream(Router::new()).await;
    let app = TestApp::with_base_urls(compiler_base, unreachable_url().await);

    let response = app.send(get("/docs/x.html")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(content_type(&response).starts_with("text/plain"));
    assert_eq!(body_text(response).await, "File Not Found");
    assert_eq!(app.state.cache.stats().entries, 0);
    Ok(())
}

#[tokio::test]
async fn test_latin1_page_is_served_byte_for_byte() -> Result<()> {
    let host = Router::new()
        .route("/latin1.html", route_get(|| async { &b"<html><body><p>caf\xe9</p></body></html>"[..] }));
    let app = TestApp::new(Router::new(), host).await;

    let response = app.send(get("/docs/latin1.html")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(&bytes[..], b"<html><body><p>caf\xe9</p><!--kitchen--></body></html>");
    Ok(())
}
