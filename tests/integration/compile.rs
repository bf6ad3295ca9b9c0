//! `/compile` against a stub compiler service.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::post as route_post;

use crate::support::{TestApp, body_json, post};

const REPLY: &str = r#"{
    "compiledCode": "alert(\"hi\");",
    "errors": [],
    "warnings": [{"lineno": 1, "charno": 4, "warning": "dangerous use of this", "type": "JSC_UNSAFE_THIS"}]
}"#;

/// Compiler stub answering [`REPLY`] and counting calls.
fn counting_compiler(calls: Arc<AtomicUsize>) -> Router {
    Router::new().route(
        "/compile",
        route_post(move || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                ([("content-type", "application/json")], REPLY)
            }
        }),
    )
}

#[tokio::test]
async fn test_compile_returns_service_result() -> Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = TestApp::new(counting_compiler(calls.clone()), Router::new()).await;

    let response = app.send(post("/compile", "text/javascript", "alert('hi');")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["compiledCode"], "alert(\"hi\");");
    assert_eq!(body["errors"], serde_json::json!([]));
    assert_eq!(body["warnings"][0]["type"], "JSC_UNSAFE_THIS");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_put_and_surrounding_whitespace_hit_the_same_entry() -> Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = TestApp::new(counting_compiler(calls.clone()), Router::new()).await;

    app.send(post("/compile", "text/javascript; charset=utf-8", "alert('hi');")).await;

    let put = Request::builder()
        .method("PUT")
        .uri("/compile")
        .header("content-type", "text/javascript")
        .body(Body::from("\n  alert('hi');\n"))?;
    let response = app.send(put).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["compiledCode"], "alert(\"hi\");");

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(app.state.cache.stats().hits, 1);
    Ok(())
}

#[tokio::test]
async fn test_unavailable_service_yields_uncached_failure() -> Result<()> {
    let app = TestApp::offline().await;

    let response = app.send(post("/compile", "text/javascript", "alert(1);")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({
            "compiledCode": "",
            "errors": [{"lineno": 0, "error": "Compilation request is failed."}],
            "warnings": []
        })
    );
    assert_eq!(app.state.cache.stats().entries, 0);
    Ok(())
}

#[tokio::test]
async fn test_compile_rejects_other_content_types() -> Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = TestApp::new(counting_compiler(calls.clone()), Router::new()).await;

    let response = app.send(post("/compile", "application/json", "alert(1);")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let binary = app.send(post("/compile", "text/javascript", vec![0xff_u8, 0xfe, 0x00])).await;
    assert_eq!(binary.status(), StatusCode::BAD_REQUEST);

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn test_slow_service_yields_uncached_failure() -> Result<()> {
    let slow = Router::new().route(
        "/compile",
        route_post(|| async {
            tokio::time::sleep(Duration::from_secs(4)).await;
            ([("content-type", "application/json")], REPLY)
        }),
    );
    let app = TestApp::new(slow, Router::new()).await;

    let response = app.send(post("/compile", "text/javascript", "alert(1);")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["compiledCode"], "");
    assert_eq!(body["errors"][0]["error"], "Compilation request is failed.");
    assert_eq!(app.state.cache.stats().entries, 0);
    Ok(())
}
