//! `/js`, `/samples`, `/admin/cache/flush` and `/health` through the router.

use anyhow::Result;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use kitchen_proxy::store::Partition;

use crate::support::{ADMIN_TOKEN, TestApp, body_json, body_text, content_type, get, post};

#[tokio::test]
async fn test_js_resolves_bundle() -> Result<()> {
    let app = TestApp::offline().await;

    let response =
        app.send(post("/js", "application/json", r#"{"requires": ["widget.Widget"]}"#)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(content_type(&response).starts_with("application/json"));

    let body = body_json(response).await;
    assert_eq!(
        body["code"],
        "// base.js\n// debug/logger.js\n// dom.js\n// widget.js\n"
    );
    assert_eq!(body["errors"], serde_json::json!([]));
    Ok(())
}

#[tokio::test]
async fn test_js_reports_unknown_symbols() -> Result<()> {
    let app = TestApp::offline().await;

    let response = app
        .send(post("/js", "application/json", r#"{"requires": ["a.B", "no.Such", "x.Unknown"]}"#))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["code"], "// base.js\n// debug/logger.js\n// a.js\n");
    assert_eq!(
        body["errors"],
        serde_json::json!(["no.Such is not exist.", "x.Unknown is not exist."])
    );
    Ok(())
}

#[tokio::test]
async fn test_js_second_request_is_a_cache_hit() -> Result<()> {
    let app = TestApp::offline().await;

    let first = app.send(post("/js", "application/json", r#"{"requires": ["dom", "a.B"]}"#)).await;
    let first = body_text(first).await;
    let second = app.send(post("/js", "application/json", r#"{"requires": ["a.B", "dom"]}"#)).await;
    let second = body_text(second).await;

    assert_eq!(first, second);
    let stats = app.state.cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.entries, 1);
    Ok(())
}

#[tokio::test]
async fn test_js_rejects_malformed_requests() -> Result<()> {
    let app = TestApp::offline().await;

    let wrong_type = app.send(post("/js", "text/plain", r#"{"requires": []}"#)).await;
    assert_eq!(wrong_type.status(), StatusCode::BAD_REQUEST);

    let missing = app.send(post("/js", "application/json", r#"{"symbols": ["a.B"]}"#)).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(missing).await.contains("requires"));

    let not_json = app.send(post("/js", "application/json", "requires=a.B")).await;
    assert_eq!(not_json.status(), StatusCode::BAD_REQUEST);

    assert_eq!(app.state.cache.stats().entries, 0);
    Ok(())
}

#[tokio::test]
async fn test_samples_listing() -> Result<()> {
    let app = TestApp::offline().await;
    let hello = app.projects.create(Partition::Shared, None, "Hello", "alert(1);", "<p>hi</p>");
    app.projects.create(Partition::Shared, None, "", "draft();", "");
    app.projects.create(Partition::Private, Some("alice"), "Secret", "secret();", "");

    let plain = body_json(app.send(get("/samples")).await).await;
    assert_eq!(plain, serde_json::json!({ "s_1": { "n": "Hello" } }));

    let selected = app.send(get(&format!("/samples?selected={hello}"))).await;
    assert_eq!(selected.status(), StatusCode::OK);
    assert_eq!(
        body_json(selected).await,
        serde_json::json!({ "s_1": { "n": "Hello", "j": "alert(1);", "h": "<p>hi</p>" } })
    );

    let bogus = body_json(app.send(get("/samples?selected=nonsense")).await).await;
    assert_eq!(bogus, plain);
    Ok(())
}

#[tokio::test]
async fn test_flush_requires_admin_token() -> Result<()> {
    let app = TestApp::offline().await;
    app.send(post("/js", "application/json", r#"{"requires": ["a.B"]}"#)).await;
    assert_eq!(app.state.cache.stats().entries, 1);

    let anonymous = app.send(post("/admin/cache/flush", "application/json", "")).await;
    assert_eq!(anonymous.status(), StatusCode::FORBIDDEN);

    let mut wrong = post("/admin/cache/flush", "application/json", "");
    wrong.headers_mut().insert(AUTHORIZATION, "Bearer nope".parse()?);
    assert_eq!(app.send(wrong).await.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.state.cache.stats().entries, 1);

    let mut admin = post("/admin/cache/flush", "application/json", "");
    admin.headers_mut().insert(AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}").parse()?);
    let response = app.send(admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({ "flushed": 1 }));
    assert_eq!(app.state.cache.stats().entries, 0);
    Ok(())
}

#[tokio::test]
async fn test_health_reports_table_and_cache() -> Result<()> {
    let app = TestApp::offline().await;
    app.send(post("/js", "application/json", r#"{"requires": ["a.B"]}"#)).await;

    let response = app.send(get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["files"], 6);
    assert_eq!(body["symbols"], 7);
    assert_eq!(body["cache"]["entries"], 1);
    assert_eq!(body["cache"]["misses"], 1);
    Ok(())
}
