use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use crate::helpers::TestApp;

#[tokio::test]
async fn waitlist_signup_normalizes_and_persists() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .post_waitlist(&json!({ "email": "  Foo@Bar.COM " }))
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*"),
        "POST responses must carry the CORS headers too"
    );
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "ok": true, "saved": true }));

    let (email, source): (String, String) =
        sqlx::query_as("SELECT email, source FROM waitlist")
            .fetch_one(app.dm.db())
            .await?;
    assert_eq!(email, "foo@bar.com");
    assert_eq!(source, "howdy-site");

    Ok(())
}

#[tokio::test]
async fn waitlist_signup_invalid_email_is_a_400() -> Result<()> {
    let app = TestApp::spawn().await?;

    let cases = [
        (json!({ "email": "not-an-email" }), "No '@'"),
        (json!({ "email": "missing-domain-dot@example" }), "No '.' in domain"),
        (json!({ "email": "   " }), "Whitespace only"),
        (json!({ "email": "" }), "Empty email"),
        (json!({ "email": null }), "Null email"),
        (json!({}), "Missing email field"),
    ];

    for (body, description) in cases {
        let res = app.post_waitlist(&body).await?;
        assert_eq!(
            res.status(),
            StatusCode::BAD_REQUEST,
            "Expected 400 for: {description}, got: {}",
            res.status()
        );
        let body: Value = res.json().await?;
        assert_eq!(body, json!({ "error": "Invalid email" }));
    }

    // No body at all reads as a missing email.
    let res = app.post_waitlist_raw("").await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "error": "Invalid email" }));

    assert_eq!(app.waitlist_row_count().await?, 0, "Nothing may be persisted");

    Ok(())
}

#[tokio::test]
async fn waitlist_repeat_signup_upserts_a_single_row() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .post_waitlist(&json!({ "email": "le_guin@gmail.com" }))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let (first_updated_at,): (i64,) =
        sqlx::query_as("SELECT updated_at FROM waitlist WHERE email = $1")
            .bind("le_guin@gmail.com")
            .fetch_one(app.dm.db())
            .await?;

    // Same address, different case and whitespace
    let res = app
        .post_waitlist(&json!({ "email": " LE_GUIN@gmail.com " }))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "ok": true, "saved": true }));

    assert_eq!(app.waitlist_row_count().await?, 1, "Upsert, not insert");

    let (second_updated_at,): (i64,) =
        sqlx::query_as("SELECT updated_at FROM waitlist WHERE email = $1")
            .bind("le_guin@gmail.com")
            .fetch_one(app.dm.db())
            .await?;
    assert!(second_updated_at >= first_updated_at);

    Ok(())
}

#[tokio::test]
async fn waitlist_unsupported_methods_are_a_405() -> Result<()> {
    let app = TestApp::spawn().await?;

    for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
        let res = app
            .http_client
            .request(method.clone(), format!("http://{}/", app.addr))
            .send()
            .await?;
        assert_eq!(
            res.status(),
            StatusCode::METHOD_NOT_ALLOWED,
            "Expected 405 for: {method}"
        );
        let body: Value = res.json().await?;
        assert_eq!(body, json!({ "error": "Method not allowed" }));
    }

    Ok(())
}

#[tokio::test]
async fn waitlist_preflight_is_a_204_with_cors_headers() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .http_client
        .request(Method::OPTIONS, format!("http://{}/", app.addr))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let header = |name: &str| {
        res.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    assert_eq!(header("access-control-allow-origin").as_deref(), Some("*"));
    assert_eq!(
        header("access-control-allow-methods").as_deref(),
        Some("POST, OPTIONS")
    );
    assert_eq!(
        header("access-control-allow-headers").as_deref(),
        Some("Content-Type")
    );

    let body = res.text().await?;
    assert!(body.is_empty(), "Preflight body must be empty, got: {body}");

    Ok(())
}

#[tokio::test]
async fn waitlist_malformed_body_is_acknowledged_unsaved() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.post_waitlist_raw("{not json").await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "ok": true, "saved": false }));

    assert_eq!(app.waitlist_row_count().await?, 0);

    Ok(())
}

#[tokio::test]
async fn waitlist_persistence_failure_is_acknowledged_unsaved() -> Result<()> {
    let app = TestApp::spawn().await?;

    // Make every write fail.
    sqlx::query("DROP TABLE waitlist").execute(app.dm.db()).await?;

    let res = app
        .post_waitlist(&json!({ "email": "le_guin@gmail.com" }))
        .await?;

    assert_eq!(
        res.status(),
        StatusCode::OK,
        "Storage failures must never surface as a 4xx/5xx"
    );
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "ok": true, "saved": false }));

    Ok(())
}
