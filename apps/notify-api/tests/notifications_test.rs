mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use notify_api::push::store::SubscriptionStore;

#[tokio::test]
async fn config_returns_vapid_public_key() {
    let t = common::test_app(true);
    let server = TestServer::new(t.app).unwrap();

    let resp = server.get("/notifications/config").await;
    resp.assert_status_ok();
    let body: serde_json::Value = resp.json();
    assert_eq!(body["vapidPublicKey"], common::TEST_VAPID_PUBLIC_KEY);
}

#[tokio::test]
async fn config_reports_push_not_configured() {
    let t = common::test_app(false);
    let server = TestServer::new(t.app).unwrap();

    let resp = server.get("/notifications/config").await;
    resp.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["error"]["code"], "PUSH_NOT_CONFIGURED");
}

#[tokio::test]
async fn subscribe_stores_subscription_for_admin() {
    let t = common::test_app(true);
    let server = TestServer::new(t.app).unwrap();

    let resp = server
        .post("/notifications/subscribe")
        .add_header(common::admin_header(), "adm_1")
        .json(&common::subscription_json("https://push.example.com/sub/1", "tBHItJI5svbpez7KI4CCXg"))
        .await;
    resp.assert_status(StatusCode::CREATED);

    let body: serde_json::Value = resp.json();
    assert_eq!(body["endpoint"], "https://push.example.com/sub/1");
    assert_eq!(body["ownerId"], "adm_1");
    assert!(body.get("keys").is_none());
    assert_eq!(t.store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn resubscribing_same_endpoint_does_not_duplicate() {
    let t = common::test_app(true);
    let server = TestServer::new(t.app).unwrap();

    for auth in ["firstAuthSecret", "secondAuthSecret"] {
        server
            .post("/notifications/subscribe")
            .add_header(common::admin_header(), "adm_1")
            .json(&common::subscription_json("https://push.example.com/sub/1", auth))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let subs = t.store.list().await.unwrap();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].keys.auth, "secondAuthSecret");
}

#[tokio::test]
async fn subscribe_requires_admin_identity() {
    let t = common::test_app(true);
    let server = TestServer::new(t.app).unwrap();

    let resp = server
        .post("/notifications/subscribe")
        .json(&common::subscription_json("https://push.example.com/sub/1", "tBH"))
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(t.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn subscribe_rejects_invalid_subscription() {
    let t = common::test_app(true);
    let server = TestServer::new(t.app).unwrap();

    let resp = server
        .post("/notifications/subscribe")
        .add_header(common::admin_header(), "adm_1")
        .json(&common::subscription_json("not-a-url", "tBH"))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"][0]["field"], "subscription.endpoint");
}

#[tokio::test]
async fn subscribe_without_vapid_is_unavailable() {
    let t = common::test_app(false);
    let server = TestServer::new(t.app).unwrap();

    let resp = server
        .post("/notifications/subscribe")
        .add_header(common::admin_header(), "adm_1")
        .json(&common::subscription_json("https://push.example.com/sub/1", "tBH"))
        .await;
    resp.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn unsubscribe_removes_and_is_idempotent() {
    let t = common::test_app(true);
    let server = TestServer::new(t.app).unwrap();

    server
        .post("/notifications/subscribe")
        .add_header(common::admin_header(), "adm_1")
        .json(&common::subscription_json("https://push.example.com/sub/1", "tBH"))
        .await
        .assert_status(StatusCode::CREATED);

    for _ in 0..2 {
        server
            .post("/notifications/unsubscribe")
            .add_header(common::admin_header(), "adm_1")
            .json(&serde_json::json!({ "endpoint": "https://push.example.com/sub/1" }))
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    assert_eq!(t.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn health_is_ok() {
    let t = common::test_app(false);
    let server = TestServer::new(t.app).unwrap();

    let resp = server.get("/health").await;
    resp.assert_status_ok();
    let body = resp.json::<serde_json::Value>();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["sseConnections"], 0);
    assert_eq!(body["pushEnabled"], false);
}
