//! Integration tests for bearer authentication and the error envelope.

mod helpers;

use axum::http::StatusCode;
use uuid::Uuid;

use drivehub_entity::user::UserRole;

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/auth/me", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["code"], "AUTHENTICATION");
    assert!(response.body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_expired_token_is_unauthorized() {
    let app = helpers::TestApp::new().await;
    let token = app.token_for(Uuid::new_v4(), "late@example.com", UserRole::User, -3600);

    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["code"], "AUTHENTICATION");
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request("GET", "/api/files/list", None, Some("not-a-jwt"))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_registers_on_first_request() {
    let app = helpers::TestApp::new().await;
    let alice = app.login("alice@example.com", UserRole::User);

    let response = app.request("GET", "/api/auth/me", None, Some(&alice.token)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], alice.id.to_string());
    assert_eq!(response.body["email"], "alice@example.com");
    assert_eq!(response.body["role"], "USER");
    assert_eq!(response.body["storageQuota"], helpers::QUOTA);
    assert_eq!(response.body["storageUsed"], 0);
}

#[tokio::test]
async fn test_email_taken_by_another_subject_conflicts() {
    let app = helpers::TestApp::new().await;
    app.signup("alice@example.com").await;
    let impostor = app.login("alice@example.com", UserRole::User);

    let response = app
        .request("GET", "/api/auth/me", None, Some(&impostor.token))
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_health_is_public() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["database"], true);
    assert_eq!(response.body["storage"], true);
}

#[tokio::test]
async fn test_health_reports_degraded_storage() {
    let app = helpers::TestApp::new().await;
    app.blobs.set_fail_stores(true);

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "degraded");
    assert_eq!(response.body["storage"], false);
}
