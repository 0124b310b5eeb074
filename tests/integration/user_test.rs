//! Integration tests for user administration.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use drivehub_entity::user::UserRole;

#[tokio::test]
async fn test_admin_endpoints_require_admin() {
    let app = helpers::TestApp::new().await;
    let alice = app.signup("alice@example.com").await;

    let response = app.request("GET", "/api/users", None, Some(&alice.token)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_list_search_and_get() {
    let app = helpers::TestApp::new().await;
    let admin = app.signup_with_role("admin@example.com", UserRole::Admin).await;
    let alice = app.signup("alice@example.com").await;
    app.signup("bob@example.com").await;

    let response = app.request("GET", "/api/users?limit=2", None, Some(&admin.token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["meta"]["total"], 3);
    assert_eq!(response.body["items"].as_array().unwrap().len(), 2);

    let response = app
        .request("GET", "/api/users/search?search=ALICE", None, Some(&admin.token))
        .await;
    assert_eq!(response.body["meta"]["total"], 1);
    assert_eq!(response.body["items"][0]["id"], alice.id.to_string());

    let response = app
        .request("GET", "/api/users/search?role=ADMIN", None, Some(&admin.token))
        .await;
    assert_eq!(response.body["items"][0]["email"], "admin@example.com");

    let response = app
        .request("GET", &format!("/api/users/{}", alice.id), None, Some(&admin.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["email"], "alice@example.com");
}

#[tokio::test]
async fn test_role_and_quota_changes() {
    let app = helpers::TestApp::new().await;
    let admin = app.signup_with_role("admin@example.com", UserRole::Admin).await;
    let alice = app.signup("alice@example.com").await;

    let response = app
        .request(
            "POST",
            "/api/users/role",
            Some(json!({ "userId": alice.id, "role": "SUPER_ADMIN" })),
            Some(&admin.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            "PUT",
            &format!("/api/users/{}", alice.id),
            Some(json!({ "storageQuota": 50 })),
            Some(&admin.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["storageQuota"], 50);

    let response = app
        .request(
            "PUT",
            &format!("/api/users/{}", alice.id),
            Some(json!({ "storageQuota": -1 })),
            Some(&admin.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.upload(&alice.token, "big.bin", None, &[0u8; 64]).await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);

    let response = app
        .request(
            "POST",
            &format!("/api/users/{}/storage/recalculate", alice.id),
            None,
            Some(&admin.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["storageUsed"], 0);
}

#[tokio::test]
async fn test_delete_user_removes_their_items() {
    let app = helpers::TestApp::new().await;
    let admin = app.signup_with_role("admin@example.com", UserRole::Admin).await;
    let alice = app.signup("alice@example.com").await;
    app.upload(&alice.token, "a.txt", None, b"abc").await;

    let response = app
        .request("DELETE", &format!("/api/users/{}", admin.id), None, Some(&admin.token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request("DELETE", &format!("/api/users/{}", alice.id), None, Some(&admin.token))
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app
        .request("GET", &format!("/api/users/{}", alice.id), None, Some(&admin.token))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    app.state.releases.flush().await;
    assert!(app.blobs.is_empty().await);

    // Alice's token is still valid but must not bring the account back.
    let response = app.request("GET", "/api/auth/me", None, Some(&alice.token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    let response = app
        .request("GET", &format!("/api/users/{}", alice.id), None, Some(&admin.token))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
