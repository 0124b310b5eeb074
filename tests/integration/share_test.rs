//! Integration tests for per-user shares.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::id_of;

#[tokio::test]
async fn test_share_takes_effect_only_while_shared() {
    let app = helpers::TestApp::new().await;
    let alice = app.signup("alice@example.com").await;
    let bob = app.signup("bob@example.com").await;
    let file = app.upload(&alice.token, "plan.txt", None, b"plan").await;
    let file = id_of(&file.body);

    let response = app
        .request(
            "POST",
            "/api/files/share",
            Some(json!({ "fileId": file, "email": "bob@example.com", "permission": "VIEW" })),
            Some(&alice.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["granteeId"], bob.id.to_string());
    assert_eq!(response.body["permission"], "VIEW");

    // Still PRIVATE.
    let response = app
        .request("GET", &format!("/api/files/{file}"), None, Some(&bob.token))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    app.request(
        "PUT",
        &format!("/api/files/{file}/access"),
        Some(json!({ "accessLevel": "SHARED" })),
        Some(&alice.token),
    )
    .await;

    let response = app
        .request("GET", &format!("/api/files/{file}"), None, Some(&bob.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let download = app
        .get_raw(&format!("/api/files/{file}/download"), Some(&bob.token))
        .await;
    assert_eq!(&download.body[..], b"plan");

    let response = app
        .request("PUT", &format!("/api/files/{file}"), Some(json!({ "name": "x.txt" })), Some(&bob.token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let shared = app.request("GET", "/api/files/shared", None, Some(&bob.token)).await;
    assert_eq!(shared.status, StatusCode::OK);
    assert_eq!(shared.body["files"][0]["id"], file.to_string());
}

#[tokio::test]
async fn test_upgrade_list_and_revoke() {
    let app = helpers::TestApp::new().await;
    let alice = app.signup("alice@example.com").await;
    let bob = app.signup("bob@example.com").await;
    let file = app.upload(&alice.token, "plan.txt", None, b"plan").await;
    let file = id_of(&file.body);
    app.request(
        "PUT",
        &format!("/api/files/{file}/access"),
        Some(json!({ "accessLevel": "SHARED" })),
        Some(&alice.token),
    )
    .await;

    for permission in ["VIEW", "EDIT"] {
        let response = app
            .request(
                "POST",
                "/api/files/share",
                Some(json!({ "fileId": file, "email": "BOB@example.com", "permission": permission })),
                Some(&alice.token),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let shares = app
        .request("GET", &format!("/api/files/{file}/shares"), None, Some(&alice.token))
        .await;
    assert_eq!(shares.status, StatusCode::OK);
    let entries = shares.body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["email"], "bob@example.com");
    assert_eq!(entries[0]["permission"], "EDIT");

    let response = app
        .request("PUT", &format!("/api/files/{file}"), Some(json!({ "name": "renamed.txt" })), Some(&bob.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request(
            "DELETE",
            &format!("/api/files/{file}/shares/{}", bob.id),
            None,
            Some(&alice.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app
        .request("GET", &format!("/api/files/{file}"), None, Some(&bob.token))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_share_request_validation() {
    let app = helpers::TestApp::new().await;
    let alice = app.signup("alice@example.com").await;
    let folder = app
        .request("POST", "/api/files/folders", Some(json!({ "name": "Team" })), Some(&alice.token))
        .await;
    let folder = id_of(&folder.body);

    let response = app
        .request(
            "POST",
            "/api/files/share",
            Some(json!({ "email": "bob@example.com" })),
            Some(&alice.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            "POST",
            "/api/files/share",
            Some(json!({ "folderId": folder, "email": "not-an-email" })),
            Some(&alice.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            "POST",
            "/api/files/share",
            Some(json!({ "folderId": folder, "email": "nobody@example.com" })),
            Some(&alice.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request(
            "POST",
            "/api/files/share",
            Some(json!({ "folderId": folder, "email": "alice@example.com" })),
            Some(&alice.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_folder_shares() {
    let app = helpers::TestApp::new().await;
    let alice = app.signup("alice@example.com").await;
    let bob = app.signup("bob@example.com").await;
    let folder = app
        .request("POST", "/api/files/folders", Some(json!({ "name": "Team" })), Some(&alice.token))
        .await;
    let folder = id_of(&folder.body);

    let response = app
        .request(
            "POST",
            "/api/files/share",
            Some(json!({ "folderId": folder, "email": "bob@example.com", "permission": "MANAGE" })),
            Some(&alice.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["resourceType"], "folder");

    let shares = app
        .request("GET", &format!("/api/files/folders/{folder}/shares"), None, Some(&alice.token))
        .await;
    assert_eq!(shares.body.as_array().unwrap().len(), 1);

    let response = app
        .request(
            "DELETE",
            &format!("/api/files/folders/{folder}/shares/{}", bob.id),
            None,
            Some(&alice.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
}
