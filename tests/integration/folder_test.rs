//! Integration tests for the folder hierarchy.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use helpers::id_of;

#[tokio::test]
async fn test_create_and_list_folders() {
    let app = helpers::TestApp::new().await;
    let alice = app.signup("alice@example.com").await;

    let response = app
        .request("POST", "/api/files/folders", Some(json!({ "name": "Docs" })), Some(&alice.token))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["name"], "Docs");
    assert_eq!(response.body["accessLevel"], "PRIVATE");
    assert!(response.body["parentId"].is_null());
    let docs = id_of(&response.body);

    let response = app
        .request(
            "POST",
            "/api/files/folders",
            Some(json!({ "name": "Reports", "parentId": docs })),
            Some(&alice.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let reports = id_of(&response.body);

    let response = app
        .request("GET", "/api/files/folders", None, Some(&alice.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["folders"].as_array().unwrap().len(), 1);
    assert_eq!(response.body["files"].as_array().unwrap().len(), 0);

    let response = app
        .request("GET", &format!("/api/files/folders?folderId={docs}"), None, Some(&alice.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["folders"][0]["id"], reports.to_string());

    let response = app
        .request("GET", &format!("/api/files/folders/{reports}/path"), None, Some(&alice.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let names: Vec<&str> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Docs", "Reports"]);
}

#[tokio::test]
async fn test_invalid_names_are_rejected() {
    let app = helpers::TestApp::new().await;
    let alice = app.signup("alice@example.com").await;

    for name in ["a/b", "..", "   "] {
        let response = app
            .request("POST", "/api/files/folders", Some(json!({ "name": name })), Some(&alice.token))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "name {name:?}");
    }

    let response = app
        .request("POST", "/api/files/folders", Some(json!({ "name": "a/b" })), Some(&alice.token))
        .await;
    assert_eq!(response.body["code"], "INVALID_NAME");
}

#[tokio::test]
async fn test_move_into_own_descendant_conflicts() {
    let app = helpers::TestApp::new().await;
    let alice = app.signup("alice@example.com").await;

    let a = app
        .request("POST", "/api/files/folders", Some(json!({ "name": "A" })), Some(&alice.token))
        .await;
    let a = id_of(&a.body);
    let b = app
        .request(
            "POST",
            "/api/files/folders",
            Some(json!({ "name": "B", "parentId": a })),
            Some(&alice.token),
        )
        .await;
    let b = id_of(&b.body);

    let response = app
        .request(
            "PUT",
            &format!("/api/files/folders/{a}/move"),
            Some(json!({ "parentId": b })),
            Some(&alice.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["code"], "CYCLE_DETECTED");

    let response = app
        .request(
            "PUT",
            &format!("/api/files/folders/{b}/move"),
            Some(json!({ "parentId": null })),
            Some(&alice.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["parentId"].is_null());
}

#[tokio::test]
async fn test_private_folder_is_invisible_to_others() {
    let app = helpers::TestApp::new().await;
    let alice = app.signup("alice@example.com").await;
    let bob = app.signup("bob@example.com").await;

    let folder = app
        .request("POST", "/api/files/folders", Some(json!({ "name": "Secret" })), Some(&alice.token))
        .await;
    let folder = id_of(&folder.body);

    let response = app
        .request("GET", &format!("/api/files/folders/{folder}"), None, Some(&bob.token))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request(
            "PUT",
            &format!("/api/files/folders/{folder}/access"),
            Some(json!({ "accessLevel": "PUBLIC" })),
            Some(&alice.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["accessLevel"], "PUBLIC");

    let response = app
        .request("GET", &format!("/api/files/folders/{folder}"), None, Some(&bob.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    // Visible but not editable.
    let response = app
        .request(
            "PUT",
            &format!("/api/files/folders/{folder}"),
            Some(json!({ "name": "Mine" })),
            Some(&bob.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_cascade_delete_frees_quota() {
    let app = helpers::TestApp::new().await;
    let alice = app.signup("alice@example.com").await;

    let root = app
        .request("POST", "/api/files/folders", Some(json!({ "name": "Root" })), Some(&alice.token))
        .await;
    let root = id_of(&root.body);
    let child = app
        .request(
            "POST",
            "/api/files/folders",
            Some(json!({ "name": "Child", "parentId": root })),
            Some(&alice.token),
        )
        .await;
    let child = id_of(&child.body);

    let upload = app.upload(&alice.token, "a.txt", Some(child), b"hello").await;
    assert_eq!(upload.status, StatusCode::CREATED);
    let file = id_of(&upload.body);

    let response = app
        .request("DELETE", &format!("/api/files/folders/{root}"), None, Some(&alice.token))
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    for path in [
        format!("/api/files/folders/{root}"),
        format!("/api/files/folders/{child}"),
        format!("/api/files/{file}"),
    ] {
        let response = app.request("GET", &path, None, Some(&alice.token)).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{path}");
    }

    let info = app
        .request("GET", "/api/files/storage/info", None, Some(&alice.token))
        .await;
    assert_eq!(info.body["storageUsed"], 0);

    app.state.releases.flush().await;
    assert!(app.blobs.is_empty().await);
}

#[tokio::test]
async fn test_unknown_folder_is_not_found() {
    let app = helpers::TestApp::new().await;
    let alice = app.signup("alice@example.com").await;

    let response = app
        .request(
            "DELETE",
            &format!("/api/files/folders/{}", Uuid::new_v4()),
            None,
            Some(&alice.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["code"], "NOT_FOUND");
}
