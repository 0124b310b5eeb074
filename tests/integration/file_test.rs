//! Integration tests for upload, download, listing and public links.

mod helpers;

use axum::http::{StatusCode, header};
use serde_json::json;
use uuid::Uuid;

use helpers::id_of;

#[tokio::test]
async fn test_upload_and_download() {
    let app = helpers::TestApp::new().await;
    let alice = app.signup("alice@example.com").await;

    let response = app.upload(&alice.token, "notes.txt", None, b"hello world").await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["name"], "notes.txt");
    assert_eq!(response.body["mimeType"], "text/plain");
    assert_eq!(response.body["sizeBytes"], 11);
    assert_eq!(response.body["accessLevel"], "PRIVATE");
    assert!(response.body.get("blobRef").is_none());
    let id = id_of(&response.body);

    let download = app
        .get_raw(&format!("/api/files/{id}/download"), Some(&alice.token))
        .await;
    assert_eq!(download.status, StatusCode::OK);
    assert_eq!(&download.body[..], b"hello world");
    assert_eq!(download.headers[header::CONTENT_TYPE], "text/plain");
    let disposition = download.headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"notes.txt\""));

    let inline = app
        .get_raw(&format!("/api/files/{id}/download?inline=true"), Some(&alice.token))
        .await;
    let disposition = inline.headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("inline;"));

    let info = app
        .request("GET", "/api/files/storage/info", None, Some(&alice.token))
        .await;
    assert_eq!(info.body["storageUsed"], 11);
    assert_eq!(info.body["storageQuota"], helpers::QUOTA);
}

#[tokio::test]
async fn test_upload_into_folder_and_list() {
    let app = helpers::TestApp::new().await;
    let alice = app.signup("alice@example.com").await;

    let folder = app
        .request("POST", "/api/files/folders", Some(json!({ "name": "Docs" })), Some(&alice.token))
        .await;
    let folder = id_of(&folder.body);

    app.upload(&alice.token, "b.txt", Some(folder), b"bb").await;
    app.upload(&alice.token, "a.txt", None, b"a").await;
    app.upload(&alice.token, "c.md", None, b"ccc").await;

    let response = app
        .request("GET", "/api/files/list?sortBy=name&sortOrder=asc", None, Some(&alice.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let names: Vec<&str> = response.body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["a.txt", "b.txt", "c.md"]);
    assert_eq!(response.body["meta"]["total"], 3);

    let response = app
        .request("GET", "/api/files/list?search=.TXT&page=2&limit=1&sortBy=name&sortOrder=desc", None, Some(&alice.token))
        .await;
    assert_eq!(response.body["meta"]["total"], 2);
    assert_eq!(response.body["meta"]["totalPages"], 2);
    assert_eq!(response.body["items"][0]["name"], "a.txt");

    let response = app
        .request("GET", &format!("/api/files/folders?folderId={folder}"), None, Some(&alice.token))
        .await;
    assert_eq!(response.body["files"][0]["name"], "b.txt");
}

#[tokio::test]
async fn test_upload_limits() {
    let app = helpers::TestApp::new().await;
    let alice = app.signup("alice@example.com").await;

    let too_big = vec![b'x'; helpers::MAX_UPLOAD as usize + 1];
    let response = app.upload(&alice.token, "big.bin", None, &too_big).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "VALIDATION");

    let chunk = vec![b'x'; 4_000];
    assert_eq!(app.upload(&alice.token, "1.bin", None, &chunk).await.status, StatusCode::CREATED);
    assert_eq!(app.upload(&alice.token, "2.bin", None, &chunk).await.status, StatusCode::CREATED);
    let response = app.upload(&alice.token, "3.bin", None, &chunk).await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.body["code"], "QUOTA_EXCEEDED");

    app.state.releases.flush().await;
    assert_eq!(app.blobs.len().await, 2);
}

#[tokio::test]
async fn test_upload_when_store_is_down() {
    let app = helpers::TestApp::new().await;
    let alice = app.signup("alice@example.com").await;
    app.blobs.set_fail_stores(true);

    let response = app.upload(&alice.token, "a.txt", None, b"a").await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["code"], "UPSTREAM_UNAVAILABLE");

    let list = app.request("GET", "/api/files/list", None, Some(&alice.token)).await;
    assert_eq!(list.body["meta"]["total"], 0);
}

#[tokio::test]
async fn test_rename_move_and_delete() {
    let app = helpers::TestApp::new().await;
    let alice = app.signup("alice@example.com").await;
    let folder = app
        .request("POST", "/api/files/folders", Some(json!({ "name": "Docs" })), Some(&alice.token))
        .await;
    let folder = id_of(&folder.body);
    let file = app.upload(&alice.token, "draft.txt", None, b"draft").await;
    let file = id_of(&file.body);

    let response = app
        .request("PUT", &format!("/api/files/{file}"), Some(json!({ "name": "final.txt" })), Some(&alice.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], "final.txt");

    let response = app
        .request(
            "PUT",
            &format!("/api/files/{file}/move"),
            Some(json!({ "parentId": folder })),
            Some(&alice.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["parentId"], folder.to_string());

    let response = app
        .request("DELETE", &format!("/api/files/{file}"), None, Some(&alice.token))
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let response = app
        .request("GET", &format!("/api/files/{file}"), None, Some(&alice.token))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let info = app
        .request("GET", "/api/files/storage/info", None, Some(&alice.token))
        .await;
    assert_eq!(info.body["storageUsed"], 0);
}

#[tokio::test]
async fn test_public_link_follows_access_level() {
    let app = helpers::TestApp::new().await;
    let alice = app.signup("alice@example.com").await;
    let image = app.upload(&alice.token, "image.png", None, b"\x89PNG").await;
    let image = id_of(&image.body);

    let response = app
        .request(
            "PUT",
            &format!("/api/files/{image}/access"),
            Some(json!({ "accessLevel": "PUBLIC" })),
            Some(&alice.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let link = app
        .request("POST", &format!("/api/files/{image}/public-link"), None, Some(&alice.token))
        .await;
    assert_eq!(link.status, StatusCode::OK);
    let token = link.body["publicToken"].as_str().unwrap().to_string();
    let url = link.body["url"].as_str().unwrap();
    let path = url.strip_prefix(helpers::BASE_URL).unwrap().to_string();
    assert_eq!(path, format!("/api/files/public/{token}"));

    let download = app.get_raw(&path, None).await;
    assert_eq!(download.status, StatusCode::OK);
    assert_eq!(&download.body[..], b"\x89PNG");
    assert_eq!(download.headers[header::CONTENT_TYPE], "image/png");

    let info = app.request("GET", &format!("{path}/info"), None, None).await;
    assert_eq!(info.status, StatusCode::OK);
    assert_eq!(info.body["name"], "image.png");
    assert!(info.body.get("ownerId").is_none());

    // Going private hides the link without revoking it.
    app.request(
        "PUT",
        &format!("/api/files/{image}/access"),
        Some(json!({ "accessLevel": "PRIVATE" })),
        Some(&alice.token),
    )
    .await;
    assert_eq!(app.get_raw(&path, None).await.status, StatusCode::NOT_FOUND);

    app.request(
        "PUT",
        &format!("/api/files/{image}/access"),
        Some(json!({ "accessLevel": "PUBLIC" })),
        Some(&alice.token),
    )
    .await;
    assert_eq!(app.get_raw(&path, None).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_public_token_is_not_found() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/files/public/nope/info", None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request("GET", &format!("/api/files/{}", Uuid::new_v4()), None, None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
