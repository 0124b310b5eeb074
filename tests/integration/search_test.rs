//! Integration tests for name search.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::id_of;

#[tokio::test]
async fn test_search_respects_visibility() {
    let app = helpers::TestApp::new().await;
    let alice = app.signup("alice@example.com").await;
    let bob = app.signup("bob@example.com").await;

    let report = app.upload(&alice.token, "report.pdf", None, b"%PDF").await;
    let report = id_of(&report.body);
    app.upload(&bob.token, "report-bob.pdf", None, b"%PDF").await;
    app.request("POST", "/api/files/folders", Some(json!({ "name": "Reports" })), Some(&alice.token))
        .await;

    let response = app
        .request("GET", "/api/search?query=REPORT", None, Some(&alice.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["files"].as_array().unwrap().len(), 1);
    assert_eq!(response.body["folders"].as_array().unwrap().len(), 1);
    assert_eq!(response.body["meta"]["total"], 2);

    // A share on a PRIVATE item does not surface it.
    app.request(
        "POST",
        "/api/files/share",
        Some(json!({ "fileId": report, "email": "bob@example.com" })),
        Some(&alice.token),
    )
    .await;
    let response = app
        .request("GET", "/api/search?query=report", None, Some(&bob.token))
        .await;
    assert_eq!(response.body["files"].as_array().unwrap().len(), 1);

    app.request(
        "PUT",
        &format!("/api/files/{report}/access"),
        Some(json!({ "accessLevel": "SHARED" })),
        Some(&alice.token),
    )
    .await;
    let response = app
        .request("GET", "/api/search?query=report", None, Some(&bob.token))
        .await;
    assert_eq!(response.body["files"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_empty_query_is_rejected() {
    let app = helpers::TestApp::new().await;
    let alice = app.signup("alice@example.com").await;

    let response = app.request("GET", "/api/search?query=%20", None, Some(&alice.token)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "VALIDATION");
}

#[tokio::test]
async fn test_page_far_past_the_end_is_empty() {
    let app = helpers::TestApp::new().await;
    let alice = app.signup("alice@example.com").await;
    app.upload(&alice.token, "plan.txt", None, b"p").await;

    let response = app
        .request(
            "GET",
            &format!("/api/search?query=plan&page={}&limit=100", u64::MAX),
            None,
            Some(&alice.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["files"].as_array().unwrap().is_empty());
    assert_eq!(response.body["meta"]["total"], 1);
}
