//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use bytes::Bytes;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use drivehub_api::{AppState, build_app};
use drivehub_auth::{Claims, JwtEncoder};
use drivehub_core::config::AppConfig;
use drivehub_database::DatabasePool;
use drivehub_entity::user::UserRole;
use drivehub_storage::providers::MemoryBlobStore;
use drivehub_storage::{ReleaseQueue, StorageManager};

pub const BASE_URL: &str = "http://drive.test";
pub const QUOTA: i64 = 10_000;
pub const MAX_UPLOAD: u64 = 4_096;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for reaching past the HTTP layer
    pub state: AppState,
    /// The in-memory blob store behind the router
    pub blobs: Arc<MemoryBlobStore>,
    encoder: JwtEncoder,
}

/// Response of a JSON request
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body (`Null` when empty or not JSON)
    pub body: Value,
}

/// Response carrying raw bytes
pub struct RawResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Body bytes
    pub body: Bytes,
}

/// A signed-in test user
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

impl TestApp {
    /// Create a new test application on an in-memory database and blob store
    pub async fn new() -> Self {
        let mut config = AppConfig::default();
        config.server.public_base_url = BASE_URL.to_string();
        config.auth.jwt_secret = "integration-test-secret".to_string();
        config.quota.default_quota_bytes = QUOTA;
        config.storage.max_upload_size_bytes = MAX_UPLOAD;
        config.storage.release.initial_backoff_ms = 1;

        let db = DatabasePool::memory().await.expect("Failed to open test database");
        let blobs = Arc::new(MemoryBlobStore::new());
        let storage = StorageManager::new(blobs.clone(), Duration::from_secs(1));
        let (releases, _worker) = ReleaseQueue::spawn(storage.clone(), &config.storage.release);

        let encoder = JwtEncoder::new(&config.auth);
        let state = AppState::new(config, db, storage, releases);
        let router = build_app(state.clone());

        Self {
            router,
            state,
            blobs,
            encoder,
        }
    }

    /// Mint a token for a fresh identity.
    pub fn login(&self, email: &str, role: UserRole) -> TestUser {
        let id = Uuid::new_v4();
        let token = self.token_for(id, email, role, 3600);
        TestUser {
            id,
            email: email.to_string(),
            token,
        }
    }

    /// Mint a token and make the directory aware of the user.
    pub async fn signup(&self, email: &str) -> TestUser {
        self.signup_with_role(email, UserRole::User).await
    }

    pub async fn signup_with_role(&self, email: &str, role: UserRole) -> TestUser {
        let user = self.login(email, role);
        let response = self.request("GET", "/api/auth/me", None, Some(&user.token)).await;
        assert_eq!(response.status, StatusCode::OK, "signup failed: {}", response.body);
        user
    }

    /// Sign a token valid for `ttl_seconds` (negative for an expired one).
    pub fn token_for(&self, id: Uuid, email: &str, role: UserRole, ttl_seconds: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        self.encoder
            .encode(&Claims {
                sub: id,
                email: email.to_string(),
                name: None,
                role,
                exp: now + ttl_seconds,
                iat: Some(now),
            })
            .expect("Failed to sign token")
    }

    /// Make a JSON request
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder().method(method).uri(path);

        let body = match body {
            Some(b) => {
                req = req.header("Content-Type", "application/json");
                Body::from(serde_json::to_string(&b).expect("Failed to serialize body"))
            }
            None => Body::empty(),
        };

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let raw = self
            .send(req.body(body).expect("Failed to build request"))
            .await;
        let body: Value = serde_json::from_slice(&raw.body).unwrap_or(Value::Null);

        TestResponse {
            status: raw.status,
            body,
        }
    }

    /// GET returning raw bytes and headers
    pub async fn get_raw(&self, path: &str, token: Option<&str>) -> RawResponse {
        let mut req = Request::builder().method("GET").uri(path);
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }
        self.send(req.body(Body::empty()).expect("Failed to build request"))
            .await
    }

    /// Multipart upload to `/api/files/upload`
    pub async fn upload(
        &self,
        token: &str,
        name: &str,
        folder_id: Option<Uuid>,
        data: &[u8],
    ) -> TestResponse {
        const BOUNDARY: &str = "drivehub-test-boundary";

        let mut body = Vec::new();
        if let Some(folder_id) = folder_id {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"folderId\"\r\n\r\n{folder_id}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let req = Request::builder()
            .method("POST")
            .uri("/api/files/upload")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::from(body))
            .expect("Failed to build request");

        let raw = self.send(req).await;
        TestResponse {
            status: raw.status,
            body: serde_json::from_slice(&raw.body).unwrap_or(Value::Null),
        }
    }

    async fn send(&self, req: Request<Body>) -> RawResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body");

        RawResponse {
            status,
            headers,
            body,
        }
    }
}

/// The `id` field of a JSON body as a UUID
pub fn id_of(body: &Value) -> Uuid {
    body["id"]
        .as_str()
        .and_then(|s| s.parse().ok())
        .expect("response has no id")
}
