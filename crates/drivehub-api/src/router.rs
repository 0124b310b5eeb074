//! Route definitions for the DriveHub HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use std::time::Duration;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Request},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Room for multipart boundaries and the small text fields next to the file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the complete Axum router with all routes and middleware.
///
/// Receives the fully-constructed `AppState` and threads it through
/// every route via `.with_state(state)`.
pub fn build_router(state: AppState) -> Router {
    let max_upload = usize::try_from(state.config.storage.max_upload_size_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(folder_routes())
        .merge(file_routes(max_upload))
        .merge(share_routes())
        .merge(storage_routes())
        .merge(search_routes())
        .merge(health_routes());

    let cors = middleware::build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(TimeoutLayer::new(timeout))
        .layer(axum_middleware::from_fn(middleware::request_logging))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                user_id = tracing::field::Empty,
            )
        }))
        .layer(cors)
        .with_state(state)
}

/// Current principal
fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(handlers::auth::me))
}

/// User administration
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::user::list_users))
        .route("/users/search", get(handlers::user::search_users))
        .route("/users/role", post(handlers::user::update_role))
        .route(
            "/users/{id}",
            get(handlers::user::get_user)
                .put(handlers::user::update_user)
                .delete(handlers::user::delete_user),
        )
        .route(
            "/users/{id}/storage/recalculate",
            post(handlers::storage::recalculate_usage),
        )
}

/// Folder hierarchy
fn folder_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/files/folders",
            get(handlers::folder::list_children).post(handlers::folder::create_folder),
        )
        .route(
            "/files/folders/{id}",
            get(handlers::folder::get_folder)
                .put(handlers::folder::rename_folder)
                .delete(handlers::folder::delete_folder),
        )
        .route("/files/folders/{id}/path", get(handlers::folder::get_path))
        .route("/files/folders/{id}/move", put(handlers::folder::move_folder))
        .route("/files/folders/{id}/access", put(handlers::folder::set_access))
        .route("/files/shared", get(handlers::folder::shared_with_me))
}

/// File listing, upload, download, mutation
fn file_routes(max_upload: usize) -> Router<AppState> {
    Router::new()
        .route("/files/list", get(handlers::file::list_files))
        .route(
            "/files/upload",
            post(handlers::file::upload)
                .layer::<_, std::convert::Infallible>(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(max_upload)),
        )
        .route(
            "/files/{id}",
            get(handlers::file::get_file)
                .put(handlers::file::rename_file)
                .delete(handlers::file::delete_file),
        )
        .route("/files/{id}/download", get(handlers::file::download))
        .route("/files/{id}/move", put(handlers::file::move_file))
        .route("/files/{id}/access", put(handlers::file::set_access))
}

/// Shares and public links
fn share_routes() -> Router<AppState> {
    Router::new()
        .route("/files/share", post(handlers::share::share))
        .route("/files/{id}/shares", get(handlers::share::list_file_shares))
        .route(
            "/files/{id}/shares/{user_id}",
            delete(handlers::share::revoke_file_share),
        )
        .route(
            "/files/folders/{id}/shares",
            get(handlers::share::list_folder_shares),
        )
        .route(
            "/files/folders/{id}/shares/{user_id}",
            delete(handlers::share::revoke_folder_share),
        )
        .route(
            "/files/{id}/public-link",
            post(handlers::share::issue_public_link),
        )
        .route("/files/public/{token}", get(handlers::share::public_download))
        .route("/files/public/{token}/info", get(handlers::share::public_info))
}

/// Quota
fn storage_routes() -> Router<AppState> {
    Router::new().route("/files/storage/info", get(handlers::storage::storage_info))
}

/// Search
fn search_routes() -> Router<AppState> {
    Router::new().route("/search", get(handlers::search::search))
}

/// Health
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
