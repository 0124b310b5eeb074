//! Share and public link handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use uuid::Uuid;

use drivehub_entity::permission::ResourceRef;
use drivehub_entity::share::Share;
use drivehub_service::share::{PublicLink, ShareEntry};

use crate::dto::request::{DownloadQuery, ShareRequest};
use crate::dto::response::PublicFileInfo;
use crate::error::ApiResult;
use crate::extractors::{ApiQuery, AuthUser, ValidatedJson};
use crate::handlers::file_response;
use crate::state::AppState;

/// POST /api/files/share
pub async fn share(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<ShareRequest>,
) -> ApiResult<Json<Share>> {
    let resource = req.resource()?;
    let share = state
        .share_service
        .share(&auth, resource, &req.email, req.permission)
        .await?;
    Ok(Json(share))
}

/// GET /api/files/{id}/shares
pub async fn list_file_shares(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ShareEntry>>> {
    let shares = state
        .share_service
        .list_shares(&auth, ResourceRef::file(id))
        .await?;
    Ok(Json(shares))
}

/// DELETE /api/files/{id}/shares/{user_id}
pub async fn revoke_file_share(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state
        .share_service
        .revoke(&auth, ResourceRef::file(id), user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/files/folders/{id}/shares
pub async fn list_folder_shares(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ShareEntry>>> {
    let shares = state
        .share_service
        .list_shares(&auth, ResourceRef::folder(id))
        .await?;
    Ok(Json(shares))
}

/// DELETE /api/files/folders/{id}/shares/{user_id}
pub async fn revoke_folder_share(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state
        .share_service
        .revoke(&auth, ResourceRef::folder(id), user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/files/{id}/public-link
pub async fn issue_public_link(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PublicLink>> {
    Ok(Json(state.link_service.issue(&auth, id).await?))
}

/// GET /api/files/public/{token}?inline= (no auth)
pub async fn public_download(
    State(state): State<AppState>,
    Path(token): Path<String>,
    ApiQuery(query): ApiQuery<DownloadQuery>,
) -> ApiResult<Response> {
    let (file, data) = state.link_service.download(&token).await?;
    file_response(&file, data, query.inline)
}

/// GET /api/files/public/{token}/info (no auth)
pub async fn public_info(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<PublicFileInfo>> {
    let file = state.link_service.resolve(&token).await?;
    Ok(Json(PublicFileInfo::from(file)))
}
