//! Folder handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use drivehub_entity::folder::Folder;
use drivehub_service::folder::FolderContents;

use crate::dto::request::{
    AccessLevelRequest, CreateFolderRequest, FolderQuery, MoveRequest, RenameRequest,
};
use crate::error::ApiResult;
use crate::extractors::{ApiQuery, AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/files/folders
pub async fn create_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateFolderRequest>,
) -> ApiResult<(StatusCode, Json<Folder>)> {
    let folder = state
        .folder_service
        .create_folder(&auth, &req.name, req.parent_id)
        .await?;
    Ok((StatusCode::CREATED, Json(folder)))
}

/// GET /api/files/folders?folderId=...
pub async fn list_children(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<FolderQuery>,
) -> ApiResult<Json<FolderContents>> {
    let contents = state
        .folder_service
        .list_children(&auth, query.folder_id)
        .await?;
    Ok(Json(contents))
}

/// GET /api/files/folders/{id}
pub async fn get_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Folder>> {
    Ok(Json(state.folder_service.get_folder(&auth, id).await?))
}

/// GET /api/files/folders/{id}/path
pub async fn get_path(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Folder>>> {
    Ok(Json(state.folder_service.resolve_path(&auth, id).await?))
}

/// PUT /api/files/folders/{id}
pub async fn rename_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<RenameRequest>,
) -> ApiResult<Json<Folder>> {
    let folder = state
        .folder_service
        .rename_folder(&auth, id, &req.name)
        .await?;
    Ok(Json(folder))
}

/// PUT /api/files/folders/{id}/move
pub async fn move_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<MoveRequest>,
) -> ApiResult<Json<Folder>> {
    let folder = state
        .folder_service
        .move_folder(&auth, id, req.parent_id)
        .await?;
    Ok(Json(folder))
}

/// PUT /api/files/folders/{id}/access
pub async fn set_access(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<AccessLevelRequest>,
) -> ApiResult<Json<Folder>> {
    let folder = state
        .folder_service
        .set_folder_access(&auth, id, req.access_level)
        .await?;
    Ok(Json(folder))
}

/// DELETE /api/files/folders/{id}
pub async fn delete_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.folder_service.delete_folder(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/files/shared
pub async fn shared_with_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<FolderContents>> {
    Ok(Json(state.folder_service.shared_with_me(&auth).await?))
}
