//! File listing, upload, download and mutation handlers.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use bytes::Bytes;
use uuid::Uuid;

use drivehub_core::error::AppError;
use drivehub_core::types::PageResponse;
use drivehub_entity::file::File;
use drivehub_entity::permission::AccessLevel;
use drivehub_service::file::UploadParams;

use crate::dto::request::{
    AccessLevelRequest, DownloadQuery, ListFilesQuery, MoveRequest, RenameRequest,
};
use crate::error::ApiResult;
use crate::extractors::{ApiQuery, AuthUser, ValidatedJson};
use crate::handlers::file_response;
use crate::state::AppState;

/// GET /api/files/list
pub async fn list_files(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ListFilesQuery>,
) -> ApiResult<Json<PageResponse<File>>> {
    let (filter, page) = query.into_parts();
    let files = state.file_service.list_files(&auth, &filter, page).await?;
    Ok(Json(files))
}

/// POST /api/files/upload (multipart: `file`, `name`, `folderId`, `accessLevel`)
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<File>)> {
    let mut data: Option<Bytes> = None;
    let mut file_name: Option<String> = None;
    let mut mime_type: Option<String> = None;
    let mut name: Option<String> = None;
    let mut parent_id: Option<Uuid> = None;
    let mut access_level = AccessLevel::Private;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "file" => {
                file_name = field.file_name().map(String::from);
                mime_type = field.content_type().map(String::from);
                data = Some(field.bytes().await?);
            }
            "name" => {
                let text = field.text().await?;
                if !text.trim().is_empty() {
                    name = Some(text);
                }
            }
            "folderId" => {
                let text = field.text().await?;
                let text = text.trim();
                if !text.is_empty() {
                    parent_id = Some(
                        text.parse::<Uuid>()
                            .map_err(|_| AppError::validation("Invalid folderId"))?,
                    );
                }
            }
            "accessLevel" => {
                let text = field.text().await?;
                if !text.trim().is_empty() {
                    access_level = text.parse()?;
                }
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| AppError::validation("Missing 'file' field"))?;
    let name = name
        .or(file_name)
        .ok_or_else(|| AppError::validation("A file name is required"))?;

    let file = state
        .upload_service
        .upload(
            &auth,
            UploadParams {
                parent_id,
                name,
                mime_type,
                access_level,
                data,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(file)))
}

/// GET /api/files/{id}
pub async fn get_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<File>> {
    Ok(Json(state.file_service.get_file(&auth, id).await?))
}

/// GET /api/files/{id}/download?inline=
pub async fn download(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ApiQuery(query): ApiQuery<DownloadQuery>,
) -> ApiResult<Response> {
    let (file, data) = state.download_service.download(&auth, id).await?;
    file_response(&file, data, query.inline)
}

/// PUT /api/files/{id}
pub async fn rename_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<RenameRequest>,
) -> ApiResult<Json<File>> {
    Ok(Json(state.file_service.rename_file(&auth, id, &req.name).await?))
}

/// PUT /api/files/{id}/move
pub async fn move_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<MoveRequest>,
) -> ApiResult<Json<File>> {
    Ok(Json(state.file_service.move_file(&auth, id, req.parent_id).await?))
}

/// PUT /api/files/{id}/access
pub async fn set_access(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<AccessLevelRequest>,
) -> ApiResult<Json<File>> {
    let file = state
        .file_service
        .set_file_access(&auth, id, req.access_level)
        .await?;
    Ok(Json(file))
}

/// DELETE /api/files/{id}
pub async fn delete_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.file_service.delete_file(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
