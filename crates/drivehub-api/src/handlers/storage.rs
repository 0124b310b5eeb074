//! Storage quota handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use drivehub_entity::storage::StorageQuota;

use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/files/storage/info
pub async fn storage_info(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<StorageQuota>> {
    Ok(Json(state.storage_service.storage_info(&auth).await?))
}

/// POST /api/users/{id}/storage/recalculate
pub async fn recalculate_usage(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StorageQuota>> {
    Ok(Json(state.storage_service.recalculate_usage(&auth, id).await?))
}
