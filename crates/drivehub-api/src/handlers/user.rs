//! User administration handlers (ADMIN and above).

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use drivehub_core::types::{PageRequest, PageResponse};
use drivehub_entity::user::User;

use crate::dto::request::{UpdateRoleRequest, UpdateUserRequest, UserSearchQuery};
use crate::error::ApiResult;
use crate::extractors::{ApiQuery, AuthUser, PaginationParams, ValidatedJson};
use crate::state::AppState;

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> ApiResult<Json<PageResponse<User>>> {
    let users = state
        .admin_user_service
        .list_users(&auth, params.into_page_request())
        .await?;
    Ok(Json(users))
}

/// GET /api/users/search?search=...&role=...
pub async fn search_users(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<UserSearchQuery>,
) -> ApiResult<Json<PageResponse<User>>> {
    let page = PageRequest::new(query.page, query.limit);
    let users = state
        .admin_user_service
        .search_users(&auth, query.search.as_deref(), query.role, page)
        .await?;
    Ok(Json(users))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.admin_user_service.get_user(&auth, id).await?))
}

/// POST /api/users/role
pub async fn update_role(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateRoleRequest>,
) -> ApiResult<Json<User>> {
    let user = state
        .admin_user_service
        .update_role(&auth, req.user_id, req.role)
        .await?;
    Ok(Json(user))
}

/// PUT /api/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    let user = state
        .admin_user_service
        .update_user(&auth, id, req.into())
        .await?;
    Ok(Json(user))
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.admin_user_service.delete_user(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
