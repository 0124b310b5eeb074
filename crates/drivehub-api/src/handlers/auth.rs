//! Auth handlers.

use axum::Json;
use axum::extract::State;

use drivehub_entity::user::User;

use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<User>> {
    Ok(Json(state.user_service.me(&auth).await?))
}
