//! Search handler.

use axum::Json;
use axum::extract::State;

use drivehub_core::types::PageRequest;
use drivehub_service::search::SearchResults;

use crate::dto::request::SearchQuery;
use crate::error::ApiResult;
use crate::extractors::{ApiQuery, AuthUser};
use crate::state::AppState;

/// GET /api/search?query=...&page=...&limit=...
pub async fn search(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Json<SearchResults>> {
    let page = PageRequest::new(query.page, query.limit);
    let results = state
        .search_service
        .search(&auth, &query.query, page)
        .await?;
    Ok(Json(results))
}
