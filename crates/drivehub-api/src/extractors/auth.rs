//! `AuthUser` extractor: pulls the bearer token from the Authorization
//! header, verifies it, and resolves the caller's directory entry.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use drivehub_core::error::AppError;
use drivehub_entity::user::Principal;
use drivehub_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))?;

        let claims = state.jwt_decoder.decode(token)?;

        // The directory, not the token, decides name and role once the
        // user exists.
        let user = state
            .user_service
            .ensure_registered(&claims.principal())
            .await?;

        let ctx = RequestContext::new(Principal {
            id: user.id,
            email: user.email,
            name: Some(user.name),
            role: user.role,
        });
        tracing::Span::current().record("user_id", tracing::field::display(ctx.user_id()));

        Ok(AuthUser(ctx))
    }
}
