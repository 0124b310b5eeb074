//! Request context carrying the authenticated principal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use drivehub_entity::user::{Principal, UserRole};

/// Context for the current authenticated request.
///
/// Built by the API layer from a verified bearer token and passed into
/// every service method, so each operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The verified caller.
    pub principal: Principal,
    /// Correlation ID for logs.
    pub request_id: Uuid,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            request_id: Uuid::new_v4(),
            request_time: Utc::now(),
        }
    }

    /// The caller's user ID.
    pub fn user_id(&self) -> Uuid {
        self.principal.id
    }

    /// The caller's role.
    pub fn role(&self) -> UserRole {
        self.principal.role
    }

    /// Returns whether the caller is ADMIN or above.
    pub fn is_admin(&self) -> bool {
        self.principal.role.is_admin_or_above()
    }
}
