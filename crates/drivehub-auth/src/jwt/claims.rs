//! JWT claims structure.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use drivehub_entity::user::{Principal, UserRole};

/// Claims carried by a bearer token issued by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Email address.
    pub email: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Platform role.
    #[serde(default)]
    pub role: UserRole,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Issued-at (Unix timestamp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Claims {
    /// The authenticated principal these claims describe.
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.sub,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
        }
    }
}
