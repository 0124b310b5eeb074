//! The verified caller of a request.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::UserRole;

/// An authenticated actor, as asserted by a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// User ID.
    pub id: Uuid,
    /// Email address.
    pub email: String,
    /// Display name, when the token carries one.
    pub name: Option<String>,
    /// Platform role.
    pub role: UserRole,
}

impl Principal {
    /// Display name, falling back to the local part of the email.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => self
                .email
                .split('@')
                .next()
                .unwrap_or(&self.email)
                .to_string(),
        }
    }
}
