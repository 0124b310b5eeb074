//! Share permission levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Permission carried by a share or required by an operation.
///
/// Totally ordered: Manage > Edit > View.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SharePermission {
    /// Read metadata and content.
    View,
    /// Rename and otherwise modify the item in place.
    Edit,
    /// Move, delete, change access, and manage shares and links.
    Manage,
}

impl SharePermission {
    /// Return the privilege level (higher = more privileged).
    pub fn privilege_level(&self) -> u8 {
        match self {
            Self::Manage => 3,
            Self::Edit => 2,
            Self::View => 1,
        }
    }

    /// Check if this permission grants at least the given level.
    pub fn has_at_least(&self, required: &SharePermission) -> bool {
        self.privilege_level() >= required.privilege_level()
    }

    /// Return the permission as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "VIEW",
            Self::Edit => "EDIT",
            Self::Manage => "MANAGE",
        }
    }
}

impl fmt::Display for SharePermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SharePermission {
    type Err = drivehub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "VIEW" => Ok(Self::View),
            "EDIT" => Ok(Self::Edit),
            "MANAGE" => Ok(Self::Manage),
            _ => Err(drivehub_core::AppError::validation(format!(
                "Invalid permission: '{s}'. Expected one of: VIEW, EDIT, MANAGE"
            ))),
        }
    }
}
