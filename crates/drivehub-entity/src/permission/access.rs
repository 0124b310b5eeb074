//! Item visibility levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Visibility of a file or folder.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessLevel {
    /// Only the owner can see the item.
    #[default]
    Private,
    /// The owner and principals holding an explicit share.
    Shared,
    /// Anyone, including anonymous callers, may view the item.
    Public,
}

impl AccessLevel {
    /// Return the level as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "PRIVATE",
            Self::Shared => "SHARED",
            Self::Public => "PUBLIC",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = drivehub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PRIVATE" => Ok(Self::Private),
            "SHARED" => Ok(Self::Shared),
            "PUBLIC" => Ok(Self::Public),
            _ => Err(drivehub_core::AppError::validation(format!(
                "Invalid access level: '{s}'. Expected one of: PRIVATE, SHARED, PUBLIC"
            ))),
        }
    }
}
