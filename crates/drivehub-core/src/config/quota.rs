//! Quota and hierarchy limits.

use serde::{Deserialize, Serialize};

/// Per-user storage quota and folder tree limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Quota assigned to newly registered users, in bytes (default 10 GB).
    #[serde(default = "default_quota")]
    pub default_quota_bytes: i64,
    /// Longest parent chain a path resolution will follow.
    #[serde(default = "default_max_depth")]
    pub max_path_depth: usize,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            default_quota_bytes: default_quota(),
            max_path_depth: default_max_depth(),
        }
    }
}

fn default_quota() -> i64 {
    10_737_418_240 // 10 GB
}

fn default_max_depth() -> usize {
    256
}
