//! Storage quota value object.

use serde::{Deserialize, Serialize};

/// Quota information for one user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageQuota {
    /// Total quota in bytes.
    pub storage_quota: i64,
    /// Currently used bytes.
    pub storage_used: i64,
    /// Usage percentage rounded to two decimals (may exceed 100 after an
    /// administrator lowers the quota).
    pub usage_percentage: f64,
}

impl StorageQuota {
    /// Create a quota from total and used values.
    pub fn new(storage_quota: i64, storage_used: i64) -> Self {
        let usage_percentage = if storage_quota <= 0 {
            0.0
        } else {
            let raw = (storage_used as f64 / storage_quota as f64) * 100.0;
            (raw * 100.0).round() / 100.0
        };

        Self {
            storage_quota,
            storage_used,
            usage_percentage,
        }
    }

    /// Bytes still available (never negative).
    pub fn available_bytes(&self) -> i64 {
        (self.storage_quota - self.storage_used).max(0)
    }

    /// Check if adding the given number of bytes would exceed the quota.
    pub fn would_exceed(&self, additional_bytes: i64) -> bool {
        self.storage_used.saturating_add(additional_bytes) > self.storage_quota
    }
}
