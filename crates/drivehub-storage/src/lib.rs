//! # drivehub-storage
//!
//! Blob store implementations for DriveHub: a local filesystem provider
//! and an in-memory provider with fault injection for tests. The
//! [`StorageManager`] bounds every call with a timeout, and the
//! [`ReleaseQueue`] retries releases of orphaned blobs in the background.

pub mod manager;
pub mod providers;
pub mod release;

pub use manager::StorageManager;
pub use release::ReleaseQueue;
