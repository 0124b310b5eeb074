//! # drivehub-service
//!
//! Business logic service layer for DriveHub. Each service orchestrates
//! repositories, the blob store, and the access evaluator to implement one
//! group of use cases.
//!
//! Services follow constructor injection: the database pool, storage
//! manager, and release queue are handed in at construction time and are
//! cheap to clone.

pub mod context;
pub mod file;
pub mod folder;
pub mod permission;
pub mod search;
pub mod share;
pub mod storage;
pub mod user;

pub use context::RequestContext;
pub use file::{DownloadService, FileService, UploadService};
pub use folder::{FolderService, FolderTree};
pub use permission::PermissionService;
pub use search::SearchService;
pub use share::{LinkService, ShareService};
pub use storage::StorageService;
pub use user::{AdminUserService, UserService};

#[cfg(test)]
pub(crate) mod test_support;
