//! Item authorization shared by the folder, file, and share services.

pub mod service;

pub use service::PermissionService;
