//! Access level, share permission, and resource addressing types.

pub mod access;
pub mod grant;
pub mod resource;

pub use access::AccessLevel;
pub use grant::SharePermission;
pub use resource::{AccessControlled, ResourceRef, ResourceType};
