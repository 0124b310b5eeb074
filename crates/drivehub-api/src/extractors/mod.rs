//! Custom Axum extractors.

pub mod auth;
pub mod pagination;
pub mod rejection;

pub use auth::AuthUser;
pub use pagination::PaginationParams;
pub use rejection::{ApiQuery, ValidatedJson};
