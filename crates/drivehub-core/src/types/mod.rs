//! Core type definitions used across the DriveHub workspace.

pub mod pagination;
pub mod sorting;

pub use pagination::{PageMeta, PageRequest, PageResponse};
pub use sorting::SortDirection;
