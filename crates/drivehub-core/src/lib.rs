//! # drivehub-core
//!
//! Core crate for DriveHub. Contains the unified error system, configuration
//! schemas, pagination and sorting types, and the blob store trait that the
//! storage crate implements.
//!
//! This crate has **no** internal dependencies on other DriveHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
