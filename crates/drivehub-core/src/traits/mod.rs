//! Core traits defined in `drivehub-core` and implemented by other crates.

pub mod blob;

pub use blob::{BlobRef, BlobStore};
