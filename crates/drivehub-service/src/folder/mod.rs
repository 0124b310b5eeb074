//! Folder hierarchy management.

pub mod service;
pub mod tree;

pub use service::{FolderContents, FolderService};
pub use tree::{FolderTree, PurgeReport, Subtree};
