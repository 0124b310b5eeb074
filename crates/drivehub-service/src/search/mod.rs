//! Name search over visible files and folders.

pub mod service;

pub use service::{SearchResults, SearchService};
