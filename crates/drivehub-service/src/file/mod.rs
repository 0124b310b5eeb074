//! File services: metadata, upload, and download.

pub mod download;
pub mod service;
pub mod upload;

pub use download::DownloadService;
pub use service::{FileFilter, FileService, FileSortField};
pub use upload::{UploadParams, UploadService};
