//! Shares and public links.

pub mod link;
pub mod service;

pub use link::{LinkService, PublicLink};
pub use service::{ShareEntry, ShareService};
