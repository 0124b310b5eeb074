//! # drivehub-database
//!
//! SQLite connection management, embedded migrations, and concrete
//! repository implementations for all DriveHub entities.
//!
//! Repositories are stateless: every method takes the connection to run
//! on, so the same query can execute against a pooled read connection or
//! inside a [`WriteTransaction`].

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::{DatabasePool, WriteTransaction};
