//! # drivehub-entity
//!
//! Domain entity models for DriveHub. Every struct in this crate represents
//! a database table row or a domain value object. Database entities derive
//! `sqlx::FromRow`; enums are stored as TEXT and serialized in the
//! SCREAMING_SNAKE_CASE form the dashboard client expects.

pub mod file;
pub mod folder;
pub mod naming;
pub mod permission;
pub mod share;
pub mod storage;
pub mod user;
