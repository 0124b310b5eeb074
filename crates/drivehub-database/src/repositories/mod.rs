//! Repository implementations for all DriveHub entities.

pub mod file;
pub mod folder;
pub mod share;
pub mod user;

pub use file::FileRepository;
pub use folder::FolderRepository;
pub use share::ShareRepository;
pub use user::UserRepository;

use drivehub_core::error::{AppError, ErrorKind};

/// Map a sqlx error, prefixing generic database failures with `context`.
///
/// Unique violations and lock contention keep the kind assigned by the
/// core conversion (`Conflict`).
pub(crate) fn db_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        let err = AppError::from(e);
        if err.kind == ErrorKind::Database {
            AppError {
                message: format!("{context}: {}", err.message),
                ..err
            }
        } else {
            err
        }
    }
}
