//! # drivehub-api
//!
//! HTTP surface of DriveHub: axum router, handlers, extractors, DTOs and
//! the mapping from domain errors to status codes.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use state::AppState;
