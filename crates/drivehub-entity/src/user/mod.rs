//! User domain entities.

pub mod model;
pub mod principal;
pub mod role;

pub use model::{CreateUser, UpdateUser, User};
pub use principal::Principal;
pub use role::UserRole;
