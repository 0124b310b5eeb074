//! Role-based enforcement for user administration.

pub mod enforcer;

pub use enforcer::RoleEnforcer;
