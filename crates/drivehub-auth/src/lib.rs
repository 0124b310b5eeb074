//! # drivehub-auth
//!
//! Authorization for DriveHub: bearer-token verification, the access
//! evaluator that decides every item operation, and role enforcement for
//! user administration.
//!
//! ## Modules
//!
//! - `jwt`: HS256 token verification and claims
//! - `acl`: owner / visibility / share evaluation and grant lookup
//! - `rbac`: role checks and audited administrative overrides

pub mod acl;
pub mod jwt;
pub mod rbac;

pub use acl::{AccessResolver, GrantSet, can_access};
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use rbac::RoleEnforcer;
