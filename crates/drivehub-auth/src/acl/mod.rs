//! Item-level access evaluation and share grant resolution.

pub mod evaluator;
pub mod resolver;

pub use evaluator::{can_access, effective_permission};
pub use resolver::{AccessResolver, GrantSet};
