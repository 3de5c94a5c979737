//! Role-based access control over (role, object, action) triples.

pub mod enforcer;
pub mod policies;

pub use enforcer::RbacEnforcer;
pub use policies::{Policy, PolicySet, actions, objects, roles};
