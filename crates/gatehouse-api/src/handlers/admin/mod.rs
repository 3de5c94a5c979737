//! Administrative handlers. Every route checks the caller's role against
//! the `*_all` actions of its object.

pub mod sessions;
pub mod users;
