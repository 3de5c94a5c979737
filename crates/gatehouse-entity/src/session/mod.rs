//! Session domain entities.

pub mod model;
pub mod store;
pub mod token;

pub use model::{Session, SessionPatch};
pub use store::SessionStore;
pub use token::AuthToken;
