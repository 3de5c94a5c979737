//! Identity domain entities.

pub mod model;
pub mod status;
pub mod store;

pub use model::{User, UserPatch, normalize_contact};
pub use status::UserStatus;
pub use store::UserStore;
