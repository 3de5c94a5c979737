//! Session lifecycle: login, refresh, revocation and cleanup.

pub mod cleanup;
pub mod grant;
pub mod manager;

pub use cleanup::SessionCleanup;
pub use grant::GrantType;
pub use manager::{LoginInput, SessionManager};
