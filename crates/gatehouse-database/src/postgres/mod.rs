//! PostgreSQL store driver.

pub mod args;
pub mod session;
pub mod user;

pub use session::PgSessionStore;
pub use user::PgUserStore;
