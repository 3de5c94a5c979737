//! In-memory store driver.
//!
//! Selected with `database.driver = "memory"`. Data lives for the life of
//! the process; used by the test suites and for local development.

pub mod matcher;
pub mod session;
pub mod table;
pub mod user;

pub use session::MemorySessionStore;
pub use user::MemoryUserStore;
