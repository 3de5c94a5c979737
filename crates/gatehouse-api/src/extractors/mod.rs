//! Custom Axum extractors.

pub mod auth;
pub mod client;
pub mod json;
pub mod list;

pub use auth::AuthUser;
pub use client::ClientInfo;
pub use json::ValidatedJson;
pub use list::{ListParams, ListColumns};
