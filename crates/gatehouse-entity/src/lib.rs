//! # gatehouse-entity
//!
//! Domain models for Gatehouse. Every struct in this crate is either a
//! database row (deriving `sqlx::FromRow`) or a value object returned to
//! API clients. The narrow store contracts the auth layer depends on live
//! next to the models they persist.

pub mod session;
pub mod user;
