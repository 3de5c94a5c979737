//! # gatehouse-api
//!
//! HTTP boundary for Gatehouse built on Axum.
//!
//! Provides the auth, self-service and administrative endpoints, the bearer
//! and list-query extractors, error-to-HTTP mapping, panic recovery and
//! request logging.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::run_server;
pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
