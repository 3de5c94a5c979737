//! Response DTOs.

use serde::Serialize;

/// `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Whether the store answered.
    pub database: bool,
    pub version: String,
}
