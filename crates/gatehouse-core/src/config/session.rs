//! Session management configuration.

use serde::{Deserialize, Serialize};

/// Session management configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// When set, a new login blocks every other active session of the identity.
    #[serde(default = "default_true")]
    pub single_session: bool,
    /// Interval for expired session cleanup in seconds. `0` disables the task.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            single_session: true,
            cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_cleanup_interval() -> u64 {
    15 * 60
}
