//! Extra RBAC policy configuration.

use serde::{Deserialize, Serialize};

/// Policies and grouping edges appended to the built-in policy set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RbacConfig {
    /// `[role, object, action]` grants.
    #[serde(default)]
    pub policies: Vec<[String; 3]>,
    /// `[child, parent]` inheritance edges.
    #[serde(default)]
    pub groupings: Vec<[String; 2]>,
}
