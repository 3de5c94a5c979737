//! Shared, swappable handle over a [`PolicySet`].

use std::sync::{Arc, RwLock};

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;

use super::policies::PolicySet;

/// Process-wide permission engine.
///
/// Readers clone an `Arc` snapshot; writers build a new set and swap it in,
/// so a check never observes a half-updated graph.
#[derive(Debug)]
pub struct RbacEnforcer {
    current: RwLock<Arc<PolicySet>>,
}

impl RbacEnforcer {
    pub fn new(policies: PolicySet) -> Self {
        Self {
            current: RwLock::new(Arc::new(policies)),
        }
    }

    /// The current policy set.
    pub fn snapshot(&self) -> Arc<PolicySet> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    pub fn enforce(&self, role: &str, object: &str, action: &str) -> bool {
        self.snapshot().enforce(role, object, action)
    }

    /// `Forbidden` unless `role` may perform `action` on `object`.
    pub fn require(&self, role: &str, object: &str, action: &str) -> AppResult<()> {
        if self.enforce(role, object, action) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Role '{role}' may not {action} {object}"
            )))
        }
    }

    pub fn add_policy(&self, role: &str, object: &str, action: &str) -> bool {
        self.update(|set| Ok(set.add_policy(role, object, action)))
            .unwrap_or(false)
    }

    pub fn add_grouping_policy(&self, child: &str, parent: &str) -> AppResult<bool> {
        self.update(|set| set.add_grouping_policy(child, parent))
    }

    fn update<T>(&self, change: impl FnOnce(&mut PolicySet) -> AppResult<T>) -> AppResult<T> {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut next = (**guard).clone();
        let out = change(&mut next)?;
        *guard = Arc::new(next);
        Ok(out)
    }
}

impl Default for RbacEnforcer {
    fn default() -> Self {
        Self::new(PolicySet::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::error::ErrorKind;

    #[test]
    fn test_require_maps_denial_to_forbidden() {
        let rbac = RbacEnforcer::default();
        assert!(rbac.require("admin", "user", "delete_all").is_ok());

        let err = rbac.require("user", "session", "view_all").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_writes() {
        let rbac = RbacEnforcer::new(PolicySet::empty());
        let before = rbac.snapshot();

        assert!(rbac.add_policy("ops", "session", "*"));
        assert!(!before.enforce("ops", "session", "view"));
        assert!(rbac.enforce("ops", "session", "view"));
    }

    #[test]
    fn test_failed_write_leaves_set_intact() {
        let rbac = RbacEnforcer::default();
        assert!(rbac.add_grouping_policy("user", "superadmin").is_err());
        assert!(!rbac.enforce("user", "session", "delete"));
    }
}
