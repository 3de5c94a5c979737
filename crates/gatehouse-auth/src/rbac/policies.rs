//! Policy triples and the role inheritance graph.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use serde::Serialize;

use gatehouse_core::config::RbacConfig;
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;

/// Matches any object or any action when it appears in a policy.
pub const WILDCARD: &str = "*";

/// Built-in role tags.
pub mod roles {
    /// Standard end user.
    pub const USER: &str = "user";
    /// Operator of the portal.
    pub const ADMIN: &str = "admin";
    /// Unrestricted operator.
    pub const SUPERADMIN: &str = "superadmin";
}

/// Protected objects.
pub mod objects {
    /// Identity records.
    pub const USER: &str = "user";
    /// Session records.
    pub const SESSION: &str = "session";
}

/// Actions. The `_all` forms cover records owned by other identities.
pub mod actions {
    pub const VIEW_ALL: &str = "view_all";
    pub const VIEW: &str = "view";
    pub const CREATE_ALL: &str = "create_all";
    pub const CREATE: &str = "create";
    pub const UPDATE_ALL: &str = "update_all";
    pub const UPDATE: &str = "update";
    pub const DELETE_ALL: &str = "delete_all";
    pub const DELETE: &str = "delete";
}

/// A `(role, object, action)` grant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Policy {
    pub role: String,
    pub object: String,
    pub action: String,
}

impl Policy {
    pub fn new(role: &str, object: &str, action: &str) -> Self {
        Self {
            role: role.to_string(),
            object: object.to_string(),
            action: action.to_string(),
        }
    }

    /// Policy-side wildcards only; a concrete policy never matches a `*` request.
    fn grants(&self, object: &str, action: &str) -> bool {
        (self.object == WILDCARD || self.object == object)
            && (self.action == WILDCARD || self.action == action)
    }
}

/// Immutable-once-built policy table plus `child -> parents` edges.
///
/// The grouping graph is kept acyclic: [`PolicySet::add_grouping_policy`]
/// rejects any edge that would close a loop.
#[derive(Debug, Clone, Default)]
pub struct PolicySet {
    policies: HashSet<Policy>,
    parents: BTreeMap<String, BTreeSet<String>>,
}

impl PolicySet {
    /// An empty set that denies everything.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in roles: `user` may view users, `admin` inherits `user`
    /// and may do anything on users and sessions, `superadmin` inherits
    /// `admin` and may do anything at all.
    pub fn builtin() -> Self {
        let mut set = Self::empty();
        set.add_policy(roles::USER, objects::USER, actions::VIEW);
        set.add_policy(roles::ADMIN, objects::USER, WILDCARD);
        set.add_policy(roles::ADMIN, objects::SESSION, WILDCARD);
        set.add_policy(roles::SUPERADMIN, WILDCARD, WILDCARD);
        for (child, parent) in [
            (roles::ADMIN, roles::USER),
            (roles::SUPERADMIN, roles::ADMIN),
        ] {
            set.add_grouping_policy(child, parent)
                .expect("built-in role hierarchy is acyclic");
        }
        set
    }

    /// Built-in policies merged with the configured extras.
    pub fn from_config(config: &RbacConfig) -> AppResult<Self> {
        let mut set = Self::builtin();
        for [role, object, action] in &config.policies {
            set.add_policy(role, object, action);
        }
        for [child, parent] in &config.groupings {
            set.add_grouping_policy(child, parent)?;
        }
        Ok(set)
    }

    /// Insert a grant. Returns `false` when it was already present.
    pub fn add_policy(&mut self, role: &str, object: &str, action: &str) -> bool {
        self.policies.insert(Policy::new(role, object, action))
    }

    /// Make `child` inherit everything granted to `parent`.
    ///
    /// Returns `Ok(false)` for an existing edge and a validation error when
    /// the edge would create a cycle.
    pub fn add_grouping_policy(&mut self, child: &str, parent: &str) -> AppResult<bool> {
        if child == parent || self.inherits(parent, child) {
            return Err(AppError::validation(format!(
                "Grouping '{child}' -> '{parent}' would create a role cycle"
            )));
        }
        Ok(self
            .parents
            .entry(child.to_string())
            .or_default()
            .insert(parent.to_string()))
    }

    /// Whether `role` may perform `action` on `object`.
    pub fn enforce(&self, role: &str, object: &str, action: &str) -> bool {
        self.reachable_roles(role).iter().any(|r| {
            self.policies
                .iter()
                .any(|p| p.role == *r && p.grants(object, action))
        })
    }

    /// Whether `role` reaches `ancestor` through one or more edges.
    pub fn inherits(&self, role: &str, ancestor: &str) -> bool {
        self.reachable_roles(role)
            .iter()
            .skip(1)
            .any(|r| r == ancestor)
    }

    /// `role` followed by every role it inherits from, breadth first.
    pub fn reachable_roles(&self, role: &str) -> Vec<String> {
        let mut seen = vec![role.to_string()];
        let mut queue = VecDeque::from([role.to_string()]);

        while let Some(current) = queue.pop_front() {
            let Some(parents) = self.parents.get(&current) else {
                continue;
            };
            for parent in parents {
                if !seen.contains(parent) {
                    seen.push(parent.clone());
                    queue.push_back(parent.clone());
                }
            }
        }
        seen
    }

    /// All grants, sorted.
    pub fn policies(&self) -> Vec<Policy> {
        let mut all: Vec<_> = self.policies.iter().cloned().collect();
        all.sort();
        all
    }

    /// All `(child, parent)` edges, sorted.
    pub fn groupings(&self) -> Vec<(String, String)> {
        self.parents
            .iter()
            .flat_map(|(child, parents)| parents.iter().map(|p| (child.clone(), p.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::error::ErrorKind;

    #[test]
    fn test_wildcard_grants_every_concrete_pair() {
        let set = PolicySet::builtin();
        for object in ["user", "session", "invoice"] {
            for action in ["view", "delete_all", "anything"] {
                assert!(set.enforce("superadmin", object, action));
            }
        }
        for action in ["view_all", "create_all", "update", "delete"] {
            assert!(set.enforce("admin", "session", action));
        }
        assert!(!set.enforce("admin", "invoice", "view"));
    }

    #[test]
    fn test_inheritance_is_transitive() {
        let mut set = PolicySet::empty();
        set.add_policy("c", "report", "export");
        set.add_grouping_policy("a", "b").unwrap();
        set.add_grouping_policy("b", "c").unwrap();

        assert!(set.enforce("a", "report", "export"));
        assert!(set.enforce("b", "report", "export"));
        assert!(!set.enforce("c", "report", "view"));
        assert!(set.inherits("a", "c"));
        assert!(!set.inherits("c", "a"));
    }

    #[test]
    fn test_cycles_are_rejected() {
        let mut set = PolicySet::empty();
        set.add_grouping_policy("a", "b").unwrap();
        set.add_grouping_policy("b", "c").unwrap();

        let err = set.add_grouping_policy("c", "a").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(set.add_grouping_policy("a", "a").is_err());
        assert_eq!(set.groupings().len(), 2);
    }

    #[test]
    fn test_concrete_policy_does_not_match_wildcard_request() {
        let set = PolicySet::builtin();
        assert!(set.enforce("user", "user", "view"));
        assert!(!set.enforce("user", "user", "*"));
        assert!(!set.enforce("user", "*", "view"));
        assert!(!set.enforce("user", "user", "view_all"));
    }

    #[test]
    fn test_inserts_are_idempotent() {
        let mut set = PolicySet::empty();
        assert!(set.add_policy("r", "o", "a"));
        assert!(!set.add_policy("r", "o", "a"));
        assert!(set.add_grouping_policy("r", "p").unwrap());
        assert!(!set.add_grouping_policy("r", "p").unwrap());
        assert_eq!(set.policies().len(), 1);
    }

    #[test]
    fn test_builtin_hierarchy() {
        let set = PolicySet::builtin();
        assert_eq!(
            set.groupings(),
            vec![
                ("admin".to_string(), "user".to_string()),
                ("superadmin".to_string(), "admin".to_string()),
            ]
        );
        assert_eq!(set.reachable_roles("superadmin"), ["superadmin", "admin", "user"]);
        assert_eq!(set.reachable_roles("admin"), ["admin", "user"]);
    }

    #[test]
    fn test_unknown_role_is_denied() {
        assert!(!PolicySet::builtin().enforce("guest", "user", "view"));
    }

    #[test]
    fn test_from_config_merges_extras() {
        let config = RbacConfig {
            policies: vec![["auditor".into(), "session".into(), "view_all".into()]],
            groupings: vec![["support".into(), "auditor".into()]],
        };
        let set = PolicySet::from_config(&config).unwrap();
        assert!(set.enforce("support", "session", "view_all"));
        assert!(set.enforce("admin", "user", "delete_all"));

        let cyclic = RbacConfig {
            policies: vec![],
            groupings: vec![["user".into(), "superadmin".into()]],
        };
        assert!(PolicySet::from_config(&cyclic).is_err());
    }
}
