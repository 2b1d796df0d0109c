//! Role-membership abstraction.
//!
//! Resolving "is user U a member of role R" belongs to the hosting identity
//! system, not to this crate. The service and query gateway depend on it only
//! through the [`RoleMembership`] trait, which keeps the visibility logic
//! generic over whatever directory or IAM backend the host wires in.
//!
//! [`StaticRoleMembership`] is a trivial in-memory implementation, suitable
//! for tests and for hosts whose role table is small and loaded up front.

use std::collections::{BTreeSet, HashMap};

use crate::primitives::{RoleId, UserId};

/// Trait implemented by pluggable role-membership providers.
///
/// `has_role` MUST be a pure lookup: no side effects, and stable for the
/// duration of a single service call.
pub trait RoleMembership {
    fn has_role(&self, user: &UserId, role: &RoleId) -> bool;

    /// Current members of a role, used by the eager role-expansion share
    /// path. Order must be deterministic.
    fn members_of(&self, role: &RoleId) -> Vec<UserId>;
}

/// In-memory role table.
#[derive(Debug, Clone, Default)]
pub struct StaticRoleMembership {
    roles: HashMap<RoleId, BTreeSet<UserId>>,
}

impl StaticRoleMembership {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, user: impl Into<UserId>, role: impl Into<RoleId>) {
        self.roles.entry(role.into()).or_default().insert(user.into());
    }
}

impl RoleMembership for StaticRoleMembership {
    fn has_role(&self, user: &UserId, role: &RoleId) -> bool {
        self.roles.get(role).is_some_and(|members| members.contains(user))
    }

    fn members_of(&self, role: &RoleId) -> Vec<UserId> {
        self.roles
            .get(role)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_membership_lookup() {
        let mut membership = StaticRoleMembership::new();
        membership.assign("alice", "sales");
        membership.assign("bob", "sales");
        membership.assign("alice", "audit");

        assert!(membership.has_role(&UserId::from("alice"), &RoleId::from("sales")));
        assert!(!membership.has_role(&UserId::from("bob"), &RoleId::from("audit")));
        assert_eq!(
            membership.members_of(&RoleId::from("sales")),
            vec![UserId::from("alice"), UserId::from("bob")]
        );
        assert!(membership.members_of(&RoleId::from("absent")).is_empty());
    }
}
