//!
//! The visibility service: the sole writer of the resource store.
//!
//! Enforces the PUBLIC/PRIVATE state machine, validates and applies grants
//! and revocations, and answers `can_view`. Batch operations are
//! validate-then-commit: every row is authorized and staged before the first
//! write, so a failure anywhere leaves the store untouched.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::audit::{AuditAction, AuditEvent, AuditLog};
use crate::error::{Result, VisibilityError};
use crate::membership::RoleMembership;
use crate::primitives::{AccessList, Grantee, Principal, Resource, ResourceId, RoleId, UserId};
use crate::rights;
use crate::store::ResourceStore;
use crate::types::{RightsMask, Visibility, WarningKind};

/// A warning attached to one resource of an otherwise successful batch.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResourceWarning {
    pub resource: ResourceId,
    pub kind: WarningKind,
}

/// Result of a `set_visibility` batch.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VisibilityOutcome {
    /// Rows whose visibility actually changed. Idempotent re-application
    /// succeeds with zero.
    pub updated: u64,
    pub warnings: Vec<ResourceWarning>,
}

/// Result of a `grant` or `share_with_role` call.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GrantOutcome {
    /// Resources that received at least one new grant.
    pub resources_updated: u64,
    /// New access-list entries across the batch (duplicates excluded).
    pub grants_added: u64,
    /// Human-readable confirmation for the presentation layer.
    pub message: String,
}

/// Result of a `revoke_many` batch.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RevokeOutcome {
    /// Resources that lost at least one grant.
    pub resources_updated: u64,
    /// Access-list entries removed across the batch.
    pub grants_removed: u64,
    /// Human-readable confirmation for the presentation layer.
    pub message: String,
}

/// Dashboard statistics over the whole store.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VisibilityStats {
    pub total: usize,
    pub private: usize,
    pub public: usize,
    /// Private resources with a non-empty access list.
    pub shared: usize,
    pub most_shared: Option<MostShared>,
}

/// The resource carrying the most access-list entries.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MostShared {
    pub resource: ResourceId,
    pub grants: usize,
}

/// The visibility service. Generic over the role-membership provider so the
/// hosting application decides where "is U a member of R" is answered.
#[derive(Debug, Clone)]
pub struct VisibilityService<M: RoleMembership> {
    store: ResourceStore,
    audit: AuditLog,
    membership: M,
}

impl<M: RoleMembership> VisibilityService<M> {
    pub fn new(store: ResourceStore, membership: M) -> Self {
        VisibilityService {
            store,
            audit: AuditLog::new(),
            membership,
        }
    }

    /// Read access for the query gateway and the presentation layer.
    pub fn store(&self) -> &ResourceStore {
        &self.store
    }

    pub fn membership(&self) -> &M {
        &self.membership
    }

    /// The append-only record of committed changes.
    pub fn audit_log(&self) -> &[AuditEvent] {
        self.audit.events()
    }

    /// Admits a new resource into the store. Creation itself is the hosting
    /// application's concern; the service only guards id uniqueness.
    pub fn insert_resource(&mut self, resource: Resource) -> Result<()> {
        self.store.insert(resource)
    }

    /// Records an explicit capability grant for a non-owner actor.
    pub fn grant_capability(
        &mut self,
        id: &ResourceId,
        actor: impl Into<UserId>,
        mask: RightsMask,
    ) -> Result<()> {
        self.store.grant_capability(id, actor, mask)
    }

    fn authorize(&self, resource: &Resource, actor: &Principal, need: RightsMask) -> Result<()> {
        let have = self.store.rights_for(resource, actor.user());
        if rights::sufficient(have, need) {
            Ok(())
        } else {
            Err(VisibilityError::PermissionDenied {
                resource: resource.id.clone(),
                actor: actor.user().clone(),
            })
        }
    }

    /// Sets the visibility flag on every listed resource, all-or-nothing.
    ///
    /// Requires ADMIN on each resource; fails naming the first unauthorized
    /// or missing one, applying nothing. Turning a resource PUBLIC clears its
    /// access list. Re-applying the current state is a successful no-op that
    /// counts zero and emits no audit event. Turning a resource PRIVATE while
    /// its list is empty yields an `EmptyAccessList` warning, never an error.
    pub fn set_visibility(
        &mut self,
        ids: &BTreeSet<ResourceId>,
        private: bool,
        actor: &Principal,
    ) -> Result<VisibilityOutcome> {
        let target = if private {
            Visibility::Private
        } else {
            Visibility::Public
        };

        let mut staged: Vec<Resource> = Vec::new();
        let mut warnings: Vec<ResourceWarning> = Vec::new();
        for resource in self.store.get_many(ids)? {
            self.authorize(resource, actor, rights::core::ADMIN)?;
            if resource.visibility == target {
                continue; // idempotent no-op
            }
            let mut next = resource.clone();
            next.visibility = target;
            if !private {
                next.access_list.clear();
            } else if next.access_list.is_empty() {
                warn!(resource = %next.id, "resource turned private with empty access list");
                warnings.push(ResourceWarning {
                    resource: next.id.clone(),
                    kind: WarningKind::EmptyAccessList,
                });
            }
            next.version += 1;
            staged.push(next);
        }

        let audit_rows: Vec<(ResourceId, u64)> = staged
            .iter()
            .map(|resource| (resource.id.clone(), resource.version))
            .collect();
        let updated = staged.len() as u64;
        self.store.commit(staged)?;

        for (resource, version) in audit_rows {
            debug!(resource = %resource, to = ?target, "visibility changed");
            self.audit.record(
                resource,
                actor.user().clone(),
                version,
                AuditAction::VisibilityChanged { to: target },
            );
        }

        Ok(VisibilityOutcome { updated, warnings })
    }

    /// Appends grantees to the access lists of every listed resource,
    /// all-or-nothing.
    ///
    /// Requires SHARE on each resource. Pairs already present are silently
    /// idempotent. An empty grantee set is an `InvalidArgument`.
    pub fn grant(
        &mut self,
        ids: &BTreeSet<ResourceId>,
        grantees: &BTreeSet<Grantee>,
        actor: &Principal,
    ) -> Result<GrantOutcome> {
        if grantees.is_empty() {
            return Err(VisibilityError::InvalidArgument(
                "at least one user or role grantee is required".into(),
            ));
        }

        let mut staged: Vec<Resource> = Vec::new();
        let mut added: Vec<(ResourceId, u64, Grantee)> = Vec::new();
        for resource in self.store.get_many(ids)? {
            self.authorize(resource, actor, rights::core::SHARE)?;
            let mut next = resource.clone();
            let mut new_grants: Vec<Grantee> = Vec::new();
            for grantee in grantees {
                if next.access_list.insert(grantee.clone()) {
                    new_grants.push(grantee.clone());
                }
            }
            if !new_grants.is_empty() {
                next.version += 1;
                for grantee in new_grants {
                    added.push((next.id.clone(), next.version, grantee));
                }
                staged.push(next);
            }
        }

        let resources_updated = staged.len() as u64;
        let grants_added = added.len() as u64;
        self.store.commit(staged)?;

        for (resource, version, grantee) in added {
            debug!(resource = %resource, grantee = %grantee, "access granted");
            self.audit.record(
                resource,
                actor.user().clone(),
                version,
                AuditAction::AccessGranted { grantee },
            );
        }

        let mut message = format!(
            "Shared {} resource(s) with {} principal(s)",
            resources_updated,
            grantees.len()
        );
        if grants_added > 0 {
            message.push_str(&format!(" ({grants_added} new access grants)"));
        }

        Ok(GrantOutcome {
            resources_updated,
            grants_added,
            message,
        })
    }

    /// Shares one resource with every current member of a role, expanding the
    /// role eagerly into USER grants. Membership changes after the call do
    /// not affect the snapshot; callers wanting live role resolution should
    /// `grant` a `Grantee::Role` instead.
    pub fn share_with_role(
        &mut self,
        id: &ResourceId,
        role: &RoleId,
        actor: &Principal,
    ) -> Result<GrantOutcome> {
        let resource = self
            .store
            .get(id)
            .ok_or_else(|| VisibilityError::ResourceNotFound(id.clone()))?;
        self.authorize(resource, actor, rights::core::SHARE)?;

        let members = self.membership.members_of(role);
        if members.is_empty() {
            return Ok(GrantOutcome {
                resources_updated: 0,
                grants_added: 0,
                message: format!("Role '{role}' has no members; nothing shared"),
            });
        }
        let member_count = members.len();
        let grantees: BTreeSet<Grantee> = members.into_iter().map(Grantee::User).collect();
        let ids = BTreeSet::from([id.clone()]);
        let outcome = self.grant(&ids, &grantees, actor)?;

        Ok(GrantOutcome {
            message: format!("Shared '{id}' with {member_count} user(s) holding role '{role}'"),
            ..outcome
        })
    }

    /// Removes grantees from the access lists of every listed resource,
    /// all-or-nothing.
    ///
    /// Requires SHARE on each resource. Pairs not present are silently
    /// idempotent, mirroring `grant`; use `revoke` to be told about a single
    /// missing grant. An empty grantee set is an `InvalidArgument`.
    pub fn revoke_many(
        &mut self,
        ids: &BTreeSet<ResourceId>,
        grantees: &BTreeSet<Grantee>,
        actor: &Principal,
    ) -> Result<RevokeOutcome> {
        if grantees.is_empty() {
            return Err(VisibilityError::InvalidArgument(
                "at least one grantee to remove is required".into(),
            ));
        }

        let mut staged: Vec<Resource> = Vec::new();
        let mut removed: Vec<(ResourceId, u64, Grantee)> = Vec::new();
        for resource in self.store.get_many(ids)? {
            self.authorize(resource, actor, rights::core::SHARE)?;
            let mut next = resource.clone();
            let mut dropped: Vec<Grantee> = Vec::new();
            for grantee in grantees {
                if next.access_list.remove(grantee) {
                    dropped.push(grantee.clone());
                }
            }
            if !dropped.is_empty() {
                next.version += 1;
                for grantee in dropped {
                    removed.push((next.id.clone(), next.version, grantee));
                }
                staged.push(next);
            }
        }

        let resources_updated = staged.len() as u64;
        let grants_removed = removed.len() as u64;
        self.store.commit(staged)?;

        for (resource, version, grantee) in removed {
            debug!(resource = %resource, grantee = %grantee, "access revoked");
            self.audit.record(
                resource,
                actor.user().clone(),
                version,
                AuditAction::AccessRevoked { grantee },
            );
        }

        let mut message = format!("Removed access from {resources_updated} resource(s)");
        if grants_removed > 0 {
            message.push_str(&format!(" ({grants_removed} grants removed)"));
        }

        Ok(RevokeOutcome {
            resources_updated,
            grants_removed,
            message,
        })
    }

    /// Removes one grant. `GrantNotFound` if the pair is absent.
    pub fn revoke(&mut self, id: &ResourceId, grantee: &Grantee, actor: &Principal) -> Result<()> {
        let resource = self
            .store
            .get(id)
            .ok_or_else(|| VisibilityError::ResourceNotFound(id.clone()))?;
        self.authorize(resource, actor, rights::core::SHARE)?;
        if !resource.access_list.contains(grantee) {
            return Err(VisibilityError::GrantNotFound {
                resource: id.clone(),
                grantee: grantee.clone(),
            });
        }

        let mut next = resource.clone();
        next.access_list.remove(grantee);
        next.version += 1;
        let version = next.version;
        self.store.commit(vec![next])?;

        debug!(resource = %id, grantee = %grantee, "access revoked");
        self.audit.record(
            id.clone(),
            actor.user().clone(),
            version,
            AuditAction::AccessRevoked {
                grantee: grantee.clone(),
            },
        );
        Ok(())
    }

    /// Pure visibility predicate; an unknown resource is visible to no one.
    pub fn can_view(&self, id: &ResourceId, principal: &Principal) -> bool {
        self.store
            .get(id)
            .is_some_and(|resource| resource.visible_to(principal, &self.membership))
    }

    /// Read-only access list for the record-detail panel.
    pub fn access_list(&self, id: &ResourceId) -> Result<&AccessList> {
        self.store
            .get(id)
            .map(|resource| &resource.access_list)
            .ok_or_else(|| VisibilityError::ResourceNotFound(id.clone()))
    }

    /// Dashboard totals. Ties for most-shared resolve to the earliest
    /// inserted resource.
    pub fn visibility_stats(&self) -> VisibilityStats {
        let mut total = 0;
        let mut private = 0;
        let mut shared = 0;
        let mut most_shared: Option<MostShared> = None;

        for resource in self.store.scan() {
            total += 1;
            if resource.visibility.is_private() {
                private += 1;
                if !resource.access_list.is_empty() {
                    shared += 1;
                }
            }
            let grants = resource.access_list.len();
            let better = match most_shared.as_ref() {
                Some(best) => grants > best.grants,
                None => grants > 0,
            };
            if better {
                most_shared = Some(MostShared {
                    resource: resource.id.clone(),
                    grants,
                });
            }
        }

        VisibilityStats {
            total,
            private,
            public: total - private,
            shared,
            most_shared,
        }
    }
}
