//! The resource store: canonical rows, the capability table, and the
//! all-or-nothing multi-row commit the batch operations rely on.
//!
//! The store itself has no policy. Authorization and the visibility state
//! machine live in the service; the store only enforces structural
//! invariants at commit time (row existence, version monotonicity).

use std::collections::{BTreeSet, HashMap};

use crate::error::{Result, VisibilityError};
use crate::primitives::{Resource, ResourceId, UserId};
use crate::rights;
use crate::types::RightsMask;

/// Keyed storage for resources plus the per-resource capability table.
///
/// Iteration (`scan`) follows insertion order, which is the store's canonical
/// order for list queries.
#[derive(Debug, Clone, Default)]
pub struct ResourceStore {
    resources: HashMap<ResourceId, Resource>,
    /// Insertion order of resource ids; parallel to `resources`.
    order: Vec<ResourceId>,
    /// Explicit capability grants: resource -> actor -> rights mask.
    /// Nested so the per-resource authorization lookup is allocation-free.
    /// The owner of a resource implicitly holds `rights::core::ADMIN` and
    /// never needs an entry here.
    capabilities: HashMap<ResourceId, HashMap<UserId, RightsMask>>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Point lookup by id.
    pub fn get(&self, id: &ResourceId) -> Option<&Resource> {
        self.resources.get(id)
    }

    /// Bulk lookup by id set, failing on the first missing resource.
    /// The returned rows follow the set's (ordered) iteration order.
    pub fn get_many(&self, ids: &BTreeSet<ResourceId>) -> Result<Vec<&Resource>> {
        ids.iter()
            .map(|id| {
                self.resources
                    .get(id)
                    .ok_or_else(|| VisibilityError::ResourceNotFound(id.clone()))
            })
            .collect()
    }

    /// Predicate scan in insertion order.
    pub fn scan(&self) -> impl Iterator<Item = &Resource> {
        self.order.iter().filter_map(|id| self.resources.get(id))
    }

    /// Admits a new resource. Ids must be unique.
    pub fn insert(&mut self, resource: Resource) -> Result<()> {
        if self.resources.contains_key(&resource.id) {
            return Err(VisibilityError::Invariant(format!(
                "resource id '{}' already exists in store",
                resource.id
            )));
        }
        self.order.push(resource.id.clone());
        self.resources.insert(resource.id.clone(), resource);
        Ok(())
    }

    /// Records an explicit capability grant for an actor on a resource.
    pub fn grant_capability(
        &mut self,
        id: &ResourceId,
        actor: impl Into<UserId>,
        mask: RightsMask,
    ) -> Result<()> {
        if !self.resources.contains_key(id) {
            return Err(VisibilityError::ResourceNotFound(id.clone()));
        }
        self.capabilities
            .entry(id.clone())
            .or_default()
            .insert(actor.into(), mask);
        Ok(())
    }

    /// Effective rights an actor holds over a resource: the full mask for the
    /// owner, otherwise whatever the capability table carries (zero if none).
    pub fn rights_for(&self, resource: &Resource, actor: &UserId) -> RightsMask {
        if &resource.owner == actor {
            return rights::core::ADMIN;
        }
        self.capabilities
            .get(&resource.id)
            .and_then(|actors| actors.get(actor))
            .copied()
            .unwrap_or(0)
    }

    /// Commits a batch of updated rows, checking structural invariants first.
    /// Either every row is written or none is: all checks run before the
    /// first write, and the writes themselves cannot fail.
    pub(crate) fn commit(&mut self, updates: Vec<Resource>) -> Result<()> {
        // 1. Updated rows must exist and version++.
        for upd in &updates {
            match self.resources.get(&upd.id) {
                Some(prev) if upd.version == prev.version + 1 => {}
                Some(_) => {
                    return Err(VisibilityError::Invariant(format!(
                        "version monotonicity violated for resource '{}'",
                        upd.id
                    )));
                }
                None => {
                    return Err(VisibilityError::Invariant(format!(
                        "updated resource '{}' not found in store",
                        upd.id
                    )));
                }
            }
        }

        // 2. Materialise.
        for upd in updates {
            self.resources.insert(upd.id.clone(), upd);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Principal;
    use crate::types::Visibility;

    fn resource(id: &str) -> Resource {
        Resource::new(id, format!("Item {id}"), id.to_uppercase(), "widgets", "owner@example.com")
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let mut store = ResourceStore::new();
        store.insert(resource("itm-001")).unwrap();
        let err = store.insert(resource("itm-001")).unwrap_err();
        assert!(matches!(err, VisibilityError::Invariant(_)));
    }

    #[test]
    fn scan_preserves_insertion_order() {
        let mut store = ResourceStore::new();
        for id in ["c", "a", "b"] {
            store.insert(resource(id)).unwrap();
        }
        let ids: Vec<_> = store.scan().map(|r| r.id.0.clone()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn get_many_names_first_missing_resource() {
        let mut store = ResourceStore::new();
        store.insert(resource("itm-001")).unwrap();
        let ids: BTreeSet<ResourceId> =
            [ResourceId::from("itm-001"), ResourceId::from("itm-404")].into();
        assert_eq!(
            store.get_many(&ids).unwrap_err(),
            VisibilityError::ResourceNotFound(ResourceId::from("itm-404"))
        );
    }

    #[test]
    fn owner_holds_full_mask_implicitly() {
        let mut store = ResourceStore::new();
        store.insert(resource("itm-001")).unwrap();
        let res = store.get(&ResourceId::from("itm-001")).unwrap();
        let owner = Principal::from("owner@example.com");
        let stranger = UserId::from("stranger@example.com");
        assert_eq!(store.rights_for(res, owner.user()), rights::core::ADMIN);
        assert_eq!(store.rights_for(res, &stranger), 0);
    }

    #[test]
    fn capability_table_tracks_actors_per_resource() {
        let mut store = ResourceStore::new();
        store.insert(resource("itm-001")).unwrap();
        store.insert(resource("itm-002")).unwrap();
        let id = ResourceId::from("itm-001");
        store.grant_capability(&id, "carol@example.com", rights::core::SHARE).unwrap();
        store.grant_capability(&id, "mallory@example.com", rights::core::ADMIN).unwrap();
        // Re-granting replaces the mask rather than stacking entries.
        store.grant_capability(&id, "carol@example.com", rights::core::READ).unwrap();

        let res = store.get(&id).unwrap();
        assert_eq!(store.rights_for(res, &UserId::from("carol@example.com")), rights::core::READ);
        assert_eq!(store.rights_for(res, &UserId::from("mallory@example.com")), rights::core::ADMIN);
        // Grants on itm-001 confer nothing on itm-002.
        let other = store.get(&ResourceId::from("itm-002")).unwrap();
        assert_eq!(store.rights_for(other, &UserId::from("carol@example.com")), 0);

        let err = store
            .grant_capability(&ResourceId::from("itm-404"), "carol@example.com", rights::core::READ)
            .unwrap_err();
        assert_eq!(err, VisibilityError::ResourceNotFound(ResourceId::from("itm-404")));
    }

    #[test]
    fn commit_rejects_version_regression_before_writing() {
        let mut store = ResourceStore::new();
        store.insert(resource("itm-001")).unwrap();
        store.insert(resource("itm-002")).unwrap();

        let mut ok = store.get(&ResourceId::from("itm-001")).unwrap().clone();
        ok.visibility = Visibility::Private;
        ok.version += 1;
        let stale = store.get(&ResourceId::from("itm-002")).unwrap().clone(); // version not bumped

        let err = store.commit(vec![ok, stale]).unwrap_err();
        assert!(matches!(err, VisibilityError::Invariant(_)));
        // Nothing was applied, including the valid row.
        assert_eq!(
            store.get(&ResourceId::from("itm-001")).unwrap().visibility,
            Visibility::Public
        );
    }
}
