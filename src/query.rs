//! The query gateway: translates a caller's filter document into a lazy,
//! conjunctive predicate scan over the resource store.
//!
//! When the filter carries a requesting principal the scan is additionally
//! restricted to resources that principal can view. When it does not, the
//! scan is unrestricted: the privileged admin-dashboard view. Callers choose
//! explicitly which of the two they are.

use crate::error::{Result, VisibilityError};
use crate::membership::RoleMembership;
use crate::primitives::{Principal, Resource, ResourceId};
use crate::store::ResourceStore;
use crate::types::{StatusFilter, Visibility};

/// Filter specification for a list query. All supplied predicates combine
/// conjunctively.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Filter {
    pub status: StatusFilter,
    /// Exact group match.
    pub group: Option<String>,
    /// Case-insensitive substring match against display name or code.
    pub text: Option<String>,
    /// Restrict the scan to resources this principal can view.
    pub principal: Option<Principal>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the JSON filter document sent by the presentation layer.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| VisibilityError::InvalidArgument(format!("malformed filter document: {e}")))
    }

    fn matches<M: RoleMembership>(&self, resource: &Resource, membership: &M) -> bool {
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Private => resource.visibility == Visibility::Private,
            StatusFilter::Public => resource.visibility == Visibility::Public,
        };
        if !status_ok {
            return false;
        }
        if let Some(group) = &self.group {
            if &resource.group != group {
                return false;
            }
        }
        if let Some(text) = &self.text {
            let needle = text.to_lowercase();
            let name_hit = resource.display_name.to_lowercase().contains(&needle);
            let code_hit = resource.code.to_lowercase().contains(&needle);
            if !name_hit && !code_hit {
                return false;
            }
        }
        if let Some(principal) = &self.principal {
            if !resource.visible_to(principal, membership) {
                return false;
            }
        }
        true
    }
}

/// The row shape handed to the list view.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResourceSummary {
    pub id: ResourceId,
    pub display_name: String,
    pub group: String,
    pub visibility: Visibility,
    pub shared_count: usize,
}

impl From<&Resource> for ResourceSummary {
    fn from(resource: &Resource) -> Self {
        ResourceSummary {
            id: resource.id.clone(),
            display_name: resource.display_name.clone(),
            group: resource.group.clone(),
            visibility: resource.visibility,
            shared_count: resource.access_list.len(),
        }
    }
}

/// Lazy scan in the store's insertion order.
pub fn scan<'a, M: RoleMembership>(
    store: &'a ResourceStore,
    membership: &'a M,
    filter: &'a Filter,
) -> impl Iterator<Item = ResourceSummary> + 'a {
    store
        .scan()
        .filter(move |resource| filter.matches(resource, membership))
        .map(ResourceSummary::from)
}
