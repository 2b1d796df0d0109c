use std::collections::BTreeSet;
use std::fmt;

use crate::membership::RoleMembership;
use crate::types::{PrincipalKind, Visibility};

// --- Identifiers -------------------------------------------------------------

/// Stable key of a governed resource (the catalog item's code/name key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub String);

/// Identity of a user, as the identity provider spells it (e-mail or login).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

/// Name of a role known to the membership provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RoleId(pub String);

macro_rules! impl_id_conversions {
    ($($ty:ident),+) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
        impl From<&str> for $ty {
            fn from(value: &str) -> Self {
                $ty(value.to_owned())
            }
        }
        impl From<String> for $ty {
            fn from(value: String) -> Self {
                $ty(value)
            }
        }
    )+};
}

impl_id_conversions!(ResourceId, UserId, RoleId);

// --- Principals & grantees ----------------------------------------------------

/// The caller identity a visibility decision is evaluated against.
///
/// A principal is always a concrete user; its roles are resolved on demand
/// through the [`RoleMembership`] provider rather than carried here, so a
/// membership change takes effect on the next check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Principal(pub UserId);

impl Principal {
    #[inline]
    pub fn user(&self) -> &UserId {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Principal {
    fn from(value: &str) -> Self {
        Principal(UserId::from(value))
    }
}

/// One entry of a resource's access list: the (kind, id) pair granted read
/// visibility into a private resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Grantee {
    User(UserId),
    Role(RoleId),
}

impl Grantee {
    pub fn kind(&self) -> PrincipalKind {
        match self {
            Grantee::User(_) => PrincipalKind::User,
            Grantee::Role(_) => PrincipalKind::Role,
        }
    }
}

impl fmt::Display for Grantee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grantee::User(u) => write!(f, "user:{u}"),
            Grantee::Role(r) => write!(f, "role:{r}"),
        }
    }
}

// --- Access list ---------------------------------------------------------------

/// Per-resource allow-list. Backed by an ordered set, so the uniqueness
/// invariant (no duplicate grantee per resource) holds by construction and
/// iteration order is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AccessList(BTreeSet<Grantee>);

impl AccessList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, grantee: &Grantee) -> bool {
        self.0.contains(grantee)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Grantee> {
        self.0.iter()
    }

    /// Inserts a grantee; returns false (and leaves the list untouched) when
    /// it is already present. Duplicate grants are idempotent, never an error.
    pub(crate) fn insert(&mut self, grantee: Grantee) -> bool {
        self.0.insert(grantee)
    }

    pub(crate) fn remove(&mut self, grantee: &Grantee) -> bool {
        self.0.remove(grantee)
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}

impl FromIterator<Grantee> for AccessList {
    fn from_iter<I: IntoIterator<Item = Grantee>>(iter: I) -> Self {
        AccessList(iter.into_iter().collect())
    }
}

// --- Resources -------------------------------------------------------------------

/// A governed catalog record: identity, display fields, owner, visibility
/// flag, and its access list. Created by the hosting application, mutated
/// only through the visibility service. Deletion is an external concern.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub display_name: String,
    /// Secondary lookup code shown in list views; matched by text filters.
    pub code: String,
    pub group: String,
    pub owner: UserId,
    pub visibility: Visibility,
    /// Monotonic per resource; bumped on every committed mutation.
    pub version: u64,
    pub access_list: AccessList,
}

impl Resource {
    /// New resources start PUBLIC with an empty access list at version 1.
    pub fn new(
        id: impl Into<ResourceId>,
        display_name: impl Into<String>,
        code: impl Into<String>,
        group: impl Into<String>,
        owner: impl Into<UserId>,
    ) -> Self {
        Resource {
            id: id.into(),
            display_name: display_name.into(),
            code: code.into(),
            group: group.into(),
            owner: owner.into(),
            visibility: Visibility::Public,
            version: 1,
            access_list: AccessList::new(),
        }
    }

    /// Pure visibility predicate: PUBLIC, or the owner, or a USER grant, or
    /// membership in a ROLE grant. A PUBLIC resource's access list is vacuous.
    pub fn visible_to<M: RoleMembership>(&self, principal: &Principal, membership: &M) -> bool {
        if self.visibility == Visibility::Public {
            return true;
        }
        if &self.owner == principal.user() {
            return true;
        }
        self.access_list.iter().any(|grantee| match grantee {
            Grantee::User(user) => user == principal.user(),
            Grantee::Role(role) => membership.has_role(principal.user(), role),
        })
    }
}
