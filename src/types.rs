//! Shared enums and aliases used across the store, service, and query layers.
//!
//! Record-shaped types (ids, resources, grants) live in `src/primitives.rs`;
//! this file holds the small value types that cut across modules.

/// RightsMask, a 32-bit field.
/// - Bits 0-3: core rights (READ, WRITE, SHARE, ADMIN) - see `crate::rights`.
/// - Bits 4-15: reserved.
/// - Bits 16-31: available for host-application overlays; preserved but never
///   interpreted by this crate.
pub type RightsMask = u32;

/// Visibility state of a resource. The whole state machine: two states,
/// both transitions legal, both idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Visible to every principal; the access list confers nothing extra.
    Public,
    /// Visible only to the owner and access-list grantees.
    Private,
}

impl Visibility {
    #[inline]
    pub fn is_private(self) -> bool {
        matches!(self, Visibility::Private)
    }
}

/// Discriminant of a grantee: a concrete user or a role resolved through the
/// membership provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    User,
    Role,
}

/// Visibility facet of a query filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Private,
    Public,
}

/// Non-fatal conditions surfaced to the caller alongside a successful result.
/// The presentation layer decides how (or whether) to render these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A resource turned PRIVATE while its access list is empty: legal, but
    /// only the owner can see it until someone is granted access.
    EmptyAccessList,
}
