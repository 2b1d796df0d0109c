//!
//! Defines error types for the visibility service.

use crate::primitives::{Grantee, ResourceId, UserId};

/// Errors returned by visibility-service operations and the query gateway.
///
/// Every variant carries enough identity to render a specific message; batch
/// operations name the first offending resource and apply nothing. No failure
/// here is fatal to the process and every operation is safe to re-issue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VisibilityError {
    /// The targeted resource does not exist in the store.
    #[error("resource not found: {0}")]
    ResourceNotFound(ResourceId),
    /// The actor lacks the required capability on a targeted resource.
    /// For batch operations the whole batch is aborted, nothing applied.
    #[error("permission denied for '{actor}' on resource '{resource}'")]
    PermissionDenied { resource: ResourceId, actor: UserId },
    /// Malformed or underspecified request (e.g. a share with no grantees).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A revoke targeted a grant that is not present.
    #[error("no grant for {grantee} on resource '{resource}'")]
    GrantNotFound {
        resource: ResourceId,
        grantee: Grantee,
    },
    /// An internal store invariant was violated during commit.
    #[error("store invariant violation: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, VisibilityError>;
