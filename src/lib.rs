#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(deprecated)]

//!
//! veil-core is a per-record visibility and sharing control layer for
//! catalog resources.
//!
//! Each resource is PUBLIC or PRIVATE; private resources carry an explicit
//! allow-list of users and roles, and a small rights algebra governs who may
//! mutate visibility or the allow-list. The crate is a library: the
//! presentation layer (dashboards, detail panels) lives elsewhere and calls
//! the [`service::VisibilityService`] and [`query`] gateway defined here.

// Module for common, shared value types (Visibility, RightsMask, filters).
pub mod types;

// Module for core record structures (ids, Principal, Grantee, Resource).
pub mod primitives;

// Re-export all core primitives for easier access at the crate root.
pub use primitives::*;

// Module for the rights algebra.
pub mod rights;

// Module for error types.
pub mod error;

// Keyed storage and the capability table.
pub mod store;

// Role-membership provider abstraction.
pub mod membership;

// Append-only audit log.
pub mod audit;

// The visibility service, sole writer of the store.
pub mod service;

// The list-query gateway.
pub mod query;

#[cfg(feature = "test-utils")]
pub mod fixtures;

pub use error::{Result, VisibilityError};
