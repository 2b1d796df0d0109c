//! Deterministic seeded fixtures for tests and benches.
//!
//! Compiled only with the `test-utils` feature; the crate's own
//! dev-dependency enables it for the integration tests.

use crate::membership::StaticRoleMembership;
use crate::primitives::Resource;
use crate::service::VisibilityService;
use crate::store::ResourceStore;

/// Owner of every seeded resource.
pub const OWNER: &str = "owner@example.com";
/// A user with no grants anywhere.
pub const STRANGER: &str = "stranger@example.com";
/// Role used by the seeded membership table.
pub const SALES_ROLE: &str = "sales";

/// Seeded membership: alice and bob hold the sales role.
pub fn membership() -> StaticRoleMembership {
    let mut membership = StaticRoleMembership::new();
    membership.assign("alice@example.com", SALES_ROLE);
    membership.assign("bob@example.com", SALES_ROLE);
    membership
}

/// A store of `count` PUBLIC resources named `itm-001..`, alternating
/// between the `hardware` and `docs` groups.
pub fn store(count: usize) -> ResourceStore {
    let mut store = ResourceStore::new();
    for i in 1..=count {
        let group = if i % 2 == 0 { "docs" } else { "hardware" };
        let resource = Resource::new(
            format!("itm-{i:03}"),
            format!("Item {i}"),
            format!("CODE-{i:03}"),
            group,
            OWNER,
        );
        store
            .insert(resource)
            .expect("fixture ids are unique by construction");
    }
    store
}

/// A service over a seeded store and the seeded membership table.
pub fn service(count: usize) -> VisibilityService<StaticRoleMembership> {
    VisibilityService::new(store(count), membership())
}
