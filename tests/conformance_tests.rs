use std::collections::BTreeSet;

use veil_core::fixtures;
use veil_core::query::{self, Filter};
use veil_core::types::{Visibility, WarningKind};
use veil_core::{Grantee, Principal, ResourceId, UserId, VisibilityError};

fn ids(names: &[&str]) -> BTreeSet<ResourceId> {
    names.iter().map(|n| ResourceId::from(*n)).collect()
}

/// itm-001 starts PUBLIC; toggled private it warns about the empty list;
/// granting alice makes it visible to alice and nobody else (owner aside).
#[test]
fn single_item_privacy_lifecycle() {
    let mut service = fixtures::service(1);
    let owner = Principal::from(fixtures::OWNER);
    let id = ResourceId::from("itm-001");
    let targets = ids(&["itm-001"]);

    assert_eq!(service.store().get(&id).unwrap().visibility, Visibility::Public);

    let outcome = service.set_visibility(&targets, true, &owner).unwrap();
    assert_eq!(outcome.updated, 1);
    assert_eq!(outcome.warnings[0].kind, WarningKind::EmptyAccessList);
    assert_eq!(service.store().get(&id).unwrap().visibility, Visibility::Private);
    assert!(service.access_list(&id).unwrap().is_empty());

    let grantees = BTreeSet::from([Grantee::User(UserId::from("alice@example.com"))]);
    service.grant(&targets, &grantees, &owner).unwrap();
    assert_eq!(service.access_list(&id).unwrap().len(), 1);
    assert!(service.can_view(&id, &Principal::from("alice@example.com")));
    assert!(!service.can_view(&id, &Principal::from("bob@example.com")));
}

/// A bulk toggle where one row fails authorization applies nothing: a
/// subsequent list query still shows every row PUBLIC.
#[test]
fn failed_bulk_toggle_leaves_the_listing_unchanged() {
    let mut service = fixtures::service(3);
    let stranger = Principal::from(fixtures::STRANGER);

    let err = service
        .set_visibility(&ids(&["itm-001", "itm-002", "itm-003"]), true, &stranger)
        .unwrap_err();
    assert!(matches!(err, VisibilityError::PermissionDenied { .. }));

    let filter = Filter::default();
    let rows: Vec<_> = query::scan(service.store(), service.membership(), &filter).collect();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|row| row.visibility == Visibility::Public));
}

/// PRIVATE -> PUBLIC clears the access list.
#[test]
fn returning_to_public_clears_grants() {
    let mut service = fixtures::service(1);
    let owner = Principal::from(fixtures::OWNER);
    let id = ResourceId::from("itm-001");
    let targets = ids(&["itm-001"]);

    service.set_visibility(&targets, true, &owner).unwrap();
    service
        .grant(
            &targets,
            &BTreeSet::from([Grantee::User(UserId::from("alice@example.com"))]),
            &owner,
        )
        .unwrap();
    service.set_visibility(&targets, false, &owner).unwrap();

    assert!(service.access_list(&id).unwrap().is_empty());
    // Everyone sees it again.
    assert!(service.can_view(&id, &Principal::from("nobody@example.com")));
}

/// Role grants resolve transitively through the membership provider, and the
/// listing's shared_count reflects the list size.
#[test]
fn role_grant_listing_and_counts() {
    let mut service = fixtures::service(2);
    let owner = Principal::from(fixtures::OWNER);
    let targets = ids(&["itm-001"]);

    service.set_visibility(&targets, true, &owner).unwrap();
    service
        .grant(
            &targets,
            &BTreeSet::from([Grantee::Role(fixtures::SALES_ROLE.into())]),
            &owner,
        )
        .unwrap();

    // alice holds the sales role (see fixtures), carol does not.
    let alice_view = Filter {
        principal: Some(Principal::from("alice@example.com")),
        ..Filter::default()
    };
    let carol_view = Filter {
        principal: Some(Principal::from("carol@example.com")),
        ..Filter::default()
    };
    assert_eq!(query::scan(service.store(), service.membership(), &alice_view).count(), 2);
    assert_eq!(query::scan(service.store(), service.membership(), &carol_view).count(), 1);

    let summary = query::scan(service.store(), service.membership(), &Filter::default())
        .find(|row| row.id == ResourceId::from("itm-001"))
        .unwrap();
    assert_eq!(summary.shared_count, 1);
}
