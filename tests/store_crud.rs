//! Store CRUD Tests
//!
//! Tests for:
//! - Create assigns a fresh identity at version 0
//! - Get with every field returns exactly what was stored
//! - Each update bumps the version by one; a stale version never writes
//! - Get, update and delete agree on what doesn't exist
//! - Find filters, sorts and pages

mod common;

use common::{create_temp_dir, credit, full_payment, open_store};
use paystore::payment::{
    Chunk, Deadline, ErrorKind, Filter, PaymentService, PaymentUpsert, Selection, Sort,
    SortField,
};
use rust_decimal_macros::dec;
use uuid::Uuid;

// =============================================================================
// Lifecycle scenario
// =============================================================================

#[test]
fn test_create_update_conflict_delete_scenario() {
    let temp = create_temp_dir();
    let store = open_store(&temp);
    let org = Uuid::new_v4();
    let a = credit(org);

    let id = store.create(Deadline::none(), &a).unwrap();
    assert!(!id.is_nil());

    let read = store.get(Deadline::none(), id, &Selection::all()).unwrap();
    assert_eq!(read.id, id);
    assert_eq!(read.version, 0);
    assert_eq!(read.organisation_id, org);
    assert_eq!(read.payment_type, "credit");
    assert_eq!(read.attributes, a.attributes);

    let mut a2 = a.clone();
    a2.attributes.amount = dec!(150);
    store.update(Deadline::none(), id, 0, &a2).unwrap();
    let read = store.get(Deadline::none(), id, &Selection::all()).unwrap();
    assert_eq!(read.version, 1);
    assert_eq!(read.attributes.amount, dec!(150));

    let mut a3 = a.clone();
    a3.attributes.amount = dec!(999);
    let err = store.update(Deadline::none(), id, 0, &a3).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VersionConflict);

    store.delete(Deadline::none(), id).unwrap();
    let err = store.get(Deadline::none(), id, &Selection::all()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_full_payment_round_trip() {
    let temp = create_temp_dir();
    let store = open_store(&temp);
    let upsert = full_payment(Uuid::new_v4());

    let id = store.create(Deadline::none(), &upsert).unwrap();
    let read = store.get(Deadline::none(), id, &Selection::all()).unwrap();

    assert_eq!(read.payment_type, upsert.payment_type);
    assert_eq!(read.organisation_id, upsert.organisation_id);
    assert_eq!(read.attributes, upsert.attributes);
    // exact decimal, no float drift
    assert_eq!(read.attributes.amount.to_string(), "100.21");
}

#[test]
fn test_create_returns_distinct_identities() {
    let temp = create_temp_dir();
    let store = open_store(&temp);
    let org = Uuid::new_v4();

    let mut ids: Vec<Uuid> = (0..50)
        .map(|_| store.create(Deadline::none(), &credit(org)).unwrap())
        .collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 50);
}

// =============================================================================
// Versioning
// =============================================================================

#[test]
fn test_version_increments_by_one() {
    let temp = create_temp_dir();
    let store = open_store(&temp);
    let upsert = credit(Uuid::new_v4());
    let id = store.create(Deadline::none(), &upsert).unwrap();

    for expected in 0..10u32 {
        store.update(Deadline::none(), id, expected, &upsert).unwrap();
        let read = store
            .get(Deadline::none(), id, &Selection::id_only().with_version())
            .unwrap();
        assert_eq!(read.version, expected + 1);
    }
}

#[test]
fn test_stale_version_never_mutates() {
    let temp = create_temp_dir();
    let store = open_store(&temp);
    let upsert = credit(Uuid::new_v4());
    let id = store.create(Deadline::none(), &upsert).unwrap();
    store.update(Deadline::none(), id, 0, &upsert).unwrap();
    let before = store.get(Deadline::none(), id, &Selection::all()).unwrap();

    let mut stale = upsert.clone();
    stale.payment_type = "debit".into();
    for version in [0, 2, 7] {
        let err = store.update(Deadline::none(), id, version, &stale).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionConflict);
        assert!(!err.is_retryable());
    }

    let after = store.get(Deadline::none(), id, &Selection::all()).unwrap();
    assert_eq!(after, before);
    assert_eq!(store.metrics().snapshot().version_conflicts, 3);
}

#[test]
fn test_organisation_cannot_change() {
    let temp = create_temp_dir();
    let store = open_store(&temp);
    let org = Uuid::new_v4();
    let id = store.create(Deadline::none(), &credit(org)).unwrap();

    let err = store
        .update(Deadline::none(), id, 0, &credit(Uuid::new_v4()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPayment);

    let read = store
        .get(Deadline::none(), id, &Selection::id_only().with_version().with_organisation_id())
        .unwrap();
    assert_eq!(read.organisation_id, org);
    assert_eq!(read.version, 0);
}

// =============================================================================
// Not-found symmetry
// =============================================================================

#[test]
fn test_never_created_is_not_found_everywhere() {
    let temp = create_temp_dir();
    let store = open_store(&temp);
    let id = Uuid::new_v4();
    let upsert = credit(Uuid::new_v4());

    let get = store.get(Deadline::none(), id, &Selection::all()).unwrap_err();
    let update = store.update(Deadline::none(), id, 0, &upsert).unwrap_err();
    let delete = store.delete(Deadline::none(), id).unwrap_err();

    assert_eq!(get.kind(), ErrorKind::NotFound);
    assert_eq!(update.kind(), ErrorKind::NotFound);
    assert_eq!(delete.kind(), ErrorKind::NotFound);
}

#[test]
fn test_deleted_is_not_found_everywhere() {
    let temp = create_temp_dir();
    let store = open_store(&temp);
    let upsert = credit(Uuid::new_v4());
    let id = store.create(Deadline::none(), &upsert).unwrap();
    store.delete(Deadline::none(), id).unwrap();

    assert!(store.get(Deadline::none(), id, &Selection::id_only()).unwrap_err().is(ErrorKind::NotFound));
    assert!(store.update(Deadline::none(), id, 0, &upsert).unwrap_err().is(ErrorKind::NotFound));
    assert!(store.delete(Deadline::none(), id).unwrap_err().is(ErrorKind::NotFound));
}

// =============================================================================
// Validation before I/O
// =============================================================================

#[test]
fn test_nil_identity_rejected() {
    let temp = create_temp_dir();
    let store = open_store(&temp);
    let upsert = credit(Uuid::new_v4());

    for err in [
        store.get(Deadline::none(), Uuid::nil(), &Selection::all()).unwrap_err(),
        store.update(Deadline::none(), Uuid::nil(), 0, &upsert).unwrap_err(),
        store.delete(Deadline::none(), Uuid::nil()).unwrap_err(),
    ] {
        assert_eq!(err.kind(), ErrorKind::InvalidIdentity);
    }
}

#[test]
fn test_invalid_payment_rejected_on_create() {
    let temp = create_temp_dir();
    let store = open_store(&temp);

    let err = store
        .create(Deadline::none(), &PaymentUpsert::new(Uuid::nil(), "credit"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = store
        .create(Deadline::none(), &PaymentUpsert::new(Uuid::new_v4(), ""))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPayment);

    let mut negative = credit(Uuid::new_v4());
    negative.attributes.amount = dec!(-1);
    let err = store.create(Deadline::none(), &negative).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPayment);

    let found = store
        .find(Deadline::none(), &Filter::any(), &Selection::id_only(), None, Chunk::first(10))
        .unwrap();
    assert!(found.is_empty());
}

// =============================================================================
// Find
// =============================================================================

#[test]
fn test_find_filters_by_organisation_and_type() {
    let temp = create_temp_dir();
    let store = open_store(&temp);
    let org_a = Uuid::new_v4();
    let org_b = Uuid::new_v4();

    let mut debit = credit(org_a);
    debit.payment_type = "debit".into();

    store.create(Deadline::none(), &credit(org_a)).unwrap();
    store.create(Deadline::none(), &credit(org_a)).unwrap();
    store.create(Deadline::none(), &debit).unwrap();
    store.create(Deadline::none(), &credit(org_b)).unwrap();

    let selection = Selection::id_only().with_type().with_organisation_id();

    let by_org = store
        .find(Deadline::none(), &Filter::any().organisation(org_a), &selection, None, Chunk::first(10))
        .unwrap();
    assert_eq!(by_org.len(), 3);
    assert!(by_org.iter().all(|p| p.organisation_id == org_a));

    let both = store
        .find(
            Deadline::none(),
            &Filter::any().organisation(org_a).payment_type("credit"),
            &selection,
            None,
            Chunk::first(10),
        )
        .unwrap();
    assert_eq!(both.len(), 2);
    assert!(both.iter().all(|p| p.payment_type == "credit"));

    let none = store
        .find(
            Deadline::none(),
            &Filter::any().payment_type("refund"),
            &selection,
            None,
            Chunk::first(10),
        )
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn test_find_pages_are_disjoint_and_ordered() {
    let temp = create_temp_dir();
    let store = open_store(&temp);
    let org = Uuid::new_v4();
    for _ in 0..7 {
        store.create(Deadline::none(), &credit(org)).unwrap();
    }

    let mut seen = Vec::new();
    let mut chunk = Chunk::first(3);
    loop {
        let page = store
            .find(Deadline::none(), &Filter::any(), &Selection::id_only(), None, chunk)
            .unwrap();
        if page.is_empty() {
            break;
        }
        seen.extend(page.into_iter().map(|p| p.id.to_string()));
        chunk = chunk.next();
    }

    assert_eq!(seen.len(), 7);
    let mut sorted = seen.clone();
    sorted.sort();
    assert_eq!(seen, sorted);
    assert_eq!(store.metrics().snapshot().rows_returned, 7);
}

#[test]
fn test_find_sort_by_version_desc() {
    let temp = create_temp_dir();
    let store = open_store(&temp);
    let org = Uuid::new_v4();
    let upsert = credit(org);

    let ids: Vec<Uuid> = (0..3)
        .map(|_| store.create(Deadline::none(), &upsert).unwrap())
        .collect();
    // versions 0, 1, 2
    for (i, id) in ids.iter().enumerate() {
        for v in 0..i as u32 {
            store.update(Deadline::none(), *id, v, &upsert).unwrap();
        }
    }

    let found = store
        .find(
            Deadline::none(),
            &Filter::any(),
            &Selection::id_only().with_version(),
            Some(Sort::desc(SortField::Version)),
            Chunk::first(10),
        )
        .unwrap();
    let versions: Vec<u32> = found.iter().map(|p| p.version).collect();
    assert_eq!(versions, vec![2, 1, 0]);
    assert_eq!(found[0].id, ids[2]);
}

#[test]
fn test_find_rejects_unbounded_chunk() {
    let temp = create_temp_dir();
    let store = open_store(&temp);

    let err = store
        .find(Deadline::none(), &Filter::any(), &Selection::all(), None, Chunk::first(0))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = store
        .find(Deadline::none(), &Filter::any(), &Selection::all(), None, Chunk::first(1_001))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

// =============================================================================
// Persistence across reopen
// =============================================================================

#[test]
fn test_payments_survive_reopen() {
    let temp = create_temp_dir();
    let upsert = full_payment(Uuid::new_v4());

    let id = {
        let store = open_store(&temp);
        store.create(Deadline::none(), &upsert).unwrap()
    };

    let store = open_store(&temp);
    let read = store.get(Deadline::none(), id, &Selection::all()).unwrap();
    assert_eq!(read.attributes, upsert.attributes);
    assert_eq!(store.metrics().snapshot().payments_created, 0);
}
