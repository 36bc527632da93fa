//! Projection Tests
//!
//! A read returns exactly the selected fields (plus the identity); every
//! other field is at its zero value. Holds with engine-side path extraction
//! and with whole-blob decoding.

mod common;

use common::{create_temp_dir, db_path, full_payment, open_store_with};
use paystore::payment::{
    ChargesInformation, Chunk, Deadline, Filter, Party, Payment, PaymentAttributes,
    PaymentService, PaymentUpsert, Selection, SelectionAttributes,
};
use paystore::store::{SqlitePaymentStore, StoreConfig};
use rust_decimal::Decimal;
use tempfile::TempDir;
use uuid::Uuid;

// =============================================================================
// Test Utilities
// =============================================================================

fn stores(temp: &TempDir) -> [SqlitePaymentStore; 2] {
    [
        open_store_with(StoreConfig::new(db_path(temp)).with_path_extraction(true)),
        open_store_with(StoreConfig::new(db_path(temp)).with_path_extraction(false)),
    ]
}

/// What a read with `selection` must return for a stored payment
fn expected(id: Uuid, upsert: &PaymentUpsert, selection: &Selection) -> Payment {
    let a = &upsert.attributes;
    let s = &selection.attributes;
    fn pick<T: Clone + Default>(selected: bool, value: &T) -> T {
        if selected {
            value.clone()
        } else {
            T::default()
        }
    }
    Payment {
        id,
        version: 0,
        organisation_id: pick(selection.organisation_id, &upsert.organisation_id),
        payment_type: pick(selection.payment_type, &upsert.payment_type),
        attributes: PaymentAttributes {
            amount: pick(s.amount, &a.amount),
            currency: pick(s.currency, &a.currency),
            reference: pick(s.reference, &a.reference),
            end_to_end_reference: pick(s.end_to_end_reference, &a.end_to_end_reference),
            numeric_reference: pick(s.numeric_reference, &a.numeric_reference),
            payment_id: pick(s.payment_id, &a.payment_id),
            payment_purpose: pick(s.payment_purpose, &a.payment_purpose),
            payment_scheme: pick(s.payment_scheme, &a.payment_scheme),
            payment_type: pick(s.payment_type, &a.payment_type),
            processing_date: pick(s.processing_date, &a.processing_date),
            scheme_payment_sub_type: pick(s.scheme_payment_sub_type, &a.scheme_payment_sub_type),
            scheme_payment_type: pick(s.scheme_payment_type, &a.scheme_payment_type),
            beneficiary_party: pick(s.beneficiary_party, &a.beneficiary_party),
            debtor_party: pick(s.debtor_party, &a.debtor_party),
            sponsor_party: pick(s.sponsor_party, &a.sponsor_party),
            charges_information: pick(s.charges_information, &a.charges_information),
            fx: pick(s.fx, &a.fx),
        },
    }
}

fn selections() -> Vec<Selection> {
    vec![
        Selection::id_only(),
        Selection::id_only().with_organisation_id(),
        Selection::id_only().with_type(),
        Selection::id_only().with_attributes(SelectionAttributes {
            amount: true,
            currency: true,
            ..SelectionAttributes::NONE
        }),
        Selection::id_only().with_type().with_attributes(SelectionAttributes {
            processing_date: true,
            beneficiary_party: true,
            charges_information: true,
            fx: true,
            ..SelectionAttributes::NONE
        }),
        Selection::id_only().with_attributes(SelectionAttributes::ALL),
        Selection::id_only().with_type().with_attributes(SelectionAttributes::ALL),
    ]
}

// =============================================================================
// Get
// =============================================================================

#[test]
fn test_get_returns_exactly_the_selection() {
    let temp = create_temp_dir();
    let upsert = full_payment(Uuid::new_v4());
    let stores = stores(&temp);
    let id = stores[0].create(Deadline::none(), &upsert).unwrap();

    for store in &stores {
        for selection in selections() {
            let read = store.get(Deadline::none(), id, &selection).unwrap();
            assert_eq!(
                read,
                expected(id, &upsert, &selection),
                "selection {:?} path_extraction {}",
                selection,
                store.config().path_extraction
            );
        }
    }
}

#[test]
fn test_select_all_equals_stored() {
    let temp = create_temp_dir();
    let upsert = full_payment(Uuid::new_v4());
    let stores = stores(&temp);
    let id = stores[0].create(Deadline::none(), &upsert).unwrap();

    for store in &stores {
        let read = store.get(Deadline::none(), id, &Selection::all()).unwrap();
        assert_eq!(read.id, id);
        assert_eq!(read.version, 0);
        assert_eq!(read.organisation_id, upsert.organisation_id);
        assert_eq!(read.payment_type, upsert.payment_type);
        assert_eq!(read.attributes, upsert.attributes);
    }
}

#[test]
fn test_unselected_nested_fields_are_zero() {
    let temp = create_temp_dir();
    let upsert = full_payment(Uuid::new_v4());
    let stores = stores(&temp);
    let id = stores[0].create(Deadline::none(), &upsert).unwrap();

    let selection = Selection::id_only().with_attributes(SelectionAttributes {
        fx: true,
        ..SelectionAttributes::NONE
    });
    for store in &stores {
        let read = store.get(Deadline::none(), id, &selection).unwrap();
        assert_eq!(read.attributes.fx.contract_reference, "FX123");
        assert_eq!(read.attributes.amount, Decimal::ZERO);
        assert_eq!(read.attributes.debtor_party, Party::default());
        assert_eq!(read.attributes.charges_information, ChargesInformation::default());
        assert_eq!(read.payment_type, "");
        assert!(read.organisation_id.is_nil());
    }
}

// =============================================================================
// Find
// =============================================================================

#[test]
fn test_find_projects_every_row() {
    let temp = create_temp_dir();
    let org = Uuid::new_v4();
    let upsert = full_payment(org);
    let stores = stores(&temp);
    let ids: Vec<Uuid> = (0..3)
        .map(|_| stores[0].create(Deadline::none(), &upsert).unwrap())
        .collect();

    let selection = Selection::id_only().with_version().with_attributes(SelectionAttributes {
        reference: true,
        ..SelectionAttributes::NONE
    });
    for store in &stores {
        let found = store
            .find(
                Deadline::none(),
                &Filter::any().organisation(org),
                &selection,
                None,
                Chunk::first(10),
            )
            .unwrap();
        assert_eq!(found.len(), ids.len());
        for p in &found {
            assert!(ids.contains(&p.id));
            assert_eq!(p.attributes.reference, upsert.attributes.reference);
            assert_eq!(p.attributes.currency, "");
            assert_eq!(p.payment_type, "");
        }
    }
}
