//! Shared fixtures for store integration tests

#![allow(dead_code)]

use std::path::PathBuf;

use chrono::NaiveDate;
use paystore::payment::{
    ChargesInformation, ForeignExchange, Party, PaymentAttributes, PaymentUpsert, SenderCharge,
};
use paystore::store::{SqlitePaymentStore, StoreConfig};
use rust_decimal_macros::dec;
use tempfile::TempDir;
use uuid::Uuid;

pub fn create_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

pub fn db_path(temp: &TempDir) -> PathBuf {
    temp.path().join("payments.db")
}

pub fn open_store(temp: &TempDir) -> SqlitePaymentStore {
    SqlitePaymentStore::open(StoreConfig::new(db_path(temp))).expect("Failed to open store")
}

pub fn open_store_with(config: StoreConfig) -> SqlitePaymentStore {
    SqlitePaymentStore::open(config).expect("Failed to open store")
}

/// Raw connection on the store file, bypassing the service
pub fn raw_connection(temp: &TempDir) -> rusqlite::Connection {
    rusqlite::Connection::open(db_path(temp)).expect("Failed to open raw connection")
}

/// A credit of 100 GBP with no other attributes
pub fn credit(organisation_id: Uuid) -> PaymentUpsert {
    PaymentUpsert::new(organisation_id, "credit").with_attributes(PaymentAttributes {
        amount: dec!(100),
        currency: "GBP".into(),
        ..Default::default()
    })
}

/// A payment with every attribute populated
pub fn full_payment(organisation_id: Uuid) -> PaymentUpsert {
    PaymentUpsert::new(organisation_id, "Payment").with_attributes(PaymentAttributes {
        amount: dec!(100.21),
        currency: "GBP".into(),
        reference: "Payment for Em's piano lessons".into(),
        end_to_end_reference: "Wil piano Jan".into(),
        numeric_reference: "1002001".into(),
        payment_id: "123456789012345678".into(),
        payment_purpose: "Paying for goods/services".into(),
        payment_scheme: "FPS".into(),
        payment_type: "Credit".into(),
        processing_date: NaiveDate::from_ymd_opt(2017, 1, 18),
        scheme_payment_sub_type: "InternetBanking".into(),
        scheme_payment_type: "ImmediatePayment".into(),
        beneficiary_party: Party {
            account_name: "W Owens".into(),
            account_number: "31926819".into(),
            account_number_code: "BBAN".into(),
            account_type: 0,
            address: "1 The Beneficiary Localtown SE2".into(),
            bank_id: "403000".into(),
            bank_id_code: "GBDSC".into(),
            name: "Wilfred Jeremiah Owens".into(),
        },
        debtor_party: Party {
            account_name: "EJ Brown Black".into(),
            account_number: "GB29XABC10161234567801".into(),
            account_number_code: "IBAN".into(),
            account_type: 0,
            address: "10 Debtor Crescent Sourcetown NE1".into(),
            bank_id: "203301".into(),
            bank_id_code: "GBDSC".into(),
            name: "Emelia Jane Brown".into(),
        },
        sponsor_party: Party {
            account_number: "56781234".into(),
            bank_id: "123123".into(),
            bank_id_code: "GBDSC".into(),
            ..Default::default()
        },
        charges_information: ChargesInformation {
            bearer_code: "SHAR".into(),
            sender_charges: vec![
                SenderCharge {
                    amount: dec!(5.00),
                    currency: "GBP".into(),
                },
                SenderCharge {
                    amount: dec!(10.00),
                    currency: "USD".into(),
                },
            ],
            receiver_charges_amount: dec!(1.00),
            receiver_charges_currency: "USD".into(),
        },
        fx: ForeignExchange {
            contract_reference: "FX123".into(),
            exchange_rate: "2.00000".into(),
            original_amount: "200.42".into(),
            original_currency: "USD".into(),
        },
    })
}
