//! Payment domain types
//!
//! `Payment` is what reads return, `PaymentUpsert` is what writes accept.
//! Identity, version and organisation are owned by the store; the rest is
//! caller data.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{PaymentError, PaymentResult};

/// A stored payment
///
/// Fields not requested by a read's selection hold their zero value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Immutable identity assigned on create
    pub id: Uuid,
    /// Incremented by one on every successful update
    pub version: u32,
    /// Immutable owner
    pub organisation_id: Uuid,
    /// Category code
    #[serde(rename = "type")]
    pub payment_type: String,
    pub attributes: PaymentAttributes,
}

/// The variable attribute set of a payment
///
/// Absent attributes take their zero value on input; a nested object that
/// is present must carry all of its keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentAttributes {
    pub amount: Decimal,
    pub currency: String,
    pub reference: String,
    pub end_to_end_reference: String,
    pub numeric_reference: String,
    pub payment_id: String,
    pub payment_purpose: String,
    pub payment_scheme: String,
    pub payment_type: String,
    pub processing_date: Option<NaiveDate>,
    pub scheme_payment_sub_type: String,
    pub scheme_payment_type: String,
    pub beneficiary_party: Party,
    pub debtor_party: Party,
    pub sponsor_party: Party,
    pub charges_information: ChargesInformation,
    pub fx: ForeignExchange,
}

/// Beneficiary, debtor or sponsor of a payment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub account_name: String,
    pub account_number: String,
    pub account_number_code: String,
    pub account_type: i64,
    pub address: String,
    pub bank_id: String,
    pub bank_id_code: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChargesInformation {
    pub bearer_code: String,
    pub sender_charges: Vec<SenderCharge>,
    pub receiver_charges_amount: Decimal,
    pub receiver_charges_currency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SenderCharge {
    pub amount: Decimal,
    pub currency: String,
}

/// Foreign exchange details, kept as received
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignExchange {
    pub contract_reference: String,
    pub exchange_rate: String,
    pub original_amount: String,
    pub original_currency: String,
}

/// Input of create and update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentUpsert {
    pub organisation_id: Uuid,
    #[serde(rename = "type")]
    pub payment_type: String,
    #[serde(default)]
    pub attributes: PaymentAttributes,
}

impl PaymentUpsert {
    /// Creates an upsert with default attributes
    pub fn new(organisation_id: Uuid, payment_type: impl Into<String>) -> Self {
        Self {
            organisation_id,
            payment_type: payment_type.into(),
            attributes: PaymentAttributes::default(),
        }
    }

    /// Sets the attributes
    pub fn with_attributes(mut self, attributes: PaymentAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Validates the shape of the payment. Performs no I/O.
    pub fn validate(&self) -> PaymentResult<()> {
        if self.organisation_id.is_nil() {
            return Err(PaymentError::invalid_argument(
                "organisation_id",
                self.organisation_id,
                "organisation_id must not be nil",
            ));
        }

        if self.payment_type.trim().is_empty() {
            return Err(PaymentError::invalid_payment("type must not be empty")
                .arg("type", &self.payment_type));
        }

        let attrs = &self.attributes;
        if attrs.amount.is_sign_negative() && !attrs.amount.is_zero() {
            return Err(PaymentError::invalid_payment("amount must not be negative")
                .arg("attributes.amount", attrs.amount));
        }
        check_currency("attributes.currency", &attrs.currency)?;
        check_currency(
            "attributes.charges_information.receiver_charges_currency",
            &attrs.charges_information.receiver_charges_currency,
        )?;

        for (i, charge) in attrs.charges_information.sender_charges.iter().enumerate() {
            if charge.amount.is_sign_negative() && !charge.amount.is_zero() {
                return Err(PaymentError::invalid_payment(
                    "sender charge amount must not be negative",
                )
                .arg(
                    format!("attributes.charges_information.sender_charges[{}].amount", i),
                    charge.amount,
                ));
            }
            check_currency(
                &format!("attributes.charges_information.sender_charges[{}].currency", i),
                &charge.currency,
            )?;
        }

        Ok(())
    }
}

/// Currencies are optional but, when present, are ISO 4217 alphabetic codes.
fn check_currency(name: &str, currency: &str) -> PaymentResult<()> {
    if currency.is_empty() {
        return Ok(());
    }
    if currency.len() == 3 && currency.bytes().all(|b| b.is_ascii_uppercase()) {
        return Ok(());
    }
    Err(PaymentError::invalid_payment("currency must be a 3 letter uppercase code").arg(name, currency))
}
