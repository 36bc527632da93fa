//! Stored shape of a payment's variable attributes
//!
//! The blob is a flat JSON object: the payment type under `type` next to
//! every attribute under its own key. Conversion to and from the domain
//! types is spelled out field by field.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::payment::{
    ChargesInformation, ForeignExchange, Party, Payment, PaymentAttributes, PaymentError,
    PaymentResult, PaymentUpsert, Selection,
};

/// A top level key of the blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlobPath {
    Type,
    Amount,
    Currency,
    Reference,
    EndToEndReference,
    NumericReference,
    PaymentId,
    PaymentPurpose,
    PaymentScheme,
    PaymentType,
    ProcessingDate,
    SchemePaymentSubType,
    SchemePaymentType,
    BeneficiaryParty,
    DebtorParty,
    SponsorParty,
    ChargesInformation,
    Fx,
}

impl BlobPath {
    /// Every key, in blob order
    pub const ALL: [BlobPath; 18] = [
        BlobPath::Type,
        BlobPath::Amount,
        BlobPath::Currency,
        BlobPath::Reference,
        BlobPath::EndToEndReference,
        BlobPath::NumericReference,
        BlobPath::PaymentId,
        BlobPath::PaymentPurpose,
        BlobPath::PaymentScheme,
        BlobPath::PaymentType,
        BlobPath::ProcessingDate,
        BlobPath::SchemePaymentSubType,
        BlobPath::SchemePaymentType,
        BlobPath::BeneficiaryParty,
        BlobPath::DebtorParty,
        BlobPath::SponsorParty,
        BlobPath::ChargesInformation,
        BlobPath::Fx,
    ];

    /// The JSON key
    pub fn key(&self) -> &'static str {
        match self {
            BlobPath::Type => "type",
            BlobPath::Amount => "amount",
            BlobPath::Currency => "currency",
            BlobPath::Reference => "reference",
            BlobPath::EndToEndReference => "end_to_end_reference",
            BlobPath::NumericReference => "numeric_reference",
            BlobPath::PaymentId => "payment_id",
            BlobPath::PaymentPurpose => "payment_purpose",
            BlobPath::PaymentScheme => "payment_scheme",
            BlobPath::PaymentType => "payment_type",
            BlobPath::ProcessingDate => "processing_date",
            BlobPath::SchemePaymentSubType => "scheme_payment_sub_type",
            BlobPath::SchemePaymentType => "scheme_payment_type",
            BlobPath::BeneficiaryParty => "beneficiary_party",
            BlobPath::DebtorParty => "debtor_party",
            BlobPath::SponsorParty => "sponsor_party",
            BlobPath::ChargesInformation => "charges_information",
            BlobPath::Fx => "fx",
        }
    }

    /// Whether the selection asks for this key
    pub fn is_selected(&self, s: &Selection) -> bool {
        let a = &s.attributes;
        match self {
            BlobPath::Type => s.payment_type,
            BlobPath::Amount => a.amount,
            BlobPath::Currency => a.currency,
            BlobPath::Reference => a.reference,
            BlobPath::EndToEndReference => a.end_to_end_reference,
            BlobPath::NumericReference => a.numeric_reference,
            BlobPath::PaymentId => a.payment_id,
            BlobPath::PaymentPurpose => a.payment_purpose,
            BlobPath::PaymentScheme => a.payment_scheme,
            BlobPath::PaymentType => a.payment_type,
            BlobPath::ProcessingDate => a.processing_date,
            BlobPath::SchemePaymentSubType => a.scheme_payment_sub_type,
            BlobPath::SchemePaymentType => a.scheme_payment_type,
            BlobPath::BeneficiaryParty => a.beneficiary_party,
            BlobPath::DebtorParty => a.debtor_party,
            BlobPath::SponsorParty => a.sponsor_party,
            BlobPath::ChargesInformation => a.charges_information,
            BlobPath::Fx => a.fx,
        }
    }

    /// The keys a selection asks for, in blob order
    pub fn selected(s: &Selection) -> Vec<BlobPath> {
        Self::ALL.into_iter().filter(|p| p.is_selected(s)).collect()
    }
}

/// The blob, fully populated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentData {
    #[serde(rename = "type")]
    pub payment_type: String,
    pub amount: Decimal,
    pub currency: String,
    pub reference: String,
    pub end_to_end_reference: String,
    pub numeric_reference: String,
    pub payment_id: String,
    pub payment_purpose: String,
    pub payment_scheme: String,
    #[serde(rename = "payment_type")]
    pub payment_type_code: String,
    pub processing_date: Option<NaiveDate>,
    pub scheme_payment_sub_type: String,
    pub scheme_payment_type: String,
    pub beneficiary_party: Party,
    pub debtor_party: Party,
    pub sponsor_party: Party,
    pub charges_information: ChargesInformation,
    pub fx: ForeignExchange,
}

impl From<&PaymentUpsert> for PaymentData {
    fn from(p: &PaymentUpsert) -> Self {
        let a = &p.attributes;
        Self {
            payment_type: p.payment_type.clone(),
            amount: a.amount,
            currency: a.currency.clone(),
            reference: a.reference.clone(),
            end_to_end_reference: a.end_to_end_reference.clone(),
            numeric_reference: a.numeric_reference.clone(),
            payment_id: a.payment_id.clone(),
            payment_purpose: a.payment_purpose.clone(),
            payment_scheme: a.payment_scheme.clone(),
            payment_type_code: a.payment_type.clone(),
            processing_date: a.processing_date,
            scheme_payment_sub_type: a.scheme_payment_sub_type.clone(),
            scheme_payment_type: a.scheme_payment_type.clone(),
            beneficiary_party: a.beneficiary_party.clone(),
            debtor_party: a.debtor_party.clone(),
            sponsor_party: a.sponsor_party.clone(),
            charges_information: a.charges_information.clone(),
            fx: a.fx.clone(),
        }
    }
}

impl PaymentData {
    /// Sets one key from its extracted JSON value. The value must have the
    /// stored type; `null` is only accepted where the stored type allows it.
    pub(crate) fn set(&mut self, path: BlobPath, value: &Value) -> PaymentResult<()> {
        match path {
            BlobPath::Type => self.payment_type = field(path, value)?,
            BlobPath::Amount => self.amount = field(path, value)?,
            BlobPath::Currency => self.currency = field(path, value)?,
            BlobPath::Reference => self.reference = field(path, value)?,
            BlobPath::EndToEndReference => self.end_to_end_reference = field(path, value)?,
            BlobPath::NumericReference => self.numeric_reference = field(path, value)?,
            BlobPath::PaymentId => self.payment_id = field(path, value)?,
            BlobPath::PaymentPurpose => self.payment_purpose = field(path, value)?,
            BlobPath::PaymentScheme => self.payment_scheme = field(path, value)?,
            BlobPath::PaymentType => self.payment_type_code = field(path, value)?,
            BlobPath::ProcessingDate => self.processing_date = field(path, value)?,
            BlobPath::SchemePaymentSubType => self.scheme_payment_sub_type = field(path, value)?,
            BlobPath::SchemePaymentType => self.scheme_payment_type = field(path, value)?,
            BlobPath::BeneficiaryParty => self.beneficiary_party = field(path, value)?,
            BlobPath::DebtorParty => self.debtor_party = field(path, value)?,
            BlobPath::SponsorParty => self.sponsor_party = field(path, value)?,
            BlobPath::ChargesInformation => self.charges_information = field(path, value)?,
            BlobPath::Fx => self.fx = field(path, value)?,
        }
        Ok(())
    }

    /// Resets every field the selection doesn't ask for to its zero value
    pub fn masked(self, s: &Selection) -> Self {
        if s.selects_whole_blob() {
            return self;
        }
        let a = &s.attributes;
        Self {
            payment_type: keep(s.payment_type, self.payment_type),
            amount: keep(a.amount, self.amount),
            currency: keep(a.currency, self.currency),
            reference: keep(a.reference, self.reference),
            end_to_end_reference: keep(a.end_to_end_reference, self.end_to_end_reference),
            numeric_reference: keep(a.numeric_reference, self.numeric_reference),
            payment_id: keep(a.payment_id, self.payment_id),
            payment_purpose: keep(a.payment_purpose, self.payment_purpose),
            payment_scheme: keep(a.payment_scheme, self.payment_scheme),
            payment_type_code: keep(a.payment_type, self.payment_type_code),
            processing_date: keep(a.processing_date, self.processing_date),
            scheme_payment_sub_type: keep(a.scheme_payment_sub_type, self.scheme_payment_sub_type),
            scheme_payment_type: keep(a.scheme_payment_type, self.scheme_payment_type),
            beneficiary_party: keep(a.beneficiary_party, self.beneficiary_party),
            debtor_party: keep(a.debtor_party, self.debtor_party),
            sponsor_party: keep(a.sponsor_party, self.sponsor_party),
            charges_information: keep(a.charges_information, self.charges_information),
            fx: keep(a.fx, self.fx),
        }
    }

    /// Moves the blob fields into a payment
    pub fn apply_to(self, payment: &mut Payment) {
        payment.payment_type = self.payment_type;
        payment.attributes = PaymentAttributes {
            amount: self.amount,
            currency: self.currency,
            reference: self.reference,
            end_to_end_reference: self.end_to_end_reference,
            numeric_reference: self.numeric_reference,
            payment_id: self.payment_id,
            payment_purpose: self.payment_purpose,
            payment_scheme: self.payment_scheme,
            payment_type: self.payment_type_code,
            processing_date: self.processing_date,
            scheme_payment_sub_type: self.scheme_payment_sub_type,
            scheme_payment_type: self.scheme_payment_type,
            beneficiary_party: self.beneficiary_party,
            debtor_party: self.debtor_party,
            sponsor_party: self.sponsor_party,
            charges_information: self.charges_information,
            fx: self.fx,
        };
    }
}

fn field<T: DeserializeOwned>(path: BlobPath, value: &Value) -> PaymentResult<T> {
    T::deserialize(value).map_err(|e| {
        PaymentError::invalid_format(e.to_string()).var("key", path.key())
    })
}

fn keep<T: Default>(selected: bool, value: T) -> T {
    if selected {
        value
    } else {
        T::default()
    }
}
