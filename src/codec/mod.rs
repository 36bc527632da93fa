//! Payment record codec
//!
//! Serializes the variable attributes of a payment (type plus nested
//! attributes) into the JSON blob held by the `data` column, and back.
//!
//! # Guarantees
//!
//! - `decode(encode(x)) == x` for every valid payment
//! - A blob that isn't a well formed encoding fails with `InvalidFormat`,
//!   never with `NotFound` or a store error
//! - Projected blobs (selected keys only) decode without the full record,
//!   with the same per-key strictness

mod record;

pub use record::{BlobPath, PaymentData};

use serde_json::{Map, Value};

use crate::payment::{PaymentError, PaymentResult, Selection};

/// Encodes the blob of a payment
pub fn encode(data: &PaymentData) -> PaymentResult<Vec<u8>> {
    serde_json::to_vec(data).map_err(|e| {
        PaymentError::invalid_format("payment data cannot be serialized")
            .call("serde_json::to_vec", "PaymentData")
            .caused_by(e.to_string())
    })
}

/// Decodes a full blob. Every key must be present with the right type.
pub fn decode(bytes: &[u8]) -> PaymentResult<PaymentData> {
    serde_json::from_slice(bytes).map_err(|e| {
        PaymentError::invalid_format(e.to_string()).var("blob_len", bytes.len())
    })
}

/// Decodes a projected blob, populating only the selected keys.
///
/// The blob must be a JSON object holding every selected key with its
/// stored type. Unselected keys are neither read nor checked.
pub fn decode_projected(bytes: &[u8], selection: &Selection) -> PaymentResult<PaymentData> {
    let object: Map<String, Value> = serde_json::from_slice(bytes).map_err(|e| {
        PaymentError::invalid_format(e.to_string()).var("blob_len", bytes.len())
    })?;

    let mut data = PaymentData::default();
    for path in BlobPath::selected(selection) {
        let value = object.get(path.key()).ok_or_else(|| {
            PaymentError::invalid_format("selected key missing from blob").var("key", path.key())
        })?;
        data.set(path, value)?;
    }
    Ok(data)
}
