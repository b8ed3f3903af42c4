//! Two-pass decoder for the provider envelope.
//!
//! The provider stringifies its own response before wrapping it, so a body
//! looks like `{"req_id": "..", "response": "{\"option_contracts\": [..]}"}`.
//! Both passes are strict: a failure in either one fails the whole decode.

use serde_json::Value;

use crate::error::DecodeError;
use crate::models::{OptionContract, ResponseEnvelope};

/// Decode a raw response body into the contract list, preserving order.
pub fn decode(raw_body: &str) -> Result<Vec<OptionContract>, DecodeError> {
    let envelope = decode_envelope(raw_body)?;
    decode_payload(&envelope.response)
}

/// First pass: outer JSON into the envelope.
pub fn decode_envelope(raw_body: &str) -> Result<ResponseEnvelope, DecodeError> {
    serde_json::from_str(raw_body).map_err(DecodeError::InvalidEnvelope)
}

/// Second pass: the nested document carried in `response`.
pub fn decode_payload(payload: &str) -> Result<Vec<OptionContract>, DecodeError> {
    let mut document: Value = serde_json::from_str(payload).map_err(DecodeError::InvalidPayload)?;

    let contracts = document
        .get_mut("option_contracts")
        .map(Value::take)
        .ok_or(DecodeError::MissingContracts)?;

    serde_json::from_value(contracts).map_err(DecodeError::InvalidContracts)
}
