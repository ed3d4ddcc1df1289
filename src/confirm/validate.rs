//! Send-payload validation.
//!
//! A pure parse step: the input is never mutated, a passing payload produces
//! a new, fully normalized value. Runs before any surface is created.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::confirm::types::{ConfirmError, ConfirmResult};

/// A send payload whose every field is a normalized hexadecimal string:
/// `0x` prefix, lowercase, non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanitizedPayload {
    fields: Map<String, Value>,
}

impl SanitizedPayload {
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// Validate and normalize a raw payload. Any non-string or non-hex field
/// rejects the whole request.
pub fn sanitize_payload(params: &Map<String, Value>) -> ConfirmResult<SanitizedPayload> {
    let mut fields = Map::new();
    for (key, value) in params {
        let raw = value.as_str().ok_or(ConfirmError::InvalidPayload)?;
        fields.insert(key.clone(), Value::String(sanitize_hex(raw)?));
    }
    Ok(SanitizedPayload { fields })
}

/// Normalize one field: strip an optional `0x`/`0X` prefix, lowercase, and
/// require the remainder to match `[0-9a-f]+`.
fn sanitize_hex(value: &str) -> ConfirmResult<String> {
    let body = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
        .to_ascii_lowercase();
    if body.is_empty() || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ConfirmError::InvalidPayload);
    }
    Ok(format!("0x{}", body))
}
