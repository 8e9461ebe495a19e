//! Request construction.
//!
//! Validates the method name and parameter shape, then assigns the
//! session's next identifier (or a null id in notification mode).

use serde_json::Value;

use crate::protocol::RequestEnvelope;
use crate::{Error, Result};

/// Build a request envelope for one call.
///
/// In call mode the session counter is incremented exactly once and the
/// new value becomes the envelope's id; the increment happens before the
/// envelope is returned, so a retried send never reuses a stale id. In
/// notification mode the id is null and the counter is untouched.
pub(crate) fn build_request(
    next_id: &mut u64,
    notification: bool,
    method: &str,
    params: Value,
) -> Result<RequestEnvelope> {
    // ---
    if !is_valid_method(method) {
        return Err(Error::InvalidMethod(method.to_string()));
    }

    let params = positional(params)?;

    if notification {
        return Ok(RequestEnvelope::notification(method, params));
    }

    *next_id += 1;
    Ok(RequestEnvelope::call(*next_id, method, params))
}

/// Method names are non-empty identifiers: a letter or underscore
/// followed by letters, digits, underscores or dots.
fn is_valid_method(method: &str) -> bool {
    // ---
    let mut chars = method.chars();

    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Normalize parameters to the positional wire form.
///
/// No named parameters travel over the wire: an array is kept as-is, a
/// keyed object has its keys discarded with the values retained in
/// source order, and anything else is rejected.
fn positional(params: Value) -> Result<Vec<Value>> {
    // ---
    match params {
        Value::Array(values) => Ok(values),
        Value::Object(map) => Ok(map.into_iter().map(|(_, value)| value).collect()),
        _ => Err(Error::InvalidParams),
    }
}
