use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ErrorObject, ErrorPayload};

/// Decode an envelope, insisting on a JSON object at the top level.
///
/// Serde would happily map a bare array onto an envelope struct by
/// field position; the wire unit is an object, so anything else is
/// malformed.
pub(crate) fn decode_envelope<T: DeserializeOwned>(raw: &[u8]) -> serde_json::Result<T> {
    // ---
    let value: Value = serde_json::from_slice(raw)?;

    if !value.is_object() {
        return Err(serde::de::Error::custom("envelope must be a JSON object"));
    }

    serde_json::from_value(value)
}

/// Request wire unit.
///
/// `id` is a positive integer assigned by the client session, or absent
/// (`null`) for a notification. `params` is strictly positional; order
/// is significant and preserved end-to-end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Correlation id, `None` for notifications.
    #[serde(default)]
    pub id: Option<u64>,
    /// Name of the operation to invoke.
    pub method: String,
    /// Positional argument values.
    #[serde(default)]
    pub params: Vec<Value>,
}

impl RequestEnvelope {
    /// Request that expects a correlated reply.
    pub fn call(id: u64, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            id: Some(id),
            method: method.into(),
            params,
        }
    }

    /// Fire-and-forget request; no reply is sent or awaited.
    pub fn notification(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            id: None,
            method: method.into(),
            params,
        }
    }

    /// Whether this request expects no reply.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Response wire unit.
///
/// Exactly one of `result`/`error` is non-null. `id` echoes the
/// request's id; `Some(0)` marks the out-of-band fatal envelope, which
/// has no correlatable originator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Echoed request id.
    #[serde(default)]
    pub id: Option<u64>,
    /// Method return value; null when an error occurred.
    #[serde(default)]
    pub result: Value,
    /// Null on success, otherwise the error payload.
    #[serde(default)]
    pub error: Option<ErrorPayload>,
}

impl ResponseEnvelope {
    /// Successful response carrying the method's return value.
    pub fn success(id: Option<u64>, result: Value) -> Self {
        Self {
            id,
            result,
            error: None,
        }
    }

    /// Failed response carrying a structured error object.
    pub fn failure(id: Option<u64>, error: ErrorObject) -> Self {
        Self {
            id,
            result: Value::Null,
            error: Some(ErrorPayload::Detail(error)),
        }
    }
}
