use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Discriminator carried in a structured error object's `kind` field.
///
/// Distinguishes an application exception raised *by* the invoked method
/// from a failure to invoke it at all. Unknown discriminators from
/// non-conforming peers are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorKind {
    /// Structured exception raised by the invoked method.
    Exception,
    /// Method missing, argument mismatch, or internal fault during
    /// invocation.
    InvocationFault,
    /// Any other discriminator a peer may send.
    Other(String),
}

impl ErrorKind {
    /// Wire spelling of this discriminator.
    pub fn as_str(&self) -> &str {
        match self {
            ErrorKind::Exception => "exception",
            ErrorKind::InvocationFault => "invocation_fault",
            ErrorKind::Other(other) => other,
        }
    }
}

impl From<String> for ErrorKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "exception" => ErrorKind::Exception,
            "invocation_fault" => ErrorKind::InvocationFault,
            _ => ErrorKind::Other(value),
        }
    }
}

impl From<ErrorKind> for String {
    fn from(kind: ErrorKind) -> Self {
        kind.as_str().to_string()
    }
}

/// File/line origin of a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Source file on the side that produced the failure.
    pub filename: String,
    /// Line within `filename`.
    pub line: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.filename, self.line)
    }
}

/// Structured error object carried in a response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorObject {
    /// Failure class discriminator.
    pub kind: ErrorKind,
    /// Human-readable message. Always present.
    pub message: String,
    /// Numeric code; 0 when the producer supplied none.
    #[serde(default)]
    pub code: i64,
    /// Origin location, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<SourceLocation>,
    /// Stack trace frames, verbatim.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<Value>,
}

impl ErrorObject {
    /// Error object for a failure to invoke the named method.
    pub fn invocation_fault(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InvocationFault,
            message: message.into(),
            code: 0,
            file: None,
            trace: Vec::new(),
        }
    }
}

/// The `error` field of a response envelope.
///
/// Conforming peers send the structured object form; a bare string is
/// also legal on the wire and anything else a peer sends is preserved
/// raw rather than rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorPayload {
    /// Structured error object.
    Detail(ErrorObject),
    /// Bare-string error form.
    Message(String),
    /// Any other non-null representation.
    Other(Value),
}

impl ErrorPayload {
    /// Discriminator, when the structured form carries one.
    pub fn kind(&self) -> Option<&ErrorKind> {
        match self {
            ErrorPayload::Detail(detail) => Some(&detail.kind),
            _ => None,
        }
    }

    /// Raw JSON value of this payload, whatever its shape.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_round_trips_known_and_unknown() {
        // ---
        let exception: ErrorKind = serde_json::from_value(json!("exception")).unwrap();
        assert_eq!(exception, ErrorKind::Exception);

        let fault: ErrorKind = serde_json::from_value(json!("invocation_fault")).unwrap();
        assert_eq!(fault, ErrorKind::InvocationFault);

        let other: ErrorKind = serde_json::from_value(json!("panic")).unwrap();
        assert_eq!(other, ErrorKind::Other("panic".into()));
        assert_eq!(serde_json::to_value(&other).unwrap(), json!("panic"));
    }

    #[test]
    fn payload_accepts_string_form() {
        // ---
        let payload: ErrorPayload = serde_json::from_value(json!("call failed")).unwrap();
        assert!(matches!(payload, ErrorPayload::Message(_)));
        assert_eq!(payload.kind(), None);
    }

    #[test]
    fn payload_accepts_structured_form() {
        // ---
        let payload: ErrorPayload = serde_json::from_value(json!({
            "kind": "exception",
            "message": "boom",
            "code": 3,
            "file": {"filename": "remote.rs", "line": 7},
            "trace": [{"frame": 0}]
        }))
        .unwrap();

        assert_eq!(payload.kind(), Some(&ErrorKind::Exception));
        let ErrorPayload::Detail(detail) = payload else {
            panic!("expected structured form");
        };
        assert_eq!(detail.message, "boom");
        assert_eq!(detail.code, 3);
        assert_eq!(detail.file.unwrap().line, 7);
        assert_eq!(detail.trace.len(), 1);
    }

    #[test]
    fn payload_keeps_unrecognized_objects_raw() {
        // Object without the mandatory kind/message fields still decodes.
        let payload: ErrorPayload =
            serde_json::from_value(json!({"reason": "unknown"})).unwrap();
        assert!(matches!(payload, ErrorPayload::Other(_)));
        assert_eq!(payload.to_value(), json!({"reason": "unknown"}));
    }

    #[test]
    fn object_defaults_are_omitted_on_the_wire() {
        // ---
        let object = ErrorObject::invocation_fault("no method `missing` registered");
        let wire = serde_json::to_value(&object).unwrap();
        assert_eq!(
            wire,
            json!({
                "kind": "invocation_fault",
                "message": "no method `missing` registered",
                "code": 0
            })
        );
    }
}
