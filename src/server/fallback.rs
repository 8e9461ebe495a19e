//! Process-wide fault channel.
//!
//! Failures that escape per-request handling (protocol precondition
//! violations, undecodable bodies) have no correlatable originator, so
//! they cannot be answered with an echoed id. This module converts them
//! into the last-resort envelope: `id = 0`, null result, and an
//! exception-kind error with full origin.

use std::collections::HashMap;

use bytes::Bytes;

use crate::domain::{HttpReply, CONTENT_TYPE_HEADER, CONTENT_TYPE_JSON};
use crate::protocol::{ErrorKind, ErrorObject, ResponseEnvelope, SourceLocation};
use crate::Error;

/// Emitted when the fallback's own encoder fails; the last line of
/// defense may not itself fail.
const ENCODER_FAILURE: &[u8] =
    br#"{"id":0,"result":null,"error":"fatal: response encoder failure"}"#;

/// Convert a fault that escaped per-request handling into the fatal
/// fallback reply.
///
/// Install this at the serving edge, exactly once per serving process;
/// it is the only place failures become a best-effort response instead
/// of propagating.
#[track_caller]
pub fn fatal_response(err: &Error) -> HttpReply {
    // ---
    let caller = std::panic::Location::caller();

    let detail = ErrorObject {
        kind: ErrorKind::Exception,
        message: err.to_string(),
        code: 0,
        file: Some(SourceLocation {
            filename: caller.file().to_string(),
            line: caller.line(),
        }),
        trace: Vec::new(),
    };

    let envelope = ResponseEnvelope::failure(Some(0), detail);
    let body =
        serde_json::to_vec(&envelope).unwrap_or_else(|_| ENCODER_FAILURE.to_vec());

    let mut headers = HashMap::new();
    headers.insert(CONTENT_TYPE_HEADER.to_string(), CONTENT_TYPE_JSON.to_string());

    HttpReply {
        status: 200,
        headers,
        body: Bytes::from(body),
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::protocol::ErrorPayload;
    use serde_json::Value;

    #[test]
    fn fatal_envelope_has_id_zero_and_exception_kind() {
        // ---
        let reply = fatal_response(&Error::EmptyRequest);
        let envelope: ResponseEnvelope = serde_json::from_slice(&reply.body).unwrap();

        assert_eq!(envelope.id, Some(0));
        assert_eq!(envelope.result, Value::Null);

        let Some(ErrorPayload::Detail(detail)) = envelope.error else {
            panic!("expected structured error");
        };
        assert_eq!(detail.kind, ErrorKind::Exception);
        assert_eq!(detail.message, "empty request body");
        assert!(detail.file.is_some());
    }

    #[test]
    fn fatal_reply_declares_json() {
        // ---
        let reply = fatal_response(&Error::InvalidRequest);
        assert_eq!(reply.header(CONTENT_TYPE_HEADER), Some(CONTENT_TYPE_JSON));
    }
}
