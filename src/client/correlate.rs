//! Response correlation.
//!
//! Decodes a reply body, classifies its error field and verifies that
//! the echoed identifier matches the outstanding request before the
//! result value is trusted.

use serde_json::Value;

use crate::error::RemoteException;
use crate::protocol::{decode_envelope, ErrorKind, ErrorPayload, ResponseEnvelope};
use crate::{Error, Result};

/// Correlate a raw reply body against the outstanding request id.
///
/// `expected_id` of `None` means the session is in notification mode:
/// the body is not inspected at all, and the transport's acceptance of
/// the send is the only success signal.
///
/// Error-field inspection runs before identifier verification, which in
/// turn runs before the result is trusted: an envelope is never treated
/// as successful just because `result` is non-null when the ids
/// disagree.
pub(crate) fn correlate(raw_body: &[u8], expected_id: Option<u64>) -> Result<Value> {
    // ---
    let Some(expected) = expected_id else {
        return Ok(Value::Null);
    };

    let envelope: ResponseEnvelope =
        decode_envelope(raw_body).map_err(Error::MalformedResponse)?;

    if let Some(payload) = envelope.error {
        return Err(classify(payload));
    }

    if envelope.id != Some(expected) {
        return Err(Error::IdentifierMismatch {
            expected,
            got: envelope.id,
        });
    }

    Ok(envelope.result)
}

/// Map a non-null error payload onto the failure taxonomy.
///
/// A structured object with the `exception` kind becomes
/// [`Error::RemoteException`], carrying the remote origin forward; every
/// other representation (other kinds, bare strings, unrecognized shapes)
/// becomes [`Error::RemoteError`] with the raw payload.
fn classify(payload: ErrorPayload) -> Error {
    // ---
    match payload {
        ErrorPayload::Detail(detail) if detail.kind == ErrorKind::Exception => {
            Error::RemoteException(RemoteException {
                message: detail.message,
                code: detail.code,
                file: detail.file,
                trace: detail.trace,
                endpoint: None,
            })
        }
        other => Error::RemoteError(other.to_value()),
    }
}
