/// Protocol types for the JSON wire envelope.
///
/// This module defines the request/response wire format and the
/// error-object vocabulary shared by client and server.
mod envelope;
mod error_object;

pub(crate) use envelope::decode_envelope;
pub use envelope::{RequestEnvelope, ResponseEnvelope};
pub use error_object::{ErrorKind, ErrorObject, ErrorPayload, SourceLocation};
