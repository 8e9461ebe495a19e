use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::protocol::SourceLocation;

/// Structured application exception reported by the remote side.
///
/// Carries everything the serving process copied out of the raised
/// exception: message, numeric code, origin file/line and stack trace.
/// The client fills in `endpoint` so diagnostics name the server that
/// produced the failure.
#[derive(Debug, Clone)]
pub struct RemoteException {
    /// Human-readable exception message.
    pub message: String,
    /// Numeric exception code (0 when the remote side supplied none).
    pub code: i64,
    /// File/line where the exception was raised on the remote side.
    pub file: Option<SourceLocation>,
    /// Remote stack trace, verbatim.
    pub trace: Vec<Value>,
    /// Endpoint the failing call was sent to.
    pub endpoint: Option<String>,
}

impl fmt::Display for RemoteException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "remote exception")?;
        if let Some(endpoint) = &self.endpoint {
            write!(f, " from {endpoint}")?;
        }
        write!(f, ": '{}'", self.message)?;
        if self.code != 0 {
            write!(f, " (code {})", self.code)?;
        }
        if let Some(file) = &self.file {
            write!(f, " at {file}")?;
        }
        Ok(())
    }
}

/// Errors that can occur during RPC operations.
///
/// Every condition the core detects is surfaced as its own variant;
/// nothing is downgraded to a generic code or silently swallowed.
#[derive(Error, Debug)]
pub enum Error {
    /// Endpoint is not a valid http(s) URL.
    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    /// Method name is empty or not an identifier. Fails before any
    /// transport attempt.
    #[error("invalid method name `{0}`")]
    InvalidMethod(String),

    /// Parameters were not a positional sequence. Fails before any
    /// transport attempt.
    #[error("parameters must form a positional sequence")]
    InvalidParams,

    /// Transport collaborator could not complete the exchange.
    /// Propagated as-is; the core never retries.
    #[error("connection failure: {0}")]
    Connection(String),

    /// Response body did not decode as an envelope.
    #[error("malformed response envelope: {0}")]
    MalformedResponse(serde_json::Error),

    /// Inbound request body did not decode as an envelope.
    #[error("malformed request envelope: {0}")]
    MalformedRequest(serde_json::Error),

    /// Inbound request carried no body at all.
    #[error("empty request body")]
    EmptyRequest,

    /// Inbound transport context failed the protocol precondition.
    #[error("invalid RPC request: expected POST with application/json")]
    InvalidRequest,

    /// Response id disagrees with the outstanding request id. Surfaced
    /// to the caller, never silently ignored.
    #[error("response id {got:?} does not match request id {expected}")]
    IdentifierMismatch {
        /// Id assigned to the outstanding request.
        expected: u64,
        /// Id found in the response envelope.
        got: Option<u64>,
    },

    /// Structured application exception raised on the remote side.
    #[error("{0}")]
    RemoteException(RemoteException),

    /// Non-exception error payload from the remote side. The payload is
    /// kept raw: a bare string and a structured object are both legal
    /// wire forms.
    #[error("remote error: {0}")]
    RemoteError(Value),

    /// JSON encoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for RPC operations.
pub type Result<T> = std::result::Result<T, Error>;
