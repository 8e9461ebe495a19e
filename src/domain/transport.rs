// src/domain/transport.rs

//! Transport domain abstractions.
//!
//! This module defines the HTTP boundary used by the client and server
//! layers. It intentionally avoids any reference to concrete HTTP client
//! libraries.
//!
//! The transport layer is responsible only for carrying opaque envelope
//! bytes over one POST exchange and surfacing the reply body plus
//! headers. Higher-level semantics such as identifier correlation and
//! error classification are handled elsewhere.
//!
//! Concrete implementations of this interface live under `src/transport/`.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;

use crate::Result;

/// MIME type required on request and response bodies.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Content-type header name.
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

/// Integrity header carried on correlated responses: lowercase hex SHA-1
/// digest of the exact serialized response body, so a caller can detect
/// in-flight corruption independent of transport-level checksums.
pub const CONTENT_SHA1_HEADER: &str = "Content-SHA1";

/// One HTTP reply as surfaced by a transport.
///
/// Headers are kept as a plain name/value map; use
/// [`header`](Self::header) for case-insensitive lookup.
#[derive(Debug, Clone)]
pub struct HttpReply {
    /// HTTP status code.
    pub status: u16,
    /// Reply headers.
    pub headers: HashMap<String, String>,
    /// Raw reply body.
    pub body: Bytes,
}

impl HttpReply {
    /// Look up a header by name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Transport abstraction.
///
/// A `Transport` performs one HTTP POST exchange per call: it sends the
/// encoded envelope with the JSON content-type header and returns the
/// raw reply body plus headers. It makes no attempt to interpret either.
///
/// Implementations must ensure that:
/// - `post()` returns only once the full reply body has been received.
/// - Transport failures surface as [`Error::Connection`](crate::Error)
///   and are never retried at this layer.
/// - A call blocks its caller until the exchange completes; timeout and
///   cancellation policy belongs to the embedding, not the core.
///
/// The in-memory transport serves as the reference implementation of
/// these semantics.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    // ---
    /// POST an encoded envelope to `endpoint` and return the reply.
    async fn post(&self, endpoint: &str, body: Bytes) -> Result<HttpReply>;

    /// Close the transport and release any associated resources.
    async fn close(&self) -> Result<()>;
}

/// Shared transport pointer.
///
/// This is an `Arc<dyn Transport>`, which means:
/// - `.clone()` is cheap (only increments a reference count)
/// - Multiple clones share the same underlying connection
/// - Used to erase concrete transport types behind a stable domain interface.
pub type TransportPtr = Arc<dyn Transport>;

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        // ---
        let mut headers = HashMap::new();
        headers.insert("Content-SHA1".to_string(), "abc123".to_string());

        let reply = HttpReply {
            status: 200,
            headers,
            body: Bytes::new(),
        };

        assert_eq!(reply.header("content-sha1"), Some("abc123"));
        assert_eq!(reply.header("CONTENT-SHA1"), Some("abc123"));
        assert_eq!(reply.header("Content-Type"), None);
    }
}
