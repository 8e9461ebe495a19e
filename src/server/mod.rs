//! RPC server: handler registry, dispatch and response emission.

mod fallback;
mod handler;

use std::collections::HashMap;

use bytes::Bytes;
use serde_json::Value;
use sha1::{Digest, Sha1};

use crate::domain::{
    HttpReply, CONTENT_SHA1_HEADER, CONTENT_TYPE_HEADER, CONTENT_TYPE_JSON,
};
use crate::protocol::{decode_envelope, ErrorObject, RequestEnvelope, ResponseEnvelope};
use crate::{log_debug, log_warn, Error, Result};

pub use fallback::fatal_response;
pub use handler::Exception;

use handler::{wrap_handler, BoxedHandler, Invoked};

/// Inbound transport context for one dispatch.
///
/// Captures what the HTTP layer saw: the request method, the declared
/// content type and the raw body bytes.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    /// HTTP method of the inbound call.
    pub method: String,
    /// Declared content type, if any.
    pub content_type: Option<String>,
    /// Raw request body.
    pub body: Bytes,
}

impl InboundRequest {
    /// A well-formed POST carrying a JSON body.
    pub fn post_json(body: Bytes) -> Self {
        Self {
            method: "POST".to_string(),
            content_type: Some(CONTENT_TYPE_JSON.to_string()),
            body,
        }
    }
}

/// A correlated response ready for the wire.
#[derive(Debug, Clone)]
pub struct EmittedResponse {
    /// Exact serialized envelope bytes.
    pub body: Bytes,
    /// Lowercase hex SHA-1 digest of `body`, computed after final
    /// encoding.
    pub digest: String,
}

/// Dispatch outcome: a correlated reply, or silence for notifications.
#[derive(Debug)]
pub enum Dispatched {
    /// Response envelope plus its integrity digest.
    Reply(EmittedResponse),
    /// The request was a notification; nothing goes on the wire.
    NoReply,
}

/// RPC server: a registry of named handlers plus the dispatch logic
/// that routes decoded envelopes to them.
///
/// Registration happens before serving; dispatch borrows `&self` and
/// keeps all per-request state on the stack, so concurrent inbound
/// requests are independent. Whether the registered handlers tolerate
/// concurrent invocation is their own responsibility.
///
/// # Example
///
/// ```
/// use http_rpc::RpcServer;
///
/// let mut server = RpcServer::new();
/// server.register("add", |(a, b): (i64, i64)| async move { Ok(a + b) });
/// ```
pub struct RpcServer {
    // ---
    handlers: HashMap<String, BoxedHandler>,
}

impl RpcServer {
    // ---
    /// Create a server with an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register an async handler under a method name.
    ///
    /// The handler takes one argument deserialized from the positional
    /// params array (a tuple for strict arity checking, a struct whose
    /// fields map in declaration order, or `Vec<Value>` for variadic
    /// methods) and returns `Result<Resp, Exception>`. Lookup misses
    /// and argument mismatches are reported to callers as invocation
    /// faults; a raised [`Exception`] travels back with origin and
    /// trace.
    ///
    /// Registering the same name twice replaces the earlier handler.
    pub fn register<F, Fut, Args, Resp>(&mut self, method: &str, handler: F)
    where
        F: Fn(Args) -> Fut + Send + Sync + Clone + 'static,
        Fut: std::future::Future<Output = std::result::Result<Resp, Exception>> + Send + 'static,
        Args: serde::de::DeserializeOwned + Send + 'static,
        Resp: serde::Serialize + Send + 'static,
    {
        // ---
        self.handlers
            .insert(method.to_string(), wrap_handler(method, handler));
    }

    /// Dispatch one inbound request against the registry.
    ///
    /// Protocol preconditions (POST, JSON content type) are checked
    /// before the body is touched. The response envelope always echoes
    /// the request's id; a null id means notification, in which case
    /// the invocation still runs for its side effects but nothing is
    /// emitted, not even on error.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRequest`] - not a POST with JSON content type
    /// - [`Error::EmptyRequest`] - body was empty
    /// - [`Error::MalformedRequest`] - body did not decode as an
    ///   envelope
    ///
    /// These escape per-request handling; serving edges convert them
    /// with [`fatal_response`].
    pub async fn dispatch(&self, inbound: InboundRequest) -> Result<Dispatched> {
        // ---
        if !inbound.method.eq_ignore_ascii_case("POST")
            || !declares_json(inbound.content_type.as_deref())
        {
            return Err(Error::InvalidRequest);
        }

        if inbound.body.is_empty() {
            return Err(Error::EmptyRequest);
        }

        let request: RequestEnvelope =
            decode_envelope(&inbound.body).map_err(Error::MalformedRequest)?;

        let RequestEnvelope { id, method, params } = request;
        let outcome = self.invoke(&method, params).await;

        if id.is_none() {
            // Notification: the invocation ran for its side effects;
            // failures are handled locally and never leave the process.
            match &outcome {
                Invoked::Fault(_message) => {
                    log_warn!("notification `{method}` faulted: {_message}")
                }
                Invoked::Raised(_exception) => {
                    log_warn!("notification `{method}` raised: {_exception}")
                }
                Invoked::Value(_) => log_debug!("notification `{method}` handled"),
            }
            return Ok(Dispatched::NoReply);
        }

        let envelope = match outcome {
            Invoked::Value(value) => ResponseEnvelope::success(id, value),
            Invoked::Fault(message) => {
                ResponseEnvelope::failure(id, ErrorObject::invocation_fault(message))
            }
            Invoked::Raised(exception) => {
                ResponseEnvelope::failure(id, ErrorObject::from(exception))
            }
        };

        let body = serde_json::to_vec(&envelope)?;
        // Digest covers the exact bytes that go on the wire.
        let digest = hex::encode(Sha1::digest(&body));

        Ok(Dispatched::Reply(EmittedResponse {
            body: Bytes::from(body),
            digest,
        }))
    }

    /// Full HTTP serving edge: dispatch plus last-resort fault
    /// conversion.
    ///
    /// Infallible by construction: every escaping [`Error`] becomes
    /// the fatal `id = 0` envelope. Transports and server loops call
    /// this once per inbound request; it is the process-wide fault
    /// channel's single installation point.
    pub async fn serve_http(&self, inbound: InboundRequest) -> HttpReply {
        // ---
        match self.dispatch(inbound).await {
            Ok(Dispatched::Reply(reply)) => {
                let mut headers = HashMap::new();
                headers.insert(CONTENT_TYPE_HEADER.to_string(), CONTENT_TYPE_JSON.to_string());
                headers.insert(CONTENT_SHA1_HEADER.to_string(), reply.digest);

                HttpReply {
                    status: 200,
                    headers,
                    body: reply.body,
                }
            }
            Ok(Dispatched::NoReply) => HttpReply {
                status: 204,
                headers: HashMap::new(),
                body: Bytes::new(),
            },
            Err(err) => fatal_response(&err),
        }
    }

    /// Look up and run the named handler.
    async fn invoke(&self, method: &str, params: Vec<Value>) -> Invoked {
        // ---
        match self.handlers.get(method) {
            Some(handler) => handler(params).await,
            None => Invoked::Fault(format!("no method `{method}` registered")),
        }
    }
}

impl Default for RpcServer {
    fn default() -> Self {
        Self::new()
    }
}

/// Content-type precondition. Parameters after `;` (e.g. a charset)
/// are tolerated.
fn declares_json(content_type: Option<&str>) -> bool {
    // ---
    match content_type {
        Some(value) => value
            .split(';')
            .next()
            .map(str::trim)
            .is_some_and(|mime| mime.eq_ignore_ascii_case(CONTENT_TYPE_JSON)),
        None => false,
    }
}
