//! RPC client implementation.
//!
//! This module contains the core [`RpcClient`] type which sends JSON
//! envelope requests to an HTTP endpoint and correlates the replies.
//!
//! # Architecture
//!
//! Each non-notification call increments the session's monotonic id
//! counter, POSTs the encoded envelope through the transport, and runs
//! the correlator over the reply body. A notification session sends
//! null-id envelopes and never waits on a reply.
//!
//! # Concurrency
//!
//! A session is one-request-at-a-time by contract: `invoke` takes
//! `&mut self`, so the borrow checker serializes access to the id
//! counter. Embeddings that want parallel calls use one session per
//! worker rather than sharing one counter.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::builder::build_request;
use super::correlate::correlate;
use crate::{Error, Result, RpcConfig, TransportPtr};

/// Running RPC client session.
///
/// Owns the target endpoint, the notification-mode flag (fixed at
/// construction) and the monotonic id counter. The counter starts at
/// zero, is never reset and is never shared across sessions; it is the
/// sole source of request identifiers.
pub struct RpcClient {
    // ---
    transport: TransportPtr,
    endpoint: String,
    notification: bool,
    next_id: u64,
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("endpoint", &self.endpoint)
            .field("notification", &self.notification)
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl RpcClient {
    // ---
    /// Create a client with an explicitly provided transport.
    ///
    /// This is the constructor you want for tests and for advanced
    /// users.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the configured endpoint is
    /// not a valid http(s) URL.
    pub fn with_transport(transport: TransportPtr, config: &RpcConfig) -> Result<Self> {
        // ---
        let endpoint = validate_endpoint(&config.endpoint)?;

        Ok(Self {
            transport,
            endpoint,
            notification: config.notification,
            next_id: 0,
        })
    }

    /// Convenience constructor that selects the crate-default transport.
    ///
    /// This calls [`create_transport`](crate::create_transport)
    /// (feature-driven) and then constructs the client using
    /// [`with_transport`](Self::with_transport).
    ///
    /// # Errors
    ///
    /// Returns an error if transport creation fails or the endpoint is
    /// invalid.
    pub async fn connect(config: &RpcConfig) -> Result<Self> {
        // ---
        let transport = crate::create_transport(config).await?;
        Self::with_transport(transport, config)
    }

    /// Target endpoint of this session.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether this is a notification session.
    pub fn is_notification(&self) -> bool {
        self.notification
    }

    /// Invoke a remote method with positional arguments.
    ///
    /// The single generic entry point: builds the envelope, sends it,
    /// and correlates the reply. In notification mode this returns
    /// `Value::Null` as soon as the transport accepts the send.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidMethod`] / [`Error::InvalidParams`] - the call
    ///   was rejected before any transport attempt
    /// - [`Error::Connection`] - the transport could not complete the
    ///   exchange
    /// - [`Error::MalformedResponse`] - the reply did not decode as an
    ///   envelope
    /// - [`Error::RemoteException`] / [`Error::RemoteError`] - the far
    ///   side reported a failure
    /// - [`Error::IdentifierMismatch`] - the reply's id disagrees with
    ///   this request's id
    pub async fn invoke(&mut self, method: &str, params: Vec<Value>) -> Result<Value> {
        // ---
        self.roundtrip(method, Value::Array(params)).await
    }

    /// Typed convenience wrapper around [`invoke`](Self::invoke).
    ///
    /// `params` is serialized and normalized to the positional form: a
    /// tuple or `Vec` serializes to the array sent on the wire, a
    /// struct's field values are taken in declaration order with the
    /// field names discarded, and `()` sends an empty array. Scalars
    /// are rejected with [`Error::InvalidParams`].
    ///
    /// In notification mode the reply value is null, so `R` should be
    /// `()` there.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use http_rpc::{RpcClient, RpcConfig};
    /// # async fn example() -> http_rpc::Result<()> {
    /// let config = RpcConfig::new("http://localhost:8742/rpc");
    /// let mut client = RpcClient::connect(&config).await?;
    ///
    /// let sum: i64 = client.call("add", (2, 3)).await?;
    /// assert_eq!(sum, 5);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn call<P, R>(&mut self, method: &str, params: P) -> Result<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        // ---
        let params = match serde_json::to_value(params)? {
            Value::Null => Value::Array(Vec::new()),
            other => other,
        };
        let result = self.roundtrip(method, params).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Build the envelope, send it, correlate the reply.
    async fn roundtrip(&mut self, method: &str, params: Value) -> Result<Value> {
        // ---
        // The counter is advanced inside build_request, before the
        // envelope reaches the transport.
        let envelope = build_request(&mut self.next_id, self.notification, method, params)?;
        let expected_id = envelope.id;

        let body = serde_json::to_vec(&envelope)?;
        let reply = self.transport.post(&self.endpoint, Bytes::from(body)).await?;

        correlate(&reply.body, expected_id).map_err(|err| self.locate(err))
    }

    /// Attach this session's endpoint to remote exceptions so the
    /// caller's diagnostics name the failing server.
    fn locate(&self, err: Error) -> Error {
        // ---
        match err {
            Error::RemoteException(mut exception) => {
                exception.endpoint = Some(self.endpoint.clone());
                Error::RemoteException(exception)
            }
            other => other,
        }
    }
}

fn validate_endpoint(endpoint: &str) -> Result<String> {
    // ---
    let parsed =
        Url::parse(endpoint).map_err(|_| Error::InvalidEndpoint(endpoint.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => Ok(endpoint.to_string()),
        _ => Err(Error::InvalidEndpoint(endpoint.to_string())),
    }
}

#[cfg(test)]
mod tests {
    // ---
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;
    use crate::domain::HttpReply;
    use crate::protocol::RequestEnvelope;
    use crate::Transport;

    /// Transport double: records posted bodies, replies from a queue.
    struct CannedTransport {
        posted: Mutex<Vec<(String, Bytes)>>,
        replies: Mutex<Vec<HttpReply>>,
    }

    impl CannedTransport {
        fn new(replies: Vec<HttpReply>) -> Arc<Self> {
            Arc::new(Self {
                posted: Mutex::new(Vec::new()),
                replies: Mutex::new(replies),
            })
        }

        fn reply_with(body: Value) -> HttpReply {
            HttpReply {
                status: 200,
                headers: HashMap::new(),
                body: Bytes::from(serde_json::to_vec(&body).unwrap()),
            }
        }

        fn posted_envelopes(&self) -> Vec<RequestEnvelope> {
            self.posted
                .lock()
                .unwrap()
                .iter()
                .map(|(_, body)| serde_json::from_slice(body).unwrap())
                .collect()
        }
    }

    #[async_trait::async_trait]
    impl Transport for CannedTransport {
        async fn post(&self, endpoint: &str, body: Bytes) -> Result<HttpReply> {
            self.posted
                .lock()
                .unwrap()
                .push((endpoint.to_string(), body));
            Ok(self.replies.lock().unwrap().remove(0))
        }

        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    fn config() -> RpcConfig {
        RpcConfig::new("http://localhost:8742/rpc")
    }

    #[test]
    fn rejects_non_http_endpoints() {
        // ---
        let transport = CannedTransport::new(vec![]);

        for bad in ["not a url", "ftp://host/x", "localhost:8742"] {
            let err = RpcClient::with_transport(transport.clone(), &RpcConfig::new(bad))
                .unwrap_err();
            assert!(matches!(err, Error::InvalidEndpoint(_)), "accepted {bad:?}");
        }
    }

    #[tokio::test]
    async fn invoke_assigns_sequential_ids_and_correlates() {
        // ---
        let transport = CannedTransport::new(vec![
            CannedTransport::reply_with(json!({"id": 1, "result": 5, "error": null})),
            CannedTransport::reply_with(json!({"id": 2, "result": 7, "error": null})),
        ]);

        let mut client = RpcClient::with_transport(transport.clone(), &config()).unwrap();

        assert_eq!(
            client.invoke("add", vec![json!(2), json!(3)]).await.unwrap(),
            json!(5)
        );
        assert_eq!(
            client.invoke("add", vec![json!(3), json!(4)]).await.unwrap(),
            json!(7)
        );

        let sent = transport.posted_envelopes();
        assert_eq!(sent[0].id, Some(1));
        assert_eq!(sent[0].params, vec![json!(2), json!(3)]);
        assert_eq!(sent[1].id, Some(2));
    }

    #[tokio::test]
    async fn notification_session_sends_null_ids_and_skips_replies() {
        // The canned reply is garbage; a notification must not read it.
        let garbage = HttpReply {
            status: 200,
            headers: HashMap::new(),
            body: Bytes::from_static(b"not json"),
        };
        let transport = CannedTransport::new(vec![garbage.clone(), garbage]);

        let mut client =
            RpcClient::with_transport(transport.clone(), &config().with_notification()).unwrap();

        assert_eq!(client.invoke("ping", vec![]).await.unwrap(), Value::Null);
        assert_eq!(client.invoke("ping", vec![]).await.unwrap(), Value::Null);

        let sent = transport.posted_envelopes();
        assert!(sent.iter().all(RequestEnvelope::is_notification));
    }

    #[tokio::test]
    async fn remote_exception_carries_the_endpoint() {
        // ---
        let transport = CannedTransport::new(vec![CannedTransport::reply_with(json!({
            "id": 1,
            "result": null,
            "error": {"kind": "exception", "message": "boom", "code": 3}
        }))]);

        let mut client = RpcClient::with_transport(transport, &config()).unwrap();
        let err = client.invoke("explode", vec![]).await.unwrap_err();

        let Error::RemoteException(exception) = err else {
            panic!("expected RemoteException, got {err:?}");
        };
        assert_eq!(exception.endpoint.as_deref(), Some("http://localhost:8742/rpc"));
    }

    #[tokio::test]
    async fn typed_call_flattens_struct_params_positionally() {
        // ---
        #[derive(serde::Serialize)]
        struct AddArgs {
            a: i64,
            b: i64,
        }

        let transport = CannedTransport::new(vec![CannedTransport::reply_with(
            json!({"id": 1, "result": 5, "error": null}),
        )]);

        let mut client = RpcClient::with_transport(transport.clone(), &config()).unwrap();
        let sum: i64 = client.call("add", AddArgs { a: 2, b: 3 }).await.unwrap();
        assert_eq!(sum, 5);

        let sent = transport.posted_envelopes();
        assert_eq!(sent[0].params, vec![json!(2), json!(3)]);
    }

    #[tokio::test]
    async fn typed_call_rejects_scalar_params() {
        // ---
        let transport = CannedTransport::new(vec![]);
        let mut client = RpcClient::with_transport(transport, &config()).unwrap();

        let err = client.call::<_, Value>("add", 5).await.unwrap_err();
        assert!(matches!(err, Error::InvalidParams));
    }
}
