//! RPC semantics over HTTP with JSON envelopes and automatic
//! request/response correlation
//!
//! This library provides a simple, ergonomic API for a minimal RPC
//! convention over HTTP. It handles identifier assignment and
//! verification, notification (fire-and-forget) calls, method dispatch
//! against a registry of handlers, and a shared error taxonomy that
//! keeps transport failures, protocol malformations and remote
//! application errors distinguishable.
//!
//! # Wire format
//!
//! Requests and responses travel as JSON envelopes over HTTP POST:
//!
//! ```text
//! request:  {"id": 1, "method": "add", "params": [2, 3]}
//! response: {"id": 1, "result": 5, "error": null}
//! ```
//!
//! A request with a null id is a notification: the server processes it
//! but emits no reply, and the client does not wait for one. Correlated
//! replies carry a `Content-SHA1` header with the digest of the exact
//! response body.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use http_rpc::{
//!     bind_memory_server, create_memory_transport, RpcClient, RpcConfig, RpcServer,
//! };
//!
//! # async fn example() -> http_rpc::Result<()> {
//! let mut server = RpcServer::new();
//! server.register("add", |(a, b): (i64, i64)| async move { Ok(a + b) });
//! bind_memory_server("http://math.test/rpc", Arc::new(server)).await;
//!
//! let config = RpcConfig::new("http://math.test/rpc");
//! let mut client = RpcClient::with_transport(create_memory_transport(), &config)?;
//!
//! let sum: i64 = client.call("add", (2, 3)).await?;
//! assert_eq!(sum, 5);
//! # Ok(())
//! # }
//! ```

// Import all sub modules once...
mod client;
mod domain;
mod protocol;
mod server;
mod transport;

mod rpc_config;

mod error;
mod macros;

#[allow(unused_imports)]
pub(crate) use macros::{log_debug, log_error, log_info, log_warn};

// Re-export main types
pub use client::RpcClient;
pub use server::{Dispatched, EmittedResponse, Exception, InboundRequest, RpcServer};

pub use rpc_config::RpcConfig;

pub use error::{Error, RemoteException, Result};

pub use server::fatal_response;

pub use transport::{
    //
    bind_memory_server,
    create_memory_transport,
    create_memory_transport_with_hub,
    MemoryHub,
};

#[cfg(feature = "transport_hyper")]
pub use transport::{create_hyper_transport, serve};

// --- public re-exports
pub use domain::{
    //
    HttpReply,
    Transport,
    TransportPtr,
    CONTENT_SHA1_HEADER,
    CONTENT_TYPE_HEADER,
    CONTENT_TYPE_JSON,
};

pub use protocol::{
    //
    ErrorKind,
    ErrorObject,
    ErrorPayload,
    RequestEnvelope,
    ResponseEnvelope,
    SourceLocation,
};

/// Create the crate-default transport for a client session.
///
/// Feature-driven: the hyper HTTP transport when `transport_hyper` is
/// enabled, the in-memory transport (process-global hub) otherwise.
pub async fn create_transport(config: &RpcConfig) -> Result<TransportPtr> {
    // ---
    #[cfg(feature = "transport_hyper")]
    {
        return transport::create_hyper_transport(config).await;
    }

    // Fallback / default
    #[cfg(not(feature = "transport_hyper"))]
    {
        let _ = config;
        Ok(create_memory_transport())
    }
}
