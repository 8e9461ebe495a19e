//! In-memory transport implementation.
//!
//! This module provides a pure in-process implementation of the
//! domain-level `Transport` trait. It is intended primarily for
//! testing, local execution, and as a reference for transport
//! semantics.
//!
//! ## Reference Semantics
//!
//! The in-memory transport defines the **reference behavior** for the
//! transport layer. Other transport implementations are expected to
//! approximate this behavior as closely as their underlying systems
//! allow:
//!
//! - Once a server is bound to an endpoint, posts to that endpoint are
//!   routed to its serving edge, deterministically and in-process.
//! - A post to an endpoint with no bound server fails with a
//!   connection error, exactly as an unreachable host would.
//! - The reply carries the same status, headers and body the HTTP edge
//!   would put on the wire, including `Content-SHA1`.
//!
//! ## Non-Goals
//!
//! This transport does not attempt to emulate network failure modes,
//! latency, or interleaving. It exists to provide a deterministic
//! baseline against which higher-level behavior can be validated.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use bytes::Bytes;
use tokio::sync::RwLock;

use crate::domain::{HttpReply, Transport, TransportPtr};
use crate::server::{InboundRequest, RpcServer};
use crate::{log_debug, Error, Result};

/// Shared routing table for the in-memory transport.
///
/// Simulates the HTTP fabric within a single process: servers bind to
/// endpoint strings, and any `MemoryTransport` sharing the hub can post
/// to them, exactly as clients reaching a real host would.
///
/// For integration tests that need isolation between parallel test
/// cases, construct a hub explicitly and pass it to
/// [`create_memory_transport_with_hub`]:
///
/// ```
/// # use std::sync::Arc;
/// # use http_rpc::{MemoryHub, RpcServer};
/// # async fn example() {
/// let hub = MemoryHub::new();
///
/// let mut server = RpcServer::new();
/// server.register("add", |(a, b): (i64, i64)| async move { Ok(a + b) });
/// hub.bind("http://math.test/rpc", Arc::new(server)).await;
///
/// let transport = http_rpc::create_memory_transport_with_hub(hub.clone());
/// # }
/// ```
pub struct MemoryHub {
    // ---
    servers: RwLock<HashMap<String, Arc<RpcServer>>>,
}

impl MemoryHub {
    /// Create a new, empty hub.
    pub fn new() -> Arc<Self> {
        // ---
        Arc::new(Self {
            servers: RwLock::new(HashMap::new()),
        })
    }

    /// Bind a server to an endpoint on this hub.
    ///
    /// Binding the same endpoint twice replaces the earlier server.
    pub async fn bind(&self, endpoint: impl Into<String>, server: Arc<RpcServer>) {
        // ---
        let endpoint = endpoint.into();
        log_debug!("memory hub: bind {endpoint}");

        let mut servers = self.servers.write().await;
        servers.insert(endpoint, server);
    }

    async fn post(&self, endpoint: &str, body: Bytes) -> Result<HttpReply> {
        // ---
        let servers = self.servers.read().await;

        let server = servers
            .get(endpoint)
            .ok_or_else(|| Error::Connection(format!("no server bound at {endpoint}")))?;

        Ok(server.serve_http(InboundRequest::post_json(body)).await)
    }

    async fn close(&self) {
        // ---
        log_debug!("memory hub: closing...");

        let mut servers = self.servers.write().await;
        servers.clear();
    }
}

impl Default for MemoryHub {
    fn default() -> Self {
        // ---
        Self {
            servers: RwLock::new(HashMap::new()),
        }
    }
}

/// Process-global hub used by [`create_memory_transport`] and
/// [`bind_memory_server`].
static GLOBAL_HUB: OnceLock<Arc<MemoryHub>> = OnceLock::new();

fn global_hub() -> Arc<MemoryHub> {
    GLOBAL_HUB.get_or_init(MemoryHub::new).clone()
}

/// Bind a server to an endpoint on the process-global hub.
pub async fn bind_memory_server(endpoint: impl Into<String>, server: Arc<RpcServer>) {
    // ---
    global_hub().bind(endpoint, server).await
}

/// In-memory transport.
///
/// Routes posts through a shared [`MemoryHub`], simulating the HTTP
/// fabric within the process.
struct MemoryTransport {
    // ---
    hub: Arc<MemoryHub>,
}

#[async_trait::async_trait]
impl Transport for MemoryTransport {
    // ---
    /// Route a post to the server bound at `endpoint` on the shared
    /// hub. Endpoint matching is exact string equality; this defines
    /// the reference matching semantics for the transport layer.
    async fn post(&self, endpoint: &str, body: Bytes) -> Result<HttpReply> {
        self.hub.post(endpoint, body).await
    }

    /// Close the transport.
    ///
    /// Clears all bindings from the shared hub. Note that if other
    /// transports share the same hub, their servers are also unbound.
    /// Use per-test hubs via [`create_memory_transport_with_hub`] to
    /// avoid this.
    async fn close(&self) -> Result<()> {
        self.hub.close().await;
        Ok(())
    }
}

/// Create a new in-memory transport using the process-global hub.
///
/// All transports created with this function share a single routing
/// table, matching the semantics of clients reaching real hosts.
/// Suitable for local execution and simple single-test scenarios.
///
/// For isolated parallel testing, use
/// [`create_memory_transport_with_hub`].
pub fn create_memory_transport() -> TransportPtr {
    // ---
    create_memory_transport_with_hub(global_hub())
}

/// Create a new in-memory transport using the provided hub.
///
/// Allows multiple transports to share an explicitly constructed
/// [`MemoryHub`], providing isolation between test cases running in
/// parallel.
pub fn create_memory_transport_with_hub(hub: Arc<MemoryHub>) -> TransportPtr {
    // ---
    Arc::new(MemoryTransport { hub })
}
