//! Public, transport-agnostic RPC configuration.
//!
//! This type intentionally contains no transport-specific concepts
//! (e.g. connection pools or socket options). Transport layers are
//! responsible for interpreting this config into concrete connection
//! settings.

/// Client session configuration.
///
/// The notification flag is fixed here, at construction time: a session
/// is either a calling session (monotonic ids, correlated replies) or a
/// notification session (null ids, no replies) for its whole lifetime.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Target endpoint URL (e.g. `"http://localhost:8742/rpc"`).
    pub endpoint: String,

    /// Notification mode. When set, every request is sent with a null
    /// id, no reply is awaited, and the session's id counter is never
    /// advanced.
    pub notification: bool,
}

impl RpcConfig {
    /// Create a config for an ordinary calling session.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            notification: false,
        }
    }

    /// Switch the session into notification mode.
    ///
    /// # Example
    ///
    /// ```
    /// use http_rpc::RpcConfig;
    ///
    /// let config = RpcConfig::new("http://localhost:8742/rpc").with_notification();
    /// assert!(config.notification);
    /// ```
    pub fn with_notification(mut self) -> Self {
        self.notification = true;
        self
    }
}
