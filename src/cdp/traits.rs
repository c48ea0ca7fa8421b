//! CDP transport trait
//!
//! The wire transport (WebSocket connection, message framing, command id
//! bookkeeping) is an external collaborator. The engine only requires that
//! it deliver typed command responses and a stream of out-of-band events.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

/// CDP event representation
#[derive(Debug, Clone)]
pub struct CdpEvent {
    /// Event method (e.g., "Page.frameNavigated")
    pub method: String,
    /// Event parameters
    pub params: Value,
    /// Session ID (for multi-session targets)
    pub session_id: Option<String>,
}

impl CdpEvent {
    /// Build an event with no session scoping
    pub fn new<S: Into<String>>(method: S, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
            session_id: None,
        }
    }
}

/// CDP transport trait
///
/// Represents a multiplexed connection to a browser instance. Commands may
/// be scoped to an attached target session via `session_id`; `None` sends
/// at browser scope.
#[async_trait]
pub trait CdpTransport: Send + Sync + std::fmt::Debug {
    /// Send a CDP command and wait for its result payload
    async fn send_command(
        &self,
        session_id: Option<&str>,
        method: &str,
        params: Value,
    ) -> crate::Result<Value>;

    /// Subscribe to the out-of-band event stream
    async fn listen_events(&self) -> crate::Result<mpsc::Receiver<CdpEvent>>;

    /// Close the connection
    async fn close(&self) -> crate::Result<()>;

    /// Check if the connection is active
    fn is_active(&self) -> bool;
}
