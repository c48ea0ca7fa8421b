//! Drover: browser automation and wait/query engine over the Chrome
//! DevTools Protocol.
//!
//! The crate drives headless/visible browser sessions on behalf of a
//! scripted caller: session and target lifecycle, a locked DOM node model,
//! a selector-driven query-and-wait state machine, action primitives
//! (click, type, drag, scroll, screenshot) and a synthetic mouse-trajectory
//! planner for human-like slider manipulation. The CDP wire transport is an
//! injected collaborator behind [`cdp::CdpTransport`].

pub mod error;
pub mod config;
pub mod sink;

pub mod cdp;
pub mod dom;
pub mod query;
pub mod actions;
pub mod session;

// Re-exports
pub use error::{Error, Result};

/// Drover library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
