//! Unified error types for Drover

use thiserror::Error;

/// Unified Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for Drover
///
/// The wait loop distinguishes three classes: *soft* errors
/// ([`Error::AttributeEmpty`], [`Error::AttributeUnchanged`],
/// [`Error::HtmlUnchanged`]) request another poll iteration and are only
/// surfaced as the reason inside a [`Error::Timeout`]; everything else
/// aborts the operation immediately.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CDP protocol / transport errors
    #[error("CDP error: {0}")]
    Cdp(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Selector resolved to zero nodes and no wait was requested
    #[error("Not found: {0}")]
    NotFound(String),

    /// Page not found / already closed
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// Client already closed
    #[error("client closed")]
    ClientClosed,

    /// Wait deadline elapsed; carries the last soft-failure reason
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// No execution target bound to the current context
    #[error("invalid target")]
    InvalidTarget,

    /// Degenerate geometry (empty or odd-length content quad)
    #[error("invalid dimensions")]
    InvalidDimensions,

    /// Navigation failed
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// Script execution failed
    #[error("Script execution failed: {0}")]
    ScriptExecutionFailed(String),

    /// Element attribute is empty (soft, retried by the wait loop)
    #[error("element attribute is empty")]
    AttributeEmpty,

    /// Element attribute has not changed yet (soft, retried by the wait loop)
    #[error("element attribute has not been changed")]
    AttributeUnchanged,

    /// Element outer HTML has not changed yet (soft, retried by the wait loop)
    #[error("element html has not been changed")]
    HtmlUnchanged,

    /// Node is not visible yet (soft, retried by the wait loop)
    #[error("element is not visible")]
    NotVisible,

    /// Node is still visible / still present (soft, retried by the wait loop)
    #[error("element is still present")]
    StillPresent,

    /// Fewer matches than required (soft, retried by the wait loop)
    #[error("not enough matching elements")]
    NotEnoughNodes,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new CDP error
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(sel: S) -> Self {
        Error::NotFound(sel.into())
    }

    /// Create a new page not found error
    pub fn page_not_found<S: Into<String>>(id: S) -> Self {
        Error::PageNotFound(id.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Error::Timeout(msg.into())
    }

    /// Create a new navigation failed error
    pub fn navigation_failed<S: Into<String>>(msg: S) -> Self {
        Error::NavigationFailed(msg.into())
    }

    /// Create a new script execution failed error
    pub fn script_execution_failed<S: Into<String>>(msg: S) -> Self {
        Error::ScriptExecutionFailed(msg.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// Soft errors ask the wait loop for another poll iteration instead of
    /// aborting the operation.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            Error::AttributeEmpty
                | Error::AttributeUnchanged
                | Error::HtmlUnchanged
                | Error::NotVisible
                | Error::StillPresent
                | Error::NotEnoughNodes
                | Error::NotFound(_)
        )
    }
}
