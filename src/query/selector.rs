//! Selector construction and mode detection

use crate::dom::Node;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How a raw query string is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// CSS, first match
    Css,
    /// CSS, all matches
    CssAll,
    /// XPath over the whole document
    XPath,
    /// A raw JavaScript expression evaluating to an element
    JsPath,
}

impl QueryMode {
    /// Mode from a raw query string. A `//` prefix means XPath; everything
    /// else is CSS, single or all per the call site's `all` flag. JsPath is
    /// only ever chosen explicitly.
    pub fn detect(raw: &str, all: bool) -> Self {
        if raw.starts_with("//") {
            QueryMode::XPath
        } else if all {
            QueryMode::CssAll
        } else {
            QueryMode::Css
        }
    }
}

/// A query plus its resolution options
///
/// `created` anchors all deadline arithmetic for this one resolution
/// attempt; the mode is derived once and never re-derived per poll.
#[derive(Debug, Clone)]
pub struct Selector {
    raw: String,
    mode: QueryMode,
    scope: Option<Arc<Node>>,
    timeout: Option<Duration>,
    scroll_into_view: bool,
    must_be_visible: bool,
    created: Instant,
}

impl Selector {
    pub fn new(raw: impl Into<String>, all: bool) -> Self {
        let raw = raw.into();
        let mode = QueryMode::detect(&raw, all);
        Self {
            raw,
            mode,
            scope: None,
            timeout: None,
            scroll_into_view: false,
            must_be_visible: false,
            created: Instant::now(),
        }
    }

    /// A selector resolved as a JavaScript expression
    pub fn js_path(raw: impl Into<String>) -> Self {
        let mut selector = Self::new(raw, false);
        selector.mode = QueryMode::JsPath;
        selector
    }

    /// Wait budget in seconds; zero means no wait (single resolution pass)
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = if secs == 0 {
            None
        } else {
            Some(Duration::from_secs(secs))
        };
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Restrict matches to the subtree under `scope`
    pub fn with_scope(mut self, scope: Arc<Node>) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn scrolled(mut self) -> Self {
        self.scroll_into_view = true;
        self
    }

    pub fn visible(mut self, must_be_visible: bool) -> Self {
        self.must_be_visible = must_be_visible;
        self
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn mode(&self) -> QueryMode {
        self.mode
    }

    pub fn scope(&self) -> Option<&Arc<Node>> {
        self.scope.as_ref()
    }

    pub fn must_be_visible(&self) -> bool {
        self.must_be_visible
    }

    pub fn scroll_into_view(&self) -> bool {
        self.scroll_into_view
    }

    /// Absolute deadline, anchored at creation
    pub fn deadline(&self) -> Option<Instant> {
        self.timeout.map(|t| self.created + t)
    }

    pub fn has_wait(&self) -> bool {
        self.timeout.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_detection() {
        assert_eq!(QueryMode::detect("//div[@id='app']", false), QueryMode::XPath);
        assert_eq!(QueryMode::detect("//div[@id='app']", true), QueryMode::XPath);
        assert_eq!(QueryMode::detect("div.class", false), QueryMode::Css);
        assert_eq!(QueryMode::detect("#id", true), QueryMode::CssAll);
    }

    #[test]
    fn test_zero_timeout_means_no_wait() {
        let selector = Selector::new("#id", false).with_timeout_secs(0);
        assert!(!selector.has_wait());
        assert!(selector.deadline().is_none());
        let selector = Selector::new("#id", false).with_timeout_secs(3);
        assert!(selector.has_wait());
    }

    #[test]
    fn test_js_path_mode_is_explicit() {
        let selector = Selector::js_path("document.querySelector('#app')");
        assert_eq!(selector.mode(), QueryMode::JsPath);
    }
}
