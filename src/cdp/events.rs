//! Typed page/browser events
//!
//! Parses the raw event stream into the handful of events the session layer
//! reacts to. Anything else is ignored.

use super::traits::CdpEvent;

/// Download lifecycle state from Browser.downloadProgress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadState {
    InProgress,
    Completed,
    Canceled,
}

/// Events the session layer handles
#[derive(Debug, Clone)]
pub enum PageEvent {
    /// The page's main frame committed a navigation
    FrameNavigated { url: String },
    /// A sub-session (popup/frame) attached to the browser
    AttachedToTarget { session_id: String },
    /// A sub-session detached
    DetachedFromTarget { session_id: String },
    /// A new target appeared (e.g. a click opened a tab)
    TargetCreated { target_id: String, url: String },
    /// An uncaught exception in page script
    ExceptionThrown { description: String },
    /// A JavaScript dialog is blocking the page
    JavascriptDialogOpening { message: String },
    /// Download progress report
    DownloadProgress {
        guid: String,
        state: DownloadState,
        received: f64,
        total: f64,
    },
}

impl PageEvent {
    /// Parse a raw event; returns `None` for methods the engine ignores.
    pub fn parse(event: &CdpEvent) -> Option<PageEvent> {
        let p = &event.params;
        match event.method.as_str() {
            "Page.frameNavigated" => Some(PageEvent::FrameNavigated {
                url: p["frame"]["url"].as_str().unwrap_or_default().to_string(),
            }),
            "Target.attachedToTarget" => Some(PageEvent::AttachedToTarget {
                session_id: p["sessionId"].as_str()?.to_string(),
            }),
            "Target.detachedFromTarget" => Some(PageEvent::DetachedFromTarget {
                session_id: p["sessionId"].as_str()?.to_string(),
            }),
            "Target.targetCreated" => Some(PageEvent::TargetCreated {
                target_id: p["targetInfo"]["targetId"].as_str()?.to_string(),
                url: p["targetInfo"]["url"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string(),
            }),
            "Runtime.exceptionThrown" => {
                let details: super::types::ExceptionDetails =
                    serde_json::from_value(p["exceptionDetails"].clone()).ok()?;
                Some(PageEvent::ExceptionThrown {
                    description: details.description(),
                })
            }
            "Page.javascriptDialogOpening" => Some(PageEvent::JavascriptDialogOpening {
                message: p["message"].as_str().unwrap_or_default().to_string(),
            }),
            "Browser.downloadProgress" => {
                let state = match p["state"].as_str()? {
                    "completed" => DownloadState::Completed,
                    "canceled" => DownloadState::Canceled,
                    _ => DownloadState::InProgress,
                };
                Some(PageEvent::DownloadProgress {
                    guid: p["guid"].as_str().unwrap_or_default().to_string(),
                    state,
                    received: p["receivedBytes"].as_f64().unwrap_or(0.0),
                    total: p["totalBytes"].as_f64().unwrap_or(0.0),
                })
            }
            _ => None,
        }
    }
}
