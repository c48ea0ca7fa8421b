//! Mock CDP transport for tests
//!
//! Records every command, answers from per-method responders (or canned
//! defaults), and lets tests push events into every subscribed listener.

use super::traits::{CdpEvent, CdpTransport};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;

type Responder = Box<dyn Fn(u64, &Value) -> crate::Result<Value> + Send + Sync>;

/// In-memory transport with scriptable responses
pub struct MockTransport {
    responders: Mutex<HashMap<String, Responder>>,
    calls: Mutex<Vec<(String, Value)>>,
    listeners: Mutex<Vec<mpsc::Sender<CdpEvent>>>,
    active: AtomicBool,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("active", &self.active.load(Ordering::SeqCst))
            .finish()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            responders: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            listeners: Mutex::new(Vec::new()),
            active: AtomicBool::new(true),
        }
    }

    /// Script a responder for one method. The closure receives the
    /// zero-based call index for that method and the request params.
    pub fn respond_to<F>(&self, method: &str, responder: F)
    where
        F: Fn(u64, &Value) -> crate::Result<Value> + Send + Sync + 'static,
    {
        self.responders
            .lock()
            .unwrap()
            .insert(method.to_string(), Box::new(responder));
    }

    /// Script a fixed response for one method
    pub fn respond_with(&self, method: &str, value: Value) {
        self.respond_to(method, move |_, _| Ok(value.clone()));
    }

    /// Parameters of every recorded call to `method`, in order
    pub fn calls_of(&self, method: &str) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// Number of recorded calls to `method`
    pub fn call_count(&self, method: &str) -> u64 {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .count() as u64
    }

    /// Push an event to every subscriber
    pub async fn emit(&self, event: CdpEvent) {
        let senders: Vec<_> = self.listeners.lock().unwrap().clone();
        for sender in senders {
            let _ = sender.send(event.clone()).await;
        }
    }

    fn default_response(method: &str, params: &Value) -> Value {
        match method {
            "DOM.getDocument" => json!({"root": {"nodeId": 1}}),
            "DOM.querySelector" => json!({"nodeId": 0}),
            "DOM.querySelectorAll" => json!({"nodeIds": []}),
            "DOM.performSearch" => json!({"searchId": "search-1", "resultCount": 0}),
            "DOM.getSearchResults" => json!({"nodeIds": []}),
            "DOM.describeNode" => json!({"node": {
                "nodeId": params["nodeId"].as_i64().unwrap_or(1),
                "backendNodeId": 100,
                "nodeName": "DIV",
                "attributes": []
            }}),
            "DOM.resolveNode" => json!({"object": {
                "type": "object",
                "objectId": format!("obj-{}", params["nodeId"].as_i64().unwrap_or(0))
            }}),
            "DOM.requestNode" => json!({"nodeId": 1}),
            "DOM.getBoxModel" => json!({"model": {
                "content": [0.0, 0.0, 100.0, 0.0, 100.0, 30.0, 0.0, 30.0],
                "width": 100.0,
                "height": 30.0
            }}),
            "DOM.getContentQuads" => {
                json!({"quads": [[0.0, 0.0, 100.0, 0.0, 100.0, 30.0, 0.0, 30.0]]})
            }
            "DOM.getOuterHTML" => json!({"outerHTML": "<div></div>"}),
            "Runtime.evaluate" | "Runtime.callFunctionOn" => {
                json!({"result": {"type": "undefined"}})
            }
            "Page.navigate" => json!({"frameId": "frame-1", "loaderId": "loader-1"}),
            "Page.captureScreenshot" => json!({"data": "/9j/4AA="}),
            "Network.getAllCookies" => json!({"cookies": []}),
            "Target.createTarget" => json!({"targetId": "target-1"}),
            "Target.attachToTarget" => json!({"sessionId": "session-1"}),
            _ => json!({}),
        }
    }
}

#[async_trait]
impl CdpTransport for MockTransport {
    async fn send_command(
        &self,
        _session_id: Option<&str>,
        method: &str,
        params: Value,
    ) -> crate::Result<Value> {
        if !self.active.load(Ordering::SeqCst) {
            return Err(crate::Error::ClientClosed);
        }
        let index = {
            let mut calls = self.calls.lock().unwrap();
            let index = calls.iter().filter(|(m, _)| m == method).count() as u64;
            calls.push((method.to_string(), params.clone()));
            index
        };
        let responders = self.responders.lock().unwrap();
        match responders.get(method) {
            Some(responder) => responder(index, &params),
            None => Ok(Self::default_response(method, &params)),
        }
    }

    async fn listen_events(&self) -> crate::Result<mpsc::Receiver<CdpEvent>> {
        let (tx, rx) = mpsc::channel(64);
        self.listeners.lock().unwrap().push(tx);
        Ok(rx)
    }

    async fn close(&self) -> crate::Result<()> {
        self.active.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}
