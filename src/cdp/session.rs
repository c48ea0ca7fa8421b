//! Typed command surface over a CDP transport
//!
//! `CdpSession` scopes commands to one attached target and provides one
//! typed method per protocol call the engine uses. Transport failures come
//! back wrapped with the failing method name.

use super::traits::CdpTransport;
use super::types::*;
use crate::{Error, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// A command channel bound to one browsing-context session
#[derive(Debug, Clone)]
pub struct CdpSession {
    transport: Arc<dyn CdpTransport>,
    session_id: Option<String>,
}

impl CdpSession {
    /// Session at browser scope (no attached target)
    pub fn new(transport: Arc<dyn CdpTransport>) -> Self {
        Self {
            transport,
            session_id: None,
        }
    }

    /// Session scoped to an attached target
    pub fn with_session(transport: Arc<dyn CdpTransport>, session_id: String) -> Self {
        Self {
            transport,
            session_id: Some(session_id),
        }
    }

    /// The underlying transport
    pub fn transport(&self) -> Arc<dyn CdpTransport> {
        Arc::clone(&self.transport)
    }

    /// The bound session id, if any
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Send a raw command on this session
    pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
        debug!(method, "cdp call");
        self.transport
            .send_command(self.session_id.as_deref(), method, params)
            .await
            .map_err(|e| Error::cdp(format!("{}: {}", method, e)))
    }

    // ---- Page ----

    pub async fn navigate(&self, url: &str) -> Result<NavigateResult> {
        let params = serde_json::to_value(NavigateParams {
            url: url.to_string(),
        })?;
        let result = self.call("Page.navigate", params).await?;
        let nav: NavigateResult = serde_json::from_value(result)?;
        if let Some(text) = &nav.error_text {
            return Err(Error::navigation_failed(format!("{}: {}", url, text)));
        }
        Ok(nav)
    }

    /// Full-viewport screenshot, decoded from base64
    pub async fn capture_screenshot(&self, quality: u8, clip: Option<Viewport>) -> Result<Vec<u8>> {
        let mut params = json!({ "format": "jpeg", "quality": quality });
        if let Some(clip) = clip {
            params["clip"] = serde_json::to_value(clip)?;
        }
        let result = self.call("Page.captureScreenshot", params).await?;
        let data = result
            .get("data")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::cdp("no data in screenshot result"))?;
        BASE64
            .decode(data)
            .map_err(|e| Error::cdp(format!("failed to decode screenshot: {}", e)))
    }

    pub async fn handle_javascript_dialog(&self, accept: bool) -> Result<()> {
        self.call("Page.handleJavaScriptDialog", json!({ "accept": accept }))
            .await?;
        Ok(())
    }

    // ---- Runtime ----

    /// Evaluate an expression; a thrown exception is a script failure
    pub async fn evaluate(&self, expression: &str) -> Result<RemoteObject> {
        let params = serde_json::to_value(EvaluateParams {
            expression: expression.to_string(),
            return_by_value: Some(true),
            await_promise: Some(false),
        })?;
        let result = self.call("Runtime.evaluate", params).await?;
        let response: EvaluateResponse = serde_json::from_value(result)?;
        if let Some(details) = response.exception_details {
            return Err(Error::script_execution_failed(details.description()));
        }
        Ok(response.result)
    }

    /// Evaluate an expression keeping the result as a remote reference
    pub async fn evaluate_handle(&self, expression: &str) -> Result<RemoteObject> {
        let params = serde_json::to_value(EvaluateParams {
            expression: expression.to_string(),
            return_by_value: Some(false),
            await_promise: Some(false),
        })?;
        let result = self.call("Runtime.evaluate", params).await?;
        let response: EvaluateResponse = serde_json::from_value(result)?;
        if let Some(details) = response.exception_details {
            return Err(Error::script_execution_failed(details.description()));
        }
        Ok(response.result)
    }

    /// Call a function with `this` bound to the given node
    ///
    /// Resolves the node to a remote object first, then dispatches
    /// Runtime.callFunctionOn with by-value return.
    pub async fn call_function_on_node(
        &self,
        node_id: NodeId,
        declaration: &str,
        arguments: Vec<Value>,
    ) -> Result<Value> {
        let object_id = self.resolve_node(node_id).await?;
        let params = serde_json::to_value(CallFunctionOnParams {
            function_declaration: declaration.to_string(),
            object_id,
            arguments: arguments
                .into_iter()
                .map(|value| CallArgument { value })
                .collect(),
            return_by_value: true,
        })?;
        let result = self.call("Runtime.callFunctionOn", params).await?;
        let response: EvaluateResponse = serde_json::from_value(result)?;
        if let Some(details) = response.exception_details {
            return Err(Error::script_execution_failed(details.description()));
        }
        Ok(response.result.value.unwrap_or(Value::Null))
    }

    // ---- DOM ----

    /// Root node id of the current document
    pub async fn get_document(&self) -> Result<NodeId> {
        let result = self.call("DOM.getDocument", json!({})).await?;
        result["root"]["nodeId"]
            .as_i64()
            .ok_or_else(|| Error::cdp("no document root"))
    }

    /// First CSS match under `root`; 0 means no match
    pub async fn query_selector(&self, root: NodeId, selector: &str) -> Result<NodeId> {
        let result = self
            .call(
                "DOM.querySelector",
                json!({ "nodeId": root, "selector": selector }),
            )
            .await?;
        Ok(result["nodeId"].as_i64().unwrap_or(0))
    }

    /// All CSS matches under `root`
    pub async fn query_selector_all(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        let result = self
            .call(
                "DOM.querySelectorAll",
                json!({ "nodeId": root, "selector": selector }),
            )
            .await?;
        Ok(result["nodeIds"]
            .as_array()
            .map(|ids| ids.iter().filter_map(|v| v.as_i64()).collect())
            .unwrap_or_default())
    }

    /// XPath search over the whole document
    pub async fn perform_search(&self, query: &str) -> Result<Vec<NodeId>> {
        let result = self
            .call("DOM.performSearch", json!({ "query": query }))
            .await?;
        let search_id = result["searchId"]
            .as_str()
            .ok_or_else(|| Error::cdp("no searchId"))?
            .to_string();
        let count = result["resultCount"].as_i64().unwrap_or(0);
        if count == 0 {
            let _ = self
                .call(
                    "DOM.discardSearchResults",
                    json!({ "searchId": search_id }),
                )
                .await;
            return Ok(vec![]);
        }
        let results = self
            .call(
                "DOM.getSearchResults",
                json!({ "searchId": search_id, "fromIndex": 0, "toIndex": count }),
            )
            .await?;
        let ids = results["nodeIds"]
            .as_array()
            .map(|ids| ids.iter().filter_map(|v| v.as_i64()).collect())
            .unwrap_or_default();
        let _ = self
            .call(
                "DOM.discardSearchResults",
                json!({ "searchId": search_id }),
            )
            .await;
        Ok(ids)
    }

    pub async fn describe_node(&self, node_id: NodeId) -> Result<NodeDescription> {
        let result = self
            .call("DOM.describeNode", json!({ "nodeId": node_id }))
            .await?;
        Ok(serde_json::from_value(result["node"].clone())?)
    }

    /// Node id → remote object id
    pub async fn resolve_node(&self, node_id: NodeId) -> Result<String> {
        let result = self
            .call("DOM.resolveNode", json!({ "nodeId": node_id }))
            .await?;
        result["object"]["objectId"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or(Error::InvalidTarget)
    }

    /// Remote object id → node id
    pub async fn request_node(&self, object_id: &str) -> Result<NodeId> {
        let result = self
            .call("DOM.requestNode", json!({ "objectId": object_id }))
            .await?;
        result["nodeId"].as_i64().ok_or(Error::InvalidTarget)
    }

    pub async fn get_box_model(&self, node_id: NodeId) -> Result<BoxModel> {
        let result = self
            .call("DOM.getBoxModel", json!({ "nodeId": node_id }))
            .await?;
        Ok(serde_json::from_value(result["model"].clone())?)
    }

    pub async fn get_content_quads(&self, node_id: NodeId) -> Result<Vec<Vec<f64>>> {
        let result = self
            .call("DOM.getContentQuads", json!({ "nodeId": node_id }))
            .await?;
        Ok(serde_json::from_value(result["quads"].clone())?)
    }

    pub async fn get_outer_html(&self, node_id: NodeId) -> Result<String> {
        let result = self
            .call("DOM.getOuterHTML", json!({ "nodeId": node_id }))
            .await?;
        result["outerHTML"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::cdp("no outerHTML in response"))
    }

    pub async fn scroll_into_view(&self, node_id: NodeId) -> Result<()> {
        self.call("DOM.scrollIntoViewIfNeeded", json!({ "nodeId": node_id }))
            .await?;
        Ok(())
    }

    pub async fn focus(&self, node_id: NodeId) -> Result<()> {
        self.call("DOM.focus", json!({ "nodeId": node_id })).await?;
        Ok(())
    }

    pub async fn set_file_input_files(&self, node_id: NodeId, files: &[String]) -> Result<()> {
        self.call(
            "DOM.setFileInputFiles",
            json!({ "nodeId": node_id, "files": files }),
        )
        .await?;
        Ok(())
    }

    // ---- CSS ----

    pub async fn get_computed_style(&self, node_id: NodeId) -> Result<Vec<ComputedStyleProperty>> {
        let result = self
            .call("CSS.getComputedStyleForNode", json!({ "nodeId": node_id }))
            .await?;
        Ok(serde_json::from_value(result["computedStyle"].clone())?)
    }

    // ---- Input ----

    pub async fn dispatch_mouse_event(&self, params: &MouseEventParams) -> Result<()> {
        self.call("Input.dispatchMouseEvent", serde_json::to_value(params)?)
            .await?;
        Ok(())
    }

    /// Dispatch a single typed character
    pub async fn dispatch_char(&self, ch: char) -> Result<()> {
        self.call(
            "Input.dispatchKeyEvent",
            json!({ "type": "char", "text": ch.to_string() }),
        )
        .await?;
        Ok(())
    }

    // ---- Network ----

    pub async fn set_cookie(&self, params: &SetCookieParams) -> Result<()> {
        self.call("Network.setCookie", serde_json::to_value(params)?)
            .await?;
        Ok(())
    }

    pub async fn get_all_cookies(&self) -> Result<Vec<Cookie>> {
        let result = self.call("Network.getAllCookies", json!({})).await?;
        Ok(serde_json::from_value(result["cookies"].clone())?)
    }

    // ---- Browser / Target ----

    /// Route downloads to `path` and enable progress events
    pub async fn set_download_behavior(&self, path: &str) -> Result<()> {
        self.call(
            "Browser.setDownloadBehavior",
            json!({ "behavior": "allowAndName", "downloadPath": path, "eventsEnabled": true }),
        )
        .await?;
        Ok(())
    }

    /// Allocate a new browsing context, returning its target id
    pub async fn create_target(&self, url: &str) -> Result<String> {
        let result = self.call("Target.createTarget", json!({ "url": url })).await?;
        result["targetId"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::cdp("no targetId in response"))
    }

    /// Attach to a target, returning the new session id
    pub async fn attach_to_target(&self, target_id: &str) -> Result<String> {
        let result = self
            .call(
                "Target.attachToTarget",
                json!({ "targetId": target_id, "flatten": true }),
            )
            .await?;
        result["sessionId"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::cdp("no sessionId in response"))
    }
}
