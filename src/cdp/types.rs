//! CDP protocol data types
//!
//! Serde mappings for the slice of the protocol the engine drives:
//! DOM queries and geometry, Runtime evaluation, Input dispatch, Page
//! capture, Network cookies, Browser downloads and Target attachment.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol node identifier
pub type NodeId = i64;

/// Parameters for Page.navigate
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateParams {
    pub url: String,
}

/// Result of Page.navigate
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateResult {
    pub frame_id: Option<String>,
    pub loader_id: Option<String>,
    /// Set when navigation was blocked or failed at the network layer
    pub error_text: Option<String>,
}

/// Parameters for Runtime.evaluate
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateParams {
    pub expression: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_by_value: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub await_promise: Option<bool>,
}

/// A remote JavaScript object reference or value
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
    pub r#type: String,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub object_id: Option<String>,
}

/// Exception details reported by the Runtime domain
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetails {
    pub text: String,
    #[serde(default)]
    pub line_number: Option<i64>,
    #[serde(default)]
    pub exception: Option<RemoteObject>,
}

impl ExceptionDetails {
    /// Human-readable description, preferring the thrown value's own text
    pub fn description(&self) -> String {
        self.exception
            .as_ref()
            .and_then(|e| e.description.clone())
            .unwrap_or_else(|| self.text.clone())
    }
}

/// Response envelope shared by Runtime.evaluate and Runtime.callFunctionOn
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResponse {
    pub result: RemoteObject,
    #[serde(default)]
    pub exception_details: Option<ExceptionDetails>,
}

/// An argument passed to Runtime.callFunctionOn
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallArgument {
    pub value: Value,
}

/// Parameters for Runtime.callFunctionOn
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFunctionOnParams {
    pub function_declaration: String,
    pub object_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<CallArgument>,
    pub return_by_value: bool,
}

/// Node description returned by DOM.describeNode
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescription {
    pub node_id: NodeId,
    #[serde(default)]
    pub backend_node_id: NodeId,
    pub node_name: String,
    /// Flat name/value attribute list, as the protocol delivers it
    #[serde(default)]
    pub attributes: Option<Vec<String>>,
}

/// Box model returned by DOM.getBoxModel
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxModel {
    pub content: Vec<f64>,
    pub width: f64,
    pub height: f64,
}

/// One computed style property from CSS.getComputedStyleForNode
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedStyleProperty {
    pub name: String,
    pub value: String,
}

/// Mouse event kinds accepted by Input.dispatchMouseEvent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MouseEventType {
    #[serde(rename = "mousePressed")]
    Pressed,
    #[serde(rename = "mouseMoved")]
    Moved,
    #[serde(rename = "mouseReleased")]
    Released,
}

/// Parameters for Input.dispatchMouseEvent
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MouseEventParams {
    pub r#type: MouseEventType,
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_count: Option<i64>,
}

impl MouseEventParams {
    /// Left-button event at the given point
    pub fn left(r#type: MouseEventType, x: f64, y: f64) -> Self {
        Self {
            r#type,
            x,
            y,
            button: Some("left".to_string()),
            click_count: Some(1),
        }
    }
}

/// Parameters for Network.setCookie
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCookieParams {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,
    pub http_only: bool,
}

/// A cookie returned by Network.getAllCookies
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    #[serde(default)]
    pub expires: f64,
}

/// Viewport clip for Page.captureScreenshot
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_event_serialization() {
        let params = MouseEventParams::left(MouseEventType::Pressed, 10.5, 20.0);
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["type"], "mousePressed");
        assert_eq!(value["button"], "left");
        assert_eq!(value["clickCount"], 1);
    }

    #[test]
    fn test_node_description_parsing() {
        let desc: NodeDescription = serde_json::from_value(serde_json::json!({
            "nodeId": 7,
            "backendNodeId": 12,
            "nodeName": "DIV",
            "attributes": ["id", "slider", "class", "JDJRV-slide-btn"]
        }))
        .unwrap();
        assert_eq!(desc.node_id, 7);
        assert_eq!(desc.node_name, "DIV");
        assert_eq!(desc.attributes.unwrap().len(), 4);
    }

    #[test]
    fn test_exception_description_prefers_exception_object() {
        let details: ExceptionDetails = serde_json::from_value(serde_json::json!({
            "text": "Uncaught",
            "exception": {"type": "object", "description": "ReferenceError: x is not defined"}
        }))
        .unwrap();
        assert_eq!(details.description(), "ReferenceError: x is not defined");
    }
}
