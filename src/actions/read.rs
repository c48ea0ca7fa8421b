//! Read primitives: HTML, text, styles, geometry, screenshots

use crate::cdp::types::Viewport;
use crate::cdp::CdpSession;
use crate::dom::{ClientRect, Node};
use crate::query::scripts;
use crate::query::wait::client_rect;
use crate::Result;
use serde_json::json;
use std::collections::HashMap;

/// Screenshot quality, JPEG
pub const SCREENSHOT_QUALITY: u8 = 80;

pub async fn outer_html(session: &CdpSession, node: &Node) -> Result<String> {
    session.get_outer_html(node.node_id()).await
}

/// Rendered text via the injected reader
pub async fn inner_text(session: &CdpSession, node: &Node) -> Result<String> {
    let value = session
        .call_function_on_node(node.node_id(), scripts::TEXT_JS, vec![])
        .await?;
    Ok(value.as_str().unwrap_or_default().to_string())
}

/// Live `value` property of an input
pub async fn input_value(session: &CdpSession, node: &Node) -> Result<String> {
    attribute_value(session, node, "value").await
}

/// Live DOM property read, falling back to the attribute
pub async fn attribute_value(session: &CdpSession, node: &Node, name: &str) -> Result<String> {
    let value = session
        .call_function_on_node(node.node_id(), scripts::ATTRIBUTE_JS, vec![json!(name)])
        .await?;
    Ok(value.as_str().unwrap_or_default().to_string())
}

/// Computed style values filtered to the requested property names
pub async fn computed_styles(
    session: &CdpSession,
    node: &Node,
    names: &[String],
) -> Result<HashMap<String, String>> {
    let computed = session.get_computed_style(node.node_id()).await?;
    let mut map: HashMap<String, String> = names
        .iter()
        .map(|name| (name.clone(), String::new()))
        .collect();
    for prop in computed {
        if let Some(slot) = map.get_mut(&prop.name) {
            *slot = prop.value;
        }
    }
    Ok(map)
}

/// Bounding rect of the node
pub async fn node_client_rect(session: &CdpSession, node: &Node) -> Result<ClientRect> {
    client_rect(session, node).await
}

/// Full-viewport JPEG capture
pub async fn full_screenshot(session: &CdpSession) -> Result<Vec<u8>> {
    session.capture_screenshot(SCREENSHOT_QUALITY, None).await
}

/// Element capture: scroll into view, clip to the client rect
pub async fn element_screenshot(session: &CdpSession, node: &Node) -> Result<Vec<u8>> {
    session.scroll_into_view(node.node_id()).await?;
    let rect = client_rect(session, node).await?;
    session
        .capture_screenshot(
            SCREENSHOT_QUALITY,
            Some(Viewport {
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
                scale: 1.0,
            }),
        )
        .await
}

/// Empty style map keyed by the property names to read
pub fn new_attr_map(names: &[&str]) -> HashMap<String, String> {
    names
        .iter()
        .map(|name| (name.to_string(), String::new()))
        .collect()
}

/// Parse a pixel-suffixed style value ("37.5px" → 37.5); 0 when absent
/// or malformed
pub fn read_px(map: &HashMap<String, String>, name: &str) -> f64 {
    map.get(name)
        .and_then(|value| value.trim().strip_suffix("px"))
        .and_then(|number| number.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_px() {
        let mut map = new_attr_map(&["left", "width"]);
        map.insert("left".to_string(), "37.5px".to_string());
        map.insert("width".to_string(), "auto".to_string());
        assert_eq!(read_px(&map, "left"), 37.5);
        assert_eq!(read_px(&map, "width"), 0.0);
        assert_eq!(read_px(&map, "missing"), 0.0);
    }
}
