//! Mouse, keyboard and property-write primitives
//!
//! Each primitive performs one protocol effect against an already
//! resolved node and fails fast. Retrying is the caller's business.

use super::tracks::build_tracks;
use crate::cdp::types::{MouseEventParams, MouseEventType};
use crate::cdp::CdpSession;
use crate::dom::{Node, Quad};
use crate::query::scripts;
use crate::{Error, Result};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Hold time between the last drag move and the release
pub const DRAG_RELEASE_PAUSE: Duration = Duration::from_millis(740);

/// Press point: centroid of the node's first content quad
async fn node_centroid(session: &CdpSession, node: &Node) -> Result<(f64, f64)> {
    let quads = session.get_content_quads(node.node_id()).await?;
    let first = quads.into_iter().next().ok_or(Error::InvalidDimensions)?;
    Quad(first).centroid()
}

/// Synthetic left click at the node's center
pub async fn click_node(session: &CdpSession, node: &Node) -> Result<()> {
    session.scroll_into_view(node.node_id()).await?;
    let (x, y) = node_centroid(session, node).await?;
    debug!(x, y, "click");
    session
        .dispatch_mouse_event(&MouseEventParams::left(MouseEventType::Pressed, x, y))
        .await?;
    session
        .dispatch_mouse_event(&MouseEventParams::left(MouseEventType::Released, x, y))
        .await
}

/// Human-like horizontal drag by `offset_x` pixels
///
/// Press at the centroid, then one move per planned delta added to the
/// running X, hold, release.
pub async fn mouse_drag_node(session: &CdpSession, node: &Node, offset_x: f64) -> Result<()> {
    session.scroll_into_view(node.node_id()).await?;
    let (x, y) = node_centroid(session, node).await?;
    debug!(x, y, offset_x, "drag");

    session
        .dispatch_mouse_event(&MouseEventParams::left(MouseEventType::Pressed, x, y))
        .await?;

    let mut current_x = x;
    for delta in build_tracks(offset_x) {
        current_x += delta;
        session
            .dispatch_mouse_event(&MouseEventParams::left(MouseEventType::Moved, current_x, y))
            .await?;
    }

    tokio::time::sleep(DRAG_RELEASE_PAUSE).await;
    session
        .dispatch_mouse_event(&MouseEventParams::left(
            MouseEventType::Released,
            current_x,
            y,
        ))
        .await
}

/// Single mouse move to the node's center
pub async fn mouse_over_node(session: &CdpSession, node: &Node) -> Result<()> {
    session.scroll_into_view(node.node_id()).await?;
    let (x, y) = node_centroid(session, node).await?;
    session
        .dispatch_mouse_event(&MouseEventParams::left(MouseEventType::Moved, x, y))
        .await
}

/// Focus the node and type the text one character at a time
pub async fn send_keys_node(session: &CdpSession, node: &Node, text: &str) -> Result<()> {
    session.focus(node.node_id()).await?;
    for ch in text.chars() {
        session.dispatch_char(ch).await?;
    }
    Ok(())
}

/// Assign a DOM property with any JSON value
pub async fn set_js_attribute(
    session: &CdpSession,
    node: &Node,
    name: &str,
    value: Value,
) -> Result<()> {
    session
        .call_function_on_node(node.node_id(), scripts::SET_ATTRIBUTE_JS, vec![json!(name), value])
        .await?;
    Ok(())
}

/// Force a hidden node to render
pub async fn show_node(session: &CdpSession, node: &Node) -> Result<()> {
    session
        .call_function_on_node(node.node_id(), scripts::SHOW_JS, vec![])
        .await?;
    Ok(())
}

pub async fn scroll_into_view(session: &CdpSession, node: &Node) -> Result<()> {
    session.scroll_into_view(node.node_id()).await
}

/// Attach local files to a file input
pub async fn upload_files(session: &CdpSession, node: &Node, files: &[String]) -> Result<()> {
    session.set_file_input_files(node.node_id(), files).await
}
