//! Predicate-driven poll loop

use super::resolve::resolve;
use super::scripts;
use super::selector::Selector;
use super::POLL_INTERVAL;
use crate::cdp::CdpSession;
use crate::dom::{ClientRect, Node};
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Wait condition evaluated against each resolution pass
#[derive(Debug, Clone)]
pub enum Predicate {
    /// At least one node resolves
    Present,
    /// At least one resolved node passes the visibility check
    Visible,
    /// No resolved node passes the visibility check
    NotVisible,
    /// The selector resolves to zero nodes
    NotPresent,
    /// At least this many nodes resolve
    CountAtLeast(usize),
    /// The first node's outer HTML differs from the baseline
    ContentChanged(String),
    /// The named attribute is non-empty
    AttributeReady(String),
    /// The named attribute is non-empty and differs from the baseline
    AttributeChanged { name: String, baseline: String },
}

/// Bounding rect of a node via the injected rect reader
pub async fn client_rect(session: &CdpSession, node: &Node) -> Result<ClientRect> {
    let value = session
        .call_function_on_node(node.node_id(), scripts::CLIENT_RECT_JS, vec![])
        .await?;
    Ok(serde_json::from_value(value)?)
}

/// Nodes that render, pass the injected visibility check, and (when a
/// scope node is set) fall inside the scope's vertical range. Horizontal
/// clipping is not checked.
async fn visible_nodes(
    session: &CdpSession,
    selector: &Selector,
    nodes: &[Arc<Node>],
) -> Result<Vec<Arc<Node>>> {
    let clip = match selector.scope() {
        Some(scope) => client_rect(session, scope).await.ok(),
        None => None,
    };

    let mut kept = Vec::new();
    for node in nodes {
        if session.get_box_model(node.node_id()).await.is_err() {
            continue;
        }
        let visible = session
            .call_function_on_node(node.node_id(), scripts::VISIBLE_JS, vec![])
            .await;
        if !matches!(visible, Ok(serde_json::Value::Bool(true))) {
            continue;
        }
        let rect = match client_rect(session, node).await {
            Ok(rect) => rect,
            Err(_) => continue,
        };
        if let Some(clip) = clip {
            let y = rect.y + rect.height;
            if y <= clip.y || y >= clip.y + clip.height {
                continue;
            }
        }
        kept.push(Arc::clone(node));
    }
    Ok(kept)
}

/// One predicate evaluation. Ok carries the nodes that satisfied it; a
/// soft error requests another poll; anything else aborts the wait.
async fn evaluate(
    session: &CdpSession,
    selector: &Selector,
    predicate: &Predicate,
    nodes: &[Arc<Node>],
) -> Result<Vec<Arc<Node>>> {
    match predicate {
        Predicate::Present => {
            if nodes.is_empty() {
                Err(Error::not_found(selector.raw()))
            } else {
                Ok(nodes.to_vec())
            }
        }
        Predicate::Visible => {
            if nodes.is_empty() {
                return Err(Error::not_found(selector.raw()));
            }
            let kept = visible_nodes(session, selector, nodes).await?;
            if kept.is_empty() {
                Err(Error::NotVisible)
            } else {
                Ok(kept)
            }
        }
        Predicate::NotVisible => {
            if nodes.is_empty() {
                return Ok(vec![]);
            }
            let kept = visible_nodes(session, selector, nodes).await?;
            if kept.is_empty() {
                Ok(vec![])
            } else {
                Err(Error::StillPresent)
            }
        }
        Predicate::NotPresent => {
            if nodes.is_empty() {
                Ok(vec![])
            } else {
                Err(Error::StillPresent)
            }
        }
        Predicate::CountAtLeast(min) => {
            if nodes.len() >= *min {
                Ok(nodes.to_vec())
            } else {
                Err(Error::NotEnoughNodes)
            }
        }
        Predicate::ContentChanged(baseline) => {
            let first = match nodes.first() {
                Some(first) => first,
                None => return Err(Error::not_found(selector.raw())),
            };
            let html = session.get_outer_html(first.node_id()).await?;
            if html == *baseline {
                Err(Error::HtmlUnchanged)
            } else {
                Ok(nodes.to_vec())
            }
        }
        Predicate::AttributeReady(name) => {
            let first = match nodes.first() {
                Some(first) => first,
                None => return Err(Error::not_found(selector.raw())),
            };
            match first.attribute(name) {
                Some(value) if !value.is_empty() => Ok(nodes.to_vec()),
                _ => Err(Error::AttributeEmpty),
            }
        }
        Predicate::AttributeChanged { name, baseline } => {
            let first = match nodes.first() {
                Some(first) => first,
                None => return Err(Error::not_found(selector.raw())),
            };
            match first.attribute(name) {
                Some(value) if !value.is_empty() && value != *baseline => Ok(nodes.to_vec()),
                _ => Err(Error::AttributeUnchanged),
            }
        }
    }
}

/// Resolve-and-wait until the predicate holds or the deadline passes
///
/// Polls at a fixed interval, measured from the selector's creation
/// instant. With no wait budget, a single pass runs and its soft failure
/// is returned as-is (zero nodes report NotFound immediately). On
/// deadline the last soft reason comes back as a Timeout — except for
/// ContentChanged, whose deadline branch reports success with no nodes.
/// That asymmetry is load-bearing for callers that treat "no change
/// within budget" as settled; do not extend it to other predicates.
pub async fn wait_for(
    session: &CdpSession,
    selector: &Selector,
    predicate: &Predicate,
) -> Result<Vec<Arc<Node>>> {
    let deadline = selector.deadline();
    loop {
        let nodes = resolve(session, selector).await?;
        match evaluate(session, selector, predicate, &nodes).await {
            Ok(kept) => {
                if selector.scroll_into_view() {
                    if let Some(first) = kept.first() {
                        session.scroll_into_view(first.node_id()).await?;
                    }
                }
                return Ok(kept);
            }
            Err(soft) if soft.is_soft() => {
                let Some(deadline) = deadline else {
                    return Err(soft);
                };
                if Instant::now() >= deadline {
                    if matches!(predicate, Predicate::ContentChanged(_)) {
                        debug!(selector = selector.raw(), "content unchanged at deadline");
                        return Ok(vec![]);
                    }
                    warn!(selector = selector.raw(), reason = %soft, "wait timed out");
                    return Err(Error::timeout(format!(
                        "wait `{}`: {}",
                        selector.raw(),
                        soft
                    )));
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
            Err(hard) => return Err(hard),
        }
    }
}
