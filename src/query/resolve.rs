//! One resolution pass: selector → node snapshots

use super::selector::{QueryMode, Selector};
use crate::cdp::types::NodeId;
use crate::cdp::CdpSession;
use crate::dom::Node;
use crate::{Error, Result};
use std::sync::Arc;
use tracing::debug;

/// Resolve a selector to fresh node snapshots
///
/// CSS queries run under the scope node when one is set, else under the
/// document root. XPath always searches the whole document; JsPath
/// evaluates the raw expression and maps the resulting object back to a
/// node. Zero matches resolve to an empty list, not an error.
pub async fn resolve(session: &CdpSession, selector: &Selector) -> Result<Vec<Arc<Node>>> {
    let root = match selector.scope() {
        Some(scope) => scope.node_id(),
        None => session.get_document().await?,
    };

    let ids: Vec<NodeId> = match selector.mode() {
        QueryMode::Css => {
            let id = session.query_selector(root, selector.raw()).await?;
            if id == 0 {
                vec![]
            } else {
                vec![id]
            }
        }
        QueryMode::CssAll => session.query_selector_all(root, selector.raw()).await?,
        QueryMode::XPath => session.perform_search(selector.raw()).await?,
        QueryMode::JsPath => {
            let object = session.evaluate_handle(selector.raw()).await?;
            match object.object_id {
                Some(object_id) => match session.request_node(&object_id).await {
                    Ok(id) if id != 0 => vec![id],
                    _ => vec![],
                },
                None => vec![],
            }
        }
    };

    debug!(selector = selector.raw(), count = ids.len(), "resolved");

    let mut nodes = Vec::with_capacity(ids.len());
    for id in ids {
        let desc = session.describe_node(id).await?;
        nodes.push(Arc::new(Node::from_description(desc)));
    }
    Ok(nodes)
}

/// Resolve or fail: a zero-node result becomes `NotFound`
pub async fn resolve_one(session: &CdpSession, selector: &Selector) -> Result<Arc<Node>> {
    let nodes = resolve(session, selector).await?;
    nodes
        .into_iter()
        .next()
        .ok_or_else(|| Error::not_found(selector.raw()))
}
