//! Element: a (node, page, index) handle scoped to a subtree

use super::page::Page;
use crate::actions::{input, read};
use crate::dom::{ClientRect, Node};
use crate::query::{wait_for, Predicate, Selector};
use crate::{Error, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// A resolved node bound to its page
///
/// Carries no lifecycle of its own; the node snapshot is only as fresh
/// as the resolution that produced it.
#[derive(Debug, Clone)]
pub struct Element {
    index: usize,
    node: Arc<Node>,
    page: Arc<Page>,
}

impl Element {
    pub fn new(index: usize, node: Arc<Node>, page: Arc<Page>) -> Self {
        Self { index, node, page }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn node(&self) -> &Arc<Node> {
        &self.node
    }

    pub fn page(&self) -> &Arc<Page> {
        &self.page
    }

    pub fn node_id(&self) -> i64 {
        self.node.node_id()
    }

    fn session(&self) -> &crate::cdp::CdpSession {
        self.page.session()
    }

    /// All elements matching the selector under this node
    pub async fn selects(
        &self,
        sel: &str,
        timeout_secs: u64,
        must_visible: bool,
    ) -> Result<Vec<Element>> {
        info!(node = self.node.node_name(), sel, "select");
        let selector = Selector::new(sel, true)
            .with_scope(Arc::clone(&self.node))
            .with_timeout_secs(timeout_secs);
        let predicate = if must_visible {
            Predicate::Visible
        } else {
            Predicate::Present
        };
        let nodes = wait_for(self.session(), &selector, &predicate).await?;
        Ok(nodes
            .into_iter()
            .enumerate()
            .map(|(index, node)| Element::new(index, node, Arc::clone(&self.page)))
            .collect())
    }

    /// First element matching the selector under this node
    pub async fn select(
        &self,
        sel: &str,
        timeout_secs: u64,
        must_visible: bool,
    ) -> Result<Element> {
        let mut elements = self.selects(sel, timeout_secs, must_visible).await?;
        if elements.is_empty() {
            return Err(Error::not_found(sel));
        }
        Ok(elements.remove(0))
    }

    /// Click this node's center, then settle
    pub async fn click(&self, settle_ms: u64) -> Result<()> {
        info!(node = self.node.node_name(), "click");
        let outcome = input::click_node(self.session(), &self.node).await;
        tokio::time::sleep(Duration::from_millis(settle_ms)).await;
        outcome?;
        self.page.refresh_frame().await;
        Ok(())
    }

    /// Click that opens a tab; returns the newly bound page
    pub async fn click_page(&self) -> Result<Arc<Page>> {
        info!(node = self.node.node_name(), "click page");
        input::click_node(self.session(), &self.node).await?;
        let page = self.page.wait_new_page().await?;
        info!(url = %page.url(), "click page opened");
        self.page.refresh_frame().await;
        Ok(page)
    }

    pub async fn send_keys(&self, value: &str) -> Result<()> {
        info!(node = self.node.node_name(), "send keys");
        input::send_keys_node(self.session(), &self.node, value).await?;
        self.page.refresh_frame().await;
        Ok(())
    }

    pub async fn set_value(&self, value: &str) -> Result<()> {
        self.set_attr("value", serde_json::json!(value)).await
    }

    pub async fn set_html(&self, html: &str) -> Result<()> {
        self.set_attr("innerHTML", serde_json::json!(html)).await
    }

    /// Assign any JSON value to a DOM property
    pub async fn set_attr(&self, name: &str, value: Value) -> Result<()> {
        info!(node = self.node.node_name(), name, "set attr");
        input::set_js_attribute(self.session(), &self.node, name, value).await?;
        self.page.refresh_frame().await;
        Ok(())
    }

    /// Live DOM property read
    pub async fn attr(&self, name: &str) -> Result<String> {
        read::attribute_value(self.session(), &self.node, name).await
    }

    /// The attribute map captured at resolution time
    pub fn attrs(&self) -> HashMap<String, String> {
        self.node.attributes()
    }

    pub async fn html(&self) -> Result<String> {
        self.attr("outerHTML").await
    }

    pub async fn text(&self) -> Result<String> {
        read::inner_text(self.session(), &self.node).await
    }

    pub async fn value(&self) -> Result<String> {
        read::input_value(self.session(), &self.node).await
    }

    /// Computed style values for the requested property names
    pub async fn styles(&self, names: &[String]) -> Result<HashMap<String, String>> {
        read::computed_styles(self.session(), &self.node, names).await
    }

    pub async fn client_rect(&self) -> Result<ClientRect> {
        read::node_client_rect(self.session(), &self.node).await
    }

    /// Drag a child matched under this node by `offset_x` pixels
    pub async fn mouse_drag(&self, sel: &str, offset_x: f64) -> Result<()> {
        info!(node = self.node.node_name(), sel, offset_x, "mouse drag");
        let target = self.select(sel, self.max_wait(), true).await?;
        input::mouse_drag_node(self.session(), target.node(), offset_x).await?;
        self.page.refresh_frame().await;
        Ok(())
    }

    pub async fn mouse_over(&self, sel: &str) -> Result<()> {
        info!(node = self.node.node_name(), sel, "mouse over");
        let target = self.select(sel, self.max_wait(), true).await?;
        input::mouse_over_node(self.session(), target.node()).await?;
        self.page.refresh_frame().await;
        Ok(())
    }

    /// Wait for a child of this node to become visible
    pub async fn wait_visible(&self, sel: &str, secs: u64) -> Result<()> {
        info!(node = self.node.node_name(), sel, secs, "wait visible");
        let selector = Selector::new(sel, false)
            .with_scope(Arc::clone(&self.node))
            .with_timeout_secs(secs)
            .scrolled();
        wait_for(self.session(), &selector, &Predicate::Visible).await?;
        self.page.refresh_frame().await;
        Ok(())
    }

    /// Wait for a child's outer HTML to differ from the baseline
    pub async fn wait_changed(&self, sel: &str, old_html: &str, timeout_secs: u64) -> Result<()> {
        info!(node = self.node.node_name(), sel, "wait changed");
        let secs = if timeout_secs == 0 {
            self.max_wait()
        } else {
            timeout_secs
        };
        let selector = Selector::new(sel, false)
            .with_scope(Arc::clone(&self.node))
            .with_timeout_secs(secs)
            .scrolled();
        wait_for(
            self.session(),
            &selector,
            &Predicate::ContentChanged(old_html.to_string()),
        )
        .await?;
        self.page.refresh_frame().await;
        Ok(())
    }

    pub async fn image_ready(&self, sel: &str, values: &mut HashMap<String, String>) -> Result<()> {
        info!(node = self.node.node_name(), sel, "image ready");
        let selector = Selector::new(sel, false)
            .with_scope(Arc::clone(&self.node))
            .with_timeout_secs(self.max_wait());
        let nodes = wait_for(
            self.session(),
            &selector,
            &Predicate::AttributeReady("src".to_string()),
        )
        .await?;
        for node in &nodes {
            values.insert(sel.to_string(), node.attribute("src").unwrap_or_default());
        }
        self.page.refresh_frame().await;
        Ok(())
    }

    pub async fn image_changed(
        &self,
        sel: &str,
        values: &mut HashMap<String, String>,
    ) -> Result<()> {
        info!(node = self.node.node_name(), sel, "image changed");
        let baseline = values.get(sel).cloned().unwrap_or_default();
        let selector = Selector::new(sel, false)
            .with_scope(Arc::clone(&self.node))
            .with_timeout_secs(self.max_wait());
        let nodes = wait_for(
            self.session(),
            &selector,
            &Predicate::AttributeChanged {
                name: "src".to_string(),
                baseline,
            },
        )
        .await?;
        if let Some(node) = nodes.first() {
            values.insert(sel.to_string(), node.attribute("src").unwrap_or_default());
        }
        self.page.refresh_frame().await;
        Ok(())
    }

    /// Force a hidden node to render
    pub async fn show(&self) -> Result<()> {
        input::show_node(self.session(), &self.node).await?;
        self.page.refresh_frame().await;
        Ok(())
    }

    pub async fn scroll_into_view(&self) -> Result<()> {
        info!(node = self.node.node_name(), "scroll into view");
        input::scroll_into_view(self.session(), &self.node).await?;
        self.page.refresh_frame().await;
        Ok(())
    }

    /// JPEG of this element, base64-encoded
    pub async fn screenshot(&self) -> Result<String> {
        let bytes = read::element_screenshot(self.session(), &self.node).await?;
        Ok(BASE64.encode(bytes))
    }

    fn max_wait(&self) -> u64 {
        self.page.max_wait()
    }
}
