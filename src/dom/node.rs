//! Node snapshot and geometry helpers

use crate::cdp::types::{NodeDescription, NodeId};
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::RwLock;

/// A resolved DOM node
///
/// Attributes are kept as the flat name/value list the protocol delivers.
/// The list is behind a lock: the page event task may refresh it while a
/// wait loop is reading.
#[derive(Debug)]
pub struct Node {
    node_id: NodeId,
    backend_node_id: NodeId,
    node_name: String,
    attributes: RwLock<Vec<String>>,
}

impl Node {
    pub fn new(node_id: NodeId, backend_node_id: NodeId, node_name: String) -> Self {
        Self {
            node_id,
            backend_node_id,
            node_name,
            attributes: RwLock::new(Vec::new()),
        }
    }

    pub fn from_description(desc: NodeDescription) -> Self {
        Self {
            node_id: desc.node_id,
            backend_node_id: desc.backend_node_id,
            node_name: desc.node_name,
            attributes: RwLock::new(desc.attributes.unwrap_or_default()),
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn backend_node_id(&self) -> NodeId {
        self.backend_node_id
    }

    /// Tag name as reported by the protocol (upper-case for elements)
    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    /// Value of one attribute, if present
    pub fn attribute(&self, name: &str) -> Option<String> {
        let attrs = self.attributes.read().unwrap();
        attrs
            .chunks_exact(2)
            .find(|pair| pair[0] == name)
            .map(|pair| pair[1].clone())
    }

    /// All attributes as a map
    pub fn attributes(&self) -> HashMap<String, String> {
        let attrs = self.attributes.read().unwrap();
        attrs
            .chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect()
    }

    /// Replace the attribute list wholesale
    pub fn set_attributes(&self, flat: Vec<String>) {
        *self.attributes.write().unwrap() = flat;
    }
}

/// Bounding client rect as reported by the injected rect reader
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ClientRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One content quad: flattened x,y corner coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Quad(pub Vec<f64>);

impl Quad {
    /// Geometric center of the quad
    ///
    /// Fails with `InvalidDimensions` when the coordinate list is empty or
    /// has an odd length.
    pub fn centroid(&self) -> Result<(f64, f64)> {
        let coords = &self.0;
        if coords.is_empty() || coords.len() % 2 != 0 {
            return Err(Error::InvalidDimensions);
        }
        let points = (coords.len() / 2) as f64;
        let x = coords.iter().step_by(2).sum::<f64>() / points;
        let y = coords.iter().skip(1).step_by(2).sum::<f64>() / points;
        Ok((x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_lookup() {
        let node = Node::new(5, 50, "DIV".to_string());
        node.set_attributes(vec![
            "id".to_string(),
            "slider".to_string(),
            "class".to_string(),
            "btn active".to_string(),
        ]);
        assert_eq!(node.attribute("id").as_deref(), Some("slider"));
        assert_eq!(node.attribute("class").as_deref(), Some("btn active"));
        assert_eq!(node.attribute("style"), None);
        assert_eq!(node.attributes().len(), 2);
    }

    #[test]
    fn test_from_description_without_attributes() {
        let desc = serde_json::from_value(json!({
            "nodeId": 3, "backendNodeId": 30, "nodeName": "IMG"
        }))
        .unwrap();
        let node = Node::from_description(desc);
        assert_eq!(node.node_name(), "IMG");
        assert!(node.attributes().is_empty());
    }

    #[test]
    fn test_quad_centroid() {
        let quad = Quad(vec![0.0, 0.0, 100.0, 0.0, 100.0, 30.0, 0.0, 30.0]);
        assert_eq!(quad.centroid().unwrap(), (50.0, 15.0));
    }

    #[test]
    fn test_quad_centroid_rejects_degenerate() {
        assert!(matches!(
            Quad(vec![]).centroid(),
            Err(Error::InvalidDimensions)
        ));
        assert!(matches!(
            Quad(vec![1.0, 2.0, 3.0]).centroid(),
            Err(Error::InvalidDimensions)
        ));
    }
}
