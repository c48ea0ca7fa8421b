//! Query engine tests: resolution and wait loop over the mock transport

use super::selector::Selector;
use super::wait::{wait_for, Predicate};
use crate::cdp::{CdpSession, MockTransport};
use crate::Error;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn session() -> (Arc<MockTransport>, CdpSession) {
    let transport = Arc::new(MockTransport::new());
    let session = CdpSession::with_session(transport.clone(), "session-1".to_string());
    (transport, session)
}

fn node_response(id: i64, attributes: Vec<&str>) -> serde_json::Value {
    json!({"node": {
        "nodeId": id,
        "backendNodeId": id * 10,
        "nodeName": "DIV",
        "attributes": attributes
    }})
}

#[tokio::test]
async fn test_resolve_css_single() {
    let (transport, session) = session();
    transport.respond_with("DOM.querySelector", json!({"nodeId": 5}));
    transport.respond_with("DOM.describeNode", node_response(5, vec!["id", "app"]));
    let selector = Selector::new("#app", false);
    let nodes = super::resolve(&session, &selector).await.unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].attribute("id").as_deref(), Some("app"));
}

#[tokio::test]
async fn test_no_wait_zero_nodes_is_not_found() {
    let (transport, session) = session();
    let selector = Selector::new("#missing", false);
    let err = wait_for(&session, &selector, &Predicate::Present)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    // single pass, no polling
    assert_eq!(transport.call_count("DOM.querySelector"), 1);
}

#[tokio::test]
async fn test_wait_present_succeeds_after_polls() {
    let (transport, session) = session();
    transport.respond_to("DOM.querySelector", |index, _| {
        Ok(json!({"nodeId": if index < 3 { 0 } else { 7 }}))
    });
    transport.respond_with("DOM.describeNode", node_response(7, vec![]));
    let selector = Selector::new("#late", false).with_timeout_secs(2);
    let nodes = wait_for(&session, &selector, &Predicate::Present)
        .await
        .unwrap();
    assert_eq!(nodes.len(), 1);
    assert!(transport.call_count("DOM.querySelector") >= 4);
}

#[tokio::test]
async fn test_wait_visible_times_out_near_deadline() {
    let (transport, session) = session();
    transport.respond_with("DOM.querySelector", json!({"nodeId": 5}));
    transport.respond_with("DOM.describeNode", node_response(5, vec![]));
    // style check says hidden, rect reader still answers
    transport.respond_to("Runtime.callFunctionOn", |_, params| {
        let decl = params["functionDeclaration"].as_str().unwrap_or_default();
        if decl.contains("getBoundingClientRect") {
            Ok(json!({"result": {"type": "object",
                "value": {"x": 0.0, "y": 0.0, "width": 10.0, "height": 10.0}}}))
        } else {
            Ok(json!({"result": {"type": "boolean", "value": false}}))
        }
    });
    let selector = Selector::new("#hidden", false).with_timeout_secs(1);
    let start = Instant::now();
    let err = wait_for(&session, &selector, &Predicate::Visible)
        .await
        .unwrap_err();
    let elapsed = start.elapsed();
    assert!(matches!(err, Error::Timeout(_)));
    assert!(elapsed >= Duration::from_millis(950), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(2), "elapsed {:?}", elapsed);
}

#[tokio::test]
async fn test_content_changed_deadline_reports_success() {
    let (transport, session) = session();
    transport.respond_with("DOM.querySelector", json!({"nodeId": 9}));
    transport.respond_with("DOM.describeNode", node_response(9, vec![]));
    transport.respond_with("DOM.getOuterHTML", json!({"outerHTML": "<div>same</div>"}));
    let selector = Selector::new("#stable", false).with_timeout(Duration::from_millis(350));
    let nodes = wait_for(
        &session,
        &selector,
        &Predicate::ContentChanged("<div>same</div>".to_string()),
    )
    .await
    .unwrap();
    assert!(nodes.is_empty());
}

#[tokio::test]
async fn test_content_changed_detects_change() {
    let (transport, session) = session();
    transport.respond_with("DOM.querySelector", json!({"nodeId": 9}));
    transport.respond_with("DOM.describeNode", node_response(9, vec![]));
    transport.respond_to("DOM.getOuterHTML", |index, _| {
        Ok(json!({"outerHTML": if index < 2 { "<div>old</div>" } else { "<div>new</div>" }}))
    });
    let selector = Selector::new("#panel", false).with_timeout_secs(2);
    let nodes = wait_for(
        &session,
        &selector,
        &Predicate::ContentChanged("<div>old</div>".to_string()),
    )
    .await
    .unwrap();
    assert_eq!(nodes.len(), 1);
}

#[tokio::test]
async fn test_count_at_least_waits_for_enough_nodes() {
    let (transport, session) = session();
    transport.respond_to("DOM.querySelectorAll", |index, _| {
        Ok(json!({"nodeIds": if index < 2 { vec![1] } else { vec![1, 2, 3] }}))
    });
    transport.respond_to("DOM.describeNode", |_, params| {
        Ok(json!({"node": {
            "nodeId": params["nodeId"],
            "backendNodeId": 0,
            "nodeName": "LI",
            "attributes": []
        }}))
    });
    let selector = Selector::new("ul li", true).with_timeout_secs(2);
    let nodes = wait_for(&session, &selector, &Predicate::CountAtLeast(3))
        .await
        .unwrap();
    assert_eq!(nodes.len(), 3);
}

#[tokio::test]
async fn test_attribute_ready_waits_for_src() {
    let (transport, session) = session();
    transport.respond_with("DOM.querySelector", json!({"nodeId": 4}));
    transport.respond_to("DOM.describeNode", |index, _| {
        Ok(if index < 2 {
            json!({"node": {"nodeId": 4, "backendNodeId": 40, "nodeName": "IMG",
                "attributes": ["src", ""]}})
        } else {
            json!({"node": {"nodeId": 4, "backendNodeId": 40, "nodeName": "IMG",
                "attributes": ["src", "data:image/png;base64,xyz"]}})
        })
    });
    let selector = Selector::new("img.captcha", false).with_timeout_secs(2);
    let nodes = wait_for(
        &session,
        &selector,
        &Predicate::AttributeReady("src".to_string()),
    )
    .await
    .unwrap();
    assert_eq!(
        nodes[0].attribute("src").as_deref(),
        Some("data:image/png;base64,xyz")
    );
}

#[tokio::test]
async fn test_attribute_changed_needs_new_value() {
    let (transport, session) = session();
    transport.respond_with("DOM.querySelector", json!({"nodeId": 4}));
    transport.respond_to("DOM.describeNode", |index, _| {
        let src = if index < 2 { "old.png" } else { "new.png" };
        Ok(json!({"node": {"nodeId": 4, "backendNodeId": 40, "nodeName": "IMG",
            "attributes": ["src", src]}}))
    });
    let selector = Selector::new("img.captcha", false).with_timeout_secs(2);
    let nodes = wait_for(
        &session,
        &selector,
        &Predicate::AttributeChanged {
            name: "src".to_string(),
            baseline: "old.png".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(nodes[0].attribute("src").as_deref(), Some("new.png"));
}

#[tokio::test]
async fn test_not_present_waits_for_removal() {
    let (transport, session) = session();
    transport.respond_to("DOM.querySelector", |index, _| {
        Ok(json!({"nodeId": if index < 2 { 7 } else { 0 }}))
    });
    transport.respond_with("DOM.describeNode", node_response(7, vec![]));
    let selector = Selector::new(".spinner", false).with_timeout_secs(2);
    let nodes = wait_for(&session, &selector, &Predicate::NotPresent)
        .await
        .unwrap();
    assert!(nodes.is_empty());
}

#[tokio::test]
async fn test_scope_clips_vertical_axis_only() {
    let (transport, session) = session();
    transport.respond_with("DOM.querySelector", json!({"nodeId": 5}));
    transport.respond_with("DOM.describeNode", node_response(5, vec![]));
    // scope (obj-2) spans y 0..100; candidate (obj-5) bottoms out at y 150
    transport.respond_to("Runtime.callFunctionOn", |_, params| {
        let decl = params["functionDeclaration"].as_str().unwrap_or_default();
        let object_id = params["objectId"].as_str().unwrap_or_default();
        if decl.contains("getBoundingClientRect") {
            let rect = if object_id == "obj-2" {
                json!({"x": 0.0, "y": 0.0, "width": 500.0, "height": 100.0})
            } else {
                // far off the x axis on purpose; only y is clipped
                json!({"x": 9000.0, "y": 140.0, "width": 10.0, "height": 10.0})
            };
            Ok(json!({"result": {"type": "object", "value": rect}}))
        } else {
            Ok(json!({"result": {"type": "boolean", "value": true}}))
        }
    });
    let scope = Arc::new(crate::dom::Node::new(2, 20, "DIV".to_string()));
    let selector = Selector::new("#inner", false).with_scope(scope);
    let err = wait_for(&session, &selector, &Predicate::Visible)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotVisible));
}

#[tokio::test]
async fn test_xpath_resolution_uses_search() {
    let (transport, session) = session();
    transport.respond_with(
        "DOM.performSearch",
        json!({"searchId": "s1", "resultCount": 1}),
    );
    transport.respond_with("DOM.getSearchResults", json!({"nodeIds": [21]}));
    transport.respond_with("DOM.describeNode", node_response(21, vec![]));
    let selector = Selector::new("//div[@id='app']", false);
    let nodes = super::resolve(&session, &selector).await.unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(transport.call_count("DOM.querySelector"), 0);
}
