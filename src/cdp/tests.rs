//! CDP layer tests: typed session over the mock transport

use super::mock::MockTransport;
use super::session::CdpSession;
use super::traits::{CdpEvent, CdpTransport};
use crate::Error;
use serde_json::json;
use std::sync::Arc;

fn session() -> (Arc<MockTransport>, CdpSession) {
    let transport = Arc::new(MockTransport::new());
    let session = CdpSession::with_session(transport.clone(), "session-1".to_string());
    (transport, session)
}

#[tokio::test]
async fn test_navigate_records_url() {
    let (transport, session) = session();
    let nav = session.navigate("https://example.com").await.unwrap();
    assert_eq!(nav.frame_id.as_deref(), Some("frame-1"));
    let calls = transport.calls_of("Page.navigate");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["url"], "https://example.com");
}

#[tokio::test]
async fn test_navigate_error_text_is_failure() {
    let (transport, session) = session();
    transport.respond_with(
        "Page.navigate",
        json!({"frameId": "frame-1", "errorText": "net::ERR_NAME_NOT_RESOLVED"}),
    );
    let err = session.navigate("https://nxdomain.invalid").await.unwrap_err();
    assert!(matches!(err, Error::NavigationFailed(_)));
}

#[tokio::test]
async fn test_evaluate_exception_surfaces_description() {
    let (transport, session) = session();
    transport.respond_with(
        "Runtime.evaluate",
        json!({
            "result": {"type": "undefined"},
            "exceptionDetails": {
                "text": "Uncaught",
                "exception": {"type": "object", "description": "TypeError: boom"}
            }
        }),
    );
    let err = session.evaluate("boom()").await.unwrap_err();
    match err {
        Error::ScriptExecutionFailed(msg) => assert!(msg.contains("TypeError: boom")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_call_function_on_node_resolves_first() {
    let (transport, session) = session();
    transport.respond_with(
        "Runtime.callFunctionOn",
        json!({"result": {"type": "string", "value": "hello"}}),
    );
    let value = session
        .call_function_on_node(7, "function() { return this.textContent; }", vec![])
        .await
        .unwrap();
    assert_eq!(value, json!("hello"));
    let resolves = transport.calls_of("DOM.resolveNode");
    assert_eq!(resolves.len(), 1);
    assert_eq!(resolves[0]["nodeId"], 7);
    let calls = transport.calls_of("Runtime.callFunctionOn");
    assert_eq!(calls[0]["objectId"], "obj-7");
    assert_eq!(calls[0]["returnByValue"], true);
}

#[tokio::test]
async fn test_perform_search_collects_and_discards() {
    let (transport, session) = session();
    transport.respond_with(
        "DOM.performSearch",
        json!({"searchId": "search-9", "resultCount": 2}),
    );
    transport.respond_with("DOM.getSearchResults", json!({"nodeIds": [11, 12]}));
    let ids = session.perform_search("//div[@id='app']").await.unwrap();
    assert_eq!(ids, vec![11, 12]);
    let discards = transport.calls_of("DOM.discardSearchResults");
    assert_eq!(discards.len(), 1);
    assert_eq!(discards[0]["searchId"], "search-9");
}

#[tokio::test]
async fn test_perform_search_empty_still_discards() {
    let (transport, session) = session();
    let ids = session.perform_search("//span[@class='nope']").await.unwrap();
    assert!(ids.is_empty());
    assert_eq!(transport.call_count("DOM.getSearchResults"), 0);
    assert_eq!(transport.call_count("DOM.discardSearchResults"), 1);
}

#[tokio::test]
async fn test_resolve_node_without_object_is_invalid_target() {
    let (transport, session) = session();
    transport.respond_with("DOM.resolveNode", json!({"object": {"type": "undefined"}}));
    let err = session.resolve_node(3).await.unwrap_err();
    assert!(matches!(err, Error::InvalidTarget));
}

#[tokio::test]
async fn test_capture_screenshot_decodes_base64() {
    let (_transport, session) = session();
    let bytes = session.capture_screenshot(80, None).await.unwrap();
    assert!(!bytes.is_empty());
    assert_eq!(bytes[0], 0xff);
}

#[tokio::test]
async fn test_closed_transport_rejects_commands() {
    let (transport, session) = session();
    transport.close().await.unwrap();
    assert!(!transport.is_active());
    let err = session.get_document().await.unwrap_err();
    match err {
        Error::Cdp(msg) => assert!(msg.contains("DOM.getDocument")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_emit_reaches_every_listener() {
    let transport = MockTransport::new();
    let mut rx1 = transport.listen_events().await.unwrap();
    let mut rx2 = transport.listen_events().await.unwrap();
    transport
        .emit(CdpEvent::new("Page.frameNavigated", json!({"frame": {"url": "about:blank"}})))
        .await;
    assert_eq!(rx1.recv().await.unwrap().method, "Page.frameNavigated");
    assert_eq!(rx2.recv().await.unwrap().method, "Page.frameNavigated");
}

#[tokio::test]
async fn test_responder_sees_call_index() {
    let (transport, session) = session();
    transport.respond_to("DOM.querySelector", |index, _| {
        Ok(json!({"nodeId": if index == 0 { 0 } else { 42 }}))
    });
    assert_eq!(session.query_selector(1, "#slider").await.unwrap(), 0);
    assert_eq!(session.query_selector(1, "#slider").await.unwrap(), 42);
}
