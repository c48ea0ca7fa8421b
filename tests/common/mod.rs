//! Shared test scaffolding: a scripted transport and a client over it

use drover::cdp::MockTransport;
use drover::config::Config;
use drover::session::{Client, ClientOptions};
use serde_json::json;
use std::sync::{Arc, Once};

static TRACING: Once = Once::new();

/// A client whose pages settle immediately (a body node always resolves)
pub fn setup() -> (Arc<MockTransport>, Arc<Client>) {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
    let transport = Arc::new(MockTransport::new());
    transport.respond_to("DOM.querySelector", |_, params| {
        let selector = params["selector"].as_str().unwrap_or_default();
        Ok(json!({"nodeId": if selector == "body" { 2 } else { 0 }}))
    });
    let client = Client::new(
        ClientOptions::new("example.com"),
        Config::default(),
        transport.clone(),
    );
    (transport, client)
}

/// Make every node pass the visibility check and report a fixed rect
pub fn script_visibility(transport: &MockTransport) {
    transport.respond_to("Runtime.callFunctionOn", |_, params| {
        let decl = params["functionDeclaration"].as_str().unwrap_or_default();
        if decl.contains("getBoundingClientRect") {
            Ok(json!({"result": {"type": "object",
                "value": {"x": 10.0, "y": 20.0, "width": 100.0, "height": 30.0}}}))
        } else {
            Ok(json!({"result": {"type": "boolean", "value": true}}))
        }
    });
}
