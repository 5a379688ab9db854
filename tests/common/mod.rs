//! Common test utilities and helpers

#![allow(dead_code)]

use serde_json::{json, Value};
use text_mirror_core::mcp::{McpServer, ServerInfo, ToolHandler};
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

/// Version string reported by test servers
pub const TEST_VERSION: &str = "v9.9.9 (1234567)";

/// Create a server without transcript logging
pub fn create_test_server() -> McpServer {
    McpServer::new(ToolHandler::new(false), ServerInfo::new(TEST_VERSION))
}

/// Feed raw bytes to a fresh server and collect every response line
pub async fn run_raw_session(input: Vec<u8>, shutdown: CancellationToken) -> Vec<Value> {
    let server = create_test_server();
    let (writer, mut client) = tokio::io::duplex(64 * 1024);

    let collector = tokio::spawn(async move {
        let mut output = String::new();
        client
            .read_to_string(&mut output)
            .await
            .expect("server output should be UTF-8");
        output
    });

    server
        .serve(&input[..], writer, shutdown)
        .await
        .expect("session should end cleanly");

    let output = collector.await.unwrap();
    output
        .lines()
        .map(|line| serde_json::from_str(line).expect("each output line is one JSON value"))
        .collect()
}

/// Send JSON messages, one per line, and collect the responses
pub async fn run_session(messages: &[Value]) -> Vec<Value> {
    let mut input = Vec::new();
    for message in messages {
        input.extend_from_slice(message.to_string().as_bytes());
        input.push(b'\n');
    }
    run_raw_session(input, CancellationToken::new()).await
}

/// Find the response carrying `id`
pub fn response_for(responses: &[Value], id: Value) -> &Value {
    responses
        .iter()
        .find(|response| response["id"] == id)
        .unwrap_or_else(|| panic!("no response with id {}: {:?}", id, responses))
}

/// Build a `tools/call` request for the mirror tool
pub fn mirror_call(id: u64, text: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {
            "name": "mirror",
            "arguments": {"text": text}
        }
    })
}

/// Mirrored text from a successful `tools/call` response
pub fn mirrored_text(response: &Value) -> String {
    assert!(
        response.get("error").is_none(),
        "unexpected error response: {}",
        response
    );
    response["result"]["structuredContent"]["text"]
        .as_str()
        .expect("structuredContent.text should be a string")
        .to_string()
}
