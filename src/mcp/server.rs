//! MCP server with stdio transport
//!
//! Implements a JSON-RPC 2.0 server over newline-delimited stdin/stdout.
//! Each `tools/call` runs in its own task with a cancellation token that a
//! `notifications/cancelled` message (or shutdown) can fire. All responses go
//! through one writer task so output lines never interleave.

use super::protocol::{
    negotiate_protocol_version, CancelledParams, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
};
use super::tools::ToolHandler;
use crate::error::{MirrorError, Result};
use crate::grapheme;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

/// Service name reported in `serverInfo`
pub const SERVICE_NAME: &str = "text-mirror";

/// Service title reported in `serverInfo`
pub const SERVICE_TITLE: &str = "Text mirroring/reversing tool";

type ResponseSender = mpsc::UnboundedSender<JsonRpcResponse>;

/// Tokens of requests still running, keyed by the JSON form of their id
type InFlight = Arc<Mutex<HashMap<String, CancellationToken>>>;

/// Identity reported to clients on `initialize`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub name: String,
    pub title: String,
    pub version: String,
}

impl ServerInfo {
    /// Server info for this service at `version`
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            name: SERVICE_NAME.to_string(),
            title: SERVICE_TITLE.to_string(),
            version: version.into(),
        }
    }
}

/// MCP server that handles JSON-RPC requests over stdio
pub struct McpServer {
    tool_handler: Arc<ToolHandler>,
    info: ServerInfo,
}

/// Per-session state shared by the read loop and request tasks
struct Session {
    responses: ResponseSender,
    in_flight: InFlight,
    tasks: TaskTracker,
    token: CancellationToken,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(tool_handler: ToolHandler, info: ServerInfo) -> Self {
        Self {
            tool_handler: Arc::new(tool_handler),
            info,
        }
    }

    /// Identity reported on `initialize`
    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// Run the server on stdin/stdout until EOF or `shutdown` fires
    pub async fn run(&self, shutdown: CancellationToken) -> Result<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout(), shutdown)
            .await
    }

    /// Serve one session over arbitrary byte streams.
    ///
    /// Returns once the reader hits EOF (after in-flight requests finish) or
    /// `shutdown` is cancelled (in-flight requests are cancelled too).
    pub async fn serve<R, W>(&self, reader: R, writer: W, shutdown: CancellationToken) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        info!("MCP server started, listening on stdin...");

        let (tx, rx) = mpsc::unbounded_channel();
        let session = Session {
            responses: tx,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            tasks: TaskTracker::new(),
            token: shutdown.child_token(),
        };
        let writer_task = tokio::spawn(write_responses(writer, rx, session.token.clone()));

        let mut reader = BufReader::new(reader);
        let mut line = Vec::new();
        let mut read_error = None;

        loop {
            line.clear();

            let read = tokio::select! {
                biased;

                _ = session.token.cancelled() => {
                    debug!("Session cancelled, stopping read loop");
                    break;
                }
                read = reader.read_until(b'\n', &mut line) => read,
            };

            match read {
                Ok(0) => {
                    // EOF
                    debug!("Received EOF, shutting down");
                    break;
                }
                Ok(_) => {
                    let decoded = grapheme::decode_text(&line);
                    let request = decoded.trim();
                    if request.is_empty() {
                        continue;
                    }

                    debug!("Received request: {}", request);
                    self.dispatch(request, &session);
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    read_error = Some(e);
                    break;
                }
            }
        }

        session.tasks.close();
        session.tasks.wait().await;

        // Closing the channel lets the writer drain and exit
        drop(session);

        let written = writer_task
            .await
            .map_err(|e| MirrorError::Other(format!("Writer task failed: {}", e)))?;

        info!("MCP server shutting down");

        written?;
        match read_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Parse and route a single JSON-RPC message
    fn dispatch(&self, line: &str, session: &Session) {
        // Parse JSON, then the request shape
        let message: Value = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(e) => {
                send(
                    &session.responses,
                    JsonRpcResponse::error(
                        None,
                        JsonRpcError::parse_error(format!("Invalid JSON: {}", e)),
                    ),
                );
                return;
            }
        };

        let id = message.get("id").cloned().filter(|id| !id.is_null());
        let request: JsonRpcRequest = match serde_json::from_value(message) {
            Ok(req) => req,
            Err(e) => {
                send(
                    &session.responses,
                    JsonRpcResponse::error(
                        id,
                        JsonRpcError::invalid_request(format!("Invalid request: {}", e)),
                    ),
                );
                return;
            }
        };

        // Validate JSON-RPC version
        if request.jsonrpc != "2.0" {
            if request.is_notification() {
                warn!("Dropping notification with jsonrpc '{}'", request.jsonrpc);
            } else {
                send(
                    &session.responses,
                    JsonRpcResponse::error(
                        request.id,
                        JsonRpcError::invalid_request("jsonrpc must be '2.0'"),
                    ),
                );
            }
            return;
        }

        if request.is_notification() {
            self.handle_notification(request, session);
            return;
        }

        // Route to handler
        let response = match request.method.as_str() {
            // MCP protocol methods
            "initialize" => self.handle_initialize(request),
            "ping" => JsonRpcResponse::success(request.id, serde_json::json!({})),
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => {
                self.spawn_tools_call(request, session);
                return;
            }

            // Unknown method
            _ => {
                JsonRpcResponse::error(request.id, JsonRpcError::method_not_found(&request.method))
            }
        };

        send(&session.responses, response);
    }

    /// Handle a message without an id
    fn handle_notification(&self, request: JsonRpcRequest, session: &Session) {
        match request.method.as_str() {
            "notifications/initialized" => debug!("Client finished initialization"),
            "notifications/cancelled" => {
                let params: CancelledParams = match serde_json::from_value(request.params) {
                    Ok(params) => params,
                    Err(e) => {
                        warn!("Malformed cancellation notification: {}", e);
                        return;
                    }
                };

                let key = request_key(&params.request_id);
                let token = session
                    .in_flight
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .get(&key)
                    .cloned();

                match token {
                    Some(token) => {
                        debug!(
                            "Cancelling request {} ({})",
                            key,
                            params.reason.as_deref().unwrap_or("no reason given")
                        );
                        token.cancel();
                    }
                    None => debug!("Cancellation for unknown or finished request {}", key),
                }
            }
            other => debug!("Ignoring notification: {}", other),
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!("Handling initialize");

        let requested = request
            .params
            .get("protocolVersion")
            .and_then(Value::as_str);
        let protocol_version = negotiate_protocol_version(requested);

        JsonRpcResponse::success(
            request.id,
            serde_json::json!({
                "protocolVersion": protocol_version,
                "serverInfo": {
                    "name": self.info.name,
                    "title": self.info.title,
                    "version": self.info.version
                },
                "capabilities": {
                    "tools": {
                        "listChanged": false
                    }
                }
            }),
        )
    }

    /// Handle tools/list request
    fn handle_tools_list(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!("Handling tools/list");

        let tools = self.tool_handler.list_tools();

        JsonRpcResponse::success(
            request.id,
            serde_json::json!({
                "tools": tools
            }),
        )
    }

    /// Run tools/call in its own task, registered for cancellation
    fn spawn_tools_call(&self, request: JsonRpcRequest, session: &Session) {
        debug!("Handling tools/call");

        let key = request
            .id
            .as_ref()
            .map(request_key)
            .unwrap_or_default();
        let token = session.token.child_token();
        {
            let mut in_flight = session
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if in_flight.contains_key(&key) {
                warn!("Request id {} is already in flight", key);
                send(
                    &session.responses,
                    JsonRpcResponse::error(
                        request.id,
                        JsonRpcError::invalid_request(format!(
                            "request id {} is already in flight",
                            key
                        )),
                    ),
                );
                return;
            }
            in_flight.insert(key.clone(), token.clone());
        }

        let handler = Arc::clone(&self.tool_handler);
        let responses = session.responses.clone();
        let in_flight = Arc::clone(&session.in_flight);

        session.tasks.spawn(async move {
            let response = handle_tools_call(&handler, request, &token).await;

            in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&key);

            if token.is_cancelled() {
                debug!("Request {} was cancelled, no response sent", key);
                return;
            }
            send(&responses, response);
        });
    }
}

/// Handle tools/call request
async fn handle_tools_call(
    handler: &ToolHandler,
    request: JsonRpcRequest,
    cancel: &CancellationToken,
) -> JsonRpcResponse {
    // Extract tool name and arguments from params
    let params = match request.params.as_object() {
        Some(obj) => obj,
        None => {
            return JsonRpcResponse::error(
                request.id,
                JsonRpcError::invalid_params("params must be an object"),
            );
        }
    };

    let tool_name = match params.get("name").and_then(|v| v.as_str()) {
        Some(name) => name,
        None => {
            return JsonRpcResponse::error(
                request.id,
                JsonRpcError::invalid_params("missing 'name' field"),
            );
        }
    };

    let arguments = params
        .get("arguments")
        .cloned()
        .unwrap_or(Value::Object(serde_json::Map::new()));

    // Execute tool
    match handler.execute(tool_name, arguments, cancel).await {
        Ok(result) => JsonRpcResponse::success(request.id, result),
        Err(
            e @ (MirrorError::InvalidParams(_)
            | MirrorError::UnknownTool(_)
            | MirrorError::Serialization(_)),
        ) => JsonRpcResponse::error(request.id, JsonRpcError::invalid_params(e.to_string())),
        Err(e) => JsonRpcResponse::error(
            request.id,
            JsonRpcError::internal_error(format!("Tool execution failed: {}", e)),
        ),
    }
}

/// Serialize responses one per line until the channel closes
async fn write_responses<W>(
    mut writer: W,
    mut responses: mpsc::UnboundedReceiver<JsonRpcResponse>,
    session: CancellationToken,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = responses.recv().await {
        let response_json = match serde_json::to_string(&response) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize response: {}", e);
                serde_json::to_string(&JsonRpcResponse::error(
                    response.id,
                    JsonRpcError::internal_error(format!("Serialization error: {}", e)),
                ))?
            }
        };

        debug!("Sending response: {}", response_json);

        if let Err(e) = write_line(&mut writer, &response_json).await {
            error!("Failed to write response: {}", e);
            // Nobody can hear us any more; stop reading requests
            session.cancel();
            return Err(e.into());
        }
    }

    Ok(())
}

async fn write_line<W>(writer: &mut W, line: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

fn send(responses: &ResponseSender, response: JsonRpcResponse) {
    if responses.send(response).is_err() {
        debug!("Response channel closed, dropping response");
    }
}

fn request_key(id: &Value) -> String {
    id.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_routing() {
        // Test that we can parse valid JSON-RPC requests
        let request = r#"{"jsonrpc":"2.0","method":"tools/list","id":1}"#;
        let parsed: JsonRpcRequest = serde_json::from_str(request).unwrap();

        assert_eq!(parsed.jsonrpc, "2.0");
        assert_eq!(parsed.method, "tools/list");
        assert_eq!(parsed.id, Some(json!(1)));
    }

    #[test]
    fn test_request_key_distinguishes_types() {
        assert_eq!(request_key(&json!(1)), "1");
        assert_eq!(request_key(&json!("1")), "\"1\"");
    }

    #[test]
    fn test_server_info() {
        let server = McpServer::new(ToolHandler::new(false), ServerInfo::new("v1.0.0 (abcdef1)"));
        assert_eq!(server.info().name, "text-mirror");
        assert_eq!(server.info().title, "Text mirroring/reversing tool");
        assert_eq!(server.info().version, "v1.0.0 (abcdef1)");
    }

    #[tokio::test]
    async fn test_tools_call_errors() {
        let handler = ToolHandler::new(false);
        let cancel = CancellationToken::new();

        let cases = [
            (json!("not an object"), -32602),
            (json!({"arguments": {"text": "abc"}}), -32602),
            (json!({"name": "nope", "arguments": {}}), -32602),
            (json!({"name": "mirror", "arguments": {"text": 1}}), -32602),
        ];

        for (params, code) in cases {
            let request = JsonRpcRequest {
                jsonrpc: "2.0".to_string(),
                method: "tools/call".to_string(),
                params: params.clone(),
                id: Some(json!(9)),
            };
            let response = handle_tools_call(&handler, request, &cancel).await;
            let error = response.error.unwrap_or_else(|| panic!("expected error for {}", params));
            assert_eq!(error.code, code, "params: {}", params);
            assert_eq!(response.id, Some(json!(9)));
        }
    }

    #[tokio::test]
    async fn test_tools_call_without_arguments_is_invalid() {
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: "tools/call".to_string(),
            params: json!({"name": "mirror"}),
            id: Some(json!(1)),
        };

        let response =
            handle_tools_call(&ToolHandler::new(false), request, &CancellationToken::new()).await;
        assert_eq!(response.error.unwrap().code, -32602);
    }
}
