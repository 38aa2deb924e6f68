//! MCP server over newline-delimited JSON-RPC on stdio.
//!
//! One [`Session`] is created per connection and threaded through every
//! request on it; the context gate lives there and nowhere else.

use std::sync::Arc;

use kube_lint_core::{CommandRunner, ContextGate, Timeouts};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::protocol::{
    text_result, JsonRpcRequest, JsonRpcResponse, INVALID_PARAMS, INVALID_REQUEST,
    JSONRPC_VERSION, METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION,
};
use crate::tools::{tool_definitions, ToolCall, ToolName};

pub const SERVER_NAME: &str = "kube-lint-mcp";

/// Per-connection state.
#[derive(Debug, Default)]
pub struct Session {
    pub gate: ContextGate,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gate(gate: ContextGate) -> Self {
        Self { gate }
    }
}

/// Stateless request handler; all mutable state is in the [`Session`].
#[derive(Clone)]
pub struct KubeLintServer {
    pub(crate) runner: Arc<dyn CommandRunner>,
    pub(crate) timeouts: Timeouts,
}

impl KubeLintServer {
    pub fn new(runner: Arc<dyn CommandRunner>, timeouts: Timeouts) -> Self {
        Self { runner, timeouts }
    }

    pub fn server_info() -> Value {
        json!({
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION")
        })
    }

    /// Handle one raw protocol line. Returns `None` for notifications.
    pub async fn handle_line(&self, session: &mut Session, line: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => self.handle_request(session, request).await,
            Err(e) => {
                error!(error = %e, "Failed to parse request");
                Some(JsonRpcResponse::error(
                    None,
                    PARSE_ERROR,
                    format!("Parse error: {e}"),
                ))
            }
        }
    }

    /// Handle an incoming JSON-RPC request.
    pub async fn handle_request(
        &self,
        session: &mut Session,
        request: JsonRpcRequest,
    ) -> Option<JsonRpcResponse> {
        debug!(method = %request.method, "Handling MCP request");

        if request.is_notification() {
            debug!(method = %request.method, "Ignoring notification");
            return None;
        }
        let id = request.id;

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                id,
                INVALID_REQUEST,
                format!("Unsupported jsonrpc version: {}", request.jsonrpc),
            ));
        }

        let response = match request.method.as_str() {
            "initialize" => {
                info!("MCP session initialized");
                JsonRpcResponse::success(
                    id,
                    json!({
                        "protocolVersion": PROTOCOL_VERSION,
                        "capabilities": { "tools": { "listChanged": false } },
                        "serverInfo": Self::server_info()
                    }),
                )
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, json!({ "tools": tool_definitions() })),
            "tools/call" => self.handle_tools_call(session, id, request.params).await,
            other => {
                warn!(method = %other, "Unknown method");
                JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("Method not found: {other}"))
            }
        };
        Some(response)
    }

    async fn handle_tools_call(
        &self,
        session: &mut Session,
        id: Option<Value>,
        params: Value,
    ) -> JsonRpcResponse {
        #[derive(Debug, Deserialize)]
        struct ToolCallParams {
            name: String,
            #[serde(default)]
            arguments: Value,
        }

        let params: ToolCallParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {e}"))
            }
        };

        let text = self.call_tool(session, &params.name, &params.arguments).await;
        JsonRpcResponse::success(id, text_result(text))
    }

    /// Run a tool and return its report text.
    ///
    /// Every failure, including an unknown tool, is reported as text.
    pub async fn call_tool(&self, session: &mut Session, name: &str, arguments: &Value) -> String {
        let Some(tool) = ToolName::from_name(name) else {
            warn!(tool = %name, "Unknown tool");
            return format!("Unknown tool: {name}");
        };
        debug!(tool = %name, "Calling tool");

        let context = if tool.requires_context() {
            match session.gate.require() {
                Ok(ctx) => Some(ctx.to_string()),
                Err(e) => return e.to_string(),
            }
        } else {
            None
        };

        let call = match ToolCall::parse(tool, arguments) {
            Ok(call) => call,
            Err(e) => return e.to_string(),
        };

        self.dispatch(session, call, context.as_deref().unwrap_or_default())
            .await
    }

    /// Read requests from `reader` until EOF, writing one response line per
    /// request to `writer`.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut session = Session::new();
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            debug!(request = %line, "Received request");

            let Some(response) = self.handle_line(&mut session, line).await else {
                continue;
            };
            let response_json = serde_json::to_string(&response)?;
            debug!(response = %response_json, "Sending response");

            writer.write_all(response_json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        info!("MCP server shutdown");
        Ok(())
    }

    /// Run the MCP server over stdio.
    pub async fn serve_stdio(&self) -> std::io::Result<()> {
        info!("MCP server listening on stdio");
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }
}
