//! Stdio MCP server.
//!
//! Reads newline-delimited JSON-RPC messages, dispatches them to the
//! [`ToolGateway`], and writes one response line per request.

use serde::Serialize;
use serde_json::{Value, json};
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use super::gateway::ToolGateway;
use super::types::{
    Implementation, InitializeResult, JsonRpcRequest, JsonRpcResponse, ListToolsResult,
    PROTOCOL_VERSION, ServerCapabilities, ToolCallParams, error_codes,
};

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "telegram_mcp_server";

/// MCP server exposing the tool gateway.
#[derive(Debug, Clone)]
pub struct McpServer {
    gateway: ToolGateway,
}

impl McpServer {
    /// Creates a new server.
    #[must_use]
    pub const fn new(gateway: ToolGateway) -> Self {
        Self { gateway }
    }

    /// Serves requests over the process's stdin/stdout until EOF.
    pub async fn run_stdio(&self) -> io::Result<()> {
        info!("Starting MCP server using stdio transport");

        let reader = BufReader::new(io::stdin());
        let mut writer = io::stdout();
        self.serve(reader, &mut writer).await?;

        info!("MCP server shutting down");
        Ok(())
    }

    /// Serves requests read from `reader`, writing responses to `writer`.
    pub async fn serve<R, W>(&self, mut reader: R, writer: &mut W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            let response = match std::str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.handle_line(line.trim()).await,
                Err(e) => {
                    warn!("Received non UTF-8 input: {}", e);
                    Some(parse_error(&e))
                }
            };

            if let Some(response) = response {
                let encoded = serde_json::to_string(&response).map_err(io::Error::other)?;
                writer.write_all(encoded.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        debug!("Input stream closed");
        Ok(())
    }

    /// Handles one raw line. Returns `None` for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to parse message: {}", e);
                return Some(parse_error(&e));
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                warn!("Invalid JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::failure(
                    id,
                    error_codes::INVALID_REQUEST,
                    format!("Invalid request: {e}"),
                ));
            }
        };

        if request.is_notification() {
            debug!("Notification: {}", request.method);
            return None;
        }

        Some(self.handle_request(request).await)
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.unwrap_or(Value::Null);
        debug!("Request {}: {}", id, request.method);

        match request.method.as_str() {
            "initialize" => respond(id, &initialize_result()),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => respond(
                id,
                &ListToolsResult {
                    tools: ToolGateway::list_tools(),
                },
            ),
            "tools/call" => {
                let params = match request
                    .params
                    .map(serde_json::from_value::<ToolCallParams>)
                    .transpose()
                {
                    Ok(Some(params)) => params,
                    Ok(None) => {
                        return JsonRpcResponse::failure(
                            id,
                            error_codes::INVALID_PARAMS,
                            "Invalid params: missing tool call parameters",
                        );
                    }
                    Err(e) => {
                        return JsonRpcResponse::failure(
                            id,
                            error_codes::INVALID_PARAMS,
                            format!("Invalid params: {e}"),
                        );
                    }
                };

                info!("Tool call: {}", params.name);
                let arguments = params.arguments.unwrap_or_else(|| json!({}));
                let result = self.gateway.invoke(&params.name, &arguments).await;
                respond(id, &result)
            }
            method => {
                warn!("Method not found: {}", method);
                JsonRpcResponse::failure(
                    id,
                    error_codes::METHOD_NOT_FOUND,
                    format!("Method not found: {method}"),
                )
            }
        }
    }
}

fn initialize_result() -> InitializeResult {
    InitializeResult {
        protocol_version: PROTOCOL_VERSION.to_owned(),
        capabilities: ServerCapabilities::default(),
        server_info: Implementation {
            name: SERVER_NAME.to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
        },
    }
}

fn parse_error(detail: &dyn std::fmt::Display) -> JsonRpcResponse {
    JsonRpcResponse::failure(
        Value::Null,
        error_codes::PARSE_ERROR,
        format!("Parse error: {detail}"),
    )
}

fn respond<T: Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => {
            error!("Failed to encode result: {}", e);
            JsonRpcResponse::failure(
                id,
                error_codes::INTERNAL_ERROR,
                format!("Internal error: {e}"),
            )
        }
    }
}
