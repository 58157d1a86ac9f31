//! MCP stdio server: one JSON-RPC message per line in, one per line out

use anyhow::{Context, Result};
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use hive_core::Hive;

use crate::protocol::*;
use crate::tools::ToolRouter;

/// Identity reported in the `initialize` result
#[derive(Debug, Clone)]
struct ServerInfo {
    name: String,
    version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: "hive".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Owns the hive and handles requests strictly one at a time
pub struct McpServer {
    hive: Hive,
    router: ToolRouter,
    info: ServerInfo,
}

impl McpServer {
    pub fn new(hive: Hive, router: ToolRouter) -> Self {
        Self {
            hive,
            router,
            info: ServerInfo::default(),
        }
    }

    pub fn hive(&self) -> &Hive {
        &self.hive
    }

    /// Serve on the process's stdin/stdout until EOF or cancellation
    pub async fn serve_stdio(&mut self, cancel: CancellationToken) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout, cancel).await
    }

    /// Read requests line by line and write each response as one line.
    ///
    /// Returns on EOF or when `cancel` fires. Only I/O failures on the
    /// transport itself are returned as errors.
    pub async fn serve<R, W>(&mut self, mut reader: R, mut writer: W, cancel: CancellationToken) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("MCP server '{}' v{} ready on stdio", self.info.name, self.info.version);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("MCP server shutting down");
                    break;
                }
                read = reader.read_until(b'\n', &mut buf) => read.context("Failed to read request line")?,
            };

            if read == 0 {
                info!("stdin closed, MCP server exiting");
                break;
            }

            let response = match std::str::from_utf8(&buf) {
                Ok(line) => self.handle_line(line).await,
                Err(e) => {
                    warn!("Request line is not valid UTF-8: {}", e);
                    Some(JsonRpcResponse::err(
                        Value::Null,
                        ERR_PARSE,
                        format!("Parse error: request is not valid UTF-8: {}", e),
                    ))
                }
            };

            if let Some(response) = response {
                write_response(&mut writer, &response).await?;
            }
        }

        Ok(())
    }

    /// Handle one raw line. `None` means nothing should be written back.
    pub async fn handle_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let raw: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                warn!("Unparsable request line: {}", e);
                return Some(JsonRpcResponse::err(
                    Value::Null,
                    ERR_PARSE,
                    format!("Parse error: {}", e),
                ));
            }
        };

        let id = raw.get("id").cloned();
        match serde_json::from_value::<JsonRpcRequest>(raw) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                warn!("Invalid request: {}", e);
                Some(JsonRpcResponse::err(
                    id.unwrap_or(Value::Null),
                    ERR_INVALID_REQUEST,
                    format!("Invalid request: {}", e),
                ))
            }
        }
    }

    pub async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!("MCP request: {}", request.method);

        let Some(id) = request.id else {
            if request.method != methods::INITIALIZED {
                debug!("Ignoring notification: {}", request.method);
            }
            return None;
        };

        let response = match request.method.as_str() {
            methods::INITIALIZE => JsonRpcResponse::ok(id, self.initialize_result(&request.params)),
            methods::PING => JsonRpcResponse::ok(id, json!({})),
            methods::TOOLS_LIST => JsonRpcResponse::ok(id, json!({"tools": self.router.list_tools()})),
            methods::TOOLS_CALL => match serde_json::from_value::<CallToolParams>(request.params) {
                Ok(params) => {
                    let output = self
                        .router
                        .dispatch(&mut self.hive, &params.name, params.arguments)
                        .await;
                    let result = CallToolResult::text(output.text, output.is_error);
                    match serde_json::to_value(&result) {
                        Ok(value) => JsonRpcResponse::ok(id, value),
                        Err(e) => JsonRpcResponse::err(
                            id,
                            ERR_INTERNAL,
                            format!("Failed to encode tool result: {}", e),
                        ),
                    }
                }
                Err(e) => JsonRpcResponse::err(
                    id,
                    ERR_INVALID_PARAMS,
                    format!("Invalid tools/call params: {}", e),
                ),
            },
            other => {
                warn!("Unknown MCP method: {}", other);
                JsonRpcResponse::err(id, ERR_METHOD_NOT_FOUND, format!("Method not found: {}", other))
            }
        };
        Some(response)
    }

    fn initialize_result(&self, params: &Value) -> Value {
        let protocol_version = params
            .get("protocolVersion")
            .and_then(Value::as_str)
            .unwrap_or(PROTOCOL_VERSION);
        json!({
            "protocolVersion": protocol_version,
            "capabilities": {"tools": {}},
            "serverInfo": {
                "name": self.info.name,
                "version": self.info.version,
            },
        })
    }
}

async fn write_response<W: AsyncWrite + Unpin>(writer: &mut W, response: &JsonRpcResponse) -> Result<()> {
    let mut frame = serde_json::to_string(response).context("Failed to serialize response")?;
    frame.push('\n');
    writer
        .write_all(frame.as_bytes())
        .await
        .context("Failed to write response")?;
    writer.flush().await.context("Failed to flush response")
}
