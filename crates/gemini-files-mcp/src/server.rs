// gemini-files-mcp/src/server.rs
// ============================================================================
// Module: MCP Server
// Description: JSON-RPC method dispatch for the Gemini Files tool server.
// Purpose: Answer the handshake, publish the catalog, and route tool calls.
// Dependencies: gemini-files-core, serde_json
// ============================================================================

//! ## Overview
//! [`McpServer`] is the [`RequestHandler`] behind the stdio transport:
//!
//! - `initialize` returns static protocol, capability, and server info.
//! - `tools/list` returns the static catalog.
//! - `tools/call` routes through [`ToolRouter`], which gates mutating tools.
//! - `notifications/initialized` is acknowledged silently.
//! - Anything else is a `-32601` error response.
//!
//! Requests without an `id` member are notifications: they are dispatched
//! but no response is ever written for them. Every request is audited.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use gemini_files_core::FilesError;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;

use crate::audit::McpAuditEvent;
use crate::audit::McpAuditEventParams;
use crate::audit::McpAuditSink;
use crate::audit::McpMethod;
use crate::audit::McpOutcome;
use crate::jsonrpc::JsonRpcError;
use crate::jsonrpc::JsonRpcRequest;
use crate::jsonrpc::JsonRpcResponse;
use crate::jsonrpc::METHOD_NOT_FOUND;
use crate::jsonrpc::TOOL_ERROR;
use crate::tools::ToolError;
use crate::tools::ToolRouter;
use crate::transport::RequestHandler;
use crate::transport::serve_stdio;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Protocol revision reported by `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name reported by `initialize`.
pub const SERVER_NAME: &str = "gemini-files-mcp";

/// Server version reported by `initialize`.
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// SECTION: Server
// ============================================================================

/// Tool call parameters.
#[derive(Debug, Deserialize)]
struct ToolCallParams {
    /// Tool name.
    #[serde(default)]
    name: Option<Value>,
    /// Raw JSON arguments.
    #[serde(default)]
    arguments: Value,
}

/// Handler outcome before it is shaped into a response.
enum Reply {
    /// Success payload.
    Result(Value),
    /// Error payload.
    Error(JsonRpcError, Option<&'static str>),
    /// Nothing to send.
    Silent,
}

/// MCP server bound to one tool router.
#[derive(Clone)]
pub struct McpServer {
    /// Tool router for `tools/call`.
    router: ToolRouter,
    /// Audit sink for request events.
    audit: Arc<dyn McpAuditSink>,
}

impl McpServer {
    /// Creates a server from a router and audit sink.
    #[must_use]
    pub fn new(router: ToolRouter, audit: Arc<dyn McpAuditSink>) -> Self {
        Self {
            router,
            audit,
        }
    }

    /// Serves requests on stdin/stdout until end of input.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError::Transport`] on stream failures or oversized frames.
    pub async fn serve(&self, max_body_bytes: usize) -> Result<(), McpServerError> {
        serve_stdio(self, self.audit.as_ref(), max_body_bytes).await
    }

    /// Runs the method state machine.
    async fn dispatch(&self, method: &str, params: Option<Value>) -> (Reply, Option<String>) {
        match method {
            "initialize" => (
                Reply::Result(json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": { "tools": {} },
                    "serverInfo": { "name": SERVER_NAME, "version": SERVER_VERSION },
                })),
                None,
            ),
            "tools/list" => (Reply::Result(json!({ "tools": self.router.list_tools() })), None),
            "tools/call" => self.call_tool(params).await,
            "notifications/initialized" => (Reply::Silent, None),
            other => (
                Reply::Error(
                    JsonRpcError::new(METHOD_NOT_FOUND, format!("Method not found: {other}")),
                    None,
                ),
                None,
            ),
        }
    }

    /// Handles `tools/call`, converting failures into structured error data.
    async fn call_tool(&self, params: Option<Value>) -> (Reply, Option<String>) {
        let params: ToolCallParams = match params {
            Some(value @ Value::Object(_)) => match serde_json::from_value(value) {
                Ok(params) => params,
                Err(err) => {
                    return (tool_failure(&ToolError::Serialization(err.to_string())), None);
                }
            },
            _ => ToolCallParams {
                name: None,
                arguments: Value::Null,
            },
        };
        let name = match params.name {
            Some(Value::String(name)) if !name.is_empty() => name,
            _ => {
                let error =
                    FilesError::validation("name is required and must be a non-empty string");
                return (tool_failure(&ToolError::Files(error)), None);
            }
        };
        let reply = match self.router.handle_tool_call(&name, &params.arguments).await {
            Ok(result) => Reply::Result(result),
            Err(error) => tool_failure(&error),
        };
        (reply, Some(name))
    }
}

/// Shapes a tool failure as a `-32000` error with structured data.
fn tool_failure(error: &ToolError) -> Reply {
    let data = error.data();
    let payload = serde_json::to_value(&data).unwrap_or(Value::Null);
    Reply::Error(JsonRpcError::new(TOOL_ERROR, data.message).with_data(payload), Some(data.code))
}

#[async_trait]
impl RequestHandler for McpServer {
    async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let notification = request.is_notification();
        let id = request.response_id();
        let method = McpMethod::from_method(&request.method);
        let (reply, tool) = self.dispatch(&request.method, request.params).await;
        let (response, outcome, error_code, error_kind) = match reply {
            Reply::Result(result) => {
                (Some(JsonRpcResponse::success(id.clone(), result)), McpOutcome::Ok, None, None)
            }
            Reply::Error(error, kind) => {
                let code = error.code;
                (
                    Some(JsonRpcResponse::failure(id.clone(), error)),
                    McpOutcome::Error,
                    Some(code),
                    kind,
                )
            }
            Reply::Silent => (None, McpOutcome::NoResponse, None, None),
        };
        let outcome = if notification { McpOutcome::NoResponse } else { outcome };
        self.audit.record(&McpAuditEvent::new(McpAuditEventParams {
            request_id: id.as_ref().map(ToString::to_string),
            method,
            tool,
            outcome,
            error_code,
            error_kind,
            safety_mode: self.router.safety_mode(),
        }));
        if notification { None } else { response }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// MCP server errors.
#[derive(Debug, thiserror::Error)]
pub enum McpServerError {
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}
