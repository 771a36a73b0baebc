// gemini-files-mcp/src/jsonrpc.rs
// ============================================================================
// Module: JSON-RPC Envelopes
// Description: JSON-RPC 2.0 request, response, and error payloads.
// Purpose: Type the correlation structures exchanged over the stdio transport.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Requests carry an optional id; a request without one is a notification
//! and is never answered. An explicit `"id": null` is still a request and is
//! answered with a `null` id. Responses echo the id exactly as received, or
//! `null` when the request could not be read far enough to recover one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Number;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Protocol version string.
pub const JSONRPC_VERSION: &str = "2.0";
/// Body is not valid JSON.
pub const PARSE_ERROR: i64 = -32700;
/// Body is JSON but not a valid request.
pub const INVALID_REQUEST: i64 = -32600;
/// Unknown method.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Tool invocation failed.
pub const TOOL_ERROR: i64 = -32000;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Request correlation id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric id, kept as received (integer, unsigned, or float).
    Number(Number),
    /// String id.
    String(String),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
        }
    }
}

/// Incoming request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version; must be `2.0`.
    pub jsonrpc: String,
    /// Correlation id: `None` when the member is absent (a notification),
    /// `Some(None)` for an explicit `null`.
    #[serde(default, deserialize_with = "deserialize_present_id")]
    pub id: Option<Option<RequestId>>,
    /// Method name.
    pub method: String,
    /// Optional parameters.
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Returns true when no response is expected.
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Returns the id to echo in the response.
    #[must_use]
    pub fn response_id(&self) -> Option<RequestId> {
        self.id.clone().flatten()
    }
}

/// Marks a present `id` member, including `null`, as `Some`.
fn deserialize_present_id<'de, D>(deserializer: D) -> Result<Option<Option<RequestId>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RequestId>::deserialize(deserializer).map(Some)
}

/// Outgoing response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcResponse {
    /// Protocol version.
    pub jsonrpc: &'static str,
    /// Echoed id, `null` when unknown.
    pub id: Option<RequestId>,
    /// Success payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Builds a success response.
    #[must_use]
    pub const fn success(id: Option<RequestId>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Builds a failure response.
    #[must_use]
    pub const fn failure(id: Option<RequestId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// Failure payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
    /// Structured detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Builds an error without data.
    #[must_use]
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Attaches structured data.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Validates a decoded JSON value as a request envelope.
///
/// # Errors
///
/// Returns an `Invalid Request` error (code -32600) when the value is not a
/// request object or declares a protocol version other than `2.0`.
pub fn parse_request(value: Value) -> Result<JsonRpcRequest, JsonRpcError> {
    let request: JsonRpcRequest = serde_json::from_value(value)
        .map_err(|err| JsonRpcError::new(INVALID_REQUEST, format!("Invalid Request: {err}")))?;
    if request.jsonrpc != JSONRPC_VERSION {
        return Err(JsonRpcError::new(
            INVALID_REQUEST,
            format!("Invalid Request: unsupported jsonrpc version {}", request.jsonrpc),
        ));
    }
    Ok(request)
}
