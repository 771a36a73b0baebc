// gemini-files-mcp/src/tools.rs
// ============================================================================
// Module: MCP Tool Router
// Description: Tool catalog and gated dispatch onto the files backend.
// Purpose: Run the safety gate before any side effect and classify every failure.
// Dependencies: gemini-files-core, serde_json, tokio
// ============================================================================

//! ## Overview
//! The router maps the five `files_*` tools onto [`FilesBackend`] calls.
//! Mutating tools consult [`enforce`] with the call's `confirm` argument
//! before their remaining arguments are even parsed, so a policy denial is
//! reported identically whether or not the rest of the call is well formed.
//!
//! Every failure leaves the router as a [`ToolError`] whose
//! [`ToolErrorData`] keeps the failure kind the backend or gate assigned.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use gemini_files_core::ConfirmationSource;
use gemini_files_core::FileOperation;
use gemini_files_core::FilesBackend;
use gemini_files_core::FilesError;
use gemini_files_core::ListFilesInput;
use gemini_files_core::SafetyMode;
use gemini_files_core::UploadFileInput;
use gemini_files_core::safety::enforce;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::audit::McpAuditSink;
use crate::audit::SafetyAuditEvent;

// ============================================================================
// SECTION: Tool Catalog
// ============================================================================

/// Tools exposed by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    /// `files_upload`.
    FilesUpload,
    /// `files_list`.
    FilesList,
    /// `files_get`.
    FilesGet,
    /// `files_delete`.
    FilesDelete,
    /// `files_download`.
    FilesDownload,
}

impl ToolName {
    /// All tools in catalog order.
    pub const ALL: [Self; 5] =
        [Self::FilesUpload, Self::FilesList, Self::FilesGet, Self::FilesDelete, Self::FilesDownload];

    /// Looks up a tool by wire name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FilesUpload => "files_upload",
            Self::FilesList => "files_list",
            Self::FilesGet => "files_get",
            Self::FilesDelete => "files_delete",
            Self::FilesDownload => "files_download",
        }
    }

    /// Returns the backend operation the tool performs.
    #[must_use]
    pub const fn operation(self) -> FileOperation {
        match self {
            Self::FilesUpload => FileOperation::Upload,
            Self::FilesList => FileOperation::List,
            Self::FilesGet => FileOperation::Get,
            Self::FilesDelete => FileOperation::Delete,
            Self::FilesDownload => FileOperation::Download,
        }
    }
}

/// Behavior hints advertised with each tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolAnnotations {
    /// Tool never changes state.
    pub read_only_hint: bool,
    /// Tool may irreversibly remove data.
    pub destructive_hint: bool,
    /// Repeating the call has no additional effect.
    pub idempotent_hint: bool,
    /// Tool talks to an external system.
    pub open_world_hint: bool,
}

/// Catalog entry returned by `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Wire name.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// JSON Schema for the `arguments` object.
    pub input_schema: Value,
    /// Behavior hints.
    pub annotations: ToolAnnotations,
}

impl ToolDefinition {
    /// Builds the catalog entry for `tool`.
    #[must_use]
    pub fn for_tool(tool: ToolName) -> Self {
        let operation = tool.operation();
        let (description, input_schema) = match tool {
            ToolName::FilesUpload => (
                "Upload a file to Gemini Files API.",
                json!({
                    "type": "object",
                    "properties": {
                        "path": {"type": "string"},
                        "displayName": {"type": "string"},
                        "mimeType": {"type": "string"},
                        "confirm": {"type": "boolean"}
                    },
                    "required": ["path"]
                }),
            ),
            ToolName::FilesList => (
                "List files from Gemini Files API.",
                json!({
                    "type": "object",
                    "properties": {
                        "pageSize": {"type": "number"},
                        "pageToken": {"type": "string"}
                    }
                }),
            ),
            ToolName::FilesGet => (
                "Get a file by name.",
                json!({
                    "type": "object",
                    "properties": {"name": {"type": "string"}},
                    "required": ["name"]
                }),
            ),
            ToolName::FilesDelete => (
                "Delete a file by name.",
                json!({
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "confirm": {"type": "boolean"}
                    },
                    "required": ["name"]
                }),
            ),
            ToolName::FilesDownload => (
                "Download a file by name to a local path.",
                json!({
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "outputPath": {"type": "string"},
                        "confirm": {"type": "boolean"}
                    },
                    "required": ["name", "outputPath"]
                }),
            ),
        };
        Self {
            name: tool.as_str(),
            description,
            input_schema,
            annotations: ToolAnnotations {
                read_only_hint: !operation.is_mutating(),
                destructive_hint: matches!(tool, ToolName::FilesDelete),
                idempotent_hint: !matches!(tool, ToolName::FilesUpload),
                open_world_hint: true,
            },
        }
    }
}

/// Returns the full tool catalog.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    ToolName::ALL.into_iter().map(ToolDefinition::for_tool).collect()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Tool invocation failures.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Gate, argument, or backend failure.
    #[error(transparent)]
    Files(#[from] FilesError),
    /// Local filesystem failure.
    #[error("{0}")]
    Io(String),
    /// Result serialization failed.
    #[error("{0}")]
    Serialization(String),
}

/// Structured error payload attached as JSON-RPC error data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolErrorData {
    /// Failure code (`VALIDATION_ERROR`, `AUTH_ERROR`, ...).
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Whether retrying may succeed.
    pub retryable: bool,
    /// Structured context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ToolError {
    /// Returns the failure code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Files(error) => error.code(),
            Self::Io(_) | Self::Serialization(_) => "INTERNAL_ERROR",
        }
    }

    /// Builds the structured payload, preserving the original failure kind.
    #[must_use]
    pub fn data(&self) -> ToolErrorData {
        match self {
            Self::Files(error) => {
                let details = match error.status() {
                    Some(status) => {
                        let mut wrapped = Map::new();
                        wrapped.insert("status".to_string(), Value::from(status));
                        if let Some(details) = error.details() {
                            wrapped.insert("details".to_string(), details.clone());
                        }
                        Some(Value::Object(wrapped))
                    }
                    None => error.details().cloned(),
                };
                ToolErrorData {
                    code: error.code(),
                    message: error.to_string(),
                    retryable: error.retryable(),
                    details,
                }
            }
            Self::Io(message) | Self::Serialization(message) => ToolErrorData {
                code: self.code(),
                message: message.clone(),
                retryable: false,
                details: None,
            },
        }
    }
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Gated dispatcher from tool calls to backend operations.
#[derive(Clone)]
pub struct ToolRouter {
    /// Backend capability implementation.
    backend: Arc<dyn FilesBackend>,
    /// Process-wide safety mode.
    safety_mode: SafetyMode,
    /// Audit sink for gate decisions.
    audit: Arc<dyn McpAuditSink>,
}

impl ToolRouter {
    /// Creates a router.
    #[must_use]
    pub fn new(
        backend: Arc<dyn FilesBackend>,
        safety_mode: SafetyMode,
        audit: Arc<dyn McpAuditSink>,
    ) -> Self {
        Self {
            backend,
            safety_mode,
            audit,
        }
    }

    /// Returns the active safety mode.
    #[must_use]
    pub const fn safety_mode(&self) -> SafetyMode {
        self.safety_mode
    }

    /// Returns the tool catalog.
    #[must_use]
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        tool_definitions()
    }

    /// Invokes a tool and returns its `tools/call` result payload.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when the tool is unknown, the gate denies the
    /// call, arguments are invalid, or the backend fails.
    pub async fn handle_tool_call(&self, name: &str, arguments: &Value) -> Result<Value, ToolError> {
        let tool = ToolName::parse(name)
            .ok_or_else(|| FilesError::validation(format!("Unknown tool: {name}")))?;
        let empty = Map::new();
        let args = match arguments {
            Value::Null => &empty,
            Value::Object(map) => map,
            _ => return Err(FilesError::validation("arguments must be an object").into()),
        };
        self.gate(tool.operation(), args)?;

        match tool {
            ToolName::FilesUpload => {
                let input = UploadFileInput {
                    path: PathBuf::from(required_string(args, "path")?),
                    display_name: optional_string(args, "displayName"),
                    mime_type: optional_string(args, "mimeType"),
                };
                let file = self.backend.upload_file(input).await?;
                tool_result(json!({ "file": file }))
            }
            ToolName::FilesList => {
                let input = ListFilesInput {
                    page_size: args
                        .get("pageSize")
                        .and_then(Value::as_u64)
                        .filter(|size| *size > 0)
                        .and_then(|size| u32::try_from(size).ok()),
                    page_token: optional_string(args, "pageToken"),
                };
                let page = self.backend.list_files(input).await?;
                tool_result(to_value(&page)?)
            }
            ToolName::FilesGet => {
                let name = required_string(args, "name")?;
                let file = self.backend.get_file(&name).await?;
                tool_result(json!({ "file": file }))
            }
            ToolName::FilesDelete => {
                let name = required_string(args, "name")?;
                self.backend.delete_file(&name).await?;
                tool_result(json!({ "ok": true }))
            }
            ToolName::FilesDownload => {
                let name = required_string(args, "name")?;
                let output_path = required_string(args, "outputPath")?;
                let content = self.backend.download_file(&name).await?;
                tokio::fs::write(&output_path, &content)
                    .await
                    .map_err(|err| ToolError::Io(format!("Unable to write {output_path}: {err}")))?;
                tool_result(json!({ "outputPath": output_path, "sizeBytes": content.len() }))
            }
        }
    }

    /// Runs the safety gate and records the decision for mutating operations.
    fn gate(&self, operation: FileOperation, args: &Map<String, Value>) -> Result<(), FilesError> {
        let confirmed = matches!(args.get("confirm"), Some(Value::Bool(true)));
        let outcome =
            enforce(self.safety_mode, operation, confirmed, ConfirmationSource::ConfirmArgument);
        if operation.is_mutating() {
            self.audit.record_safety(&SafetyAuditEvent::new(
                operation,
                self.safety_mode,
                confirmed,
                outcome.is_ok(),
            ));
        }
        outcome
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a required non-empty string argument.
fn required_string(args: &Map<String, Value>, field: &str) -> Result<String, FilesError> {
    match args.get(field) {
        Some(Value::String(value)) if !value.is_empty() => Ok(value.clone()),
        _ => Err(FilesError::validation(format!(
            "{field} is required and must be a non-empty string"
        ))),
    }
}

/// Reads an optional string argument; non-strings are ignored.
fn optional_string(args: &Map<String, Value>, field: &str) -> Option<String> {
    args.get(field).and_then(Value::as_str).map(str::to_string)
}

/// Serializes a payload.
fn to_value(payload: &impl Serialize) -> Result<Value, ToolError> {
    serde_json::to_value(payload).map_err(|err| ToolError::Serialization(err.to_string()))
}

/// Wraps a payload as text content plus structured content.
fn tool_result(payload: Value) -> Result<Value, ToolError> {
    let text =
        serde_json::to_string(&payload).map_err(|err| ToolError::Serialization(err.to_string()))?;
    Ok(json!({
        "content": [{ "type": "text", "text": text }],
        "structuredContent": payload,
    }))
}
