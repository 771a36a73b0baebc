// gemini-files-mcp/src/audit.rs
// ============================================================================
// Module: MCP Audit Logging
// Description: Structured audit events for request handling, gating, and transport.
// Purpose: Emit JSON-line diagnostics on stderr without touching the protocol stream.
// Dependencies: gemini-files-core, serde
// ============================================================================

//! ## Overview
//! Stdout carries protocol frames only, so every diagnostic is an audit
//! event written as one JSON line to a sink (stderr by default, a file when
//! configured, or nowhere with `--quiet`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use gemini_files_core::FileOperation;
use gemini_files_core::SafetyMode;
use serde::Serialize;

// ============================================================================
// SECTION: Labels
// ============================================================================

/// Request method classification.
///
/// # Invariants
/// - Variants are stable for audit labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum McpMethod {
    /// `initialize`.
    Initialize,
    /// `tools/list`.
    ToolsList,
    /// `tools/call`.
    ToolsCall,
    /// `notifications/initialized`.
    Initialized,
    /// Unsupported method.
    Other,
}

impl McpMethod {
    /// Classifies a method name.
    #[must_use]
    pub fn from_method(method: &str) -> Self {
        match method {
            "initialize" => Self::Initialize,
            "tools/list" => Self::ToolsList,
            "tools/call" => Self::ToolsCall,
            "notifications/initialized" => Self::Initialized,
            _ => Self::Other,
        }
    }

    /// Returns a stable label for the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::ToolsList => "tools/list",
            Self::ToolsCall => "tools/call",
            Self::Initialized => "notifications/initialized",
            Self::Other => "other",
        }
    }
}

/// Request outcome classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum McpOutcome {
    /// Success response sent.
    Ok,
    /// Error response sent.
    Error,
    /// Notification handled; nothing sent.
    NoResponse,
}

// ============================================================================
// SECTION: Events
// ============================================================================

/// Returns milliseconds since the Unix epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

/// Per-request audit event.
#[derive(Debug, Clone, Serialize)]
pub struct McpAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Request id rendered as text, when present.
    pub request_id: Option<String>,
    /// Method classification.
    pub method: McpMethod,
    /// Tool name for `tools/call`.
    pub tool: Option<String>,
    /// Outcome.
    pub outcome: McpOutcome,
    /// JSON-RPC error code when present.
    pub error_code: Option<i64>,
    /// Failure code (`VALIDATION_ERROR`, ...) for tool failures.
    pub error_kind: Option<&'static str>,
    /// Safety mode the server runs under.
    pub safety_mode: SafetyMode,
}

/// Inputs required to construct a request audit event.
#[derive(Debug, Clone)]
pub struct McpAuditEventParams {
    /// Request id rendered as text, when present.
    pub request_id: Option<String>,
    /// Method classification.
    pub method: McpMethod,
    /// Tool name for `tools/call`.
    pub tool: Option<String>,
    /// Outcome.
    pub outcome: McpOutcome,
    /// JSON-RPC error code when present.
    pub error_code: Option<i64>,
    /// Failure code for tool failures.
    pub error_kind: Option<&'static str>,
    /// Safety mode the server runs under.
    pub safety_mode: SafetyMode,
}

impl McpAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: McpAuditEventParams) -> Self {
        Self {
            event: "mcp_request",
            timestamp_ms: now_ms(),
            request_id: params.request_id,
            method: params.method,
            tool: params.tool,
            outcome: params.outcome,
            error_code: params.error_code,
            error_kind: params.error_kind,
            safety_mode: params.safety_mode,
        }
    }
}

/// Safety gate decision event for mutating tool calls.
#[derive(Debug, Clone, Serialize)]
pub struct SafetyAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Gated operation.
    pub operation: FileOperation,
    /// Active mode.
    pub safety_mode: SafetyMode,
    /// Whether the caller confirmed.
    pub confirmed: bool,
    /// Whether the gate allowed the call.
    pub allowed: bool,
}

impl SafetyAuditEvent {
    /// Creates a new safety decision event.
    #[must_use]
    pub fn new(operation: FileOperation, safety_mode: SafetyMode, confirmed: bool, allowed: bool) -> Self {
        Self {
            event: "safety_decision",
            timestamp_ms: now_ms(),
            operation,
            safety_mode,
            confirmed,
            allowed,
        }
    }
}

/// Transport-level diagnostic event.
#[derive(Debug, Clone, Serialize)]
pub struct TransportAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Diagnostic kind (`frame_stalled_at_eof`, `frame_too_large`, ...).
    pub kind: &'static str,
    /// Decoder stall label when relevant.
    pub stall: Option<&'static str>,
    /// Byte count relevant to the diagnostic.
    pub bytes: usize,
    /// Optional message.
    pub message: Option<String>,
}

impl TransportAuditEvent {
    /// Creates a new transport event.
    #[must_use]
    pub fn new(
        kind: &'static str,
        stall: Option<&'static str>,
        bytes: usize,
        message: Option<String>,
    ) -> Self {
        Self {
            event: "transport",
            timestamp_ms: now_ms(),
            kind,
            stall,
            bytes,
            message,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for MCP events.
pub trait McpAuditSink: Send + Sync {
    /// Record a request event.
    fn record(&self, event: &McpAuditEvent);

    /// Record a safety decision.
    fn record_safety(&self, _event: &SafetyAuditEvent) {}

    /// Record a transport diagnostic.
    fn record_transport(&self, _event: &TransportAuditEvent) {}
}

/// Writes one serialized event as a line.
fn write_line(writer: &mut impl Write, event: &impl Serialize) {
    if let Ok(payload) = serde_json::to_string(event) {
        let _ = writeln!(writer, "{payload}");
        let _ = writer.flush();
    }
}

/// Audit sink that logs JSON lines to stderr.
pub struct McpStderrAuditSink;

impl McpAuditSink for McpStderrAuditSink {
    fn record(&self, event: &McpAuditEvent) {
        write_line(&mut io::stderr(), event);
    }

    fn record_safety(&self, event: &SafetyAuditEvent) {
        write_line(&mut io::stderr(), event);
    }

    fn record_transport(&self, event: &TransportAuditEvent) {
        write_line(&mut io::stderr(), event);
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct McpFileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl McpFileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Writes an event under the file lock.
    fn append(&self, event: &impl Serialize) {
        if let Ok(mut file) = self.file.lock() {
            write_line(&mut *file, event);
        }
    }
}

impl McpAuditSink for McpFileAuditSink {
    fn record(&self, event: &McpAuditEvent) {
        self.append(event);
    }

    fn record_safety(&self, event: &SafetyAuditEvent) {
        self.append(event);
    }

    fn record_transport(&self, event: &TransportAuditEvent) {
        self.append(event);
    }
}

/// No-op audit sink.
pub struct McpNoopAuditSink;

impl McpAuditSink for McpNoopAuditSink {
    fn record(&self, _event: &McpAuditEvent) {}
}
