// gemini-files-mcp/tests/common/mod.rs
// ============================================================================
// Module: MCP Test Support
// Description: In-memory backend and audit sink for integration tests.
// Purpose: Drive the router and server without network access.
// Dependencies: gemini-files-core, gemini-files-mcp
// ============================================================================

#![allow(dead_code, reason = "Each test binary uses a different subset of helpers.")]

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use gemini_files_core::FileResource;
use gemini_files_core::FilesBackend;
use gemini_files_core::FilesError;
use gemini_files_core::ListFilesInput;
use gemini_files_core::ListFilesOutput;
use gemini_files_core::SafetyMode;
use gemini_files_core::UploadFileInput;
use gemini_files_mcp::McpAuditEvent;
use gemini_files_mcp::McpAuditSink;
use gemini_files_mcp::McpServer;
use gemini_files_mcp::ToolRouter;
use gemini_files_mcp::audit::SafetyAuditEvent;
use gemini_files_mcp::audit::TransportAuditEvent;

/// Backend that records calls and answers from fixed data.
#[derive(Default)]
pub struct FakeBackend {
    /// Operation labels in call order.
    pub calls: Mutex<Vec<String>>,
    /// Failure returned by every operation when set.
    pub failure: Option<FilesError>,
    /// Bytes returned by downloads.
    pub content: Vec<u8>,
}

impl FakeBackend {
    /// Creates a backend that fails every call with `error`.
    pub fn failing(error: FilesError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Returns recorded call labels.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Records a call and returns the configured failure, if any.
    fn enter(&self, label: String) -> Result<(), FilesError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(label);
        }
        self.failure.clone().map_or(Ok(()), Err)
    }
}

/// Builds a file resource with the given name.
pub fn file(name: &str) -> FileResource {
    FileResource {
        name: name.to_string(),
        display_name: Some("notes".to_string()),
        mime_type: Some("text/plain".to_string()),
        ..FileResource::default()
    }
}

#[async_trait]
impl FilesBackend for FakeBackend {
    async fn upload_file(&self, input: UploadFileInput) -> Result<FileResource, FilesError> {
        self.enter(format!("upload:{}", input.path.display()))?;
        Ok(file("files/uploaded"))
    }

    async fn list_files(&self, input: ListFilesInput) -> Result<ListFilesOutput, FilesError> {
        self.enter(format!("list:{:?}", input.page_size))?;
        Ok(ListFilesOutput {
            files: vec![file("files/a"), file("files/b")],
            next_page_token: Some("next".to_string()),
        })
    }

    async fn get_file(&self, name: &str) -> Result<FileResource, FilesError> {
        self.enter(format!("get:{name}"))?;
        Ok(file(name))
    }

    async fn delete_file(&self, name: &str) -> Result<(), FilesError> {
        self.enter(format!("delete:{name}"))
    }

    async fn download_file(&self, name: &str) -> Result<Bytes, FilesError> {
        self.enter(format!("download:{name}"))?;
        Ok(Bytes::from(self.content.clone()))
    }
}

/// Audit sink that keeps every event in memory.
#[derive(Default)]
pub struct MemoryAuditSink {
    /// Request events.
    pub requests: Mutex<Vec<McpAuditEvent>>,
    /// Safety gate events.
    pub safety: Mutex<Vec<SafetyAuditEvent>>,
    /// Transport events.
    pub transport: Mutex<Vec<TransportAuditEvent>>,
}

impl MemoryAuditSink {
    /// Returns the recorded transport event kinds.
    pub fn transport_kinds(&self) -> Vec<&'static str> {
        self.transport
            .lock()
            .map(|events| events.iter().map(|event| event.kind).collect())
            .unwrap_or_default()
    }
}

impl McpAuditSink for MemoryAuditSink {
    fn record(&self, event: &McpAuditEvent) {
        if let Ok(mut events) = self.requests.lock() {
            events.push(event.clone());
        }
    }

    fn record_safety(&self, event: &SafetyAuditEvent) {
        if let Ok(mut events) = self.safety.lock() {
            events.push(event.clone());
        }
    }

    fn record_transport(&self, event: &TransportAuditEvent) {
        if let Ok(mut events) = self.transport.lock() {
            events.push(event.clone());
        }
    }
}

/// Builds a server over `backend` in `mode`, returning the shared audit sink.
pub fn server(backend: Arc<FakeBackend>, mode: SafetyMode) -> (McpServer, Arc<MemoryAuditSink>) {
    let audit = Arc::new(MemoryAuditSink::default());
    let router = ToolRouter::new(backend, mode, audit.clone());
    (McpServer::new(router, audit.clone()), audit)
}
