// gemini-files-mcp/src/lib.rs
// ============================================================================
// Module: Gemini Files MCP
// Description: JSON-RPC over stdio tool server for Gemini Files.
// Purpose: Expose gated file operations as MCP tools.
// Dependencies: gemini-files-core, async-trait, bytes, tokio
// ============================================================================

//! ## Overview
//! Gemini Files MCP serves the five `files_*` tools over Content-Length
//! framed JSON-RPC on stdio. The crate is layered bottom-up:
//! [`framing`] recovers message boundaries, [`transport`] runs the ordered
//! read-dispatch-write loop, [`server`] implements the method state machine,
//! and [`tools`] gates and routes each call onto a
//! [`gemini_files_core::FilesBackend`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod framing;
pub mod jsonrpc;
pub mod server;
pub mod tools;
pub mod transport;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::McpAuditEvent;
pub use audit::McpAuditSink;
pub use audit::McpFileAuditSink;
pub use audit::McpNoopAuditSink;
pub use audit::McpStderrAuditSink;
pub use framing::DEFAULT_MAX_BODY_BYTES;
pub use framing::FrameDecoder;
pub use jsonrpc::JsonRpcRequest;
pub use jsonrpc::JsonRpcResponse;
pub use server::McpServer;
pub use server::McpServerError;
pub use tools::ToolRouter;
pub use transport::RequestHandler;
pub use transport::serve_stream;
