// gemini-files-mcp/src/main.rs
// ============================================================================
// Module: Gemini Files MCP Entry Point
// Description: Startup resolution and stdio serving for the tool server.
// Purpose: Resolve configuration once, then serve until stdin closes.
// Dependencies: clap, gemini-files-core, gemini-files-mcp, tokio
// ============================================================================

//! ## Overview
//! The binary reads flags and the process environment exactly once, builds
//! the HTTP backend and the router, and serves framed JSON-RPC on stdio.
//! Stdout is reserved for protocol frames; diagnostics go to stderr.
//!
//! Exit codes: 0 on clean end of input or help, 2 on invalid startup
//! configuration or usage, 1 on any other failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use clap::error::ErrorKind as ClapErrorKind;
use gemini_files_core::EnvSnapshot;
use gemini_files_core::ErrorKind;
use gemini_files_core::FilesError;
use gemini_files_core::GeminiFilesClient;
use gemini_files_core::StartupOptions;
use gemini_files_core::resolve_startup_config;
use gemini_files_mcp::DEFAULT_MAX_BODY_BYTES;
use gemini_files_mcp::McpAuditSink;
use gemini_files_mcp::McpFileAuditSink;
use gemini_files_mcp::McpNoopAuditSink;
use gemini_files_mcp::McpServer;
use gemini_files_mcp::McpServerError;
use gemini_files_mcp::McpStderrAuditSink;
use gemini_files_mcp::ToolRouter;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Exit code for invalid configuration or usage.
const EXIT_VALIDATION: u8 = 2;

/// Command-line flags.
#[derive(Parser, Debug)]
#[command(name = "gemini-files-mcp", version, about = "Gemini Files MCP server over stdio")]
struct Cli {
    /// API key (falls back to `GEMINI_API_KEY`, then `GOOGLE_API_KEY`).
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,
    /// API base URL (falls back to `GEMINI_BASE_URL`).
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
    /// Request timeout in milliseconds (falls back to `GEMINI_TIMEOUT_MS`).
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<String>,
    /// Safety mode: read-only, balanced, or unsafe.
    #[arg(long, value_name = "MODE")]
    safety_mode: Option<String>,
    /// Suppress audit output.
    #[arg(long, conflicts_with = "audit_log")]
    quiet: bool,
    /// Append audit events to this file instead of stderr.
    #[arg(long, value_name = "PATH")]
    audit_log: Option<PathBuf>,
    /// Largest accepted frame body in bytes.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES, value_parser = parse_max_body_bytes)]
    max_body_bytes: usize,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Startup or serving failure with its exit code.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
struct StartupError {
    /// Human-readable message.
    message: String,
    /// Process exit code.
    exit_code: u8,
}

impl From<FilesError> for StartupError {
    fn from(error: FilesError) -> Self {
        let exit_code = if error.kind() == ErrorKind::Validation { EXIT_VALIDATION } else { 1 };
        Self {
            message: error.to_string(),
            exit_code,
        }
    }
}

impl From<McpServerError> for StartupError {
    fn from(error: McpServerError) -> Self {
        Self {
            message: error.to_string(),
            exit_code: 1,
        }
    }
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Server entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            let _ = writeln!(std::io::stderr(), "{err}");
            ExitCode::from(err.exit_code)
        }
    }
}

/// Parses flags, resolves configuration, and serves until end of input.
async fn run() -> Result<ExitCode, StartupError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return Ok(report_clap_error(&err)),
    };
    let options = StartupOptions {
        api_key: cli.api_key,
        base_url: cli.base_url,
        timeout_ms: cli.timeout_ms,
        safety_mode: cli.safety_mode,
    };
    let user_agent = format!("gemini-files-mcp/{}", env!("CARGO_PKG_VERSION"));
    let resolved = resolve_startup_config(&options, &EnvSnapshot::from_process(), &user_agent)?;
    let backend = Arc::new(GeminiFilesClient::new(resolved.client)?);
    let audit: Arc<dyn McpAuditSink> = match (cli.quiet, cli.audit_log) {
        (true, _) => Arc::new(McpNoopAuditSink),
        (false, Some(path)) => Arc::new(McpFileAuditSink::new(&path).map_err(|err| {
            McpServerError::Init(format!("cannot open audit log {}: {err}", path.display()))
        })?),
        (false, None) => Arc::new(McpStderrAuditSink),
    };
    let router = ToolRouter::new(backend, resolved.safety_mode, Arc::clone(&audit));
    McpServer::new(router, audit).serve(cli.max_body_bytes).await?;
    Ok(ExitCode::SUCCESS)
}

/// Prints a clap error or help text and returns the matching exit code.
fn report_clap_error(err: &clap::Error) -> ExitCode {
    let _ = err.print();
    match err.kind() {
        ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => ExitCode::SUCCESS,
        _ => ExitCode::from(EXIT_VALIDATION),
    }
}

/// Parses a positive frame body limit.
fn parse_max_body_bytes(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(format!("max-body-bytes must be a positive integer, got {raw}")),
    }
}
