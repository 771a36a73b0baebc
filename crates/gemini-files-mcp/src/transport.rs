// gemini-files-mcp/src/transport.rs
// ============================================================================
// Module: Stdio Transport
// Description: Read-decode-dispatch-write loop over an async byte stream.
// Purpose: Turn an unframed input stream into ordered request handling.
// Dependencies: async-trait, tokio
// ============================================================================

//! ## Overview
//! [`serve_stream`] owns the only [`FrameDecoder`] for its input. Each read
//! is fed to the decoder; every completed frame is dispatched to the
//! [`RequestHandler`] one at a time, and its response (if any) is written
//! and flushed before the next frame is handled, so responses leave in
//! decode order.
//!
//! End of input ends the loop. Bytes of an unfinished trailing frame are
//! dropped and reported as a `frame_stalled_at_eof` transport audit event.
//! An oversized body declaration or an unterminated oversized header ends
//! the loop with an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use serde_json::json;
use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;

use crate::audit::McpAuditSink;
use crate::audit::TransportAuditEvent;
use crate::framing::DecodeStall;
use crate::framing::DecodedFrame;
use crate::framing::FrameDecoder;
use crate::framing::MAX_HEADER_BYTES;
use crate::framing::encode_frame;
use crate::jsonrpc::JsonRpcError;
use crate::jsonrpc::JsonRpcRequest;
use crate::jsonrpc::JsonRpcResponse;
use crate::jsonrpc::PARSE_ERROR;
use crate::jsonrpc::parse_request;
use crate::server::McpServerError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Read buffer size for each input read.
const READ_CHUNK_BYTES: usize = 64 * 1024;

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Handles one decoded request.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Returns the response to send, or `None` for notifications.
    async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse>;
}

// ============================================================================
// SECTION: Loop
// ============================================================================

/// Serves framed JSON-RPC over `input`/`output` until end of input.
///
/// # Errors
///
/// Returns [`McpServerError::Transport`] when reading or writing fails, a
/// frame declares a body larger than `max_body_bytes`, or a header block runs
/// past [`MAX_HEADER_BYTES`].
pub async fn serve_stream<R, W>(
    mut input: R,
    mut output: W,
    handler: &dyn RequestHandler,
    audit: &dyn McpAuditSink,
    max_body_bytes: usize,
) -> Result<(), McpServerError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut decoder = FrameDecoder::new(max_body_bytes);
    let mut chunk = vec![0u8; READ_CHUNK_BYTES];
    let mut last_stall = DecodeStall::AwaitingHeader;
    loop {
        let read = input
            .read(&mut chunk)
            .await
            .map_err(|err| McpServerError::Transport(format!("stdio read failed: {err}")))?;
        if read == 0 {
            break;
        }
        let batch = decoder.feed(&chunk[..read]);
        for frame in batch.frames {
            if let Some(response) = dispatch_frame(frame, handler, audit).await {
                write_response(&mut output, &response).await?;
            }
        }
        match batch.stall {
            DecodeStall::TooLarge {
                declared,
                limit,
            } => {
                audit.record_transport(&TransportAuditEvent::new(
                    "frame_too_large",
                    Some(batch.stall.as_str()),
                    declared,
                    None,
                ));
                return Err(McpServerError::Transport(format!(
                    "frame body of {declared} bytes exceeds limit of {limit}"
                )));
            }
            DecodeStall::HeaderTooLarge {
                buffered,
            } => {
                audit.record_transport(&TransportAuditEvent::new(
                    "frame_header_too_large",
                    Some(batch.stall.as_str()),
                    buffered,
                    None,
                ));
                return Err(McpServerError::Transport(format!(
                    "frame header exceeds {MAX_HEADER_BYTES} bytes without a terminator"
                )));
            }
            _ => {}
        }
        if batch.stall.is_malformed_header() && batch.stall != last_stall {
            audit.record_transport(&TransportAuditEvent::new(
                "frame_header_invalid",
                Some(batch.stall.as_str()),
                decoder.pending().len(),
                None,
            ));
        }
        last_stall = batch.stall;
    }
    let discarded = decoder.take_pending().len() + decoder.dropped();
    if discarded > 0 {
        audit.record_transport(&TransportAuditEvent::new(
            "frame_stalled_at_eof",
            Some(last_stall.as_str()),
            discarded,
            None,
        ));
    }
    Ok(())
}

/// Serves framed JSON-RPC over the process's stdin and stdout.
///
/// # Errors
///
/// Returns [`McpServerError::Transport`] on stream failures.
pub async fn serve_stdio(
    handler: &dyn RequestHandler,
    audit: &dyn McpAuditSink,
    max_body_bytes: usize,
) -> Result<(), McpServerError> {
    serve_stream(tokio::io::stdin(), tokio::io::stdout(), handler, audit, max_body_bytes).await
}

/// Converts one frame into the response to send, if any.
async fn dispatch_frame(
    frame: DecodedFrame,
    handler: &dyn RequestHandler,
    audit: &dyn McpAuditSink,
) -> Option<JsonRpcResponse> {
    match frame {
        DecodedFrame::Message(value) => match parse_request(value) {
            Ok(request) => handler.handle(request).await,
            Err(error) => {
                audit.record_transport(&TransportAuditEvent::new(
                    "invalid_request",
                    None,
                    0,
                    Some(error.message.clone()),
                ));
                Some(JsonRpcResponse::failure(None, error))
            }
        },
        DecodedFrame::Malformed {
            error,
        } => {
            audit.record_transport(&TransportAuditEvent::new(
                "parse_error",
                None,
                0,
                Some(error.clone()),
            ));
            Some(JsonRpcResponse::failure(
                None,
                JsonRpcError::new(PARSE_ERROR, "Parse error").with_data(json!({ "message": error })),
            ))
        }
    }
}

/// Frames, writes, and flushes one response.
async fn write_response<W: AsyncWrite + Unpin>(
    output: &mut W,
    response: &JsonRpcResponse,
) -> Result<(), McpServerError> {
    let frame = encode_frame(response).map_err(|err| McpServerError::Transport(err.to_string()))?;
    output
        .write_all(&frame)
        .await
        .map_err(|err| McpServerError::Transport(format!("stdio write failed: {err}")))?;
    output.flush().await.map_err(|err| McpServerError::Transport(format!("stdio write failed: {err}")))
}
