// gemini-files-mcp/tests/transport.rs
// ============================================================================
// Module: Transport Loop Tests
// Description: Framed request streams through the serve loop.
// Purpose: Validate ordering, error frames, and end-of-input handling.
// Dependencies: gemini-files-mcp, gemini-files-core, tokio
// ============================================================================

//! Transport loop tests: framed request streams through the serve loop.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only panic-based assertions are permitted."
)]

mod common;

use std::sync::Arc;

use common::FakeBackend;
use common::server;
use gemini_files_core::SafetyMode;
use gemini_files_mcp::framing::DecodedFrame;
use gemini_files_mcp::framing::decode_frames;
use gemini_files_mcp::framing::encode_frame;
use gemini_files_mcp::serve_stream;
use serde_json::Value;
use serde_json::json;
use tokio::io::AsyncReadExt;

/// Frames each message and concatenates the result.
fn framed(messages: &[Value]) -> Vec<u8> {
    messages.iter().flat_map(|message| encode_frame(message).unwrap()).collect()
}

/// Decodes every response frame written by the loop.
fn responses(output: &[u8]) -> Vec<Value> {
    let batch = decode_frames(output, usize::MAX);
    assert_eq!(batch.consumed, output.len());
    batch
        .frames
        .into_iter()
        .map(|frame| match frame {
            DecodedFrame::Message(value) => value,
            DecodedFrame::Malformed {
                error,
            } => panic!("server wrote malformed frame: {error}"),
        })
        .collect()
}

#[tokio::test]
async fn frames_in_one_read_are_answered_in_order() {
    let (server, audit) = server(Arc::new(FakeBackend::default()), SafetyMode::ReadOnly);
    let input = framed(&[
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"}),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {"name": "files_list"}}),
    ]);
    let mut output = Vec::new();
    serve_stream(input.as_slice(), &mut output, &server, &*audit, 1024 * 1024).await.unwrap();
    let ids: Vec<Value> = responses(&output).into_iter().map(|response| response["id"].clone()).collect();
    assert_eq!(ids, [json!(1), json!(2), json!(3)]);
}

#[tokio::test]
async fn malformed_body_gets_parse_error_and_loop_continues() {
    let (server, audit) = server(Arc::new(FakeBackend::default()), SafetyMode::ReadOnly);
    let mut input = b"Content-Length: 5\r\n\r\n{oops".to_vec();
    input.extend(framed(&[json!({"jsonrpc": "2.0", "id": 4, "method": "tools/list"})]));
    let mut output = Vec::new();
    serve_stream(input.as_slice(), &mut output, &server, &*audit, 1024 * 1024).await.unwrap();
    let written = responses(&output);
    assert_eq!(written.len(), 2);
    assert_eq!(written[0]["id"], Value::Null);
    assert_eq!(written[0]["error"]["code"], -32700);
    assert_eq!(written[1]["id"], 4);
    assert_eq!(audit.transport_kinds(), ["parse_error"]);
}

#[tokio::test]
async fn invalid_envelope_gets_invalid_request() {
    let (server, audit) = server(Arc::new(FakeBackend::default()), SafetyMode::ReadOnly);
    let input = framed(&[json!({"jsonrpc": "1.0", "id": 5, "method": "initialize"})]);
    let mut output = Vec::new();
    serve_stream(input.as_slice(), &mut output, &server, &*audit, 1024 * 1024).await.unwrap();
    let written = responses(&output);
    assert_eq!(written[0]["error"]["code"], -32600);
    assert_eq!(written[0]["id"], Value::Null);
    assert_eq!(audit.transport_kinds(), ["invalid_request"]);
}

#[tokio::test]
async fn partial_frame_at_end_of_input_is_reported() {
    let (server, audit) = server(Arc::new(FakeBackend::default()), SafetyMode::ReadOnly);
    let mut input = framed(&[json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"})]);
    input.extend_from_slice(b"Content-Length: 40\r\n\r\n{\"jsonrpc\"");
    let mut output = Vec::new();
    serve_stream(input.as_slice(), &mut output, &server, &*audit, 1024 * 1024).await.unwrap();
    assert_eq!(responses(&output).len(), 1);
    assert_eq!(audit.transport_kinds(), ["frame_stalled_at_eof"]);
    let events = audit.transport.lock().unwrap();
    assert_eq!(events[0].stall, Some("awaiting_body"));
}

#[tokio::test]
async fn oversized_frame_ends_the_loop_with_error() {
    let (server, audit) = server(Arc::new(FakeBackend::default()), SafetyMode::ReadOnly);
    let input = b"Content-Length: 4096\r\n\r\n".to_vec();
    let mut output = Vec::new();
    let result = serve_stream(input.as_slice(), &mut output, &server, &*audit, 1024).await;
    assert!(result.is_err());
    assert!(output.is_empty());
    assert_eq!(audit.transport_kinds(), ["frame_too_large"]);
}

#[tokio::test]
async fn missing_length_header_stalls_without_responses() {
    let (server, audit) = server(Arc::new(FakeBackend::default()), SafetyMode::ReadOnly);
    let input = b"X-Other: 1\r\n\r\n{}".to_vec();
    let mut output = Vec::new();
    serve_stream(input.as_slice(), &mut output, &server, &*audit, 1024).await.unwrap();
    assert!(output.is_empty());
    assert_eq!(audit.transport_kinds(), ["frame_header_invalid", "frame_stalled_at_eof"]);
}

#[tokio::test]
async fn non_integer_large_and_null_ids_are_echoed() {
    let (server, audit) = server(Arc::new(FakeBackend::default()), SafetyMode::ReadOnly);
    let input = framed(&[
        json!({"jsonrpc": "2.0", "id": 1.5, "method": "tools/list"}),
        json!({"jsonrpc": "2.0", "id": null, "method": "tools/list"}),
        json!({"jsonrpc": "2.0", "id": u64::MAX, "method": "tools/list"}),
    ]);
    let mut output = Vec::new();
    serve_stream(input.as_slice(), &mut output, &server, &*audit, 1024 * 1024).await.unwrap();
    let written = responses(&output);
    assert_eq!(written.len(), 3);
    let ids: Vec<Value> = written.iter().map(|response| response["id"].clone()).collect();
    assert_eq!(ids, [json!(1.5), Value::Null, json!(u64::MAX)]);
    assert!(written.iter().all(|response| response.get("result").is_some()));
    assert!(audit.transport_kinds().is_empty());
}

#[tokio::test]
async fn frames_split_across_reads_are_reassembled() {
    let (server, audit) = server(Arc::new(FakeBackend::default()), SafetyMode::ReadOnly);
    let input = framed(&[
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
    ]);
    let parts: [&[u8]; 4] = [&input[..7], &input[7..30], &input[30..61], &input[61..]];
    let reader = parts[0].chain(parts[1]).chain(parts[2]).chain(parts[3]);
    let mut output = Vec::new();
    serve_stream(reader, &mut output, &server, &*audit, 1024 * 1024).await.unwrap();
    let ids: Vec<Value> = responses(&output).into_iter().map(|response| response["id"].clone()).collect();
    assert_eq!(ids, [json!(1), json!(2)]);
    assert!(audit.transport_kinds().is_empty());
}

#[tokio::test]
async fn unterminated_header_ends_the_loop_with_error() {
    let (server, audit) = server(Arc::new(FakeBackend::default()), SafetyMode::ReadOnly);
    let input = vec![b'A'; 64 * 1024];
    let mut output = Vec::new();
    let result = serve_stream(input.as_slice(), &mut output, &server, &*audit, 1024).await;
    assert!(result.is_err());
    assert!(output.is_empty());
    assert_eq!(audit.transport_kinds(), ["frame_header_too_large"]);
}

#[tokio::test]
async fn input_after_rejected_header_is_counted_not_buffered() {
    let (server, audit) = server(Arc::new(FakeBackend::default()), SafetyMode::ReadOnly);
    let head: &[u8] = b"X-Other: 1\r\n\r\n";
    let tail = vec![b'A'; 100];
    let mut output = Vec::new();
    serve_stream(head.chain(tail.as_slice()), &mut output, &server, &*audit, 1024).await.unwrap();
    assert!(output.is_empty());
    assert_eq!(audit.transport_kinds(), ["frame_header_invalid", "frame_stalled_at_eof"]);
    let events = audit.transport.lock().unwrap();
    assert_eq!(events[1].bytes, 114);
}
