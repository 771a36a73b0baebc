// gemini-files-mcp/src/framing.rs
// ============================================================================
// Module: Frame Codec
// Description: Content-Length framing for JSON-RPC messages over a byte stream.
// Purpose: Recover message boundaries regardless of how input is chunked.
// Dependencies: bytes, serde_json
// ============================================================================

//! ## Overview
//! A frame is a header block terminated by `\r\n\r\n` that declares the body
//! size with `Content-Length`, followed by exactly that many body bytes.
//!
//! [`decode_frames`] is a pure scan over a byte slice. [`FrameDecoder`] owns
//! the pending buffer, appends each chunk, and drops exactly the bytes that
//! completed frames consumed.
//!
//! ## Invariants
//! - A frame is decoded only once its whole body is buffered.
//! - Scanning stops, without consuming anything, at the first header that is
//!   incomplete, lacks a length, or declares an unparseable length.
//! - The terminator search never looks past [`MAX_HEADER_BYTES`]; a longer
//!   header block is fatal.
//! - Once a header is rejected the decoder stops buffering; later chunks are
//!   counted as dropped and never decoded.
//! - Otherwise the pending buffer grows only by appended chunks and shrinks
//!   only by consumed frames.

// ============================================================================
// SECTION: Imports
// ============================================================================

use bytes::Bytes;
use bytes::BytesMut;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Blank line terminating a header block.
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Default cap on a single declared body length (8 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Largest header block accepted before its terminator (8 KiB).
pub const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Bytes searched for a terminator: a full header plus the terminator itself.
const HEADER_SCAN_BYTES: usize = MAX_HEADER_BYTES + HEADER_TERMINATOR.len();

/// Header name compared case-insensitively, including the colon.
const CONTENT_LENGTH_PREFIX: &[u8] = b"content-length:";

// ============================================================================
// SECTION: Types
// ============================================================================

/// One complete frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedFrame {
    /// Body parsed as JSON.
    Message(Value),
    /// Body was consumed but is not valid JSON.
    Malformed {
        /// Parser error message.
        error: String,
    },
}

/// Why a scan stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStall {
    /// No header terminator in the remaining bytes.
    AwaitingHeader,
    /// The header block has no `Content-Length` line.
    MissingLength,
    /// The `Content-Length` value is not a non-negative integer.
    InvalidLength,
    /// The header is complete but the body is not.
    AwaitingBody {
        /// Bytes still missing.
        needed: usize,
    },
    /// The declared body exceeds the configured limit.
    TooLarge {
        /// Declared body length.
        declared: usize,
        /// Configured limit.
        limit: usize,
    },
    /// No terminator within the first [`MAX_HEADER_BYTES`] of a header.
    HeaderTooLarge {
        /// Bytes buffered for the unterminated header.
        buffered: usize,
    },
}

impl DecodeStall {
    /// Returns true when no further input can make progress.
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::TooLarge { .. } | Self::HeaderTooLarge { .. })
    }

    /// Returns true when the stall is caused by a malformed header.
    #[must_use]
    pub const fn is_malformed_header(self) -> bool {
        matches!(self, Self::MissingLength | Self::InvalidLength)
    }

    /// Returns a stable label for audit events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingHeader => "awaiting_header",
            Self::MissingLength => "missing_length",
            Self::InvalidLength => "invalid_length",
            Self::AwaitingBody {
                ..
            } => "awaiting_body",
            Self::TooLarge {
                ..
            } => "too_large",
            Self::HeaderTooLarge {
                ..
            } => "header_too_large",
        }
    }
}

/// Result of one decode scan.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeBatch {
    /// Frames completed by this scan, in buffer order.
    pub frames: Vec<DecodedFrame>,
    /// Bytes consumed by those frames.
    pub consumed: usize,
    /// Why the scan stopped.
    pub stall: DecodeStall,
}

/// Frame encoding failures.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Message could not be serialized.
    #[error("frame serialization failed: {0}")]
    Serialize(String),
}

// ============================================================================
// SECTION: Encoding
// ============================================================================

/// Serializes `message` and prefixes its byte length.
///
/// # Errors
///
/// Returns [`FrameError::Serialize`] when the message cannot be serialized.
pub fn encode_frame<T: Serialize>(message: &T) -> Result<Vec<u8>, FrameError> {
    let body = serde_json::to_vec(message).map_err(|err| FrameError::Serialize(err.to_string()))?;
    let header = format!("Content-Length: {}\r\n\r\n", body.len());
    let mut frame = Vec::with_capacity(header.len() + body.len());
    frame.extend_from_slice(header.as_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

// ============================================================================
// SECTION: Decoding
// ============================================================================

/// Decodes every complete frame at the front of `buffer`.
#[must_use]
pub fn decode_frames(buffer: &[u8], max_body_bytes: usize) -> DecodeBatch {
    let mut frames = Vec::new();
    let mut consumed = 0;
    let stall = loop {
        let rest = &buffer[consumed..];
        let window = &rest[..rest.len().min(HEADER_SCAN_BYTES)];
        let Some(header_end) = find_terminator(window) else {
            if window.len() == HEADER_SCAN_BYTES {
                break DecodeStall::HeaderTooLarge {
                    buffered: rest.len(),
                };
            }
            break DecodeStall::AwaitingHeader;
        };
        let declared = match content_length(&rest[..header_end]) {
            Ok(declared) => declared,
            Err(stall) => break stall,
        };
        if declared > max_body_bytes {
            break DecodeStall::TooLarge {
                declared,
                limit: max_body_bytes,
            };
        }
        let body_start = header_end + HEADER_TERMINATOR.len();
        let available = rest.len() - body_start;
        if available < declared {
            break DecodeStall::AwaitingBody {
                needed: declared - available,
            };
        }
        let body = &rest[body_start..body_start + declared];
        frames.push(match serde_json::from_slice(body) {
            Ok(value) => DecodedFrame::Message(value),
            Err(err) => DecodedFrame::Malformed {
                error: err.to_string(),
            },
        });
        consumed += body_start + declared;
    };
    DecodeBatch {
        frames,
        consumed,
        stall,
    }
}

/// Returns the offset of the first header terminator.
fn find_terminator(buffer: &[u8]) -> Option<usize> {
    buffer.windows(HEADER_TERMINATOR.len()).position(|window| window == HEADER_TERMINATOR)
}

/// Extracts the declared body length from a header block.
fn content_length(header: &[u8]) -> Result<usize, DecodeStall> {
    let line = header
        .split(|byte| *byte == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .find(|line| {
            line.len() >= CONTENT_LENGTH_PREFIX.len()
                && line[..CONTENT_LENGTH_PREFIX.len()].eq_ignore_ascii_case(CONTENT_LENGTH_PREFIX)
        })
        .ok_or(DecodeStall::MissingLength)?;
    let raw = std::str::from_utf8(&line[CONTENT_LENGTH_PREFIX.len()..])
        .map_err(|_| DecodeStall::InvalidLength)?;
    raw.trim().parse::<usize>().map_err(|_| DecodeStall::InvalidLength)
}

// ============================================================================
// SECTION: Decoder State
// ============================================================================

/// Pending-buffer state for incremental decoding.
#[derive(Debug)]
pub struct FrameDecoder {
    /// Bytes received but not yet consumed by a complete frame.
    pending: BytesMut,
    /// Largest accepted declared body length.
    max_body_bytes: usize,
    /// Header rejection that ended decoding, if any.
    rejected: Option<DecodeStall>,
    /// Bytes received after the rejection.
    dropped: usize,
}

impl FrameDecoder {
    /// Creates an empty decoder.
    #[must_use]
    pub fn new(max_body_bytes: usize) -> Self {
        Self {
            pending: BytesMut::new(),
            max_body_bytes,
            rejected: None,
            dropped: 0,
        }
    }

    /// Appends `chunk` and drains every frame it completes.
    ///
    /// After a header is rejected, chunks are only counted.
    pub fn feed(&mut self, chunk: &[u8]) -> DecodeBatch {
        if let Some(stall) = self.rejected {
            self.dropped += chunk.len();
            return DecodeBatch {
                frames: Vec::new(),
                consumed: 0,
                stall,
            };
        }
        self.pending.extend_from_slice(chunk);
        let batch = decode_frames(&self.pending, self.max_body_bytes);
        let _ = self.pending.split_to(batch.consumed);
        if batch.stall.is_malformed_header() {
            self.rejected = Some(batch.stall);
        }
        batch
    }

    /// Returns the number of bytes received after a header rejection.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.dropped
    }

    /// Returns the bytes not yet consumed.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Removes and returns the pending bytes.
    pub fn take_pending(&mut self) -> Bytes {
        self.pending.split().freeze()
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BODY_BYTES)
    }
}
