// gemini-files-cli/src/commands.rs
// ============================================================================
// Module: CLI Verb Handlers
// Description: Guards, gating, backend calls, and output rendering per verb.
// Purpose: Map each CLI verb onto one backend capability.
// Dependencies: gemini-files-core, serde, serde_json, tokio
// ============================================================================

//! ## Overview
//! [`execute`] runs one verb in a fixed order:
//!
//! 1. Local flag guards (`delete` without `--force` is rejected outright).
//! 2. The safety gate, with `--force` as the confirmation signal.
//! 3. The backend call.
//! 4. Rendering, either human lines or pretty JSON.
//!
//! ## Invariants
//! - Nothing reaches the backend unless both the guard and the gate pass.
//! - Every failure leaves as a classified [`FilesError`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;

use gemini_files_core::ConfirmationSource;
use gemini_files_core::FileOperation;
use gemini_files_core::FilesBackend;
use gemini_files_core::FilesError;
use gemini_files_core::ListFilesInput;
use gemini_files_core::SafetyMode;
use gemini_files_core::UploadFileInput;
use gemini_files_core::safety::enforce;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::t;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Output rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One human-readable line per result.
    Human,
    /// Pretty-printed JSON document.
    Json,
}

/// A fully parsed verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileCommand {
    /// Upload a local file.
    Upload {
        /// Local file path.
        path: PathBuf,
        /// Optional display name.
        display_name: Option<String>,
        /// Optional MIME type override.
        mime_type: Option<String>,
        /// Confirmation flag.
        force: bool,
    },
    /// List one page of files.
    List {
        /// Optional page size.
        page_size: Option<u32>,
        /// Optional continuation token.
        page_token: Option<String>,
    },
    /// Fetch file metadata.
    Get {
        /// File name or id.
        name: String,
    },
    /// Delete a file.
    Delete {
        /// File name or id.
        name: String,
        /// Confirmation flag; required regardless of mode.
        force: bool,
    },
    /// Download file content to a local path.
    Download {
        /// File name or id.
        name: String,
        /// Destination path.
        output: PathBuf,
        /// Confirmation flag.
        force: bool,
    },
}

impl FileCommand {
    /// Returns the gated operation for this verb.
    #[must_use]
    pub const fn operation(&self) -> FileOperation {
        match self {
            Self::Upload {
                ..
            } => FileOperation::Upload,
            Self::List {
                ..
            } => FileOperation::List,
            Self::Get {
                ..
            } => FileOperation::Get,
            Self::Delete {
                ..
            } => FileOperation::Delete,
            Self::Download {
                ..
            } => FileOperation::Download,
        }
    }

    /// Returns whether `--force` was given.
    #[must_use]
    pub const fn force(&self) -> bool {
        match self {
            Self::Upload {
                force, ..
            }
            | Self::Delete {
                force, ..
            }
            | Self::Download {
                force, ..
            } => *force,
            Self::List {
                ..
            }
            | Self::Get {
                ..
            } => false,
        }
    }
}

// ============================================================================
// SECTION: Execution
// ============================================================================

/// Runs `command` against `backend` and renders the result to `out`.
///
/// # Errors
///
/// Returns [`FilesError`] when a guard or the safety gate rejects the verb,
/// the backend fails, or output cannot be written.
pub async fn execute<W: Write + Send>(
    command: FileCommand,
    backend: &dyn FilesBackend,
    safety_mode: SafetyMode,
    format: OutputFormat,
    out: &mut W,
) -> Result<(), FilesError> {
    if let FileCommand::Delete {
        force: false, ..
    } = command
    {
        return Err(FilesError::validation(t!("delete.force_required")));
    }
    enforce(safety_mode, command.operation(), command.force(), ConfirmationSource::ForceFlag)?;

    match command {
        FileCommand::Upload {
            path,
            display_name,
            mime_type,
            ..
        } => {
            let file = backend
                .upload_file(UploadFileInput {
                    path,
                    display_name,
                    mime_type,
                })
                .await?;
            match format {
                OutputFormat::Json => write_json(out, &json!({ "file": file })),
                OutputFormat::Human => write_line(out, &t!("upload.done", name = file.name)),
            }
        }
        FileCommand::List {
            page_size,
            page_token,
        } => {
            let page = backend
                .list_files(ListFilesInput {
                    page_size,
                    page_token,
                })
                .await?;
            match format {
                OutputFormat::Json => write_json(out, &to_json(&page)?),
                OutputFormat::Human => {
                    for file in &page.files {
                        write_line(out, &file.name)?;
                    }
                    match page.next_page_token.as_deref() {
                        Some(token) if !token.is_empty() => {
                            write_line(out, &t!("list.next_page_token", token = token))
                        }
                        _ => Ok(()),
                    }
                }
            }
        }
        FileCommand::Get {
            name,
        } => {
            let file = backend.get_file(&name).await?;
            match format {
                OutputFormat::Json => write_json(out, &json!({ "file": file })),
                OutputFormat::Human => write_line(out, &file.name),
            }
        }
        FileCommand::Delete {
            name, ..
        } => {
            backend.delete_file(&name).await?;
            match format {
                OutputFormat::Json => write_json(out, &json!({ "ok": true })),
                OutputFormat::Human => write_line(out, &t!("delete.done", name = name)),
            }
        }
        FileCommand::Download {
            name,
            output,
            ..
        } => {
            let content = backend.download_file(&name).await?;
            tokio::fs::write(&output, &content).await.map_err(|err| {
                FilesError::internal(t!(
                    "download.write_failed",
                    path = output.display(),
                    error = err
                ))
            })?;
            match format {
                OutputFormat::Json => write_json(
                    out,
                    &json!({ "outputPath": output.display().to_string(), "sizeBytes": content.len() }),
                ),
                OutputFormat::Human => write_line(
                    out,
                    &t!(
                        "download.done",
                        name = name,
                        path = output.display(),
                        size = content.len()
                    ),
                ),
            }
        }
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Serializes a payload into a JSON value.
fn to_json(payload: &impl Serialize) -> Result<Value, FilesError> {
    serde_json::to_value(payload)
        .map_err(|err| FilesError::internal(t!("output.json_failed", error = err)))
}

/// Writes a pretty-printed JSON document followed by a newline.
fn write_json<W: Write>(out: &mut W, value: &Value) -> Result<(), FilesError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| FilesError::internal(t!("output.json_failed", error = err)))?;
    write_line(out, &rendered)
}

/// Writes a single line.
fn write_line<W: Write>(out: &mut W, message: &str) -> Result<(), FilesError> {
    writeln!(out, "{message}").map_err(|err| {
        FilesError::internal(t!(
            "output.write_failed",
            stream = t!("output.stream.stdout"),
            error = err
        ))
    })
}
