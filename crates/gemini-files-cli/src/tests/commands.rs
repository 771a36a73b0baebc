// gemini-files-cli/src/tests/commands.rs
// ============================================================================
// Module: CLI Verb Handler Tests
// Description: Unit tests for guard ordering, gating, and rendering.
// Purpose: Ensure verbs never reach the backend when a guard denies them.
// Dependencies: gemini-files-cli commands module
// ============================================================================

//! ## Overview
//! Runs [`execute`] against an in-memory backend and checks both the
//! rendered output and which backend calls were made.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use gemini_files_core::ErrorKind;
use gemini_files_core::FileResource;
use gemini_files_core::FilesBackend;
use gemini_files_core::FilesError;
use gemini_files_core::ListFilesInput;
use gemini_files_core::ListFilesOutput;
use gemini_files_core::SafetyMode;
use gemini_files_core::UploadFileInput;
use serde_json::Value;

use crate::commands::FileCommand;
use crate::commands::OutputFormat;
use crate::commands::execute;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Backend that records calls.
#[derive(Default)]
struct RecordingBackend {
    /// Call labels in order.
    calls: Mutex<Vec<String>>,
    /// Continuation token returned by `list_files`.
    next_page_token: Option<String>,
}

impl RecordingBackend {
    /// Records a call label.
    fn record(&self, label: String) {
        self.calls.lock().unwrap().push(label);
    }

    /// Returns recorded call labels.
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

/// Builds a named file resource.
fn file(name: &str) -> FileResource {
    FileResource {
        name: name.to_string(),
        ..FileResource::default()
    }
}

#[async_trait]
impl FilesBackend for RecordingBackend {
    async fn upload_file(&self, input: UploadFileInput) -> Result<FileResource, FilesError> {
        self.record(format!("upload:{}", input.path.display()));
        Ok(file("files/up"))
    }

    async fn list_files(&self, _input: ListFilesInput) -> Result<ListFilesOutput, FilesError> {
        self.record("list".to_string());
        Ok(ListFilesOutput {
            files: vec![file("files/a"), file("files/b")],
            next_page_token: self.next_page_token.clone(),
        })
    }

    async fn get_file(&self, name: &str) -> Result<FileResource, FilesError> {
        self.record(format!("get:{name}"));
        Ok(file(name))
    }

    async fn delete_file(&self, name: &str) -> Result<(), FilesError> {
        self.record(format!("delete:{name}"));
        Ok(())
    }

    async fn download_file(&self, name: &str) -> Result<Bytes, FilesError> {
        self.record(format!("download:{name}"));
        Ok(Bytes::from_static(b"payload"))
    }
}

/// Runs a command and returns the rendered output or the error.
async fn run(
    backend: &RecordingBackend,
    mode: SafetyMode,
    format: OutputFormat,
    command: FileCommand,
) -> Result<String, FilesError> {
    let mut out = Vec::new();
    execute(command, backend, mode, format, &mut out).await?;
    Ok(String::from_utf8(out).unwrap())
}

// ============================================================================
// SECTION: Guards
// ============================================================================

#[tokio::test]
async fn delete_without_force_is_rejected_before_the_gate() {
    let backend = RecordingBackend::default();
    let command = FileCommand::Delete {
        name: "files/x".to_string(),
        force: false,
    };
    let err = run(&backend, SafetyMode::Unsafe, OutputFormat::Human, command).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "Delete requires --force to avoid accidental removal");
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn read_only_blocks_delete_even_with_force() {
    let backend = RecordingBackend::default();
    let command = FileCommand::Delete {
        name: "files/x".to_string(),
        force: true,
    };
    let err = run(&backend, SafetyMode::ReadOnly, OutputFormat::Human, command).await.unwrap_err();
    assert_eq!(err.to_string(), "Operation delete is blocked in read-only safety mode");
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn balanced_download_requires_force() {
    let backend = RecordingBackend::default();
    let command = FileCommand::Download {
        name: "files/x".to_string(),
        output: PathBuf::from("unused.bin"),
        force: false,
    };
    let err = run(&backend, SafetyMode::Balanced, OutputFormat::Human, command).await.unwrap_err();
    assert_eq!(err.to_string(), "Operation download requires --force in balanced safety mode");
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn read_only_allows_list_and_get() {
    let backend = RecordingBackend::default();
    run(
        &backend,
        SafetyMode::ReadOnly,
        OutputFormat::Human,
        FileCommand::List {
            page_size: None,
            page_token: None,
        },
    )
    .await
    .unwrap();
    run(
        &backend,
        SafetyMode::ReadOnly,
        OutputFormat::Human,
        FileCommand::Get {
            name: "files/a".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(backend.calls(), ["list", "get:files/a"]);
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

#[tokio::test]
async fn list_human_output_prints_names_and_token() {
    let backend = RecordingBackend {
        next_page_token: Some("tok".to_string()),
        ..RecordingBackend::default()
    };
    let command = FileCommand::List {
        page_size: Some(2),
        page_token: None,
    };
    let output = run(&backend, SafetyMode::ReadOnly, OutputFormat::Human, command).await.unwrap();
    assert_eq!(output, "files/a\nfiles/b\nnextPageToken=tok\n");
}

#[tokio::test]
async fn list_json_output_is_pretty_document() {
    let backend = RecordingBackend::default();
    let command = FileCommand::List {
        page_size: None,
        page_token: None,
    };
    let output = run(&backend, SafetyMode::ReadOnly, OutputFormat::Json, command).await.unwrap();
    assert!(output.contains("\n  \"files\""));
    let value: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["files"][1]["name"], "files/b");
    assert!(value.get("nextPageToken").is_none());
}

#[tokio::test]
async fn delete_with_force_in_unsafe_mode_reports_deleted() {
    let backend = RecordingBackend::default();
    let command = FileCommand::Delete {
        name: "files/x".to_string(),
        force: true,
    };
    let output = run(&backend, SafetyMode::Unsafe, OutputFormat::Human, command).await.unwrap();
    assert_eq!(output, "Deleted: files/x\n");
    assert_eq!(backend.calls(), ["delete:files/x"]);
}

#[tokio::test]
async fn upload_in_balanced_mode_with_force_reports_name() {
    let backend = RecordingBackend::default();
    let command = FileCommand::Upload {
        path: PathBuf::from("notes.txt"),
        display_name: None,
        mime_type: None,
        force: true,
    };
    let output = run(&backend, SafetyMode::Balanced, OutputFormat::Human, command).await.unwrap();
    assert_eq!(output, "Uploaded: files/up\n");
}

#[tokio::test]
async fn download_writes_file_and_reports_size() {
    let backend = RecordingBackend::default();
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out.bin");
    let command = FileCommand::Download {
        name: "files/x".to_string(),
        output: target.clone(),
        force: false,
    };
    let output = run(&backend, SafetyMode::Unsafe, OutputFormat::Json, command).await.unwrap();
    let value: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["sizeBytes"], 7);
    assert_eq!(std::fs::read(&target).unwrap(), b"payload");
}
