// gemini-files-core/src/model.rs
// ============================================================================
// Module: Resource Model
// Description: File metadata and operation inputs exchanged with the backend.
// Purpose: Provide one serialized shape for CLI JSON output and RPC results.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`FileResource`] mirrors the remote file metadata record. It serializes in
//! camelCase and omits absent fields, which is the shape both front-ends emit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Resource-name prefix required by the remote API.
pub const FILE_NAME_PREFIX: &str = "files/";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Metadata for one remotely stored file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResource {
    /// Fully qualified resource name (`files/<id>`).
    #[serde(default)]
    pub name: String,
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// MIME type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Size in bytes as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    /// Last update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    /// Processing state (`PROCESSING`, `ACTIVE`, `FAILED`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Canonical URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Direct download URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_uri: Option<String>,
}

/// Upload request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFileInput {
    /// Local file to upload.
    pub path: PathBuf,
    /// Optional display name.
    pub display_name: Option<String>,
    /// Optional MIME type override.
    pub mime_type: Option<String>,
}

/// List request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilesInput {
    /// Maximum entries per page.
    pub page_size: Option<u32>,
    /// Continuation token from a previous page.
    pub page_token: Option<String>,
}

/// One page of listed files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesOutput {
    /// Files on this page.
    #[serde(default)]
    pub files: Vec<FileResource>,
    /// Token for the next page, absent on the last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Prefixes `files/` onto a bare identifier; qualified names pass through.
#[must_use]
pub fn normalize_file_name(name: &str) -> String {
    if name.starts_with(FILE_NAME_PREFIX) {
        name.to_string()
    } else {
        format!("{FILE_NAME_PREFIX}{name}")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only serialization assertions.")]

    use serde_json::json;

    use super::FileResource;
    use super::ListFilesOutput;
    use super::normalize_file_name;

    #[test]
    fn bare_names_gain_prefix() {
        assert_eq!(normalize_file_name("abc"), "files/abc");
        assert_eq!(normalize_file_name("files/abc"), "files/abc");
    }

    #[test]
    fn absent_fields_are_omitted() {
        let file = FileResource {
            name: "files/abc".to_string(),
            mime_type: Some("text/plain".to_string()),
            ..FileResource::default()
        };
        let value = serde_json::to_value(&file).unwrap();
        assert_eq!(value, json!({"name": "files/abc", "mimeType": "text/plain"}));
    }

    #[test]
    fn list_page_parses_without_files_key() {
        let page: ListFilesOutput = serde_json::from_value(json!({})).unwrap();
        assert!(page.files.is_empty());
        assert!(page.next_page_token.is_none());
    }
}
