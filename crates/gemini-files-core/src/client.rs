// gemini-files-core/src/client.rs
// ============================================================================
// Module: Gemini Files HTTP Client
// Description: reqwest-backed implementation of the files backend.
// Purpose: Talk to the Gemini Files REST API and classify its failures.
// Dependencies: reqwest, serde_json, tokio
// ============================================================================

//! ## Overview
//! [`GeminiFilesClient`] implements [`FilesBackend`] over the `v1beta` files
//! endpoints. Uploads use the two-step resumable protocol (start, then
//! upload-and-finalize in one request). Non-success statuses are classified
//! with [`FilesError::from_status`]; transport failures become network errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use reqwest::RequestBuilder;
use reqwest::Response;
use reqwest::Url;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_json::json;

use crate::backend::FilesBackend;
use crate::config::ClientConfig;
use crate::error::FilesError;
use crate::model::FileResource;
use crate::model::ListFilesInput;
use crate::model::ListFilesOutput;
use crate::model::UploadFileInput;
use crate::model::normalize_file_name;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// API key header.
const API_KEY_HEADER: &str = "x-goog-api-key";
/// Resumable session URL returned by the upload start request.
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";
/// MIME type used when none is given and the extension is unknown.
const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Extension to MIME type table for uploads without an explicit type.
const MIME_TYPES: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("csv", "text/csv"),
    ("html", "text/html"),
    ("json", "application/json"),
    ("pdf", "application/pdf"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("mp4", "video/mp4"),
];

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Response body wrapping a single file.
#[derive(Debug, Deserialize)]
struct FileEnvelope {
    /// Wrapped file, when present.
    #[serde(default)]
    file: Option<FileResource>,
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// HTTP client for the Gemini Files API.
#[derive(Debug, Clone)]
pub struct GeminiFilesClient {
    /// Resolved client settings.
    config: ClientConfig,
    /// Shared connection pool.
    http: Client,
}

impl GeminiFilesClient {
    /// Builds a client from resolved settings.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::Validation`] when the API key is empty and
    /// [`FilesError::Internal`] when the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, FilesError> {
        if config.api_key.is_empty() {
            return Err(FilesError::validation("Missing apiKey in client configuration"));
        }
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| FilesError::internal(format!("http client build failed: {err}")))?;
        Ok(Self {
            config,
            http,
        })
    }

    /// Builds `{base}/{path}`.
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url)
    }

    /// Builds `{base}/v1beta/{name}{suffix}`, percent-encoding each segment
    /// of `name` so `?` and `#` stay inside the path.
    fn file_url(&self, name: &str, suffix: &str) -> Result<Url, FilesError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|err| FilesError::validation(format!("Invalid base URL: {err}")))?;
        let mut segments: Vec<String> = name.split('/').map(str::to_string).collect();
        if let Some(last) = segments.last_mut() {
            last.push_str(suffix);
        }
        url.path_segments_mut()
            .map_err(|()| FilesError::validation("Invalid base URL: cannot hold a path"))?
            .pop_if_empty()
            .push("v1beta")
            .extend(&segments);
        Ok(url)
    }

    /// Sends a request with credentials and classifies non-success statuses.
    async fn send(&self, request: RequestBuilder) -> Result<Response, FilesError> {
        let response =
            request.header(API_KEY_HEADER, &self.config.api_key).send().await.map_err(map_send_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        // An unreadable error body still classifies by status.
        let body = response.bytes().await.ok();
        Err(classify_failure(status.as_u16(), body.as_deref().unwrap_or_default()))
    }
}

#[async_trait]
impl FilesBackend for GeminiFilesClient {
    async fn upload_file(&self, input: UploadFileInput) -> Result<FileResource, FilesError> {
        if input.path.as_os_str().is_empty() {
            return Err(FilesError::validation("uploadFile requires a file path"));
        }
        let content = tokio::fs::read(&input.path).await.map_err(|err| {
            FilesError::validation(format!("Unable to read {}: {err}", input.path.display()))
        })?;
        let mime_type = input.mime_type.unwrap_or_else(|| guess_mime_type(&input.path).to_string());

        let mut metadata = json!({});
        if let Some(display_name) = input.display_name {
            metadata["displayName"] = Value::String(display_name);
        }
        let start = self
            .http
            .post(self.endpoint("upload/v1beta/files"))
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", content.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type.as_str())
            .header("Content-Type", "application/json")
            .body(json!({ "file": metadata }).to_string());
        let started = self.send(start).await?;
        let upload_url = started
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| FilesError::internal("upload session URL missing from response"))?;

        let finalize = self
            .http
            .post(upload_url)
            .header("X-Goog-Upload-Command", "upload, finalize")
            .header("X-Goog-Upload-Offset", "0")
            .header("Content-Type", mime_type.as_str())
            .body(content);
        let envelope: FileEnvelope = read_json(self.send(finalize).await?).await?;
        let file = envelope
            .file
            .ok_or_else(|| FilesError::internal("upload response did not include a file"))?;
        require_name(file)
    }

    async fn list_files(&self, input: ListFilesInput) -> Result<ListFilesOutput, FilesError> {
        let mut url = Url::parse(&self.endpoint("v1beta/files"))
            .map_err(|err| FilesError::validation(format!("Invalid base URL: {err}")))?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(page_size) = input.page_size {
                query.append_pair("pageSize", &page_size.to_string());
            }
            if let Some(page_token) = input.page_token.as_deref().filter(|token| !token.is_empty()) {
                query.append_pair("pageToken", page_token);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        let page: ListFilesOutput = read_json(self.send(self.http.get(url)).await?).await?;
        let files = page.files.into_iter().map(require_name).collect::<Result<Vec<_>, _>>()?;
        Ok(ListFilesOutput {
            files,
            next_page_token: page.next_page_token.filter(|token| !token.is_empty()),
        })
    }

    async fn get_file(&self, name: &str) -> Result<FileResource, FilesError> {
        let name = require_file_name(name, "getFile")?;
        let url = self.file_url(&name, "")?;
        let file: FileResource = read_json(self.send(self.http.get(url)).await?).await?;
        require_name(file)
    }

    async fn delete_file(&self, name: &str) -> Result<(), FilesError> {
        let name = require_file_name(name, "deleteFile")?;
        let url = self.file_url(&name, "")?;
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    async fn download_file(&self, name: &str) -> Result<Bytes, FilesError> {
        let name = require_file_name(name, "downloadFile")?;
        let mut url = self.file_url(&name, ":download")?;
        url.set_query(Some("alt=media"));
        let response = self.send(self.http.get(url)).await?;
        response.bytes().await.map_err(map_send_error)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Rejects an empty name and normalizes the rest.
fn require_file_name(name: &str, operation: &str) -> Result<String, FilesError> {
    if name.is_empty() {
        return Err(FilesError::validation(format!("{operation} requires a file name")));
    }
    Ok(normalize_file_name(name))
}

/// Rejects file records returned without a name.
fn require_name(file: FileResource) -> Result<FileResource, FilesError> {
    if file.name.is_empty() {
        return Err(FilesError::Validation {
            message: "Backend returned a file without a name".to_string(),
            details: serde_json::to_value(&file).ok(),
        });
    }
    Ok(file)
}

/// Decodes a success body.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, FilesError> {
    let body = response.bytes().await.map_err(map_send_error)?;
    serde_json::from_slice(&body)
        .map_err(|err| FilesError::internal(format!("unexpected response body: {err}")))
}

/// Maps reqwest transport errors.
fn map_send_error(err: reqwest::Error) -> FilesError {
    if err.is_builder() {
        return FilesError::internal(format!("invalid request: {err}"));
    }
    FilesError::network(format!("request failed: {err}"))
}

/// Classifies a non-success response from its status and body.
fn classify_failure(status: u16, body: &[u8]) -> FilesError {
    let parsed: Option<Value> = serde_json::from_slice(body).ok();
    let error_object = parsed.as_ref().and_then(|value| value.get("error")).cloned();
    let message = error_object
        .as_ref()
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
        .map_or_else(|| format!("request failed with status {status}"), str::to_string);
    FilesError::from_status(status, message, error_object.or(parsed))
}

/// Guesses a MIME type from the path extension.
fn guess_mime_type(path: &Path) -> &'static str {
    let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
        return FALLBACK_MIME_TYPE;
    };
    let extension = extension.to_ascii_lowercase();
    MIME_TYPES
        .iter()
        .find(|(candidate, _)| *candidate == extension)
        .map_or(FALLBACK_MIME_TYPE, |(_, mime)| *mime)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use serde_json::json;

    use super::classify_failure;
    use super::guess_mime_type;
    use crate::error::ErrorKind;

    #[test]
    fn error_message_taken_from_error_body() {
        let body = json!({"error": {"code": 404, "message": "File not found", "status": "NOT_FOUND"}});
        let error = classify_failure(404, body.to_string().as_bytes());
        assert_eq!(error.kind(), ErrorKind::Api);
        assert_eq!(error.to_string(), "File not found");
        assert_eq!(error.details().and_then(|d| d.get("status")), Some(&json!("NOT_FOUND")));
    }

    #[test]
    fn unparseable_error_body_uses_status_message() {
        let error = classify_failure(502, b"<html>bad gateway</html>");
        assert_eq!(error.to_string(), "request failed with status 502");
        assert!(error.retryable());
        assert!(error.details().is_none());
    }

    #[test]
    fn mime_guess_falls_back() {
        assert_eq!(guess_mime_type(Path::new("notes.TXT")), "text/plain");
        assert_eq!(guess_mime_type(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(guess_mime_type(Path::new("blob.bin")), "application/octet-stream");
        assert_eq!(guess_mime_type(Path::new("Makefile")), "application/octet-stream");
    }
}
