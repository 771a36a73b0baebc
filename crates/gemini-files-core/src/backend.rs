// gemini-files-core/src/backend.rs
// ============================================================================
// Module: Files Backend
// Description: Capability interface for remote file storage.
// Purpose: Let front-ends run against the HTTP client or a test double.
// Dependencies: async-trait, bytes
// ============================================================================

//! ## Overview
//! [`FilesBackend`] is the seam between the front-ends and the remote store.
//! Implementations perform no safety gating; callers gate first.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::FilesError;
use crate::model::FileResource;
use crate::model::ListFilesInput;
use crate::model::ListFilesOutput;
use crate::model::UploadFileInput;

/// Remote file storage capabilities.
///
/// # Invariants
/// - Every failure is a classified [`FilesError`].
#[async_trait]
pub trait FilesBackend: Send + Sync {
    /// Uploads a local file and returns the stored metadata.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError`] when the file cannot be read or the upload fails.
    async fn upload_file(&self, input: UploadFileInput) -> Result<FileResource, FilesError>;

    /// Lists one page of stored files.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError`] when the request fails.
    async fn list_files(&self, input: ListFilesInput) -> Result<ListFilesOutput, FilesError>;

    /// Fetches one file's metadata.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError`] when the name is empty or the request fails.
    async fn get_file(&self, name: &str) -> Result<FileResource, FilesError>;

    /// Deletes one file.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError`] when the name is empty or the request fails.
    async fn delete_file(&self, name: &str) -> Result<(), FilesError>;

    /// Downloads one file's content.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError`] when the name is empty or the request fails.
    async fn download_file(&self, name: &str) -> Result<Bytes, FilesError>;
}
