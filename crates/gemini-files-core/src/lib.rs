// gemini-files-core/src/lib.rs
// ============================================================================
// Module: Gemini Files Core
// Description: Safety gate, error taxonomy, and backend client for Gemini Files.
// Purpose: Share one decision function and one failure model across front-ends.
// Dependencies: reqwest, serde, thiserror, tokio
// ============================================================================

//! ## Overview
//! Gemini Files Core holds everything the CLI and the MCP server have in
//! common: the [`safety::decide`] gate that governs mutating operations, the
//! [`FilesError`] classification used for exit codes and structured RPC
//! errors, the [`FilesBackend`] capability trait, and the reqwest-backed
//! [`GeminiFilesClient`].
//!
//! Ambient process state (environment variables) is never read here; callers
//! capture an [`EnvSnapshot`] at their entry point and pass it in.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod safety;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use backend::FilesBackend;
pub use client::GeminiFilesClient;
pub use config::ClientConfig;
pub use config::EnvSnapshot;
pub use config::ResolvedConfig;
pub use config::StartupOptions;
pub use config::resolve_startup_config;
pub use error::ErrorKind;
pub use error::FilesError;
pub use model::FileResource;
pub use model::ListFilesInput;
pub use model::ListFilesOutput;
pub use model::UploadFileInput;
pub use safety::ConfirmationSource;
pub use safety::FileOperation;
pub use safety::SafetyDecision;
pub use safety::SafetyDenial;
pub use safety::SafetyMode;
