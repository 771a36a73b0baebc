// gemini-files-cli/src/lib.rs
// ============================================================================
// Module: Gemini Files CLI Library
// Description: Verb handlers and message catalog for the `gemini-files` binary.
// Purpose: Keep command behavior testable apart from argument parsing.
// Dependencies: gemini-files-core, serde_json, tokio
// ============================================================================

//! ## Overview
//! The binary parses arguments and resolves configuration; everything after
//! that (local guards, the safety gate, the backend call, and rendering) lives
//! in [`commands`] so it can run against any [`gemini_files_core::FilesBackend`].

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Verb handlers.
pub mod commands;
/// Message catalog.
pub mod i18n;
