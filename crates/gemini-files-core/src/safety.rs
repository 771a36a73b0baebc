// gemini-files-core/src/safety.rs
// ============================================================================
// Module: Safety Gate
// Description: Pure decision function for mutating file operations.
// Purpose: Give the CLI and MCP front-ends one identical allow/deny policy.
// Dependencies: crate::error
// ============================================================================

//! ## Overview
//! The safety gate decides whether a file operation may run under the
//! process-wide [`SafetyMode`]. The decision is a pure function of
//! `(mode, operation, confirmed)`; both front-ends call [`decide`] (through
//! [`enforce`]) before any side-effecting backend invocation.
//!
//! | mode        | non-mutating | mutating, unconfirmed | mutating, confirmed |
//! |-------------|--------------|-----------------------|---------------------|
//! | `read-only` | allow        | deny (blocked)        | deny (blocked)      |
//! | `balanced`  | allow        | deny (confirmation)   | allow               |
//! | `unsafe`    | allow        | allow                 | allow               |
//!
//! ## Invariants
//! - Every `(mode, operation, confirmed)` triple has exactly one outcome.
//! - Denials always surface as [`FilesError::Validation`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::FilesError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Process-wide policy level for mutating operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SafetyMode {
    /// Mutating operations are always blocked.
    ReadOnly,
    /// Mutating operations require per-call confirmation.
    Balanced,
    /// Mutating operations are always allowed.
    Unsafe,
}

impl SafetyMode {
    /// All modes in documentation order.
    pub const ALL: [Self; 3] = [Self::ReadOnly, Self::Balanced, Self::Unsafe];

    /// Mode used when neither a flag nor the environment selects one.
    pub const DEFAULT: Self = Self::ReadOnly;

    /// Returns the stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReadOnly => "read-only",
            Self::Balanced => "balanced",
            Self::Unsafe => "unsafe",
        }
    }
}

impl fmt::Display for SafetyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SafetyMode {
    type Err = FilesError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == raw).ok_or_else(|| {
            let expected = Self::ALL.map(Self::as_str).join(", ");
            FilesError::validation(format!("Invalid safety mode: {raw}. Expected one of: {expected}"))
        })
    }
}

/// Backend capability being invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileOperation {
    /// Upload a local file.
    Upload,
    /// Enumerate stored files.
    List,
    /// Read one file's metadata.
    Get,
    /// Remove a stored file.
    Delete,
    /// Fetch a stored file's bytes to local disk.
    Download,
}

impl FileOperation {
    /// All operations.
    pub const ALL: [Self; 5] = [Self::Upload, Self::List, Self::Get, Self::Delete, Self::Download];

    /// Returns true when the operation has side effects that the gate governs.
    ///
    /// Download counts as mutating because it writes to the local filesystem.
    #[must_use]
    pub const fn is_mutating(self) -> bool {
        matches!(self, Self::Upload | Self::Delete | Self::Download)
    }

    /// Returns the stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::List => "list",
            Self::Get => "get",
            Self::Delete => "delete",
            Self::Download => "download",
        }
    }
}

impl fmt::Display for FileOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the gate denied an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SafetyDenial {
    /// The mode blocks every mutating operation.
    BlockedByMode,
    /// The mode requires confirmation and none was given.
    ConfirmationRequired,
}

impl fmt::Display for SafetyDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlockedByMode => f.write_str("operation blocked in restrictive mode"),
            Self::ConfirmationRequired => {
                f.write_str("operation requires explicit confirmation in confirming mode")
            }
        }
    }
}

/// Gate outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SafetyDecision {
    /// The operation may run.
    Allow,
    /// The operation must not run.
    Deny(SafetyDenial),
}

impl SafetyDecision {
    /// Returns true for [`SafetyDecision::Allow`].
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Front-end that supplied the confirmation signal; only shapes the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfirmationSource {
    /// CLI `--force` flag.
    ForceFlag,
    /// RPC `confirm: true` argument.
    ConfirmArgument,
}

impl ConfirmationSource {
    /// Returns the user-facing hint for supplying confirmation.
    #[must_use]
    pub const fn hint(self) -> &'static str {
        match self {
            Self::ForceFlag => "--force",
            Self::ConfirmArgument => "confirm=true",
        }
    }
}

// ============================================================================
// SECTION: Decision
// ============================================================================

/// Decides whether `operation` may run under `mode`.
#[must_use]
pub const fn decide(mode: SafetyMode, operation: FileOperation, confirmed: bool) -> SafetyDecision {
    if !operation.is_mutating() {
        return SafetyDecision::Allow;
    }
    match mode {
        SafetyMode::ReadOnly => SafetyDecision::Deny(SafetyDenial::BlockedByMode),
        SafetyMode::Balanced if !confirmed => {
            SafetyDecision::Deny(SafetyDenial::ConfirmationRequired)
        }
        SafetyMode::Balanced | SafetyMode::Unsafe => SafetyDecision::Allow,
    }
}

/// Runs [`decide`] and converts a denial into a validation failure.
///
/// # Errors
///
/// Returns [`FilesError::Validation`] when the gate denies the operation.
pub fn enforce(
    mode: SafetyMode,
    operation: FileOperation,
    confirmed: bool,
    source: ConfirmationSource,
) -> Result<(), FilesError> {
    match decide(mode, operation, confirmed) {
        SafetyDecision::Allow => Ok(()),
        SafetyDecision::Deny(denial) => {
            let message = match denial {
                SafetyDenial::BlockedByMode => {
                    format!("Operation {operation} is blocked in {mode} safety mode")
                }
                SafetyDenial::ConfirmationRequired => format!(
                    "Operation {operation} requires {} in {mode} safety mode",
                    source.hint()
                ),
            };
            Err(FilesError::Validation {
                message,
                details: Some(serde_json::json!({
                    "operation": operation.as_str(),
                    "safetyMode": mode.as_str(),
                    "reason": denial.to_string(),
                })),
            })
        }
    }
}

// ============================================================================
// SECTION: Mode Resolution
// ============================================================================

/// Parses an optional raw mode; empty strings count as absent.
///
/// # Errors
///
/// Returns [`FilesError::Validation`] for unrecognized values.
pub fn parse_safety_mode(raw: Option<&str>) -> Result<Option<SafetyMode>, FilesError> {
    match raw {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some),
    }
}

/// Resolves the mode: explicit value, then environment value, then `read-only`.
///
/// Each level is validated before falling through, so an unrecognized
/// explicit value is an error even when the environment holds a valid one.
///
/// # Errors
///
/// Returns [`FilesError::Validation`] when either level is unrecognized.
pub fn resolve_safety_mode(
    explicit: Option<&str>,
    env: Option<&str>,
) -> Result<SafetyMode, FilesError> {
    if let Some(mode) = parse_safety_mode(explicit)? {
        return Ok(mode);
    }
    Ok(parse_safety_mode(env)?.unwrap_or(SafetyMode::DEFAULT))
}

#[cfg(test)]
mod tests;
