// gemini-files-core/src/error.rs
// ============================================================================
// Module: Failure Taxonomy
// Description: Classified failures shared by the CLI and MCP front-ends.
// Purpose: Keep policy rejections distinct from backend failures end to end.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! Every failure that can reach a user is a [`FilesError`] carrying one of five
//! kinds. Retryability is derived from the kind (and, for API failures, the
//! HTTP status class) so it can never disagree with the classification.
//!
//! ## Invariants
//! - Validation, auth, and internal failures are never retryable.
//! - Network failures are always retryable.
//! - API failures are retryable only for 429 and 5xx statuses.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Kinds
// ============================================================================

/// Failure classification used for exit codes and structured error payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input or policy rejected locally.
    Validation,
    /// Credential rejected by the backend.
    Auth,
    /// Backend rejected the request.
    Api,
    /// Transport-level failure before a response was received.
    Network,
    /// Unclassified failure.
    Internal,
}

impl ErrorKind {
    /// Returns the stable machine-readable code for the kind.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::Auth => "AUTH_ERROR",
            Self::Api => "API_ERROR",
            Self::Network => "NETWORK_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Classified failure raised by the safety gate, configuration, or backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilesError {
    /// Input or policy rejected locally.
    #[error("{message}")]
    Validation {
        /// Human-readable message.
        message: String,
        /// Optional structured context.
        details: Option<Value>,
    },
    /// Credential rejected by the backend (401/403).
    #[error("{message}")]
    Auth {
        /// Human-readable message.
        message: String,
        /// HTTP status returned by the backend.
        status: u16,
    },
    /// Backend rejected the request with a non-auth status.
    #[error("{message}")]
    Api {
        /// Human-readable message.
        message: String,
        /// HTTP status returned by the backend.
        status: u16,
        /// Optional backend error body.
        details: Option<Value>,
    },
    /// Transport failure (connect, timeout, interrupted body).
    #[error("{message}")]
    Network {
        /// Human-readable message.
        message: String,
    },
    /// Failure of unknown shape.
    #[error("{message}")]
    Internal {
        /// Human-readable message.
        message: String,
    },
}

impl FilesError {
    /// Builds a validation failure without details.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: None,
        }
    }

    /// Builds a network failure.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Builds an internal failure.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Classifies a non-success HTTP status returned by the backend.
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>, details: Option<Value>) -> Self {
        let message = message.into();
        if status == 401 || status == 403 {
            return Self::Auth {
                message,
                status,
            };
        }
        Self::Api {
            message,
            status,
            details,
        }
    }

    /// Returns the failure kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation {
                ..
            } => ErrorKind::Validation,
            Self::Auth {
                ..
            } => ErrorKind::Auth,
            Self::Api {
                ..
            } => ErrorKind::Api,
            Self::Network {
                ..
            } => ErrorKind::Network,
            Self::Internal {
                ..
            } => ErrorKind::Internal,
        }
    }

    /// Returns the machine-readable code (`VALIDATION_ERROR`, ...).
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind().code()
    }

    /// Returns whether retrying the same request may succeed.
    #[must_use]
    pub const fn retryable(&self) -> bool {
        match self {
            Self::Api {
                status,
                ..
            } => *status == 429 || *status >= 500,
            Self::Network {
                ..
            } => true,
            Self::Validation {
                ..
            }
            | Self::Auth {
                ..
            }
            | Self::Internal {
                ..
            } => false,
        }
    }

    /// Returns the backend HTTP status when one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Auth {
                status,
                ..
            }
            | Self::Api {
                status,
                ..
            } => Some(*status),
            Self::Validation {
                ..
            }
            | Self::Network {
                ..
            }
            | Self::Internal {
                ..
            } => None,
        }
    }

    /// Returns structured details attached to the failure.
    #[must_use]
    pub const fn details(&self) -> Option<&Value> {
        match self {
            Self::Validation {
                details,
                ..
            }
            | Self::Api {
                details,
                ..
            } => details.as_ref(),
            Self::Auth {
                ..
            }
            | Self::Network {
                ..
            }
            | Self::Internal {
                ..
            } => None,
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
