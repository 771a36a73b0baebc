// gemini-files-core/src/config.rs
// ============================================================================
// Module: Startup Configuration
// Description: Flag and environment resolution for client and safety settings.
// Purpose: Resolve one validated configuration before any backend call.
// Dependencies: crate::error, crate::safety, reqwest
// ============================================================================

//! ## Overview
//! Each setting resolves with the precedence explicit flag, then environment,
//! then default. Environment access is isolated in
//! [`EnvSnapshot::from_process`] so resolution stays pure and testable.
//! Empty strings are treated as absent at every level.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::time::Duration;

use reqwest::Url;

use crate::error::FilesError;
use crate::safety::SafetyMode;
use crate::safety::resolve_safety_mode;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Primary API key variable.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Fallback API key variable.
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";
/// Base URL override variable.
pub const BASE_URL_ENV: &str = "GEMINI_BASE_URL";
/// Request timeout variable (milliseconds).
pub const TIMEOUT_MS_ENV: &str = "GEMINI_TIMEOUT_MS";
/// Safety mode variable.
pub const SAFETY_MODE_ENV: &str = "GEMINI_FILES_SAFETY_MODE";
/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Captured values of the configuration environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    /// `GEMINI_API_KEY`.
    pub gemini_api_key: Option<String>,
    /// `GOOGLE_API_KEY`.
    pub google_api_key: Option<String>,
    /// `GEMINI_BASE_URL`.
    pub base_url: Option<String>,
    /// `GEMINI_TIMEOUT_MS`.
    pub timeout_ms: Option<String>,
    /// `GEMINI_FILES_SAFETY_MODE`.
    pub safety_mode: Option<String>,
}

impl EnvSnapshot {
    /// Reads the configuration variables from the current process.
    #[must_use]
    pub fn from_process() -> Self {
        let read = |key: &str| env::var_os(key).map(|value| value.to_string_lossy().to_string());
        Self {
            gemini_api_key: read(GEMINI_API_KEY_ENV),
            google_api_key: read(GOOGLE_API_KEY_ENV),
            base_url: read(BASE_URL_ENV),
            timeout_ms: read(TIMEOUT_MS_ENV),
            safety_mode: read(SAFETY_MODE_ENV),
        }
    }

    /// Builds a snapshot from explicit `(name, value)` pairs; unknown names are ignored.
    #[must_use]
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut snapshot = Self::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match key {
                GEMINI_API_KEY_ENV => snapshot.gemini_api_key = value,
                GOOGLE_API_KEY_ENV => snapshot.google_api_key = value,
                BASE_URL_ENV => snapshot.base_url = value,
                TIMEOUT_MS_ENV => snapshot.timeout_ms = value,
                SAFETY_MODE_ENV => snapshot.safety_mode = value,
                _ => {}
            }
        }
        snapshot
    }
}

/// Raw command-line settings shared by both front-ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupOptions {
    /// `--api-key`.
    pub api_key: Option<String>,
    /// `--base-url`.
    pub base_url: Option<String>,
    /// `--timeout-ms`.
    pub timeout_ms: Option<String>,
    /// `--safety-mode`.
    pub safety_mode: Option<String>,
}

/// Settings for [`crate::GeminiFilesClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API key sent on every request.
    pub api_key: String,
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Optional per-request timeout.
    pub timeout: Option<Duration>,
    /// User-Agent header value.
    pub user_agent: String,
}

impl ClientConfig {
    /// Builds a config against the default base URL with no timeout.
    #[must_use]
    pub fn new(api_key: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            user_agent: user_agent.into(),
        }
    }
}

/// Fully resolved startup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Backend client settings.
    pub client: ClientConfig,
    /// Process-wide safety mode.
    pub safety_mode: SafetyMode,
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves flags and environment into a validated configuration.
///
/// The safety mode is resolved first so an invalid mode is reported even
/// when credentials are also missing.
///
/// # Errors
///
/// Returns [`FilesError::Validation`] for an invalid safety mode, missing API
/// key, malformed base URL, or non-positive timeout.
pub fn resolve_startup_config(
    options: &StartupOptions,
    env: &EnvSnapshot,
    user_agent: &str,
) -> Result<ResolvedConfig, FilesError> {
    let safety_mode =
        resolve_safety_mode(options.safety_mode.as_deref(), env.safety_mode.as_deref())?;
    let api_key = first_present([
        options.api_key.as_deref(),
        env.gemini_api_key.as_deref(),
        env.google_api_key.as_deref(),
    ])
    .ok_or_else(|| {
        FilesError::validation(format!(
            "Missing API key. Set {GEMINI_API_KEY_ENV}, {GOOGLE_API_KEY_ENV}, or pass --api-key."
        ))
    })?;
    let base_url = resolve_base_url(options.base_url.as_deref(), env.base_url.as_deref())?;
    let timeout = resolve_timeout(options.timeout_ms.as_deref(), env.timeout_ms.as_deref())?;
    Ok(ResolvedConfig {
        client: ClientConfig {
            api_key: api_key.to_string(),
            base_url,
            timeout,
            user_agent: user_agent.to_string(),
        },
        safety_mode,
    })
}

/// Returns the first non-empty value.
fn first_present<'a, const N: usize>(values: [Option<&'a str>; N]) -> Option<&'a str> {
    values.into_iter().flatten().find(|value| !value.is_empty())
}

/// Resolves and validates the base URL.
fn resolve_base_url(flag: Option<&str>, env: Option<&str>) -> Result<String, FilesError> {
    let raw = first_present([flag, env]).unwrap_or(DEFAULT_BASE_URL);
    let url = Url::parse(raw)
        .map_err(|err| FilesError::validation(format!("Invalid base URL {raw}: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(FilesError::validation(format!(
            "Invalid base URL {raw}: scheme must be http or https"
        )));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

/// Resolves and validates the timeout; the flag is checked before the environment.
fn resolve_timeout(flag: Option<&str>, env: Option<&str>) -> Result<Option<Duration>, FilesError> {
    if let Some(raw) = flag.filter(|value| !value.is_empty()) {
        return parse_timeout_ms(raw, "timeout-ms").map(Some);
    }
    if let Some(raw) = env.filter(|value| !value.is_empty()) {
        return parse_timeout_ms(raw, TIMEOUT_MS_ENV).map(Some);
    }
    Ok(None)
}

/// Parses a finite positive millisecond count.
fn parse_timeout_ms(raw: &str, label: &str) -> Result<Duration, FilesError> {
    let invalid = || FilesError::validation(format!("{label} must be a positive number"));
    let millis: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if !millis.is_finite() || millis <= 0.0 {
        return Err(invalid());
    }
    Duration::try_from_secs_f64(millis / 1000.0).map_err(|_| invalid())
}
