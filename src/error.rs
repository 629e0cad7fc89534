//! Error types for `booknav`
//!
//! One enum per concern (scanning, fetching, storage, configuration,
//! navigation state) aggregated into [`BooknavError`], which maps each
//! failure onto a process exit code.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `booknav` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Fetch error (timeout, HTTP status, connection failure)
    pub const FETCH_ERROR: i32 = 4;

    /// Usage error (invalid arguments, unknown section id)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `booknav` operations.
///
/// This enum aggregates all domain-specific errors and provides
/// a unified interface for error handling and exit code mapping.
#[derive(Debug, Error)]
pub enum BooknavError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Content scanning error
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Page or API fetch error
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Preference store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Navigation menu error
    #[error(transparent)]
    Nav(#[from] NavError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BooknavError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => ExitCode::CONFIG_ERROR,
            Self::Fetch(_) => ExitCode::FETCH_ERROR,
            Self::Nav(_) => ExitCode::USAGE_ERROR,
            Self::Scan(_) | Self::Store(_) | Self::Io(_) => ExitCode::IO_ERROR,
            Self::Json(_) => ExitCode::ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Site configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },
}

// ============================================================================
// Scan Errors
// ============================================================================

/// Errors raised while emitting navigation data.
///
/// Missing or unreadable content never produces a `ScanError`; the
/// scanner skips it and keeps going.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The site root itself is not a directory
    #[error("site root is not a directory: {0}")]
    SiteRoot(PathBuf),

    /// Writing the serialized tree failed
    #[error("failed to write {path}: {source}")]
    Write {
        /// Output path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Fetch Errors
// ============================================================================

/// Failures fetching a page (for heading extraction) or API data.
///
/// All of these are recoverable: callers render an inline, retryable
/// placeholder instead of failing the page.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request did not complete within the configured timeout
    #[error("request timeout after {0}ms")]
    Timeout(u64),

    /// Non-2xx response
    #[error("HTTP error {0}")]
    Status(u16),

    /// Connection or transport failure
    #[error("network error: {0}")]
    Network(String),

    /// The href is not a same-origin relative path
    #[error("invalid href '{0}'")]
    InvalidHref(String),

    /// Local file could not be read
    #[error("read error: {0}")]
    Io(String),

    /// Response body could not be decoded
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

// ============================================================================
// Store Errors
// ============================================================================

/// Preference store persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error reading or writing the backing file
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized
    #[error("store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Navigation Errors
// ============================================================================

/// Navigation menu state errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavError {
    /// No menu item has the given id
    #[error("unknown section: {0}")]
    UnknownSection(String),
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `booknav` operations.
pub type Result<T> = std::result::Result<T, BooknavError>;

// ============================================================================
// Tests
// ============================================================================
