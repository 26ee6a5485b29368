//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the workspace engine. The simulated
//! pipelines never fail by design, so the taxonomy is small: boundary
//! rejections (empty input, invalid state), injected-capability failures
//! (clipboard), and configuration plumbing.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from pipeline boundaries and capabilities
//! - **Output**: Structured error types with context
//! - **Error Categories**: Configuration, Upload, Chat, Search, Clipboard

use thiserror::Error;

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, NexusError>;

/// Error types for the workspace engine
#[derive(Debug, Error)]
pub enum NexusError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors for configuration fields
    #[error("Validation failed for field '{field}': {reason}")]
    ValidationFailed { field: String, reason: String },

    /// Empty or whitespace-only input rejected at a pipeline boundary
    #[error("Empty input rejected for {field}")]
    EmptyInput { field: String },

    /// Query exceeds the configured length bound
    #[error("Query too long: {length} characters exceeds limit of {limit}")]
    QueryTooLong { length: usize, limit: usize },

    /// Progress simulation started while a previous run is still ticking
    #[error("Upload already in progress")]
    UploadInProgress,

    /// Chat message sent while an assistant reply is still pending
    #[error("Assistant reply still pending")]
    ReplyPending,

    /// Model id not present in the catalog
    #[error("Unknown model: {id}")]
    UnknownModel { id: String },

    /// Platform clipboard write rejected
    #[error("Clipboard write failed: {details}")]
    ClipboardWriteFailed { details: String },

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Internal system errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl NexusError {
    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            NexusError::Config { .. }
            | NexusError::ValidationFailed { .. }
            | NexusError::Toml(_) => "configuration",
            NexusError::UploadInProgress => "upload",
            NexusError::ReplyPending | NexusError::UnknownModel { .. } => "chat",
            NexusError::QueryTooLong { .. } => "search",
            NexusError::ClipboardWriteFailed { .. } => "clipboard",
            NexusError::EmptyInput { .. } => "input",
            NexusError::Io(_) | NexusError::Json(_) | NexusError::Internal { .. } => "generic",
        }
    }

    /// True for rejections the caller should surface to the user rather
    /// than treat as a fault
    pub fn is_user_rejection(&self) -> bool {
        matches!(
            self,
            NexusError::EmptyInput { .. }
                | NexusError::QueryTooLong { .. }
                | NexusError::UploadInProgress
                | NexusError::ReplyPending
                | NexusError::UnknownModel { .. }
        )
    }
}
