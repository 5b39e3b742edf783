//! Error handling for DocArray
//!
//! Every fallible operation in the crate returns [`Result`], whose error side
//! is [`DocArrayError`]. Validation failures carry the schema and field names
//! involved so callers can report exactly which part of a document was wrong.

use thiserror::Error;

/// Result type alias for DocArray operations
pub type Result<T> = std::result::Result<T, DocArrayError>;

/// Main error type for DocArray operations
#[derive(Error, Debug)]
pub enum DocArrayError {
    // Schema / Validation Errors
    #[error("Invalid schema '{schema}': {reason}")]
    InvalidSchema { schema: String, reason: String },

    #[error("Unknown field '{field}' on document type '{schema}'")]
    UnknownField { schema: String, field: String },

    #[error("Missing required field '{field}' on document type '{schema}'")]
    MissingField { schema: String, field: String },

    #[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Schema mismatch: expected documents of type '{expected}', got '{actual}'")]
    SchemaMismatch { expected: String, actual: String },

    // Tensor Errors
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Invalid tensor shape {shape:?}: {reason}")]
    InvalidShape { shape: Vec<usize>, reason: String },

    #[error("Cannot stack: {reason}")]
    StackError { reason: String },

    // Traversal Errors
    #[error("Invalid access path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    // Audio Errors
    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Audio encoding error: {0}")]
    Audio(#[from] hound::Error),

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DocArrayError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            DocArrayError::InvalidSchema { .. } => "INVALID_SCHEMA",
            DocArrayError::UnknownField { .. } => "UNKNOWN_FIELD",
            DocArrayError::MissingField { .. } => "MISSING_FIELD",
            DocArrayError::TypeMismatch { .. } => "TYPE_MISMATCH",
            DocArrayError::SchemaMismatch { .. } => "SCHEMA_MISMATCH",
            DocArrayError::ShapeMismatch { .. } => "SHAPE_MISMATCH",
            DocArrayError::InvalidShape { .. } => "INVALID_SHAPE",
            DocArrayError::StackError { .. } => "STACK_ERROR",
            DocArrayError::InvalidPath { .. } => "INVALID_PATH",
            DocArrayError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            DocArrayError::Audio(_) => "AUDIO_ERROR",
            DocArrayError::Io(_) => "IO_ERROR",
            DocArrayError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error came from validating user-supplied values
    ///
    /// Validation errors can be fixed by the caller by changing the input;
    /// the rest originate in I/O or encoding.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            DocArrayError::UnknownField { .. }
                | DocArrayError::MissingField { .. }
                | DocArrayError::TypeMismatch { .. }
                | DocArrayError::SchemaMismatch { .. }
                | DocArrayError::ShapeMismatch { .. }
                | DocArrayError::InvalidShape { .. }
        )
    }
}
