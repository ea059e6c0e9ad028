//! Error types for the layer editor.
//!
//! Provides a hierarchy of error types using `thiserror` for ergonomic error handling.
//! Errors local to one unit of work ([`AssetResolutionError`], [`DecodeError`]) are
//! recovered where they occur; everything else converts into [`EditorError`].

use std::io;
use thiserror::Error;
use serde::Serialize;

/// Structural problems found while validating a project file.
///
/// Checks run in declaration order and stop at the first violation.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ValidationError {
    #[error("Project file has no version field")]
    MissingVersion,
    #[error("Project canvas is missing or has non-numeric width/height")]
    InvalidCanvas,
    #[error("Project layers must be a list")]
    InvalidLayers,
    #[error("Project presets must be a list")]
    InvalidPresets,
    #[error("Canvas width and height must be greater than zero")]
    NonPositiveCanvas,
    #[error("Canvas width and height must not exceed {max} pixels", max = crate::core::MAX_CANVAS_DIMENSION)]
    CanvasTooLarge,
}

/// A layer's `file_path` could not be turned into a source reference.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("Could not resolve asset '{file_path}': {reason}")]
pub struct AssetResolutionError {
    pub file_path: String,
    pub reason: String,
}

impl AssetResolutionError {
    pub fn new(file_path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            reason: reason.into(),
        }
    }
}

/// A single layer failed to decode during compositing.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DecodeError {
    /// The layer points at a placeholder, its asset was never resolved
    #[error("Asset was not resolved: {0}")]
    Unresolved(String),
    /// Reading the source bytes failed
    #[error("Failed to read source: {0}")]
    Read(String),
    /// The bytes are not a supported image
    #[error("Failed to decode image: {0}")]
    Image(String),
    /// The decode task itself died
    #[error("Decode task failed: {0}")]
    Task(String),
}

/// Main error type for the editor.
///
/// All errors that cross an operation boundary are converted to this type before being
/// returned to the caller (or the frontend, which is why it is `Serialize`).
#[derive(Error, Debug, Serialize)]
pub enum EditorError {
    /// Project file failed structural validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Project file is not valid JSON
    #[error("Parse error: {0}")]
    Parse(String),

    /// Project file declares a version this build cannot read
    #[error("Unsupported project version: {0}")]
    UnsupportedVersion(String),

    /// Preset name was empty after trimming
    #[error("Preset name cannot be empty")]
    EmptyName,

    /// No preset with the given id
    #[error("Preset not found: {0}")]
    PresetNotFound(String),

    /// Compositing could not start or finish
    #[error("Composite error: {0}")]
    Composite(String),

    /// Raster could not be encoded to the requested format
    #[error("Encode error: {0}")]
    Encode(String),

    /// Platform sink failed to read or write
    #[error("Sink error: {0}")]
    Sink(String),

    /// The user dismissed a file dialog
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Request kind outside the supported set
    #[error("Unsupported task: {0}")]
    UnsupportedTask(String),

    /// Invalid editor configuration
    #[error("Config error: {0}")]
    Config(String),

    /// File IO error
    #[error("IO error: {0}")]
    IO(String),
}

/// Convenience result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

// Helper methods for error creation
impl EditorError {
    pub fn parse<T: Into<String>>(msg: T) -> Self {
        Self::Parse(msg.into())
    }

    pub fn composite<T: Into<String>>(msg: T) -> Self {
        Self::Composite(msg.into())
    }

    pub fn encode<T: Into<String>>(msg: T) -> Self {
        Self::Encode(msg.into())
    }

    pub fn sink<T: Into<String>>(msg: T) -> Self {
        Self::Sink(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }
}

// Convert std::io::Error to EditorError
impl From<io::Error> for EditorError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}

impl From<serde_json::Error> for EditorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_surface_their_reason() {
        let err: EditorError = ValidationError::CanvasTooLarge.into();
        assert_eq!(
            err.to_string(),
            "Validation error: Canvas width and height must not exceed 50000 pixels"
        );
    }

    #[test]
    fn serializes_for_the_frontend() {
        let json = serde_json::to_value(EditorError::UnsupportedTask("print".into())).unwrap();
        assert_eq!(json, serde_json::json!({ "UnsupportedTask": "print" }));
    }
}
