//! Error types for MicroVu program conversion.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the converter.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Required anchor line '{anchor}' not found. Cannot process file.")]
    MissingAnchor { anchor: String },

    #[error("Can't find '{name}' template file.")]
    MissingTemplate { name: String },

    #[error("File '{file_name}' already exists in output directory '{directory}'.")]
    OutputCollision {
        file_name: String,
        directory: PathBuf,
    },

    #[error("Cannot resolve placeholder '{placeholder}'")]
    UnresolvedPlaceholder { placeholder: String },

    #[error("Encoding error in {path}: {message}")]
    Encoding { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for converter operations.
pub type Result<T> = std::result::Result<T, ConvertError>;
