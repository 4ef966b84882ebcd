use std::path::PathBuf;

use thiserror::Error;

use crate::package::PackageType;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Invalid package: {0}")]
    Validation(String),

    #[error("Installer unavailable for {0} packages")]
    HandlerUnavailable(PackageType),

    #[error("Operation failed for {package}: {message}")]
    OperationFailed { package: String, message: String },

    #[error("Manifest not found: {}", .0.display())]
    ManifestNotFound(PathBuf),

    #[error("Unknown machine: {0}")]
    UnknownMachine(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Error: {0}")]
    Other(#[from] anyhow::Error),
}

impl SyncError {
    /// Build an [`SyncError::OperationFailed`] for the given package ID
    pub fn operation(package: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OperationFailed {
            package: package.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
