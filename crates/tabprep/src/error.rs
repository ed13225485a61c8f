//! Error types for the preparation pipeline.
//!
//! Every stage returns [`Result`]; the first error halts the run and is
//! handed back to the caller, which decides the process exit status.
//!
//! Errors are serializable so the CLI can emit them as JSON alongside the
//! run summary.

use crate::config::ConfigValidationError;
use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the preparation pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input could not be read or parsed as a delimited table.
    #[error("Failed to load '{}': {reason}", path.display())]
    LoadFailure { path: PathBuf, reason: String },

    /// The table cannot be split into features and a target.
    #[error("Not enough columns to split: found {columns}, need at least 2")]
    StructuralFailure { columns: usize },

    /// An output array could not be written.
    #[error("Failed to write '{}': {source}", path.display())]
    SaveFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stage ran before the stage that produces its input.
    #[error("Missing pipeline artifact: {0}")]
    MissingArtifact(&'static str),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PipelineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for machine consumers.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::LoadFailure { .. } => "LOAD_FAILURE",
            Self::StructuralFailure { .. } => "STRUCTURAL_FAILURE",
            Self::SaveFailure { .. } => "SAVE_FAILURE",
            Self::MissingArtifact(_) => "MISSING_ARTIFACT",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Polars(_) => "POLARS_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error came from reading the input.
    pub fn is_load_failure(&self) -> bool {
        match self {
            Self::LoadFailure { .. } => true,
            Self::WithContext { source, .. } => source.is_load_failure(),
            _ => false,
        }
    }

    /// Check if this error came from writing an output file.
    pub fn is_save_failure(&self) -> bool {
        match self {
            Self::SaveFailure { .. } => true,
            Self::WithContext { source, .. } => source.is_save_failure(),
            _ => false,
        }
    }
}

impl From<ConfigValidationError> for PipelineError {
    fn from(err: ConfigValidationError) -> Self {
        PipelineError::InvalidConfig(err.to_string())
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for PipelineError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PipelineError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PipelineError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            PipelineError::StructuralFailure { columns: 1 }.error_code(),
            "STRUCTURAL_FAILURE"
        );
        assert_eq!(
            PipelineError::MissingArtifact("features").error_code(),
            "MISSING_ARTIFACT"
        );
    }

    #[test]
    fn test_structural_failure_message() {
        let error = PipelineError::StructuralFailure { columns: 1 };
        assert_eq!(
            error.to_string(),
            "Not enough columns to split: found 1, need at least 2"
        );
    }

    #[test]
    fn test_failure_kind_through_context() {
        let error = PipelineError::LoadFailure {
            path: PathBuf::from("missing.csv"),
            reason: "no such file".to_string(),
        }
        .with_context("Loading input");

        assert!(error.is_load_failure());
        assert!(!error.is_save_failure());
        assert_eq!(error.error_code(), "LOAD_FAILURE");
        assert!(error.to_string().starts_with("Loading input"));
    }

    #[test]
    fn test_save_failure_keeps_path() {
        let error = PipelineError::SaveFailure {
            path: PathBuf::from("out/x_data.npy"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(error.is_save_failure());
        assert!(error.to_string().contains("out/x_data.npy"));
    }

    #[test]
    fn test_error_serialization() {
        let error = PipelineError::InvalidConfig("empty file name".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("INVALID_CONFIG"));
        assert!(json.contains("empty file name"));
    }

    #[test]
    fn test_config_validation_becomes_invalid_config() {
        let error: PipelineError =
            ConfigValidationError::SameOutputFile("out.npy".to_string()).into();

        assert_eq!(error.error_code(), "INVALID_CONFIG");
        assert!(error.to_string().contains("out.npy"));
    }
}
