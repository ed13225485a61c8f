//! Configuration for the preparation pipeline.
//!
//! Use [`PipelineConfig::builder()`] for a validated configuration with a
//! fluent API, or deserialize one with serde.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default file name for the feature matrix.
pub const DEFAULT_FEATURES_FILE: &str = "x_data.npy";

/// Default file name for the target vector.
pub const DEFAULT_TARGET_FILE: &str = "y_data.npy";

/// Configuration for the preparation pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use tabprep::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .output_dir("arrays")
///     .create_output_dir(true)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory the two arrays are written to.
    /// Default: current directory
    pub output_dir: PathBuf,

    /// File name of the feature matrix inside `output_dir`.
    /// Default: "x_data.npy"
    pub features_file: String,

    /// File name of the target vector inside `output_dir`.
    /// Default: "y_data.npy"
    pub target_file: String,

    /// Create `output_dir` (and parents) before saving.
    /// Default: false
    pub create_output_dir: bool,

    /// Run the all-unique column test on a zero-row table, which drops
    /// every column. When false, an empty table keeps all its columns.
    /// Default: false
    pub select_on_empty_table: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            features_file: DEFAULT_FEATURES_FILE.to_string(),
            target_file: DEFAULT_TARGET_FILE.to_string(),
            create_output_dir: false,
            select_on_empty_table: false,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for (field, value) in [
            ("features_file", &self.features_file),
            ("target_file", &self.target_file),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigValidationError::EmptyFileName(field));
            }
            if value.contains('/') || value.contains('\\') {
                return Err(ConfigValidationError::NotAFileName {
                    field,
                    value: value.clone(),
                });
            }
        }

        if self.features_file == self.target_file {
            return Err(ConfigValidationError::SameOutputFile(
                self.features_file.clone(),
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Output file name for '{0}' must not be empty")]
    EmptyFileName(&'static str),

    #[error("Output file name for '{field}' must not contain a path separator: {value}")]
    NotAFileName { field: &'static str, value: String },

    #[error("Features and target would both be written to '{0}'")]
    SameOutputFile(String),
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    output_dir: Option<PathBuf>,
    features_file: Option<String>,
    target_file: Option<String>,
    create_output_dir: Option<bool>,
    select_on_empty_table: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Set the directory the arrays are written to.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the feature matrix file name.
    pub fn features_file(mut self, name: impl Into<String>) -> Self {
        self.features_file = Some(name.into());
        self
    }

    /// Set the target vector file name.
    pub fn target_file(mut self, name: impl Into<String>) -> Self {
        self.target_file = Some(name.into());
        self
    }

    /// Create the output directory if it does not exist.
    pub fn create_output_dir(mut self, create: bool) -> Self {
        self.create_output_dir = Some(create);
        self
    }

    /// Apply feature selection even when the table has no rows.
    pub fn select_on_empty_table(mut self, select: bool) -> Self {
        self.select_on_empty_table = Some(select);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let config = PipelineConfig {
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from(".")),
            features_file: self
                .features_file
                .unwrap_or_else(|| DEFAULT_FEATURES_FILE.to_string()),
            target_file: self
                .target_file
                .unwrap_or_else(|| DEFAULT_TARGET_FILE.to_string()),
            create_output_dir: self.create_output_dir.unwrap_or(false),
            select_on_empty_table: self.select_on_empty_table.unwrap_or(false),
        };

        config.validate()?;
        Ok(config)
    }
}
