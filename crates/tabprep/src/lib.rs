//! Tabular Data Preparation Pipeline
//!
//! Turns a CSV table into the two NumPy arrays a training job expects: a
//! feature matrix (`x_data.npy`) and a target vector (`y_data.npy`).
//!
//! # Overview
//!
//! A run applies five stages in a fixed order over one in-memory table:
//!
//! 1. **Loading**: read the CSV (header row required) with Polars
//! 2. **Cleaning**: drop fully-empty rows, then exact duplicates
//! 3. **Feature selection**: drop columns whose values are all unique
//! 4. **Splitting**: last column is the target, the rest are features
//! 5. **Saving**: write both arrays in `.npy` format
//!
//! Each stage records what it did in a [`RunContext`] that is returned to
//! the caller. The first error from any stage ends the run.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tabprep::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::builder()
//!     .output_dir("arrays")
//!     .create_output_dir(true)
//!     .build()?;
//!
//! let ctx = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .process("data.csv")?;
//!
//! println!("Features: {:?}", ctx.features().map(|f| f.shape()));
//! println!("Target column: {:?}", ctx.target_column());
//! ```
//!
//! # Error Handling
//!
//! ```rust,ignore
//! match pipeline.process("data.csv") {
//!     Ok(ctx) => println!("{:?}", ctx.summary()),
//!     Err(e) if e.is_load_failure() => eprintln!("Cannot read input: {}", e),
//!     Err(e) => eprintln!("Pipeline failed: {}", e),
//! }
//! ```

pub mod arrays;
pub mod config;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod stages;
pub mod utils;

// Re-exports for convenient access
pub use arrays::{ArrayData, ElementKind, FeatureMatrix, TargetVector};
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use context::{RunContext, RunSummary, Shape};
pub use error::{PipelineError, Result as PipelineResult, ResultExt};
pub use pipeline::{
    ClosureProgressReporter, Pipeline, PipelineBuilder, PipelineStage, ProgressReporter,
    ProgressUpdate,
};
pub use stages::{DataCleaner, DataLoader, DataSplitter, FeatureSelector, NpySaver, Stage};
