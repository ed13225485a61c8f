//! The five preparation stages.
//!
//! The loader produces the table; every other stage implements [`Stage`],
//! takes the table produced by its predecessor and returns the table for the
//! next one. Stages record what they did in the shared [`RunContext`].

mod cleaner;
mod loader;
mod saver;
mod selector;
mod splitter;

pub use cleaner::DataCleaner;
pub use loader::DataLoader;
pub use saver::NpySaver;
pub use selector::FeatureSelector;
pub use splitter::DataSplitter;

use crate::context::RunContext;
use crate::error::Result;
use crate::pipeline::PipelineStage;
use polars::prelude::DataFrame;

/// One step of the pipeline after loading.
pub trait Stage: Send + Sync {
    /// Which pipeline stage this is, for progress reporting.
    fn stage(&self) -> PipelineStage;

    /// Transform `table`, recording results in `ctx`.
    fn apply(&self, table: DataFrame, ctx: &mut RunContext) -> Result<DataFrame>;
}
