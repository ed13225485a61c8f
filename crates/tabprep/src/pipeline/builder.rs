//! Pipeline orchestration.
//!
//! The stage sequence is wired once in [`PipelineBuilder::build`]: the loader,
//! then cleaner, feature selector, splitter and saver applied in order. The
//! first error from any stage ends the run.

use crate::config::PipelineConfig;
use crate::context::RunContext;
use crate::error::Result;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::stages::{DataCleaner, DataLoader, DataSplitter, FeatureSelector, NpySaver, Stage};
use polars::prelude::DataFrame;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// The preparation pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use tabprep::{Pipeline, PipelineConfig};
///
/// let ctx = Pipeline::builder()
///     .config(PipelineConfig::builder().output_dir("arrays").build()?)
///     .build()?
///     .process("data.csv")?;
///
/// println!("Target: {:?}", ctx.target_column());
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    loader: DataLoader,
    stages: Vec<Box<dyn Stage>>,
}

static_assertions::assert_impl_all!(Pipeline: Send, Sync);

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Stages run after loading, in order.
    pub fn stages(&self) -> Vec<PipelineStage> {
        self.stages.iter().map(|stage| stage.stage()).collect()
    }

    /// Run every stage on the CSV file at `path`.
    ///
    /// Returns the run context on success. On failure nothing after the
    /// failing stage runs; files written earlier in the run are kept.
    pub fn process(&self, path: impl AsRef<Path>) -> Result<RunContext> {
        let path = path.as_ref();
        let mut ctx = RunContext::new(Some(path.to_path_buf()), &self.config.output_dir);
        let result = self.process_internal(None, &mut ctx);
        self.finish(result, ctx)
    }

    /// Run every stage after loading on an in-memory table.
    pub fn process_frame(&self, df: DataFrame) -> Result<RunContext> {
        let mut ctx = RunContext::new(None, &self.config.output_dir);
        let result = self.process_internal(Some(df), &mut ctx);
        self.finish(result, ctx)
    }

    fn finish(&self, result: Result<()>, ctx: RunContext) -> Result<RunContext> {
        match result {
            Ok(()) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(ctx)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn process_internal(&self, df: Option<DataFrame>, ctx: &mut RunContext) -> Result<()> {
        let start_time = Instant::now();
        info!("Starting data preparation pipeline...");

        let mut table = match df {
            Some(df) => {
                ctx.record_original_shape(df.shape());
                info!("Using in-memory table. Shape: {:?}", df.shape());
                df
            }
            None => {
                self.report_progress(ProgressUpdate::new(
                    PipelineStage::Loading,
                    0.0,
                    "Loading data...",
                ));
                let path = ctx.input_path().map(Path::to_path_buf).unwrap_or_default();
                let df = self.loader.load(&path, ctx)?;
                self.report_progress(ProgressUpdate::new(
                    PipelineStage::Loading,
                    1.0,
                    format!("Loaded {} rows x {} columns", df.height(), df.width()),
                ));
                df
            }
        };

        for stage in &self.stages {
            let kind = stage.stage();
            self.report_progress(ProgressUpdate::new(
                kind,
                0.0,
                format!("{}...", kind.display_name()),
            ));

            table = stage.apply(table, ctx)?;

            self.report_progress(ProgressUpdate::new(
                kind,
                1.0,
                format!("{} complete", kind.display_name()),
            ));
        }

        info!(
            "Pipeline finished in {}ms",
            start_time.elapsed().as_millis()
        );
        Ok(())
    }
}

/// Builder for creating a [`Pipeline`] instance.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

impl PipelineBuilder {
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// Convenience wrapper over [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns [`PipelineError::InvalidConfig`](crate::error::PipelineError::InvalidConfig)
    /// if the configuration is invalid.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(DataCleaner),
            Box::new(FeatureSelector::new(config.select_on_empty_table)),
            Box::new(DataSplitter),
            Box::new(NpySaver::new(&config)),
        ];

        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
            loader: DataLoader,
            stages,
        })
    }
}
