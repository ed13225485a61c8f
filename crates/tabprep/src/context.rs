//! Per-run context threaded through every stage.
//!
//! The context is created at the start of a run with the input and output
//! locations and grows as stages record what they did. Fields are only ever
//! added; nothing removes or retypes a value written by an earlier stage.

use crate::arrays::{ElementKind, FeatureMatrix, TargetVector};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Table shape as `(rows, columns)`.
pub type Shape = (usize, usize);

/// Metadata collected over a single pipeline run.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    input_path: Option<PathBuf>,
    output_dir: PathBuf,
    original_shape: Option<Shape>,
    cleaned_shape: Option<Shape>,
    empty_rows_removed: usize,
    duplicate_rows_removed: usize,
    selected_features: Option<Vec<String>>,
    dropped_columns: Vec<String>,
    features: Option<FeatureMatrix>,
    target: Option<TargetVector>,
    target_column: Option<String>,
    output_files: Vec<PathBuf>,
}

impl RunContext {
    pub fn new(input_path: Option<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_path,
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn input_path(&self) -> Option<&Path> {
        self.input_path.as_deref()
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn original_shape(&self) -> Option<Shape> {
        self.original_shape
    }

    pub fn cleaned_shape(&self) -> Option<Shape> {
        self.cleaned_shape
    }

    pub fn empty_rows_removed(&self) -> usize {
        self.empty_rows_removed
    }

    pub fn duplicate_rows_removed(&self) -> usize {
        self.duplicate_rows_removed
    }

    pub fn selected_features(&self) -> Option<&[String]> {
        self.selected_features.as_deref()
    }

    pub fn dropped_columns(&self) -> &[String] {
        &self.dropped_columns
    }

    pub fn features(&self) -> Option<&FeatureMatrix> {
        self.features.as_ref()
    }

    pub fn target(&self) -> Option<&TargetVector> {
        self.target.as_ref()
    }

    pub fn target_column(&self) -> Option<&str> {
        self.target_column.as_deref()
    }

    pub fn output_files(&self) -> &[PathBuf] {
        &self.output_files
    }

    pub(crate) fn record_original_shape(&mut self, shape: Shape) {
        self.original_shape = Some(shape);
    }

    pub(crate) fn record_cleaning(&mut self, shape: Shape, empty_rows: usize, duplicates: usize) {
        self.cleaned_shape = Some(shape);
        self.empty_rows_removed = empty_rows;
        self.duplicate_rows_removed = duplicates;
    }

    pub(crate) fn record_selection(&mut self, selected: Vec<String>, dropped: Vec<String>) {
        self.selected_features = Some(selected);
        self.dropped_columns = dropped;
    }

    pub(crate) fn record_split(&mut self, features: FeatureMatrix, target: TargetVector) {
        self.target_column = Some(target.name.clone());
        self.features = Some(features);
        self.target = Some(target);
    }

    pub(crate) fn record_output_file(&mut self, path: PathBuf) {
        self.output_files.push(path);
    }

    /// Serializable view of the run for reporting.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            input_path: self.input_path.clone(),
            output_dir: self.output_dir.clone(),
            original_shape: self.original_shape,
            cleaned_shape: self.cleaned_shape,
            empty_rows_removed: self.empty_rows_removed,
            duplicate_rows_removed: self.duplicate_rows_removed,
            selected_features: self.selected_features.clone().unwrap_or_default(),
            dropped_columns: self.dropped_columns.clone(),
            target_column: self.target_column.clone(),
            features_shape: self.features.as_ref().map(FeatureMatrix::shape),
            features_kind: self.features.as_ref().map(|f| f.data.kind()),
            target_len: self.target.as_ref().map(TargetVector::len),
            target_kind: self.target.as_ref().map(|t| t.data.kind()),
            output_files: self.output_files.clone(),
        }
    }
}

/// Summary of a pipeline run, emitted by the CLI with `--json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub input_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub original_shape: Option<Shape>,
    pub cleaned_shape: Option<Shape>,
    pub empty_rows_removed: usize,
    pub duplicate_rows_removed: usize,
    pub selected_features: Vec<String>,
    pub dropped_columns: Vec<String>,
    pub target_column: Option<String>,
    pub features_shape: Option<Shape>,
    pub features_kind: Option<ElementKind>,
    pub target_len: Option<usize>,
    pub target_kind: Option<ElementKind>,
    pub output_files: Vec<PathBuf>,
}

impl RunSummary {
    /// Rows removed between loading and cleaning.
    pub fn rows_removed(&self) -> usize {
        self.empty_rows_removed + self.duplicate_rows_removed
    }
}
