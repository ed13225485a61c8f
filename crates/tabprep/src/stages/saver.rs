use crate::arrays::ArrayData;
use crate::config::PipelineConfig;
use crate::context::RunContext;
use crate::error::{PipelineError, Result};
use crate::pipeline::PipelineStage;
use crate::stages::Stage;
use npyz::{DType, TypeStr, WriterBuilder};
use polars::prelude::DataFrame;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Writes the feature matrix and target vector as `.npy` files.
///
/// Files go to the run's output directory. A failed write leaves any file
/// already written by this stage in place.
pub struct NpySaver {
    features_file: String,
    target_file: String,
    create_output_dir: bool,
}

impl NpySaver {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            features_file: config.features_file.clone(),
            target_file: config.target_file.clone(),
            create_output_dir: config.create_output_dir,
        }
    }

    /// Serialize `data` as an NPY v1 document with the given `shape`.
    pub fn encode(data: &ArrayData, shape: &[u64]) -> io::Result<Vec<u8>> {
        let descr = data.descr();
        match data {
            ArrayData::Bool(values) => encode_values(&descr, shape, values),
            ArrayData::Int64(values) => encode_values(&descr, shape, values),
            ArrayData::Float64(values) => encode_values(&descr, shape, values),
            ArrayData::Text { values, .. } => encode_values(&descr, shape, values),
        }
    }

    fn write(path: &Path, bytes: &[u8]) -> Result<()> {
        fs::write(path, bytes).map_err(|source| PipelineError::SaveFailure {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}

impl Default for NpySaver {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

fn encode_values<T: npyz::Serialize>(descr: &str, shape: &[u64], values: &[T]) -> io::Result<Vec<u8>> {
    let type_str: TypeStr = descr
        .parse()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("{descr}: {e}")))?;

    let mut buf = Vec::new();
    let mut writer = npyz::WriteOptions::<T>::new()
        .dtype(DType::Plain(type_str))
        .shape(shape)
        .writer(&mut buf)
        .begin_nd()?;
    for value in values {
        writer.push(value)?;
    }
    writer.finish()?;
    Ok(buf)
}

impl Stage for NpySaver {
    fn stage(&self) -> PipelineStage {
        PipelineStage::Saving
    }

    fn apply(&self, table: DataFrame, ctx: &mut RunContext) -> Result<DataFrame> {
        let output_dir = ctx.output_dir().to_path_buf();
        let features_path = output_dir.join(&self.features_file);
        let target_path = output_dir.join(&self.target_file);

        let features = ctx
            .features()
            .ok_or(PipelineError::MissingArtifact("feature matrix"))?;
        let target = ctx
            .target()
            .ok_or(PipelineError::MissingArtifact("target vector"))?;

        let (rows, cols) = features.shape();
        let features_bytes = Self::encode(&features.data, &[rows as u64, cols as u64])
            .map_err(|source| save_failure(&features_path, source))?;
        let target_bytes = Self::encode(&target.data, &[target.len() as u64])
            .map_err(|source| save_failure(&target_path, source))?;

        if self.create_output_dir {
            fs::create_dir_all(&output_dir).map_err(|source| save_failure(&output_dir, source))?;
        }

        Self::write(&features_path, &features_bytes)?;
        ctx.record_output_file(features_path.clone());

        Self::write(&target_path, &target_bytes)?;
        ctx.record_output_file(target_path.clone());

        info!("Files saved:");
        info!("  - {}", features_path.display());
        info!("  - {}", target_path.display());

        Ok(table)
    }
}

fn save_failure(path: &Path, source: io::Error) -> PipelineError {
    PipelineError::SaveFailure {
        path: PathBuf::from(path),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::{FeatureMatrix, TargetVector};
    use pretty_assertions::assert_eq;

    fn context_with_arrays(output_dir: &Path) -> RunContext {
        let mut ctx = RunContext::new(None, output_dir);
        ctx.record_split(
            FeatureMatrix {
                columns: vec!["a".into(), "b".into()],
                rows: 2,
                data: ArrayData::Float64(vec![1.0, 2.0, 3.0, 4.0]),
            },
            TargetVector {
                name: "t".into(),
                data: ArrayData::Int64(vec![0, 1]),
            },
        );
        ctx
    }

    #[test]
    fn test_encode_writes_npy_document() {
        let bytes = NpySaver::encode(&ArrayData::Int64(vec![1, 2, 3]), &[3]).unwrap();

        assert_eq!(&bytes[..6], b"\x93NUMPY");
        let npy = npyz::NpyFile::new(&bytes[..]).unwrap();
        assert_eq!(npy.shape(), &[3]);
        let values: Vec<i64> = npy.into_vec().unwrap();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn test_encode_text() {
        let data = ArrayData::Text {
            width: 5,
            values: vec!["Oslo".to_string(), "Paris".to_string()],
        };
        let bytes = NpySaver::encode(&data, &[2]).unwrap();

        let npy = npyz::NpyFile::new(&bytes[..]).unwrap();
        let values: Vec<String> = npy.into_vec().unwrap();
        assert_eq!(values, vec!["Oslo", "Paris"]);
    }

    #[test]
    fn test_encode_round_trip() {
        let bytes = NpySaver::encode(&ArrayData::Float64(vec![0.5, -1.0, 2.25, 8.0]), &[2, 2])
            .unwrap();

        let npy = npyz::NpyFile::new(&bytes[..]).unwrap();
        assert_eq!(npy.shape(), &[2, 2]);
        let values: Vec<f64> = npy.into_vec().unwrap();
        assert_eq!(values, vec![0.5, -1.0, 2.25, 8.0]);
    }

    #[test]
    fn test_saves_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context_with_arrays(dir.path());

        NpySaver::default().apply(DataFrame::empty(), &mut ctx).unwrap();

        let x_path = dir.path().join("x_data.npy");
        let y_path = dir.path().join("y_data.npy");
        assert!(x_path.is_file());
        assert!(y_path.is_file());
        assert_eq!(ctx.output_files(), &[x_path, y_path]);
    }

    #[test]
    fn test_missing_directory_is_save_failure() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let mut ctx = context_with_arrays(&missing);

        let err = NpySaver::default().apply(DataFrame::empty(), &mut ctx).unwrap_err();

        assert!(err.is_save_failure());
        assert!(ctx.output_files().is_empty());
    }

    #[test]
    fn test_creates_directory_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        let config = PipelineConfig::builder().create_output_dir(true).build().unwrap();
        let mut ctx = context_with_arrays(&nested);

        NpySaver::new(&config).apply(DataFrame::empty(), &mut ctx).unwrap();

        assert!(nested.join("x_data.npy").is_file());
        assert!(nested.join("y_data.npy").is_file());
    }

    #[test]
    fn test_without_split_is_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = RunContext::new(None, dir.path());

        let err = NpySaver::default().apply(DataFrame::empty(), &mut ctx).unwrap_err();

        assert!(matches!(err, PipelineError::MissingArtifact(_)));
        assert!(!dir.path().join("x_data.npy").exists());
    }
}
