use crate::context::RunContext;
use crate::error::{PipelineError, Result};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Reads the source table from a delimited text file with a header row.
pub struct DataLoader;

impl DataLoader {
    /// Load `path` and record its shape in `ctx`.
    ///
    /// The schema is inferred from the whole file and empty fields become
    /// nulls. A blank line is read as a row of nulls and left for the
    /// cleaner. Any read or parse problem is a [`PipelineError::LoadFailure`].
    pub fn load(&self, path: &Path, ctx: &mut RunContext) -> Result<DataFrame> {
        info!("Loading data from {}...", path.display());

        // Polars reports a missing file with a less helpful message.
        if !path.is_file() {
            return Err(PipelineError::LoadFailure {
                path: path.to_path_buf(),
                reason: "no such file".to_string(),
            });
        }

        let df = Self::read_csv(path).map_err(|e| PipelineError::LoadFailure {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let shape = df.shape();
        ctx.record_original_shape(shape);
        info!("Data loaded. Shape: {:?}", shape);
        debug!("Columns: {:?}", df.get_column_names());

        Ok(df)
    }

    fn read_csv(path: &Path) -> PolarsResult<DataFrame> {
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_records_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "data.csv", "a,b,c\n1,x,0.5\n2,y,1.5\n");
        let mut ctx = RunContext::new(Some(path.clone()), ".");

        let df = DataLoader.load(&path, &mut ctx).unwrap();

        assert_eq!(df.shape(), (2, 3));
        assert_eq!(ctx.original_shape(), Some((2, 3)));
        assert_eq!(df.column("a").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("c").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_empty_fields_are_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "data.csv", "a,b\n1,\n,\n3,z\n");
        let mut ctx = RunContext::new(None, ".");

        let df = DataLoader.load(&path, &mut ctx).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(df.column("a").unwrap().null_count(), 1);
        assert_eq!(df.column("b").unwrap().null_count(), 2);
    }

    #[test]
    fn test_blank_line_is_all_null_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "data.csv", "a,b,c\n1,x,0\n\n2,y,1\n");
        let mut ctx = RunContext::new(None, ".");

        let df = DataLoader.load(&path, &mut ctx).unwrap();

        assert_eq!(ctx.original_shape(), Some((3, 3)));
        for name in ["a", "b", "c"] {
            assert_eq!(df.column(name).unwrap().null_count(), 1);
        }

        let cleaned = crate::stages::DataCleaner.drop_empty_rows(df).unwrap();
        assert_eq!(cleaned.height(), 2);
    }

    #[test]
    fn test_missing_file_is_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.csv");
        let mut ctx = RunContext::new(None, ".");

        let err = DataLoader.load(&path, &mut ctx).unwrap_err();

        assert!(err.is_load_failure());
        assert!(ctx.original_shape().is_none());
    }
}
