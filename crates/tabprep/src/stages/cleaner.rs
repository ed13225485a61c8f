use crate::context::RunContext;
use crate::error::{Result, ResultExt};
use crate::pipeline::PipelineStage;
use crate::stages::Stage;
use polars::prelude::*;
use tracing::{debug, info};

/// Removes fully-empty rows, then exact-duplicate rows.
///
/// Duplicates are computed after empty rows are gone, keep the first
/// occurrence and preserve row order. Nulls compare equal to nulls and
/// float NaN compares equal to NaN.
pub struct DataCleaner;

impl DataCleaner {
    /// Drop every row whose values are all null.
    pub fn drop_empty_rows(&self, df: DataFrame) -> Result<DataFrame> {
        if df.width() == 0 || df.height() == 0 {
            return Ok(df);
        }

        let mut all_null: Option<BooleanChunked> = None;
        for column in df.get_columns() {
            let is_null = column.as_materialized_series().is_null();
            all_null = Some(match all_null {
                Some(acc) => &acc & &is_null,
                None => is_null,
            });
        }

        match all_null {
            Some(mask) => df.filter(&!&mask).context("Removing empty rows"),
            None => Ok(df),
        }
    }

    /// Drop rows identical to an earlier row, keeping the first.
    pub fn drop_duplicate_rows(&self, df: DataFrame) -> Result<DataFrame> {
        if df.width() == 0 || df.height() < 2 {
            return Ok(df);
        }

        df.lazy()
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()
            .context("Removing duplicate rows")
    }
}

impl Stage for DataCleaner {
    fn stage(&self) -> PipelineStage {
        PipelineStage::Cleaning
    }

    fn apply(&self, table: DataFrame, ctx: &mut RunContext) -> Result<DataFrame> {
        let initial_rows = table.height();

        let table = self.drop_empty_rows(table)?;
        let empty_rows = initial_rows - table.height();
        debug!("Removed {} fully-empty rows", empty_rows);

        let before_duplicates = table.height();
        let table = self.drop_duplicate_rows(table)?;
        let duplicates = before_duplicates - table.height();
        debug!("Removed {} duplicate rows", duplicates);

        let removed = empty_rows + duplicates;
        if removed > 0 {
            info!("Data cleaned. Rows removed: {}", removed);
        } else {
            info!("Data cleaned. No rows removed");
        }

        ctx.record_cleaning(table.shape(), empty_rows, duplicates);
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn clean(df: DataFrame) -> (DataFrame, RunContext) {
        let mut ctx = RunContext::new(None, ".");
        let df = DataCleaner.apply(df, &mut ctx).unwrap();
        (df, ctx)
    }

    #[test]
    fn test_removes_exact_duplicate() {
        let df = df! {
            "a" => [1, 2, 1, 3],
            "b" => ["x", "y", "x", "z"],
        }
        .unwrap();

        let (df, ctx) = clean(df);

        assert_eq!(df.height(), 3);
        assert_eq!(ctx.duplicate_rows_removed(), 1);
        assert_eq!(ctx.empty_rows_removed(), 0);
        assert_eq!(ctx.cleaned_shape(), Some((3, 2)));
    }

    #[test]
    fn test_keeps_first_occurrence_in_order() {
        let df = df! {
            "a" => [3, 1, 3, 2, 1],
        }
        .unwrap();

        let (df, _) = clean(df);
        let values: Vec<Option<i32>> = df
            .column("a")
            .unwrap()
            .as_materialized_series()
            .i32()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some(3), Some(1), Some(2)]);
    }

    #[test]
    fn test_removes_fully_empty_rows_only() {
        let df = df! {
            "a" => [Some(1), None, None],
            "b" => [Some("x"), None, Some("y")],
        }
        .unwrap();

        let (df, ctx) = clean(df);

        assert_eq!(df.height(), 2);
        assert_eq!(ctx.empty_rows_removed(), 1);
        assert_eq!(ctx.duplicate_rows_removed(), 0);
    }

    #[test]
    fn test_empty_rows_removed_before_duplicates() {
        // Two all-null rows are counted as empty, not as a duplicate pair.
        let df = df! {
            "a" => [None, Some(1), None],
            "b" => [None, Some(2.0), None],
        }
        .unwrap();

        let (df, ctx) = clean(df);

        assert_eq!(df.height(), 1);
        assert_eq!(ctx.empty_rows_removed(), 2);
        assert_eq!(ctx.duplicate_rows_removed(), 0);
    }

    #[test]
    fn test_partial_nulls_compare_equal() {
        let df = df! {
            "a" => [Some(1), Some(1)],
            "b" => [None::<&str>, None],
        }
        .unwrap();

        let (df, ctx) = clean(df);
        assert_eq!(df.height(), 1);
        assert_eq!(ctx.duplicate_rows_removed(), 1);
    }

    #[test]
    fn test_nan_rows_are_duplicates() {
        let df = df! {
            "a" => [f64::NAN, f64::NAN, 1.0],
            "b" => [1, 1, 1],
        }
        .unwrap();

        let (df, ctx) = clean(df);
        assert_eq!(df.height(), 2);
        assert_eq!(ctx.duplicate_rows_removed(), 1);
    }

    #[test]
    fn test_idempotent() {
        let df = df! {
            "a" => [Some(1), None, Some(1), Some(2)],
            "b" => [Some("x"), None, Some("x"), Some("y")],
        }
        .unwrap();

        let (once, _) = clean(df);
        let (twice, ctx) = clean(once.clone());

        assert_eq!(once.height(), 2);
        assert!(once.equals_missing(&twice));
        assert_eq!(ctx.empty_rows_removed() + ctx.duplicate_rows_removed(), 0);
    }

    #[test]
    fn test_empty_table() {
        let df = df! {
            "a" => Vec::<i64>::new(),
        }
        .unwrap();

        let (df, ctx) = clean(df);
        assert_eq!(df.height(), 0);
        assert_eq!(ctx.cleaned_shape(), Some((0, 1)));
    }
}
