use crate::context::RunContext;
use crate::error::Result;
use crate::pipeline::PipelineStage;
use crate::stages::Stage;
use crate::utils::column_names;
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Drops identifier-like columns, i.e. columns whose values are all unique.
///
/// All decisions are made against the incoming table and the marked columns
/// are removed in a single pass. Nulls are not counted as a distinct value,
/// so a column with a missing cell is never all-unique.
pub struct FeatureSelector {
    select_on_empty_table: bool,
}

impl FeatureSelector {
    pub fn new(select_on_empty_table: bool) -> Self {
        Self {
            select_on_empty_table,
        }
    }

    /// Whether every value in `column` is distinct, given `height` rows.
    pub fn is_all_unique(column: &Column, height: usize) -> Result<bool> {
        let distinct = column.drop_nulls().n_unique()?;
        Ok(distinct == height)
    }

    /// Names of the columns that would be dropped from `df`.
    pub fn identifier_columns(&self, df: &DataFrame) -> Result<Vec<String>> {
        let height = df.height();
        if height == 0 && !self.select_on_empty_table {
            return Ok(Vec::new());
        }

        let mut marked = Vec::new();
        for column in df.get_columns() {
            if Self::is_all_unique(column, height)? {
                debug!("Column '{}' has {} unique values", column.name(), height);
                marked.push(column.name().to_string());
            }
        }
        Ok(marked)
    }
}

impl Default for FeatureSelector {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Stage for FeatureSelector {
    fn stage(&self) -> PipelineStage {
        PipelineStage::FeatureSelection
    }

    fn apply(&self, table: DataFrame, ctx: &mut RunContext) -> Result<DataFrame> {
        if table.height() == 0 && !self.select_on_empty_table && table.width() > 0 {
            warn!("Table has no rows; keeping all {} columns", table.width());
        }

        let dropped = self.identifier_columns(&table)?;
        let table = if dropped.is_empty() {
            table
        } else {
            let names: Vec<PlSmallStr> = dropped.iter().map(|s| s.as_str().into()).collect();
            let table = table.drop_many(names);
            info!("Dropped columns with all-unique values: {:?}", dropped);
            table
        };

        ctx.record_selection(column_names(&table), dropped);
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn select(selector: &FeatureSelector, df: DataFrame) -> (DataFrame, RunContext) {
        let mut ctx = RunContext::new(None, ".");
        let df = selector.apply(df, &mut ctx).unwrap();
        (df, ctx)
    }

    #[test]
    fn test_drops_identifier_column() {
        let df = df! {
            "id" => [1, 2, 3, 4, 5],
            "b" => ["u", "v", "u", "w", "x"],
            "target" => [0, 1, 0, 1, 1],
        }
        .unwrap();

        let (df, ctx) = select(&FeatureSelector::default(), df);

        assert_eq!(column_names(&df), vec!["b", "target"]);
        assert_eq!(ctx.dropped_columns(), &["id".to_string()]);
        assert_eq!(
            ctx.selected_features().unwrap(),
            &["b".to_string(), "target".to_string()]
        );
    }

    #[test]
    fn test_repeated_value_column_is_kept() {
        let df = df! {
            "a" => [1, 1],
            "b" => [1, 2],
        }
        .unwrap();

        let (df, _) = select(&FeatureSelector::default(), df);
        assert_eq!(column_names(&df), vec!["a"]);
    }

    #[test]
    fn test_decisions_use_pre_removal_table() {
        // Every column is unique, so every column goes in one pass.
        let df = df! {
            "a" => [1, 2, 3],
            "b" => ["x", "y", "z"],
        }
        .unwrap();

        let (df, ctx) = select(&FeatureSelector::default(), df);
        assert_eq!(df.width(), 0);
        assert_eq!(ctx.dropped_columns().len(), 2);
    }

    #[test]
    fn test_nulls_are_not_distinct_values() {
        let df = df! {
            "with_gap" => [Some(1), Some(2), None],
            "all_null" => [None::<i32>, None, None],
            "dense" => [1, 1, 2],
        }
        .unwrap();

        let (df, ctx) = select(&FeatureSelector::default(), df);
        assert_eq!(column_names(&df), vec!["with_gap", "all_null", "dense"]);
        assert!(ctx.dropped_columns().is_empty());
    }

    #[test]
    fn test_survivors_keep_order() {
        let df = df! {
            "c" => [1, 1, 2],
            "id" => [7, 8, 9],
            "a" => [3, 3, 3],
        }
        .unwrap();

        let (df, _) = select(&FeatureSelector::default(), df);
        assert_eq!(column_names(&df), vec!["c", "a"]);
    }

    #[test]
    fn test_empty_table_keeps_columns_by_default() {
        let df = df! {
            "a" => Vec::<i64>::new(),
            "b" => Vec::<i64>::new(),
        }
        .unwrap();

        let (df, ctx) = select(&FeatureSelector::default(), df);
        assert_eq!(df.width(), 2);
        assert!(ctx.dropped_columns().is_empty());
    }

    #[test]
    fn test_empty_table_drops_all_when_enabled() {
        let df = df! {
            "a" => Vec::<i64>::new(),
            "b" => Vec::<i64>::new(),
        }
        .unwrap();

        let (df, ctx) = select(&FeatureSelector::new(true), df);
        assert_eq!(df.width(), 0);
        assert_eq!(ctx.dropped_columns(), &["a".to_string(), "b".to_string()]);
    }
}
