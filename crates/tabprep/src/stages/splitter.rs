use crate::arrays::{ArrayData, FeatureMatrix, TargetVector};
use crate::context::RunContext;
use crate::error::{PipelineError, Result, ResultExt};
use crate::pipeline::PipelineStage;
use crate::stages::Stage;
use polars::prelude::*;
use tracing::info;

/// Splits the table into a feature matrix and a target vector.
///
/// The last column is the target; every other column, in order, becomes a
/// feature. The table itself is forwarded unchanged.
pub struct DataSplitter;

impl DataSplitter {
    pub fn split(&self, table: &DataFrame) -> Result<(FeatureMatrix, TargetVector)> {
        let width = table.width();
        if width < 2 {
            return Err(PipelineError::StructuralFailure { columns: width });
        }

        let height = table.height();
        let (feature_columns, target_column) = table.get_columns().split_at(width - 1);
        let target_column = &target_column[0];

        let features: Vec<&Column> = feature_columns.iter().collect();
        let matrix = FeatureMatrix {
            columns: features.iter().map(|c| c.name().to_string()).collect(),
            rows: height,
            data: ArrayData::from_columns(&features, height).context("Building feature matrix")?,
        };

        let target = TargetVector {
            name: target_column.name().to_string(),
            data: ArrayData::from_columns(&[target_column], height)
                .context(format!("Building target from '{}'", target_column.name()))?,
        };

        Ok((matrix, target))
    }
}

impl Stage for DataSplitter {
    fn stage(&self) -> PipelineStage {
        PipelineStage::Splitting
    }

    fn apply(&self, table: DataFrame, ctx: &mut RunContext) -> Result<DataFrame> {
        let (features, target) = self.split(&table)?;

        info!(
            "Data split. X: {:?} ({}), y: ({},) ({})",
            features.shape(),
            features.data.descr(),
            target.len(),
            target.data.descr()
        );
        info!("Target column: '{}'", target.name);

        ctx.record_split(features, target);
        Ok(table)
    }
}
