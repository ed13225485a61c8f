//! Dense arrays produced by the split stage.
//!
//! Values are copied out of polars columns without any encoding. The element
//! type of an array is resolved once from all of its source columns:
//!
//! | source columns                              | element kind       |
//! |---------------------------------------------|--------------------|
//! | only booleans, no nulls                     | `Bool`             |
//! | integers (and booleans), no nulls           | `Int64`            |
//! | numeric, with any float column or any null  | `Float64`, null→NaN |
//! | any string, temporal or other column        | `Text`, null→""    |
//!
//! Columns holding nothing but nulls do not take part in the decision.

use crate::error::Result;
use crate::utils::{is_boolean_dtype, is_float_dtype, is_integer_dtype};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Element type of an output array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Bool,
    Int64,
    Float64,
    Text,
}

impl ElementKind {
    /// Resolve the common element kind for a set of columns.
    pub fn resolve<'a>(columns: impl IntoIterator<Item = &'a Column>) -> Self {
        let mut all_bool = true;
        let mut has_float = false;
        let mut has_null = false;

        for column in columns {
            let nulls = column.null_count();
            if nulls > 0 {
                has_null = true;
            }
            if nulls > 0 && nulls == column.len() {
                continue;
            }

            let dtype = column.dtype();
            if is_boolean_dtype(dtype) {
                continue;
            }
            all_bool = false;
            if is_float_dtype(dtype) {
                has_float = true;
            } else if !is_integer_dtype(dtype) {
                return Self::Text;
            }
        }

        match (all_bool, has_float, has_null) {
            (_, _, true) | (_, true, _) => Self::Float64,
            (true, false, false) => Self::Bool,
            (false, false, false) => Self::Int64,
        }
    }

    /// NumPy dtype descriptor for this kind, e.g. `<f8`.
    pub fn descr(&self, text_width: usize) -> String {
        match self {
            Self::Bool => "|b1".to_string(),
            Self::Int64 => "<i8".to_string(),
            Self::Float64 => "<f8".to_string(),
            Self::Text => format!("<U{}", text_width.max(1)),
        }
    }
}

/// Flat, row-major array values.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Bool(Vec<bool>),
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    /// Fixed-width unicode text; `width` is the longest value in characters.
    Text { width: usize, values: Vec<String> },
}

impl ArrayData {
    /// Number of stored elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Bool(values) => values.len(),
            Self::Int64(values) => values.len(),
            Self::Float64(values) => values.len(),
            Self::Text { values, .. } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Bool(_) => ElementKind::Bool,
            Self::Int64(_) => ElementKind::Int64,
            Self::Float64(_) => ElementKind::Float64,
            Self::Text { .. } => ElementKind::Text,
        }
    }

    /// NumPy dtype descriptor of the stored elements.
    pub fn descr(&self) -> String {
        match self {
            Self::Text { width, .. } => self.kind().descr(*width),
            _ => self.kind().descr(0),
        }
    }

    /// Copy `columns` into one row-major buffer of `height` rows.
    pub fn from_columns(columns: &[&Column], height: usize) -> Result<Self> {
        let kind = ElementKind::resolve(columns.iter().copied());

        let data = match kind {
            ElementKind::Bool => {
                let values = columns
                    .iter()
                    .map(|column| bool_values(column))
                    .collect::<Result<Vec<_>>>()?;
                Self::Bool(interleave(values, height))
            }
            ElementKind::Int64 => {
                let values = columns
                    .iter()
                    .map(|column| i64_values(column))
                    .collect::<Result<Vec<_>>>()?;
                Self::Int64(interleave(values, height))
            }
            ElementKind::Float64 => {
                let values = columns
                    .iter()
                    .map(|column| f64_values(column))
                    .collect::<Result<Vec<_>>>()?;
                Self::Float64(interleave(values, height))
            }
            ElementKind::Text => {
                let values = columns
                    .iter()
                    .map(|column| text_values(column))
                    .collect::<Result<Vec<_>>>()?;
                let values = interleave(values, height);
                let width = values
                    .iter()
                    .map(|value| value.chars().count())
                    .max()
                    .unwrap_or(0)
                    .max(1);
                Self::Text { width, values }
            }
        };

        Ok(data)
    }
}

fn bool_values(column: &Column) -> Result<Vec<bool>> {
    let cast = column.cast(&DataType::Boolean)?;
    let values = cast.as_materialized_series().bool()?;
    Ok(values.into_iter().map(|v| v.unwrap_or(false)).collect())
}

fn i64_values(column: &Column) -> Result<Vec<i64>> {
    let cast = column.cast(&DataType::Int64)?;
    let values = cast.as_materialized_series().i64()?;
    Ok(values.into_iter().map(|v| v.unwrap_or(0)).collect())
}

fn f64_values(column: &Column) -> Result<Vec<f64>> {
    let cast = column.cast(&DataType::Float64)?;
    let values = cast.as_materialized_series().f64()?;
    Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

fn text_values(column: &Column) -> Result<Vec<String>> {
    let cast = column.cast(&DataType::String)?;
    let values = cast.as_materialized_series().str()?;
    Ok(values
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect())
}

/// Turn column-major vectors into one row-major buffer.
fn interleave<T: Clone>(columns: Vec<Vec<T>>, height: usize) -> Vec<T> {
    let mut out = Vec::with_capacity(columns.len() * height);
    for row in 0..height {
        for column in &columns {
            out.push(column[row].clone());
        }
    }
    out
}

/// Two-dimensional feature matrix, `rows x columns.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub rows: usize,
    pub data: ArrayData,
}

impl FeatureMatrix {
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.columns.len())
    }
}

/// One-dimensional target vector.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetVector {
    pub name: String,
    pub data: ArrayData,
}

impl TargetVector {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
