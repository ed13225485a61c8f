//! Shared dtype helpers.

use polars::prelude::*;

/// Check if a DataType is an integer type that fits in `i64` without loss.
///
/// `UInt64` is excluded on purpose: values above `i64::MAX` would not survive
/// the cast, so such columns are widened to float instead.
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
    )
}

/// Check if a DataType is a floating point type.
///
/// `UInt64` is grouped here, see [`is_integer_dtype`].
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32 | DataType::Float64 | DataType::UInt64
    )
}

/// Check if a DataType is boolean.
#[inline]
pub fn is_boolean_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Boolean)
}

/// Column names of a DataFrame as owned strings, in column order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}
