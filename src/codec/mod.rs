//! Value codecs between host values and native storage.
//!
//! Each codec pairs an encode direction (host value to [`engine::NativeValue`]
//! parameter) with a decode direction (native vector slot to
//! [`crate::value::RowValue`]). The fixed-width and wide-integer codecs are
//! leaves; decimal and temporal build on the wide codec; the composite codec
//! recurses through the dispatcher.

pub mod composite;
pub mod decimal;
pub mod fixed;
pub mod temporal;
pub mod wide;

use engine::{LogicalType, VectorData};

use crate::error::{DuckError, Result};

/// Raised when a vector's storage does not match its logical type.
pub(crate) fn layout_mismatch(logical_type: &LogicalType, data: &VectorData) -> DuckError {
    DuckError::invalid_state(format!(
        "column of type {} has {} storage",
        logical_type,
        data.layout_name()
    ))
}

/// Raised when a row index points past a vector's slots.
pub(crate) fn slot_missing(row: usize) -> DuckError {
    DuckError::range(format!("row {} is outside the vector", row))
}

/// Copy one slot out of a native buffer.
pub(crate) fn slot<T: Copy>(values: &[T], row: usize) -> Result<T> {
    values.get(row).copied().ok_or_else(|| slot_missing(row))
}
