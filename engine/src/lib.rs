//! Native engine boundary for duckbind.
//!
//! Everything the binding layer knows about the embedded engine lives here:
//! the logical type catalog, the columnar storage the engine hands back
//! (vectors, validity masks, data chunks), the scalar values accepted as
//! statement parameters, and the backend traits a native engine implements.

pub mod backend;
pub mod types;
pub mod value;
pub mod vector;

pub use backend::{
    EngineError, InterruptHandle, NativeConnection, NativeDatabase, NativePending,
    NativePendingState, NativeStatement,
};
pub use types::{DecimalStorage, LogicalType, TypeId};
pub use value::{NativeInterval, NativeValue, UWideInt, WideInt};
pub use vector::{ColumnInfo, DataChunk, ListEntry, NativeResult, Validity, Vector, VectorData};

#[cfg(feature = "backend-duckdb")]
pub use backend::duckdb::{DuckDbDatabase, DuckDbOptions};
#[cfg(feature = "backend-duckdb")]
pub use backend::open_database;
