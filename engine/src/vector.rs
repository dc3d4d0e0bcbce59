//! Columnar result storage.
//!
//! A result is a sequence of data chunks; each chunk holds one `Vector` per
//! column. A vector pairs raw native slots (`VectorData`) with a validity
//! bitmap. Nested types reference child vectors: lists through
//! offset/length entries, arrays through a fixed stride, structs (and unions
//! and map entries, which are structs at the storage level) through one child
//! vector per field.

use crate::types::LogicalType;
use crate::value::{NativeInterval, UWideInt, WideInt};

/// Null bitmap; a missing mask means every row is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validity {
    mask: Option<Vec<u64>>,
}

impl Validity {
    pub fn all_valid() -> Self {
        Self { mask: None }
    }

    /// Build from per-row flags (`true` = valid).
    pub fn from_flags(flags: &[bool]) -> Self {
        let mut validity = Self::all_valid();
        for (row, valid) in flags.iter().enumerate() {
            if !valid {
                validity.set_invalid(row);
            }
        }
        validity
    }

    pub fn is_valid(&self, row: usize) -> bool {
        match &self.mask {
            None => true,
            Some(words) => match words.get(row / 64) {
                Some(word) => word & (1u64 << (row % 64)) != 0,
                None => true,
            },
        }
    }

    pub fn set_invalid(&mut self, row: usize) {
        let words = self.mask.get_or_insert_with(Vec::new);
        let word = row / 64;
        if words.len() <= word {
            words.resize(word + 1, u64::MAX);
        }
        words[word] &= !(1u64 << (row % 64));
    }
}

/// Offset/length pair locating one list value inside the child vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListEntry {
    pub offset: u64,
    pub length: u64,
}

/// Raw native slots of a vector, one variant per physical layout.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorData {
    Bool(Vec<bool>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    HugeInt(Vec<WideInt>),
    UHugeInt(Vec<UWideInt>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Interval(Vec<NativeInterval>),
    /// String payloads: VARCHAR, BLOB, BIT and BIGNUM
    Bytes(Vec<Vec<u8>>),
    List {
        entries: Vec<ListEntry>,
        child: Box<Vector>,
    },
    /// Fixed-size arrays; row `r` owns children `r * size .. (r + 1) * size`
    Array { child: Box<Vector> },
    /// Struct-like layouts: STRUCT, UNION (tag first) and MAP entries
    Struct(Vec<Vector>),
}

impl VectorData {
    /// Number of slots, or `None` for layouts whose row count lives elsewhere
    /// (arrays and structs take it from the owning chunk).
    pub fn slot_count(&self) -> Option<usize> {
        Some(match self {
            Self::Bool(v) => v.len(),
            Self::Int8(v) => v.len(),
            Self::Int16(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::UInt8(v) => v.len(),
            Self::UInt16(v) => v.len(),
            Self::UInt32(v) => v.len(),
            Self::UInt64(v) => v.len(),
            Self::HugeInt(v) => v.len(),
            Self::UHugeInt(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Double(v) => v.len(),
            Self::Interval(v) => v.len(),
            Self::Bytes(v) => v.len(),
            Self::List { entries, .. } => entries.len(),
            Self::Array { .. } | Self::Struct(_) => return None,
        })
    }

    /// Short layout name used in error messages.
    pub fn layout_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int8(_) => "int8",
            Self::Int16(_) => "int16",
            Self::Int32(_) => "int32",
            Self::Int64(_) => "int64",
            Self::UInt8(_) => "uint8",
            Self::UInt16(_) => "uint16",
            Self::UInt32(_) => "uint32",
            Self::UInt64(_) => "uint64",
            Self::HugeInt(_) => "hugeint",
            Self::UHugeInt(_) => "uhugeint",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Interval(_) => "interval",
            Self::Bytes(_) => "bytes",
            Self::List { .. } => "list",
            Self::Array { .. } => "array",
            Self::Struct(_) => "struct",
        }
    }
}

/// One column of a data chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct Vector {
    pub logical_type: LogicalType,
    pub data: VectorData,
    pub validity: Validity,
}

impl Vector {
    pub fn new(logical_type: LogicalType, data: VectorData, validity: Validity) -> Self {
        Self {
            logical_type,
            data,
            validity,
        }
    }

    /// A vector with every row valid.
    pub fn from_data(logical_type: LogicalType, data: VectorData) -> Self {
        Self::new(logical_type, data, Validity::all_valid())
    }

    pub fn is_valid(&self, row: usize) -> bool {
        self.validity.is_valid(row)
    }
}

/// Name and type of one result column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub logical_type: LogicalType,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, logical_type: LogicalType) -> Self {
        Self {
            name: name.into(),
            logical_type,
        }
    }
}

/// A horizontal slice of a result: `len` rows across every column.
#[derive(Debug, Clone, PartialEq)]
pub struct DataChunk {
    pub columns: Vec<Vector>,
    pub len: usize,
}

impl DataChunk {
    pub fn new(columns: Vec<Vector>, len: usize) -> Self {
        Self { columns, len }
    }
}

/// Fully materialized result handed over by the engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NativeResult {
    pub columns: Vec<ColumnInfo>,
    pub chunks: Vec<DataChunk>,
    pub rows_changed: u64,
}

impl NativeResult {
    pub fn row_count(&self) -> usize {
        self.chunks.iter().map(|c| c.len).sum()
    }
}
