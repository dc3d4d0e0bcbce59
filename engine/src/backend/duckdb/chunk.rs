//! Copying DuckDB data chunks into owned [`Vector`]s.
//!
//! Every vector is copied out before its chunk is destroyed, so the
//! materialized result owns all of its memory. Slots of NULL rows are copied
//! as whatever the engine left there, except string slots which are never
//! dereferenced for invalid rows.

use std::ptr;
use std::slice;

use duckdb::ffi;

use super::logical::{borrowed_string, OwnedLogicalType};
use crate::backend::EngineError;
use crate::types::{DecimalStorage, LogicalType};
use crate::value::{NativeInterval, UWideInt, WideInt};
use crate::vector::{ColumnInfo, DataChunk, ListEntry, NativeResult, Validity, Vector, VectorData};

/// Size of a `duckdb_string_t` slot.
const STRING_SLOT: usize = 16;
/// Strings up to this length are stored inside the slot.
const INLINE_LENGTH: usize = 12;

/// Owned `duckdb_result`, destroyed on drop.
pub(super) struct OwnedResult(pub(super) ffi::duckdb_result);

impl Drop for OwnedResult {
    fn drop(&mut self) {
        // SAFETY: the result was filled in by the C API and is destroyed once.
        unsafe { ffi::duckdb_destroy_result(&mut self.0) };
    }
}

struct OwnedChunk(ffi::duckdb_data_chunk);

impl Drop for OwnedChunk {
    fn drop(&mut self) {
        // SAFETY: the chunk came from duckdb_fetch_chunk and is destroyed once.
        unsafe { ffi::duckdb_destroy_data_chunk(&mut self.0) };
    }
}

/// Read columns and every chunk of a successful result.
pub(super) fn materialize(result: &mut OwnedResult) -> Result<NativeResult, EngineError> {
    // SAFETY: the result holds a successful materialized query result.
    unsafe {
        let count = ffi::duckdb_column_count(&mut result.0);
        let mut columns = Vec::with_capacity(count as usize);
        for col in 0..count {
            let name = borrowed_string(ffi::duckdb_column_name(&mut result.0, col));
            let logical_type = OwnedLogicalType::new(ffi::duckdb_column_logical_type(&mut result.0, col))
                .map(|lt| lt.to_logical())
                .unwrap_or(LogicalType::Unknown);
            columns.push(ColumnInfo::new(name, logical_type));
        }
        let rows_changed = ffi::duckdb_rows_changed(&mut result.0);

        let mut chunks = Vec::new();
        loop {
            let raw = ffi::duckdb_fetch_chunk(result.0);
            if raw.is_null() {
                break;
            }
            let chunk = OwnedChunk(raw);
            let len = ffi::duckdb_data_chunk_get_size(chunk.0) as usize;
            let mut vectors = Vec::with_capacity(columns.len());
            for (col, info) in columns.iter().enumerate() {
                let vector = ffi::duckdb_data_chunk_get_vector(chunk.0, col as u64);
                vectors.push(copy_vector(vector, &info.logical_type, len)?);
            }
            chunks.push(DataChunk::new(vectors, len));
        }

        Ok(NativeResult {
            columns,
            chunks,
            rows_changed,
        })
    }
}

/// Copy `len` fixed-width slots of type `T` from the vector's data buffer.
unsafe fn copy_slots<T: Copy>(vector: ffi::duckdb_vector, len: usize) -> Vec<T> {
    let data = unsafe { ffi::duckdb_vector_get_data(vector) } as *const T;
    if data.is_null() || len == 0 {
        return Vec::new();
    }
    // SAFETY: the engine guarantees `len` initialized slots of the
    // vector's physical type.
    unsafe { slice::from_raw_parts(data, len) }.to_vec()
}

unsafe fn copy_validity(vector: ffi::duckdb_vector, len: usize) -> Validity {
    let mask = unsafe { ffi::duckdb_vector_get_validity(vector) };
    let mut validity = Validity::all_valid();
    if mask.is_null() {
        return validity;
    }
    for row in 0..len {
        if !unsafe { ffi::duckdb_validity_row_is_valid(mask, row as u64) } {
            validity.set_invalid(row);
        }
    }
    validity
}

/// Decode `duckdb_string_t` slots: a u32 length, then either the bytes
/// inline or a prefix and a pointer to the out-of-line bytes.
unsafe fn copy_strings(vector: ffi::duckdb_vector, len: usize, validity: &Validity) -> Vec<Vec<u8>> {
    let base = unsafe { ffi::duckdb_vector_get_data(vector) } as *const u8;
    let mut values = Vec::with_capacity(len);
    if base.is_null() {
        return values;
    }
    for row in 0..len {
        if !validity.is_valid(row) {
            values.push(Vec::new());
            continue;
        }
        // SAFETY: each row owns one 16-byte string slot.
        let bytes = unsafe {
            let slot = base.add(row * STRING_SLOT);
            let length = ptr::read_unaligned(slot as *const u32) as usize;
            let data = if length <= INLINE_LENGTH {
                slot.add(4)
            } else {
                ptr::read_unaligned(slot.add(8) as *const *const u8)
            };
            slice::from_raw_parts(data, length).to_vec()
        };
        values.push(bytes);
    }
    values
}

fn hugeints(raw: Vec<ffi::duckdb_hugeint>) -> VectorData {
    VectorData::HugeInt(raw.into_iter().map(|h| WideInt::new(h.upper, h.lower)).collect())
}

/// Copy one vector of `len` rows, descending into child vectors.
///
/// # Safety
/// `vector` must belong to a live chunk and have type `ty`.
unsafe fn copy_vector(vector: ffi::duckdb_vector, ty: &LogicalType, len: usize) -> Result<Vector, EngineError> {
    let validity = unsafe { copy_validity(vector, len) };
    let data = unsafe {
        match ty {
            LogicalType::Boolean => {
                VectorData::Bool(copy_slots::<u8>(vector, len).into_iter().map(|b| b != 0).collect())
            }
            LogicalType::TinyInt => VectorData::Int8(copy_slots(vector, len)),
            LogicalType::SmallInt => VectorData::Int16(copy_slots(vector, len)),
            LogicalType::Integer | LogicalType::Date => VectorData::Int32(copy_slots(vector, len)),
            LogicalType::BigInt
            | LogicalType::Time
            | LogicalType::Timestamp
            | LogicalType::TimestampS
            | LogicalType::TimestampMs
            | LogicalType::TimestampNs
            | LogicalType::TimestampTz => VectorData::Int64(copy_slots(vector, len)),
            LogicalType::UTinyInt => VectorData::UInt8(copy_slots(vector, len)),
            LogicalType::USmallInt => VectorData::UInt16(copy_slots(vector, len)),
            LogicalType::UInteger => VectorData::UInt32(copy_slots(vector, len)),
            LogicalType::UBigInt | LogicalType::TimeTz => VectorData::UInt64(copy_slots(vector, len)),
            LogicalType::HugeInt | LogicalType::Uuid => hugeints(copy_slots(vector, len)),
            LogicalType::UHugeInt => VectorData::UHugeInt(
                copy_slots::<ffi::duckdb_uhugeint>(vector, len)
                    .into_iter()
                    .map(|h| UWideInt::new(h.upper, h.lower))
                    .collect(),
            ),
            LogicalType::Float => VectorData::Float(copy_slots(vector, len)),
            LogicalType::Double => VectorData::Double(copy_slots(vector, len)),
            LogicalType::Interval => VectorData::Interval(
                copy_slots::<ffi::duckdb_interval>(vector, len)
                    .into_iter()
                    .map(|i| NativeInterval {
                        months: i.months,
                        days: i.days,
                        micros: i.micros,
                    })
                    .collect(),
            ),
            LogicalType::Decimal { width, .. } => match DecimalStorage::for_width(*width) {
                DecimalStorage::Int16 => VectorData::Int16(copy_slots(vector, len)),
                DecimalStorage::Int32 => VectorData::Int32(copy_slots(vector, len)),
                DecimalStorage::Int64 => VectorData::Int64(copy_slots(vector, len)),
                DecimalStorage::HugeInt => hugeints(copy_slots(vector, len)),
            },
            LogicalType::Enum(values) => {
                if values.len() <= usize::from(u8::MAX) {
                    VectorData::UInt8(copy_slots(vector, len))
                } else if values.len() <= usize::from(u16::MAX) {
                    VectorData::UInt16(copy_slots(vector, len))
                } else {
                    VectorData::UInt32(copy_slots(vector, len))
                }
            }
            LogicalType::Varchar | LogicalType::Blob | LogicalType::Bit | LogicalType::Bignum => {
                VectorData::Bytes(copy_strings(vector, len, &validity))
            }
            LogicalType::List(child) => copy_list(vector, child, len)?,
            LogicalType::Map { key, value } => {
                let entry = LogicalType::Struct(vec![
                    ("key".to_string(), (**key).clone()),
                    ("value".to_string(), (**value).clone()),
                ]);
                copy_list(vector, &entry, len)?
            }
            LogicalType::Array { child, size } => {
                let child_len = len.checked_mul(*size).ok_or_else(|| {
                    EngineError::new(format!("Out of Range Error: array of {} x {} slots", len, size))
                })?;
                let child_vector = ffi::duckdb_array_vector_get_child(vector);
                VectorData::Array {
                    child: Box::new(copy_vector(child_vector, child, child_len)?),
                }
            }
            LogicalType::Struct(fields) => {
                let mut children = Vec::with_capacity(fields.len());
                for (i, (_, field)) in fields.iter().enumerate() {
                    let child_vector = ffi::duckdb_struct_vector_get_child(vector, i as u64);
                    children.push(copy_vector(child_vector, field, len)?);
                }
                VectorData::Struct(children)
            }
            LogicalType::Union(members) => {
                let mut children = Vec::with_capacity(members.len() + 1);
                let tags = ffi::duckdb_struct_vector_get_child(vector, 0);
                children.push(copy_vector(tags, &LogicalType::UTinyInt, len)?);
                for (i, (_, member)) in members.iter().enumerate() {
                    let child_vector = ffi::duckdb_struct_vector_get_child(vector, i as u64 + 1);
                    children.push(copy_vector(child_vector, member, len)?);
                }
                VectorData::Struct(children)
            }
            LogicalType::SqlNull => VectorData::Bool(vec![false; len]),
            LogicalType::StringLiteral
            | LogicalType::IntegerLiteral
            | LogicalType::Invalid
            | LogicalType::Unknown => {
                return Err(EngineError::new(format!(
                    "Not implemented Error: cannot read result vectors of type {}",
                    ty
                )));
            }
        }
    };
    Ok(Vector::new(ty.clone(), data, validity))
}

unsafe fn copy_list(vector: ffi::duckdb_vector, child: &LogicalType, len: usize) -> Result<VectorData, EngineError> {
    let entries = unsafe { copy_slots::<ffi::duckdb_list_entry>(vector, len) }
        .into_iter()
        .map(|e| ListEntry {
            offset: e.offset,
            length: e.length,
        })
        .collect();
    let child_len = unsafe { ffi::duckdb_list_vector_get_size(vector) } as usize;
    let child_vector = unsafe { ffi::duckdb_list_vector_get_child(vector) };
    Ok(VectorData::List {
        entries,
        child: Box::new(unsafe { copy_vector(child_vector, child, child_len) }?),
    })
}
