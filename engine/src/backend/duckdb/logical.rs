//! Reading DuckDB logical type handles into [`LogicalType`].

use std::ffi::{c_char, c_void, CStr};

use duckdb::ffi;

use crate::types::{LogicalType, TypeId};

/// Owned `duckdb_logical_type`, destroyed on drop.
pub(super) struct OwnedLogicalType(ffi::duckdb_logical_type);

impl OwnedLogicalType {
    /// Take ownership of a handle returned by the C API. `None` when null.
    pub(super) fn new(raw: ffi::duckdb_logical_type) -> Option<Self> {
        (!raw.is_null()).then_some(Self(raw))
    }

    pub(super) fn to_logical(&self) -> LogicalType {
        // SAFETY: the handle is non-null and owned by self.
        unsafe { read_logical(self.0) }
    }
}

impl Drop for OwnedLogicalType {
    fn drop(&mut self) {
        // SAFETY: the handle came from the C API and is destroyed once.
        unsafe { ffi::duckdb_destroy_logical_type(&mut self.0) };
    }
}

/// Copy a C string the engine allocated with `duckdb_malloc`, then free it.
///
/// # Safety
/// `ptr` must be null or a NUL-terminated string owned by the caller.
pub(super) unsafe fn take_string(ptr: *mut c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    let text = unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned();
    unsafe { ffi::duckdb_free(ptr as *mut c_void) };
    text
}

/// Copy a C string owned by the engine without freeing it.
///
/// # Safety
/// `ptr` must be null or a NUL-terminated string valid for the call.
pub(super) unsafe fn borrowed_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

fn child(raw: ffi::duckdb_logical_type) -> LogicalType {
    OwnedLogicalType::new(raw)
        .map(|owned| owned.to_logical())
        .unwrap_or(LogicalType::Unknown)
}

/// Build a [`LogicalType`] from a type handle, descending into children.
///
/// # Safety
/// `lt` must be a valid, non-null logical type handle.
unsafe fn read_logical(lt: ffi::duckdb_logical_type) -> LogicalType {
    let id = TypeId::from_raw(unsafe { ffi::duckdb_get_type_id(lt) } as u32);
    unsafe {
        match id {
            TypeId::Decimal => LogicalType::Decimal {
                width: ffi::duckdb_decimal_width(lt),
                scale: ffi::duckdb_decimal_scale(lt),
            },
            TypeId::Enum => {
                let size = ffi::duckdb_enum_dictionary_size(lt);
                let values = (0..u64::from(size))
                    .map(|i| take_string(ffi::duckdb_enum_dictionary_value(lt, i)))
                    .collect();
                LogicalType::Enum(values)
            }
            TypeId::List => LogicalType::List(Box::new(child(ffi::duckdb_list_type_child_type(lt)))),
            TypeId::Array => LogicalType::Array {
                child: Box::new(child(ffi::duckdb_array_type_child_type(lt))),
                size: ffi::duckdb_array_type_array_size(lt) as usize,
            },
            TypeId::Map => LogicalType::Map {
                key: Box::new(child(ffi::duckdb_map_type_key_type(lt))),
                value: Box::new(child(ffi::duckdb_map_type_value_type(lt))),
            },
            TypeId::Struct => {
                let count = ffi::duckdb_struct_type_child_count(lt);
                let fields = (0..count)
                    .map(|i| {
                        (
                            take_string(ffi::duckdb_struct_type_child_name(lt, i)),
                            child(ffi::duckdb_struct_type_child_type(lt, i)),
                        )
                    })
                    .collect();
                LogicalType::Struct(fields)
            }
            TypeId::Union => {
                let count = ffi::duckdb_union_type_member_count(lt);
                let members = (0..count)
                    .map(|i| {
                        (
                            take_string(ffi::duckdb_union_type_member_name(lt, i)),
                            child(ffi::duckdb_union_type_member_type(lt, i)),
                        )
                    })
                    .collect();
                LogicalType::Union(members)
            }
            other => LogicalType::from_type_id(other),
        }
    }
}
