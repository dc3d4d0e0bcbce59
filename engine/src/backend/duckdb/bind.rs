//! Binding [`NativeValue`]s to prepared statement slots.

use std::ffi::{c_char, c_void};

use duckdb::ffi;

use crate::backend::EngineError;
use crate::value::{NativeValue, WideInt};

fn hugeint(value: WideInt) -> ffi::duckdb_hugeint {
    ffi::duckdb_hugeint {
        lower: value.lower,
        upper: value.upper,
    }
}

/// Bind through a temporary `duckdb_value` for types without a direct entry
/// point.
unsafe fn bind_owned_value(
    stmt: ffi::duckdb_prepared_statement,
    index: u64,
    mut value: ffi::duckdb_value,
) -> ffi::duckdb_state {
    let state = unsafe { ffi::duckdb_bind_value(stmt, index, value) };
    unsafe { ffi::duckdb_destroy_value(&mut value) };
    state
}

/// Bind `value` to the 1-based slot `index`.
///
/// # Safety
/// `stmt` must be a live prepared statement handle.
pub(super) unsafe fn bind_native(
    stmt: ffi::duckdb_prepared_statement,
    index: usize,
    value: &NativeValue,
) -> Result<(), EngineError> {
    let idx = index as u64;
    let state = unsafe {
        match value {
            NativeValue::Null => ffi::duckdb_bind_null(stmt, idx),
            NativeValue::Boolean(v) => ffi::duckdb_bind_boolean(stmt, idx, *v),
            NativeValue::TinyInt(v) => ffi::duckdb_bind_int8(stmt, idx, *v),
            NativeValue::SmallInt(v) => ffi::duckdb_bind_int16(stmt, idx, *v),
            NativeValue::Integer(v) => ffi::duckdb_bind_int32(stmt, idx, *v),
            NativeValue::BigInt(v) => ffi::duckdb_bind_int64(stmt, idx, *v),
            NativeValue::HugeInt(v) => ffi::duckdb_bind_hugeint(stmt, idx, hugeint(*v)),
            NativeValue::UTinyInt(v) => ffi::duckdb_bind_uint8(stmt, idx, *v),
            NativeValue::USmallInt(v) => ffi::duckdb_bind_uint16(stmt, idx, *v),
            NativeValue::UInteger(v) => ffi::duckdb_bind_uint32(stmt, idx, *v),
            NativeValue::UBigInt(v) => ffi::duckdb_bind_uint64(stmt, idx, *v),
            NativeValue::UHugeInt(v) => ffi::duckdb_bind_uhugeint(
                stmt,
                idx,
                ffi::duckdb_uhugeint {
                    lower: v.lower,
                    upper: v.upper,
                },
            ),
            NativeValue::Float(v) => ffi::duckdb_bind_float(stmt, idx, *v),
            NativeValue::Double(v) => ffi::duckdb_bind_double(stmt, idx, *v),
            NativeValue::Varchar(v) => {
                ffi::duckdb_bind_varchar_length(stmt, idx, v.as_ptr() as *const c_char, v.len() as u64)
            }
            NativeValue::Blob(v) => ffi::duckdb_bind_blob(stmt, idx, v.as_ptr() as *const c_void, v.len() as u64),
            NativeValue::Decimal { width, scale, value } => ffi::duckdb_bind_decimal(
                stmt,
                idx,
                ffi::duckdb_decimal {
                    width: *width,
                    scale: *scale,
                    value: hugeint(*value),
                },
            ),
            NativeValue::Date(days) => ffi::duckdb_bind_date(stmt, idx, ffi::duckdb_date { days: *days }),
            NativeValue::Time(micros) => ffi::duckdb_bind_time(stmt, idx, ffi::duckdb_time { micros: *micros }),
            NativeValue::TimeTz(bits) => {
                bind_owned_value(stmt, idx, ffi::duckdb_create_time_tz_value(ffi::duckdb_time_tz { bits: *bits }))
            }
            NativeValue::Timestamp(micros) => {
                ffi::duckdb_bind_timestamp(stmt, idx, ffi::duckdb_timestamp { micros: *micros })
            }
            NativeValue::TimestampS(seconds) => bind_owned_value(
                stmt,
                idx,
                ffi::duckdb_create_timestamp_s(ffi::duckdb_timestamp_s { seconds: *seconds }),
            ),
            NativeValue::TimestampMs(millis) => bind_owned_value(
                stmt,
                idx,
                ffi::duckdb_create_timestamp_ms(ffi::duckdb_timestamp_ms { millis: *millis }),
            ),
            NativeValue::TimestampNs(nanos) => bind_owned_value(
                stmt,
                idx,
                ffi::duckdb_create_timestamp_ns(ffi::duckdb_timestamp_ns { nanos: *nanos }),
            ),
            NativeValue::TimestampTz(micros) => {
                ffi::duckdb_bind_timestamp_tz(stmt, idx, ffi::duckdb_timestamp { micros: *micros })
            }
            NativeValue::Interval(v) => ffi::duckdb_bind_interval(
                stmt,
                idx,
                ffi::duckdb_interval {
                    months: v.months,
                    days: v.days,
                    micros: v.micros,
                },
            ),
        }
    };
    if state as u32 != 0 {
        return Err(EngineError::new(format!(
            "Binder Error: could not bind {} to parameter {}",
            value.logical_type(),
            index
        )));
    }
    Ok(())
}
