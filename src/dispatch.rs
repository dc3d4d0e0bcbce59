//! Type dispatcher.
//!
//! Routes a native column slot to the codec for its logical type (fetch) and
//! a host value to the native parameter form the target slot expects (bind).
//! Both directions are exhaustive matches over closed enums; a type without a
//! codec surfaces as `RowValue::Unsupported` on fetch and as
//! `DuckError::UnsupportedType` on bind.

use bigdecimal::BigDecimal;
use chrono_tz::Tz;
use engine::{LogicalType, NativeValue, Vector, VectorData};
use num_bigint::{BigInt, Sign};
use num_traits::{One, ToPrimitive};
use tracing::debug;

use crate::codec::fixed::FixedKind;
use crate::codec::temporal::{self, TimestampUnit};
use crate::codec::{composite, decimal, fixed, layout_mismatch, slot, slot_missing, wide};
use crate::error::{DuckError, Result};
use crate::value::{DateValue, DecimalValue, HostValue, RowValue, TimeValue, TimestampValue};

/// Session state that affects how cells are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchContext {
    pub time_zone: Tz,
}

impl FetchContext {
    pub fn new(time_zone: Tz) -> Self {
        Self { time_zone }
    }
}

impl Default for FetchContext {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

fn bytes_slot<'a>(vector: &'a Vector, row: usize) -> Result<&'a [u8]> {
    match &vector.data {
        VectorData::Bytes(values) => values
            .get(row)
            .map(Vec::as_slice)
            .ok_or_else(|| slot_missing(row)),
        other => Err(layout_mismatch(&vector.logical_type, other)),
    }
}

fn int64_slot(vector: &Vector, row: usize) -> Result<i64> {
    match &vector.data {
        VectorData::Int64(values) => slot(values, row),
        other => Err(layout_mismatch(&vector.logical_type, other)),
    }
}

/// Render a BIT payload as `0`/`1` characters.
///
/// The first byte counts the padding bits at the front of the first data
/// byte; the remaining bytes hold the bits most significant first.
pub fn decode_bit(bytes: &[u8]) -> Result<String> {
    let Some((&padding, data)) = bytes.split_first() else {
        return Err(DuckError::invalid_state("BIT payload without a padding byte"));
    };
    if padding > 7 || (data.is_empty() && padding > 0) {
        return Err(DuckError::invalid_state(format!("BIT payload has invalid padding {}", padding)));
    }
    Ok(data
        .iter()
        .flat_map(|&byte| (0..8u32).rev().map(move |bit| if (byte >> bit) & 1 == 1 { '1' } else { '0' }))
        .skip(usize::from(padding))
        .collect())
}

fn enum_index(vector: &Vector, row: usize) -> Result<usize> {
    Ok(match &vector.data {
        VectorData::UInt8(v) => usize::from(slot(v, row)?),
        VectorData::UInt16(v) => usize::from(slot(v, row)?),
        VectorData::UInt32(v) => slot(v, row)? as usize,
        other => return Err(layout_mismatch(&vector.logical_type, other)),
    })
}

fn timestamp_unit(logical_type: &LogicalType) -> Option<TimestampUnit> {
    match logical_type {
        LogicalType::TimestampS => Some(TimestampUnit::Seconds),
        LogicalType::TimestampMs => Some(TimestampUnit::Millis),
        LogicalType::Timestamp => Some(TimestampUnit::Micros),
        LogicalType::TimestampNs => Some(TimestampUnit::Nanos),
        _ => None,
    }
}

/// Decode the cell at `row`. The validity mask is consulted before storage.
pub fn fetch_value(vector: &Vector, row: usize, context: &FetchContext) -> Result<RowValue> {
    if !vector.is_valid(row) {
        return Ok(RowValue::Null);
    }

    let logical_type = &vector.logical_type;
    let data = &vector.data;
    let value = match logical_type {
        LogicalType::Boolean
        | LogicalType::TinyInt
        | LogicalType::SmallInt
        | LogicalType::Integer
        | LogicalType::BigInt
        | LogicalType::UTinyInt
        | LogicalType::USmallInt
        | LogicalType::UInteger
        | LogicalType::UBigInt
        | LogicalType::Float
        | LogicalType::Double => fixed::decode(logical_type, data, row)?,

        LogicalType::HugeInt => match data {
            VectorData::HugeInt(v) => RowValue::HugeInt(wide::from_wide(slot(v, row)?)),
            other => return Err(layout_mismatch(logical_type, other)),
        },
        LogicalType::UHugeInt => match data {
            VectorData::UHugeInt(v) => RowValue::HugeInt(wide::from_uwide(slot(v, row)?)),
            other => return Err(layout_mismatch(logical_type, other)),
        },
        LogicalType::Uuid => match data {
            VectorData::HugeInt(v) => RowValue::Uuid(wide::uuid_from_wide(slot(v, row)?)),
            other => return Err(layout_mismatch(logical_type, other)),
        },
        LogicalType::Bignum => RowValue::HugeInt(wide::decode_bignum(bytes_slot(vector, row)?)?),

        LogicalType::Decimal { width, scale } => {
            RowValue::Decimal(decimal::decode(logical_type, data, row, *width, *scale)?)
        }

        LogicalType::Date => match data {
            VectorData::Int32(v) => RowValue::Date(temporal::decode_date(slot(v, row)?)?),
            other => return Err(layout_mismatch(logical_type, other)),
        },
        LogicalType::Time => RowValue::Time(temporal::decode_time(int64_slot(vector, row)?)?),
        LogicalType::TimeTz => match data {
            VectorData::UInt64(v) => {
                let (time, offset_seconds) = temporal::decode_time_tz(slot(v, row)?)?;
                RowValue::TimeTz { time, offset_seconds }
            }
            other => return Err(layout_mismatch(logical_type, other)),
        },
        LogicalType::Timestamp | LogicalType::TimestampS | LogicalType::TimestampMs | LogicalType::TimestampNs => {
            let unit = timestamp_unit(logical_type).unwrap_or(TimestampUnit::Micros);
            RowValue::Timestamp(temporal::decode_timestamp(int64_slot(vector, row)?, unit)?)
        }
        LogicalType::TimestampTz => RowValue::TimestampTz(temporal::decode_timestamp_tz(
            int64_slot(vector, row)?,
            context.time_zone,
        )?),
        LogicalType::Interval => match data {
            VectorData::Interval(v) => RowValue::Interval(temporal::decode_interval(slot(v, row)?)),
            other => return Err(layout_mismatch(logical_type, other)),
        },

        LogicalType::Varchar => {
            let bytes = bytes_slot(vector, row)?;
            let text = std::str::from_utf8(bytes)
                .map_err(|e| DuckError::invalid_state(format!("VARCHAR cell is not valid UTF-8: {}", e)))?;
            RowValue::Str(text.to_string())
        }
        LogicalType::Blob => RowValue::Blob(bytes_slot(vector, row)?.to_vec()),
        LogicalType::Bit => RowValue::Bit(decode_bit(bytes_slot(vector, row)?)?),
        LogicalType::Enum(dictionary) => {
            let index = enum_index(vector, row)?;
            let label = dictionary.get(index).ok_or_else(|| {
                DuckError::invalid_state(format!(
                    "enum index {} outside a dictionary of {}",
                    index,
                    dictionary.len()
                ))
            })?;
            RowValue::Str(label.clone())
        }

        LogicalType::List(_) => RowValue::List(composite::decode_list(vector, row, context)?),
        LogicalType::Array { size, .. } => RowValue::Array(composite::decode_array(vector, row, *size, context)?),
        LogicalType::Struct(fields) => RowValue::Struct(composite::decode_struct(vector, row, fields, context)?),
        LogicalType::Map { .. } => RowValue::Map(composite::decode_map(vector, row, context)?),
        LogicalType::Union(members) => {
            let (tag, value) = composite::decode_union(vector, row, members, context)?;
            RowValue::Union {
                tag,
                value: Box::new(value),
            }
        }

        LogicalType::SqlNull => RowValue::Null,
        LogicalType::StringLiteral | LogicalType::IntegerLiteral | LogicalType::Invalid | LogicalType::Unknown => {
            RowValue::Unsupported(logical_type.to_string())
        }
    };
    Ok(value)
}

/// Encode a host value for a parameter slot declared as `target`.
///
/// `target` is the engine's declared parameter type; `Unknown` leaves each
/// host shape at its natural native form.
pub fn bind_value(value: &HostValue, target: &LogicalType) -> Result<NativeValue> {
    Ok(match value {
        HostValue::Null => NativeValue::Null,
        HostValue::Bool(b) => fixed::encode_bool(*b),
        HostValue::Integer(n) => bind_integer(n, target)?,
        HostValue::Float(f) => match target {
            LogicalType::Float => fixed::encode_float(*f, FixedKind::Float)?,
            _ => NativeValue::Double(*f),
        },
        HostValue::Str(s) => NativeValue::Varchar(s.clone()),
        HostValue::Blob(b) => NativeValue::Blob(b.clone()),
        HostValue::Decimal(d) => bind_decimal(d, target)?,
        HostValue::Date(d) => NativeValue::Date(temporal::encode_date(&DateValue::Date(*d))),
        HostValue::Time(t) => match target {
            LogicalType::TimeTz => NativeValue::TimeTz(temporal::encode_time_tz(t, 0)?),
            _ => NativeValue::Time(temporal::encode_time(t)),
        },
        HostValue::Timestamp(ts) => bind_timestamp(&TimestampValue::Timestamp(*ts), target)?,
        HostValue::TimestampTz(ts) => NativeValue::TimestampTz(temporal::encode_timestamp_tz(ts)?),
        HostValue::Interval(i) => NativeValue::Interval(temporal::encode_interval(i)),
        HostValue::Uuid(u) => NativeValue::Varchar(u.hyphenated().to_string()),
        HostValue::List(_) | HostValue::Struct(_) => {
            return Err(DuckError::unsupported(format!("{:?}", value), value.shape_name()));
        }
    })
}

fn uhugeint_max() -> BigInt {
    (BigInt::one() << 128u32) - 1
}

/// Integers: a fixed-width target gets a range-checked slot; otherwise
/// anything in `i64` binds as BIGINT and wider values up to 128 bits travel as
/// their decimal string for the engine to cast.
fn bind_integer(value: &BigInt, target: &LogicalType) -> Result<NativeValue> {
    if let Some(kind) = FixedKind::from_logical(target) {
        return fixed::encode_int(value, kind);
    }
    if let LogicalType::Decimal { width, scale } = target {
        return decimal::encode(&BigDecimal::from(value.clone()), *width, *scale);
    }

    let (fits, type_name) = match target {
        LogicalType::UHugeInt => (value.sign() != Sign::Minus && *value <= uhugeint_max(), "UHUGEINT"),
        _ => (wide::fits_hugeint(value), "HUGEINT"),
    };
    if !fits {
        return Err(DuckError::range(format!(
            "value {} is out of range for {}",
            value, type_name
        )));
    }
    if let Some(v) = value.to_i64() {
        return Ok(NativeValue::BigInt(v));
    }
    debug!(value = %value, target = %target, "integer exceeds BIGINT, binding its decimal string");
    Ok(NativeValue::Varchar(value.to_string()))
}

fn bind_decimal(value: &BigDecimal, target: &LogicalType) -> Result<NativeValue> {
    match target {
        LogicalType::Decimal { width, scale } => decimal::encode(value, *width, *scale),
        LogicalType::Double => value
            .to_f64()
            .map(NativeValue::Double)
            .ok_or_else(|| DuckError::range(format!("value {} is out of range for DOUBLE", value))),
        _ => decimal::encode(value, DecimalValue::MAX_WIDTH, decimal::natural_scale(value)),
    }
}

fn bind_timestamp(ts: &TimestampValue, target: &LogicalType) -> Result<NativeValue> {
    let unit = timestamp_unit(target).unwrap_or(TimestampUnit::Micros);
    let raw = temporal::encode_timestamp(ts, unit)?;
    Ok(match target {
        LogicalType::TimestampS => NativeValue::TimestampS(raw),
        LogicalType::TimestampMs => NativeValue::TimestampMs(raw),
        LogicalType::TimestampNs => NativeValue::TimestampNs(raw),
        LogicalType::TimestampTz => NativeValue::TimestampTz(raw),
        _ => NativeValue::Timestamp(raw),
    })
}

/// Encode a host value straight into a fixed-width kind, bypassing the
/// declared parameter type.
pub fn bind_fixed(value: &HostValue, kind: FixedKind) -> Result<NativeValue> {
    match (value, kind) {
        (HostValue::Null, _) => Ok(NativeValue::Null),
        (HostValue::Bool(b), FixedKind::Boolean) => Ok(fixed::encode_bool(*b)),
        (HostValue::Bool(b), _) => fixed::encode_int(&BigInt::from(u8::from(*b)), kind),
        (HostValue::Integer(n), _) => fixed::encode_int(n, kind),
        (HostValue::Float(f), _) => fixed::encode_float(*f, kind),
        _ => Err(DuckError::unsupported(
            format!("{:?}", value),
            kind.logical_type().to_string(),
        )),
    }
}
