//! Fixed-width codec: booleans, 8-64 bit integers, FLOAT and DOUBLE.

use engine::{LogicalType, NativeValue, VectorData};
use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive};

use super::{layout_mismatch, slot};
use crate::error::{DuckError, Result};
use crate::value::RowValue;

/// Native scalar kinds with a fixed-width slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixedKind {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    UTinyInt,
    USmallInt,
    UInteger,
    UBigInt,
    Float,
    Double,
}

impl FixedKind {
    pub fn from_logical(logical_type: &LogicalType) -> Option<Self> {
        Some(match logical_type {
            LogicalType::Boolean => Self::Boolean,
            LogicalType::TinyInt => Self::TinyInt,
            LogicalType::SmallInt => Self::SmallInt,
            LogicalType::Integer => Self::Integer,
            LogicalType::BigInt => Self::BigInt,
            LogicalType::UTinyInt => Self::UTinyInt,
            LogicalType::USmallInt => Self::USmallInt,
            LogicalType::UInteger => Self::UInteger,
            LogicalType::UBigInt => Self::UBigInt,
            LogicalType::Float => Self::Float,
            LogicalType::Double => Self::Double,
            _ => return None,
        })
    }

    pub fn logical_type(self) -> LogicalType {
        match self {
            Self::Boolean => LogicalType::Boolean,
            Self::TinyInt => LogicalType::TinyInt,
            Self::SmallInt => LogicalType::SmallInt,
            Self::Integer => LogicalType::Integer,
            Self::BigInt => LogicalType::BigInt,
            Self::UTinyInt => LogicalType::UTinyInt,
            Self::USmallInt => LogicalType::USmallInt,
            Self::UInteger => LogicalType::UInteger,
            Self::UBigInt => LogicalType::UBigInt,
            Self::Float => LogicalType::Float,
            Self::Double => LogicalType::Double,
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, Self::Boolean | Self::Float | Self::Double)
    }
}

fn out_of_range(value: impl std::fmt::Display, kind: FixedKind) -> DuckError {
    DuckError::range(format!(
        "value {} is out of range for {}",
        value,
        kind.logical_type()
    ))
}

/// Encode an integer into `kind`, range-checked. Never truncates.
pub fn encode_int(value: &BigInt, kind: FixedKind) -> Result<NativeValue> {
    let fail = || out_of_range(value, kind);
    Ok(match kind {
        FixedKind::Boolean => match value.to_u8() {
            Some(0) => NativeValue::Boolean(false),
            Some(1) => NativeValue::Boolean(true),
            _ => return Err(fail()),
        },
        FixedKind::TinyInt => NativeValue::TinyInt(value.to_i8().ok_or_else(fail)?),
        FixedKind::SmallInt => NativeValue::SmallInt(value.to_i16().ok_or_else(fail)?),
        FixedKind::Integer => NativeValue::Integer(value.to_i32().ok_or_else(fail)?),
        FixedKind::BigInt => NativeValue::BigInt(value.to_i64().ok_or_else(fail)?),
        FixedKind::UTinyInt => NativeValue::UTinyInt(value.to_u8().ok_or_else(fail)?),
        FixedKind::USmallInt => NativeValue::USmallInt(value.to_u16().ok_or_else(fail)?),
        FixedKind::UInteger => NativeValue::UInteger(value.to_u32().ok_or_else(fail)?),
        FixedKind::UBigInt => NativeValue::UBigInt(value.to_u64().ok_or_else(fail)?),
        FixedKind::Float => {
            let v = value.to_f32().filter(|v| v.is_finite()).ok_or_else(fail)?;
            NativeValue::Float(v)
        }
        FixedKind::Double => {
            let v = value.to_f64().filter(|v| v.is_finite()).ok_or_else(fail)?;
            NativeValue::Double(v)
        }
    })
}

/// Encode a double into `kind`.
///
/// Integer kinds accept only integral values in range. Narrowing a finite
/// double to FLOAT fails when it overflows the f32 range.
pub fn encode_float(value: f64, kind: FixedKind) -> Result<NativeValue> {
    match kind {
        FixedKind::Double => Ok(NativeValue::Double(value)),
        FixedKind::Float => {
            let narrowed = value as f32;
            if value.is_finite() && narrowed.is_infinite() {
                return Err(out_of_range(value, kind));
            }
            Ok(NativeValue::Float(narrowed))
        }
        FixedKind::Boolean => Err(DuckError::unsupported(value.to_string(), "BOOLEAN")),
        _ => {
            if value.fract() != 0.0 {
                return Err(out_of_range(value, kind));
            }
            let integral = BigInt::from_f64(value).ok_or_else(|| out_of_range(value, kind))?;
            encode_int(&integral, kind)
        }
    }
}

pub fn encode_bool(value: bool) -> NativeValue {
    NativeValue::Boolean(value)
}

/// Decode one fixed-width slot.
pub fn decode(logical_type: &LogicalType, data: &VectorData, row: usize) -> Result<RowValue> {
    Ok(match data {
        VectorData::Bool(v) => RowValue::Bool(slot(v, row)?),
        VectorData::Int8(v) => RowValue::Int(i64::from(slot(v, row)?)),
        VectorData::Int16(v) => RowValue::Int(i64::from(slot(v, row)?)),
        VectorData::Int32(v) => RowValue::Int(i64::from(slot(v, row)?)),
        VectorData::Int64(v) => RowValue::Int(slot(v, row)?),
        VectorData::UInt8(v) => RowValue::UInt(u64::from(slot(v, row)?)),
        VectorData::UInt16(v) => RowValue::UInt(u64::from(slot(v, row)?)),
        VectorData::UInt32(v) => RowValue::UInt(u64::from(slot(v, row)?)),
        VectorData::UInt64(v) => RowValue::UInt(slot(v, row)?),
        VectorData::Float(v) => RowValue::Float(f64::from(slot(v, row)?)),
        VectorData::Double(v) => RowValue::Float(slot(v, row)?),
        other => return Err(layout_mismatch(logical_type, other)),
    })
}
