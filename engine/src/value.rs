//! Native scalar layouts and statement parameter values.

use crate::types::LogicalType;

/// 128-bit two's complement integer as two machine words.
///
/// Mathematically `upper * 2^64 + lower`; the sign lives in `upper`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WideInt {
    pub lower: u64,
    pub upper: i64,
}

impl WideInt {
    pub const fn new(upper: i64, lower: u64) -> Self {
        Self { lower, upper }
    }

    pub const fn from_i128(value: i128) -> Self {
        Self {
            lower: value as u64,
            upper: (value >> 64) as i64,
        }
    }

    pub const fn to_i128(self) -> i128 {
        ((self.upper as i128) << 64) | self.lower as i128
    }
}

/// Unsigned 128-bit integer as two machine words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UWideInt {
    pub lower: u64,
    pub upper: u64,
}

impl UWideInt {
    pub const fn new(upper: u64, lower: u64) -> Self {
        Self { lower, upper }
    }

    pub const fn from_u128(value: u128) -> Self {
        Self {
            lower: value as u64,
            upper: (value >> 64) as u64,
        }
    }

    pub const fn to_u128(self) -> u128 {
        ((self.upper as u128) << 64) | self.lower as u128
    }
}

/// Native interval slot. The three fields are independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NativeInterval {
    pub months: i32,
    pub days: i32,
    pub micros: i64,
}

/// A scalar handed to the engine as a prepared statement parameter.
///
/// Each variant corresponds to one native bind entry point; temporal
/// variants carry the engine's epoch-based integer encodings.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    Null,
    Boolean(bool),
    TinyInt(i8),
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    HugeInt(WideInt),
    UTinyInt(u8),
    USmallInt(u16),
    UInteger(u32),
    UBigInt(u64),
    UHugeInt(UWideInt),
    Float(f32),
    Double(f64),
    Varchar(String),
    Blob(Vec<u8>),
    Decimal {
        width: u8,
        scale: u8,
        value: WideInt,
    },
    /// Days since 1970-01-01
    Date(i32),
    /// Microseconds since midnight
    Time(i64),
    /// Packed micros and offset, see the TIME WITH TIME ZONE layout
    TimeTz(u64),
    /// Microseconds since the epoch
    Timestamp(i64),
    TimestampS(i64),
    TimestampMs(i64),
    TimestampNs(i64),
    /// UTC microseconds since the epoch
    TimestampTz(i64),
    Interval(NativeInterval),
}

impl NativeValue {
    /// The logical type this parameter carries when bound untyped.
    pub fn logical_type(&self) -> LogicalType {
        match self {
            Self::Null => LogicalType::SqlNull,
            Self::Boolean(_) => LogicalType::Boolean,
            Self::TinyInt(_) => LogicalType::TinyInt,
            Self::SmallInt(_) => LogicalType::SmallInt,
            Self::Integer(_) => LogicalType::Integer,
            Self::BigInt(_) => LogicalType::BigInt,
            Self::HugeInt(_) => LogicalType::HugeInt,
            Self::UTinyInt(_) => LogicalType::UTinyInt,
            Self::USmallInt(_) => LogicalType::USmallInt,
            Self::UInteger(_) => LogicalType::UInteger,
            Self::UBigInt(_) => LogicalType::UBigInt,
            Self::UHugeInt(_) => LogicalType::UHugeInt,
            Self::Float(_) => LogicalType::Float,
            Self::Double(_) => LogicalType::Double,
            Self::Varchar(_) => LogicalType::Varchar,
            Self::Blob(_) => LogicalType::Blob,
            Self::Decimal { width, scale, .. } => LogicalType::Decimal {
                width: *width,
                scale: *scale,
            },
            Self::Date(_) => LogicalType::Date,
            Self::Time(_) => LogicalType::Time,
            Self::TimeTz(_) => LogicalType::TimeTz,
            Self::Timestamp(_) => LogicalType::Timestamp,
            Self::TimestampS(_) => LogicalType::TimestampS,
            Self::TimestampMs(_) => LogicalType::TimestampMs,
            Self::TimestampNs(_) => LogicalType::TimestampNs,
            Self::TimestampTz(_) => LogicalType::TimestampTz,
            Self::Interval(_) => LogicalType::Interval,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}
