//! Host-side value model.
//!
//! [`HostValue`] is what callers bind as statement parameters; [`RowValue`]
//! is what fetching a result cell produces. Both are closed sum types so the
//! dispatcher can match them exhaustively.

mod interval;

use std::fmt;

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use num_bigint::BigInt;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::error::{DuckError, Result};

pub use interval::IntervalValue;

/// A value bound to a statement parameter.
///
/// `List` and `Struct` can be built but have no bind codec; binding them
/// fails with `UnsupportedType`.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Null,
    Bool(bool),
    Integer(BigInt),
    Float(f64),
    Str(String),
    Blob(Vec<u8>),
    Decimal(BigDecimal),
    Date(NaiveDate),
    Time(TimeValue),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<FixedOffset>),
    Interval(IntervalValue),
    Uuid(Uuid),
    List(Vec<HostValue>),
    Struct(Vec<(String, HostValue)>),
}

impl HostValue {
    /// Name of the value's shape, used in error messages.
    pub fn shape_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Bool(_) => "BOOLEAN",
            Self::Integer(_) => "INTEGER",
            Self::Float(_) => "DOUBLE",
            Self::Str(_) => "VARCHAR",
            Self::Blob(_) => "BLOB",
            Self::Decimal(_) => "DECIMAL",
            Self::Date(_) => "DATE",
            Self::Time(_) => "TIME",
            Self::Timestamp(_) => "TIMESTAMP",
            Self::TimestampTz(_) => "TIMESTAMP WITH TIME ZONE",
            Self::Interval(_) => "INTERVAL",
            Self::Uuid(_) => "UUID",
            Self::List(_) => "LIST",
            Self::Struct(_) => "STRUCT",
        }
    }
}

macro_rules! host_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for HostValue {
                fn from(value: $t) -> Self {
                    Self::Integer(BigInt::from(value))
                }
            }
        )*
    };
}

host_from_int!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128);

impl From<BigInt> for HostValue {
    fn from(value: BigInt) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for HostValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for HostValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for HostValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for HostValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<u8>> for HostValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob(value)
    }
}

impl From<BigDecimal> for HostValue {
    fn from(value: BigDecimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<NaiveDate> for HostValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveTime> for HostValue {
    fn from(value: NaiveTime) -> Self {
        Self::Time(TimeValue::Time(value))
    }
}

impl From<TimeValue> for HostValue {
    fn from(value: TimeValue) -> Self {
        Self::Time(value)
    }
}

impl From<NaiveDateTime> for HostValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::Timestamp(value)
    }
}

impl From<DateTime<FixedOffset>> for HostValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::TimestampTz(value)
    }
}

impl From<IntervalValue> for HostValue {
    fn from(value: IntervalValue) -> Self {
        Self::Interval(value)
    }
}

impl From<Uuid> for HostValue {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Unscaled integer with its DECIMAL(width, scale) declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalValue {
    pub unscaled: i128,
    pub width: u8,
    pub scale: u8,
}

impl DecimalValue {
    /// Widest precision a DECIMAL may declare.
    pub const MAX_WIDTH: u8 = 38;

    pub fn new(unscaled: i128, width: u8, scale: u8) -> Result<Self> {
        if width == 0 || width > Self::MAX_WIDTH || scale > width {
            return Err(DuckError::argument(format!(
                "invalid DECIMAL({},{}): width must be 1-38 and scale at most width",
                width, scale
            )));
        }
        Ok(Self {
            unscaled,
            width,
            scale,
        })
    }

    pub fn to_bigdecimal(&self) -> BigDecimal {
        BigDecimal::new(BigInt::from(self.unscaled), i64::from(self.scale))
    }
}

impl fmt::Display for DecimalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::codec::decimal::format_decimal(self.unscaled, self.scale))
    }
}

/// A DATE cell, with the engine's infinity sentinels made explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateValue {
    Date(NaiveDate),
    PosInfinity,
    NegInfinity,
}

/// A TIME cell. The engine admits `24:00:00`, which has no `NaiveTime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeValue {
    Time(NaiveTime),
    EndOfDay,
}

/// A TIMESTAMP cell of any precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampValue {
    Timestamp(NaiveDateTime),
    PosInfinity,
    NegInfinity,
}

/// A TIMESTAMP WITH TIME ZONE cell, expressed in the session time zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimestampTzValue {
    Timestamp(DateTime<Tz>),
    PosInfinity,
    NegInfinity,
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::PosInfinity => f.write_str("infinity"),
            Self::NegInfinity => f.write_str("-infinity"),
        }
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Time(t) => write!(f, "{}", t),
            Self::EndOfDay => f.write_str("24:00:00"),
        }
    }
}

impl fmt::Display for TimestampValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.f")),
            Self::PosInfinity => f.write_str("infinity"),
            Self::NegInfinity => f.write_str("-infinity"),
        }
    }
}

impl fmt::Display for TimestampTzValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.f%:z")),
            Self::PosInfinity => f.write_str("infinity"),
            Self::NegInfinity => f.write_str("-infinity"),
        }
    }
}

/// A fetched result cell.
#[derive(Debug, Clone, PartialEq)]
pub enum RowValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    /// HUGEINT, UHUGEINT and BIGNUM
    HugeInt(BigInt),
    Float(f64),
    Decimal(BigDecimal),
    Str(String),
    Blob(Vec<u8>),
    Date(DateValue),
    Time(TimeValue),
    TimeTz {
        time: TimeValue,
        offset_seconds: i32,
    },
    Timestamp(TimestampValue),
    TimestampTz(TimestampTzValue),
    Interval(IntervalValue),
    Uuid(Uuid),
    /// BIT string rendered as `0`/`1` characters
    Bit(String),
    List(Vec<RowValue>),
    /// Fields in declaration order
    Struct(Vec<(String, RowValue)>),
    /// Entries with unique keys, in first-seen key order
    Map(Vec<(RowValue, RowValue)>),
    Array(Vec<RowValue>),
    Union {
        tag: String,
        value: Box<RowValue>,
    },
    /// A cell whose type has no codec; carries the type name
    Unsupported(String),
}

impl RowValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

fn write_seq<'a>(f: &mut fmt::Formatter<'_>, items: impl Iterator<Item = &'a RowValue>) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_str("]")
}

impl fmt::Display for RowValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(v) => write!(f, "{}", v),
            Self::UInt(v) => write!(f, "{}", v),
            Self::HugeInt(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Decimal(v) => write!(f, "{}", v),
            Self::Str(s) => f.write_str(s),
            Self::Blob(b) => write!(f, "\\x{}", hex::encode(b)),
            Self::Date(d) => write!(f, "{}", d),
            Self::Time(t) => write!(f, "{}", t),
            Self::TimeTz {
                time,
                offset_seconds,
            } => {
                let sign = if *offset_seconds < 0 { '-' } else { '+' };
                let abs = offset_seconds.unsigned_abs();
                write!(
                    f,
                    "{}{}{:02}:{:02}",
                    time,
                    sign,
                    abs / 3600,
                    (abs % 3600) / 60
                )
            }
            Self::Timestamp(ts) => write!(f, "{}", ts),
            Self::TimestampTz(ts) => write!(f, "{}", ts),
            Self::Interval(iv) => write!(f, "{}", iv),
            Self::Uuid(u) => write!(f, "{}", u),
            Self::Bit(bits) => f.write_str(bits),
            Self::List(items) | Self::Array(items) => write_seq(f, items.iter()),
            Self::Struct(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "'{}': {}", name, value)?;
                }
                f.write_str("}")
            }
            Self::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", key, value)?;
                }
                f.write_str("}")
            }
            Self::Union { value, .. } => write!(f, "{}", value),
            Self::Unsupported(type_name) => write!(f, "<unsupported {}>", type_name),
        }
    }
}

/// JSON-friendly rendering for the CLI: numbers that do not fit a JSON
/// number (128-bit integers, decimals) and temporal values become strings,
/// blobs become hex.
impl Serialize for RowValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::UInt(v) => serializer.serialize_u64(*v),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::Blob(b) => serializer.serialize_str(&hex::encode(b)),
            Self::List(items) | Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Struct(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (name, value) in fields {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
            Self::Map(entries) => {
                let mut seq = serializer.serialize_seq(Some(entries.len()))?;
                for (key, value) in entries {
                    seq.serialize_element(&MapEntry { key, value })?;
                }
                seq.end()
            }
            Self::Union { tag, value } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(tag, value)?;
                map.end()
            }
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

#[derive(Serialize)]
struct MapEntry<'a> {
    key: &'a RowValue,
    value: &'a RowValue,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_option_converts_to_null() {
        let none: Option<i32> = None;
        assert_eq!(HostValue::from(none), HostValue::Null);
        assert_eq!(HostValue::from(Some(7i32)), HostValue::Integer(BigInt::from(7)));
    }

    #[test]
    fn test_decimal_value_invariants() {
        assert!(DecimalValue::new(1, 38, 38).is_ok());
        assert!(DecimalValue::new(1, 39, 0).is_err());
        assert!(DecimalValue::new(1, 0, 0).is_err());
        assert!(DecimalValue::new(1, 4, 5).is_err());
    }

    #[test]
    fn test_decimal_value_to_bigdecimal_is_exact() {
        let value = DecimalValue::new(-123_456, 9, 3).unwrap();
        assert_eq!(value.to_bigdecimal(), BigDecimal::from_str("-123.456").unwrap());
        assert_eq!(value.to_string(), "-123.456");
    }

    #[test]
    fn test_display_nested() {
        let value = RowValue::Struct(vec![
            ("a b".to_string(), RowValue::List(vec![RowValue::Int(3), RowValue::Null])),
            ("c".to_string(), RowValue::Str("x".to_string())),
        ]);
        assert_eq!(value.to_string(), "{'a b': [3, NULL], 'c': x}");
    }

    #[test]
    fn test_serialize_wide_values_as_strings() {
        let value = RowValue::List(vec![
            RowValue::HugeInt(BigInt::from(i128::MAX)),
            RowValue::Blob(vec![0xde, 0xad]),
            RowValue::Date(DateValue::PosInfinity),
            RowValue::Null,
        ]);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(
            json,
            r#"["170141183460469231731687303715884105727","dead","infinity",null]"#
        );
    }

    #[test]
    fn test_serialize_map_as_entries() {
        let value = RowValue::Map(vec![(RowValue::Int(1), RowValue::Str("one".to_string()))]);
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"[{"key":1,"value":"one"}]"#
        );
    }

    #[test]
    fn test_time_tz_display() {
        let value = RowValue::TimeTz {
            time: TimeValue::Time(NaiveTime::from_hms_opt(12, 30, 0).unwrap()),
            offset_seconds: -5 * 3600 - 1800,
        };
        assert_eq!(value.to_string(), "12:30:00-05:30");
    }

    #[test]
    fn test_end_of_day_display() {
        assert_eq!(RowValue::Time(TimeValue::EndOfDay).to_string(), "24:00:00");
        let value = RowValue::TimeTz {
            time: TimeValue::EndOfDay,
            offset_seconds: 3600,
        };
        assert_eq!(value.to_string(), "24:00:00+01:00");
    }
}
