//! Logical type catalog.
//!
//! `TypeId` mirrors the raw type tags of the engine's C API. `LogicalType` is
//! the full descriptor: the tag plus decimal (width, scale) or child types for
//! the nested kinds.

use std::fmt;

/// Raw type tag as reported by the native column metadata.
///
/// Tags the binding does not know about map to `Unknown` so that schema
/// inspection never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeId {
    Invalid,
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
    Timestamp,
    Date,
    Time,
    Interval,
    HugeInt,
    UHugeInt,
    Varchar,
    Blob,
    Decimal,
    TimestampS,
    TimestampMs,
    TimestampNs,
    Enum,
    List,
    Struct,
    Map,
    Array,
    Uuid,
    Union,
    Bit,
    TimeTz,
    TimestampTz,
    Bignum,
    SqlNull,
    StringLiteral,
    IntegerLiteral,
    Unknown,
}

impl TypeId {
    /// Map a raw native tag to a `TypeId`.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Self::Invalid,
            1 => Self::Boolean,
            2 => Self::TinyInt,
            3 => Self::SmallInt,
            4 => Self::Integer,
            5 => Self::BigInt,
            6 => Self::UTinyInt,
            7 => Self::USmallInt,
            8 => Self::UInteger,
            9 => Self::UBigInt,
            10 => Self::Float,
            11 => Self::Double,
            12 => Self::Timestamp,
            13 => Self::Date,
            14 => Self::Time,
            15 => Self::Interval,
            16 => Self::HugeInt,
            17 => Self::Varchar,
            18 => Self::Blob,
            19 => Self::Decimal,
            20 => Self::TimestampS,
            21 => Self::TimestampMs,
            22 => Self::TimestampNs,
            23 => Self::Enum,
            24 => Self::List,
            25 => Self::Struct,
            26 => Self::Map,
            27 => Self::Uuid,
            28 => Self::Union,
            29 => Self::Bit,
            30 => Self::TimeTz,
            31 => Self::TimestampTz,
            32 => Self::UHugeInt,
            33 => Self::Array,
            35 => Self::Bignum,
            36 => Self::SqlNull,
            37 => Self::StringLiteral,
            38 => Self::IntegerLiteral,
            _ => Self::Unknown,
        }
    }

    /// The raw native tag. `Unknown` has no native tag and reports `u32::MAX`.
    pub fn raw(self) -> u32 {
        match self {
            Self::Invalid => 0,
            Self::Boolean => 1,
            Self::TinyInt => 2,
            Self::SmallInt => 3,
            Self::Integer => 4,
            Self::BigInt => 5,
            Self::UTinyInt => 6,
            Self::USmallInt => 7,
            Self::UInteger => 8,
            Self::UBigInt => 9,
            Self::Float => 10,
            Self::Double => 11,
            Self::Timestamp => 12,
            Self::Date => 13,
            Self::Time => 14,
            Self::Interval => 15,
            Self::HugeInt => 16,
            Self::Varchar => 17,
            Self::Blob => 18,
            Self::Decimal => 19,
            Self::TimestampS => 20,
            Self::TimestampMs => 21,
            Self::TimestampNs => 22,
            Self::Enum => 23,
            Self::List => 24,
            Self::Struct => 25,
            Self::Map => 26,
            Self::Uuid => 27,
            Self::Union => 28,
            Self::Bit => 29,
            Self::TimeTz => 30,
            Self::TimestampTz => 31,
            Self::UHugeInt => 32,
            Self::Array => 33,
            Self::Bignum => 35,
            Self::SqlNull => 36,
            Self::StringLiteral => 37,
            Self::IntegerLiteral => 38,
            Self::Unknown => u32::MAX,
        }
    }
}

/// Backing integer used for a DECIMAL column, chosen by its declared width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalStorage {
    Int16,
    Int32,
    Int64,
    HugeInt,
}

impl DecimalStorage {
    /// Widest precision a DECIMAL may declare.
    pub const MAX_WIDTH: u8 = 38;

    pub fn for_width(width: u8) -> Self {
        match width {
            0..=4 => Self::Int16,
            5..=9 => Self::Int32,
            10..=18 => Self::Int64,
            _ => Self::HugeInt,
        }
    }
}

/// Full logical type descriptor of a column or value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogicalType {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    HugeInt,
    UTinyInt,
    USmallInt,
    UInteger,
    UBigInt,
    UHugeInt,
    Float,
    Double,
    Date,
    Time,
    TimeTz,
    Timestamp,
    TimestampS,
    TimestampMs,
    TimestampNs,
    TimestampTz,
    Interval,
    Varchar,
    Blob,
    /// Fixed-point decimal: `width` total digits (1-38), `scale` fractional digits
    Decimal { width: u8, scale: u8 },
    /// Dictionary-encoded string; storage holds the index into `values`
    Enum(Vec<String>),
    List(Box<LogicalType>),
    /// Named fields in declaration order
    Struct(Vec<(String, LogicalType)>),
    Map {
        key: Box<LogicalType>,
        value: Box<LogicalType>,
    },
    Array {
        child: Box<LogicalType>,
        size: usize,
    },
    /// Tagged union; the member order defines the tag values
    Union(Vec<(String, LogicalType)>),
    Uuid,
    Bit,
    Bignum,
    SqlNull,
    StringLiteral,
    IntegerLiteral,
    Invalid,
    Unknown,
}

impl LogicalType {
    pub fn type_id(&self) -> TypeId {
        match self {
            Self::Boolean => TypeId::Boolean,
            Self::TinyInt => TypeId::TinyInt,
            Self::SmallInt => TypeId::SmallInt,
            Self::Integer => TypeId::Integer,
            Self::BigInt => TypeId::BigInt,
            Self::HugeInt => TypeId::HugeInt,
            Self::UTinyInt => TypeId::UTinyInt,
            Self::USmallInt => TypeId::USmallInt,
            Self::UInteger => TypeId::UInteger,
            Self::UBigInt => TypeId::UBigInt,
            Self::UHugeInt => TypeId::UHugeInt,
            Self::Float => TypeId::Float,
            Self::Double => TypeId::Double,
            Self::Date => TypeId::Date,
            Self::Time => TypeId::Time,
            Self::TimeTz => TypeId::TimeTz,
            Self::Timestamp => TypeId::Timestamp,
            Self::TimestampS => TypeId::TimestampS,
            Self::TimestampMs => TypeId::TimestampMs,
            Self::TimestampNs => TypeId::TimestampNs,
            Self::TimestampTz => TypeId::TimestampTz,
            Self::Interval => TypeId::Interval,
            Self::Varchar => TypeId::Varchar,
            Self::Blob => TypeId::Blob,
            Self::Decimal { .. } => TypeId::Decimal,
            Self::Enum(_) => TypeId::Enum,
            Self::List(_) => TypeId::List,
            Self::Struct(_) => TypeId::Struct,
            Self::Map { .. } => TypeId::Map,
            Self::Array { .. } => TypeId::Array,
            Self::Union(_) => TypeId::Union,
            Self::Uuid => TypeId::Uuid,
            Self::Bit => TypeId::Bit,
            Self::Bignum => TypeId::Bignum,
            Self::SqlNull => TypeId::SqlNull,
            Self::StringLiteral => TypeId::StringLiteral,
            Self::IntegerLiteral => TypeId::IntegerLiteral,
            Self::Invalid => TypeId::Invalid,
            Self::Unknown => TypeId::Unknown,
        }
    }

    /// Build the descriptor for a tag that carries no auxiliary information.
    ///
    /// Parameterised tags (decimal, enum and the nested kinds) need their
    /// auxiliary data and come back as `Unknown`.
    pub fn from_type_id(id: TypeId) -> Self {
        match id {
            TypeId::Boolean => Self::Boolean,
            TypeId::TinyInt => Self::TinyInt,
            TypeId::SmallInt => Self::SmallInt,
            TypeId::Integer => Self::Integer,
            TypeId::BigInt => Self::BigInt,
            TypeId::HugeInt => Self::HugeInt,
            TypeId::UTinyInt => Self::UTinyInt,
            TypeId::USmallInt => Self::USmallInt,
            TypeId::UInteger => Self::UInteger,
            TypeId::UBigInt => Self::UBigInt,
            TypeId::UHugeInt => Self::UHugeInt,
            TypeId::Float => Self::Float,
            TypeId::Double => Self::Double,
            TypeId::Date => Self::Date,
            TypeId::Time => Self::Time,
            TypeId::TimeTz => Self::TimeTz,
            TypeId::Timestamp => Self::Timestamp,
            TypeId::TimestampS => Self::TimestampS,
            TypeId::TimestampMs => Self::TimestampMs,
            TypeId::TimestampNs => Self::TimestampNs,
            TypeId::TimestampTz => Self::TimestampTz,
            TypeId::Interval => Self::Interval,
            TypeId::Varchar => Self::Varchar,
            TypeId::Blob => Self::Blob,
            TypeId::Uuid => Self::Uuid,
            TypeId::Bit => Self::Bit,
            TypeId::Bignum => Self::Bignum,
            TypeId::SqlNull => Self::SqlNull,
            TypeId::StringLiteral => Self::StringLiteral,
            TypeId::IntegerLiteral => Self::IntegerLiteral,
            TypeId::Invalid => Self::Invalid,
            TypeId::Decimal
            | TypeId::Enum
            | TypeId::List
            | TypeId::Struct
            | TypeId::Map
            | TypeId::Array
            | TypeId::Union
            | TypeId::Unknown => Self::Unknown,
        }
    }

    pub fn is_nested(&self) -> bool {
        matches!(
            self,
            Self::List(_) | Self::Struct(_) | Self::Map { .. } | Self::Array { .. } | Self::Union(_)
        )
    }

    /// Child types in storage order. Maps report their key/value pair as the
    /// two children of the entry struct.
    pub fn children(&self) -> Vec<(String, LogicalType)> {
        match self {
            Self::List(child) => vec![("child".to_string(), (**child).clone())],
            Self::Array { child, .. } => vec![("child".to_string(), (**child).clone())],
            Self::Struct(fields) | Self::Union(fields) => fields.clone(),
            Self::Map { key, value } => vec![
                ("key".to_string(), (**key).clone()),
                ("value".to_string(), (**value).clone()),
            ],
            _ => Vec::new(),
        }
    }

    /// Parse a SQL type name such as `HUGEINT`, `DECIMAL(18,3)` or `INTEGER[]`.
    ///
    /// Covers the scalar catalog, decimals, and list/array suffixes. Returns
    /// `None` for anything else.
    pub fn parse(name: &str) -> Option<LogicalType> {
        let name = name.trim();
        if let Some(inner) = name.strip_suffix("[]") {
            return Some(Self::List(Box::new(Self::parse(inner)?)));
        }
        if let Some(body) = name.strip_suffix(']') {
            let open = body.rfind('[')?;
            let size: usize = body[open + 1..].trim().parse().ok()?;
            let child = Self::parse(&body[..open])?;
            return Some(Self::Array {
                child: Box::new(child),
                size,
            });
        }

        let upper = name.to_ascii_uppercase();
        if let Some(args) = upper
            .strip_prefix("DECIMAL")
            .or_else(|| upper.strip_prefix("NUMERIC"))
        {
            return parse_decimal_args(args);
        }

        let ty = match upper.as_str() {
            "BOOLEAN" | "BOOL" | "LOGICAL" => Self::Boolean,
            "TINYINT" | "INT1" => Self::TinyInt,
            "SMALLINT" | "INT2" | "SHORT" => Self::SmallInt,
            "INTEGER" | "INT" | "INT4" | "SIGNED" => Self::Integer,
            "BIGINT" | "INT8" | "LONG" => Self::BigInt,
            "HUGEINT" | "INT128" => Self::HugeInt,
            "UTINYINT" => Self::UTinyInt,
            "USMALLINT" => Self::USmallInt,
            "UINTEGER" => Self::UInteger,
            "UBIGINT" => Self::UBigInt,
            "UHUGEINT" => Self::UHugeInt,
            "FLOAT" | "FLOAT4" | "REAL" => Self::Float,
            "DOUBLE" | "FLOAT8" => Self::Double,
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            "TIMETZ" | "TIME WITH TIME ZONE" => Self::TimeTz,
            "TIMESTAMP" | "DATETIME" => Self::Timestamp,
            "TIMESTAMP_S" => Self::TimestampS,
            "TIMESTAMP_MS" => Self::TimestampMs,
            "TIMESTAMP_NS" => Self::TimestampNs,
            "TIMESTAMPTZ" | "TIMESTAMP WITH TIME ZONE" => Self::TimestampTz,
            "INTERVAL" => Self::Interval,
            "VARCHAR" | "TEXT" | "STRING" | "CHAR" | "BPCHAR" => Self::Varchar,
            "BLOB" | "BYTEA" | "BINARY" | "VARBINARY" => Self::Blob,
            "UUID" => Self::Uuid,
            "BIT" | "BITSTRING" => Self::Bit,
            "BIGNUM" | "VARINT" => Self::Bignum,
            _ => return None,
        };
        Some(ty)
    }
}

fn parse_decimal_args(args: &str) -> Option<LogicalType> {
    let args = args.trim();
    if args.is_empty() {
        return Some(LogicalType::Decimal { width: 18, scale: 3 });
    }
    let inner = args.strip_prefix('(')?.strip_suffix(')')?;
    let mut parts = inner.split(',').map(str::trim);
    let width: u8 = parts.next()?.parse().ok()?;
    let scale: u8 = match parts.next() {
        Some(s) => s.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() || width == 0 || width > DecimalStorage::MAX_WIDTH || scale > width {
        return None;
    }
    Some(LogicalType::Decimal { width, scale })
}

fn write_field_name(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    let simple = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        write!(f, "{}", name)
    } else {
        write!(f, "\"{}\"", name.replace('"', "\"\""))
    }
}

fn write_fields(f: &mut fmt::Formatter<'_>, fields: &[(String, LogicalType)]) -> fmt::Result {
    for (i, (name, ty)) in fields.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write_field_name(f, name)?;
        write!(f, " {}", ty)?;
    }
    Ok(())
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => write!(f, "BOOLEAN"),
            Self::TinyInt => write!(f, "TINYINT"),
            Self::SmallInt => write!(f, "SMALLINT"),
            Self::Integer => write!(f, "INTEGER"),
            Self::BigInt => write!(f, "BIGINT"),
            Self::HugeInt => write!(f, "HUGEINT"),
            Self::UTinyInt => write!(f, "UTINYINT"),
            Self::USmallInt => write!(f, "USMALLINT"),
            Self::UInteger => write!(f, "UINTEGER"),
            Self::UBigInt => write!(f, "UBIGINT"),
            Self::UHugeInt => write!(f, "UHUGEINT"),
            Self::Float => write!(f, "FLOAT"),
            Self::Double => write!(f, "DOUBLE"),
            Self::Date => write!(f, "DATE"),
            Self::Time => write!(f, "TIME"),
            Self::TimeTz => write!(f, "TIME WITH TIME ZONE"),
            Self::Timestamp => write!(f, "TIMESTAMP"),
            Self::TimestampS => write!(f, "TIMESTAMP_S"),
            Self::TimestampMs => write!(f, "TIMESTAMP_MS"),
            Self::TimestampNs => write!(f, "TIMESTAMP_NS"),
            Self::TimestampTz => write!(f, "TIMESTAMP WITH TIME ZONE"),
            Self::Interval => write!(f, "INTERVAL"),
            Self::Varchar => write!(f, "VARCHAR"),
            Self::Blob => write!(f, "BLOB"),
            Self::Decimal { width, scale } => write!(f, "DECIMAL({},{})", width, scale),
            Self::Enum(values) => {
                write!(f, "ENUM(")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "'{}'", v.replace('\'', "''"))?;
                }
                write!(f, ")")
            }
            Self::List(child) => write!(f, "{}[]", child),
            Self::Struct(fields) => {
                write!(f, "STRUCT(")?;
                write_fields(f, fields)?;
                write!(f, ")")
            }
            Self::Map { key, value } => write!(f, "MAP({}, {})", key, value),
            Self::Array { child, size } => write!(f, "{}[{}]", child, size),
            Self::Union(members) => {
                write!(f, "UNION(")?;
                write_fields(f, members)?;
                write!(f, ")")
            }
            Self::Uuid => write!(f, "UUID"),
            Self::Bit => write!(f, "BIT"),
            Self::Bignum => write!(f, "BIGNUM"),
            Self::SqlNull => write!(f, "\"NULL\""),
            Self::StringLiteral => write!(f, "STRING_LITERAL"),
            Self::IntegerLiteral => write!(f, "INTEGER_LITERAL"),
            Self::Invalid => write!(f, "INVALID"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}
