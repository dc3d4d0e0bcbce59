//! Temporal codec: DATE, TIME, TIME WITH TIME ZONE, the TIMESTAMP family and
//! INTERVAL.
//!
//! Dates count days from 1970-01-01 in an `i32`; `i32::MAX` and `-i32::MAX`
//! are the infinity sentinels. Times count microseconds since midnight.
//! Timestamps count seconds, milliseconds, microseconds or nanoseconds since
//! the epoch in an `i64`, with `i64::MAX` and `-i64::MAX` as sentinels.
//! TIMESTAMP WITH TIME ZONE is always UTC microseconds; fetching re-derives
//! the instant in the session time zone.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use chrono_tz::Tz;
use engine::NativeInterval;

use crate::error::{DuckError, Result};
use crate::value::{DateValue, IntervalValue, TimeValue, TimestampTzValue, TimestampValue};

pub const DATE_POS_INFINITY: i32 = i32::MAX;
pub const DATE_NEG_INFINITY: i32 = -i32::MAX;
pub const TIMESTAMP_POS_INFINITY: i64 = i64::MAX;
pub const TIMESTAMP_NEG_INFINITY: i64 = -i64::MAX;

/// Largest UTC offset a TIME WITH TIME ZONE carries, in seconds (15:59:59).
pub const MAX_TZ_OFFSET: i32 = 16 * 3600 - 1;

const MICROS_PER_SECOND: i64 = 1_000_000;
/// Raw TIME of `24:00:00`
pub const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SECOND;
/// `num_days_from_ce` of 1970-01-01
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Resolution of a timestamp column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampUnit {
    Seconds,
    Millis,
    Micros,
    Nanos,
}

fn out_of_range(what: &str, raw: impl std::fmt::Display) -> DuckError {
    DuckError::range(format!("{} value {} is out of range", what, raw))
}

pub fn decode_date(days: i32) -> Result<DateValue> {
    match days {
        DATE_POS_INFINITY => Ok(DateValue::PosInfinity),
        DATE_NEG_INFINITY => Ok(DateValue::NegInfinity),
        _ => days
            .checked_add(EPOCH_DAYS_FROM_CE)
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .map(DateValue::Date)
            .ok_or_else(|| out_of_range("DATE", days)),
    }
}

pub fn encode_date(date: &DateValue) -> i32 {
    match date {
        DateValue::Date(d) => d.num_days_from_ce() - EPOCH_DAYS_FROM_CE,
        DateValue::PosInfinity => DATE_POS_INFINITY,
        DateValue::NegInfinity => DATE_NEG_INFINITY,
    }
}

pub fn decode_time(micros: i64) -> Result<TimeValue> {
    if micros == MICROS_PER_DAY {
        return Ok(TimeValue::EndOfDay);
    }
    let secs = u32::try_from(micros.div_euclid(MICROS_PER_SECOND)).map_err(|_| out_of_range("TIME", micros))?;
    let nanos = (micros.rem_euclid(MICROS_PER_SECOND) * 1000) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
        .map(TimeValue::Time)
        .ok_or_else(|| out_of_range("TIME", micros))
}

pub fn encode_time(time: &TimeValue) -> i64 {
    let time = match time {
        TimeValue::Time(t) => t,
        TimeValue::EndOfDay => return MICROS_PER_DAY,
    };
    // Leap seconds carry nanos past 1e9; clamp into the last microsecond.
    let micros = i64::from(time.nanosecond().min(999_999_999) / 1000);
    i64::from(time.num_seconds_from_midnight()) * MICROS_PER_SECOND + micros
}

/// Split a packed TIME WITH TIME ZONE into the local time and UTC offset.
///
/// The upper 40 bits hold microseconds since midnight; the lower 24 bits
/// hold `MAX_TZ_OFFSET - offset` so that values sort by offset.
pub fn decode_time_tz(bits: u64) -> Result<(TimeValue, i32)> {
    let micros = (bits >> 24) as i64;
    let offset = MAX_TZ_OFFSET - (bits & 0x00ff_ffff) as i32;
    Ok((decode_time(micros)?, offset))
}

pub fn encode_time_tz(time: &TimeValue, offset_seconds: i32) -> Result<u64> {
    if offset_seconds.abs() > MAX_TZ_OFFSET {
        return Err(out_of_range("TIME WITH TIME ZONE offset", offset_seconds));
    }
    let micros = encode_time(time) as u64;
    Ok((micros << 24) | (MAX_TZ_OFFSET - offset_seconds) as u64)
}

fn instant(raw: i64, unit: TimestampUnit) -> Option<DateTime<chrono::Utc>> {
    match unit {
        TimestampUnit::Seconds => DateTime::from_timestamp(raw, 0),
        TimestampUnit::Millis => DateTime::from_timestamp_millis(raw),
        TimestampUnit::Micros => DateTime::from_timestamp_micros(raw),
        TimestampUnit::Nanos => Some(DateTime::from_timestamp_nanos(raw)),
    }
}

pub fn decode_timestamp(raw: i64, unit: TimestampUnit) -> Result<TimestampValue> {
    match raw {
        TIMESTAMP_POS_INFINITY => Ok(TimestampValue::PosInfinity),
        TIMESTAMP_NEG_INFINITY => Ok(TimestampValue::NegInfinity),
        _ => instant(raw, unit)
            .map(|dt| TimestampValue::Timestamp(dt.naive_utc()))
            .ok_or_else(|| out_of_range("TIMESTAMP", raw)),
    }
}

pub fn encode_timestamp(ts: &TimestampValue, unit: TimestampUnit) -> Result<i64> {
    let ts = match ts {
        TimestampValue::Timestamp(ts) => ts,
        TimestampValue::PosInfinity => return Ok(TIMESTAMP_POS_INFINITY),
        TimestampValue::NegInfinity => return Ok(TIMESTAMP_NEG_INFINITY),
    };
    encode_naive(ts, unit)
}

fn encode_naive(ts: &NaiveDateTime, unit: TimestampUnit) -> Result<i64> {
    let utc = ts.and_utc();
    let raw = match unit {
        TimestampUnit::Seconds => Some(utc.timestamp()),
        TimestampUnit::Millis => Some(utc.timestamp_millis()),
        TimestampUnit::Micros => Some(utc.timestamp_micros()),
        TimestampUnit::Nanos => utc.timestamp_nanos_opt(),
    };
    raw.filter(|r| *r != TIMESTAMP_POS_INFINITY && *r != TIMESTAMP_NEG_INFINITY)
        .ok_or_else(|| out_of_range("TIMESTAMP", ts))
}

/// Decode UTC microseconds into the session time zone.
pub fn decode_timestamp_tz(micros: i64, time_zone: Tz) -> Result<TimestampTzValue> {
    match micros {
        TIMESTAMP_POS_INFINITY => Ok(TimestampTzValue::PosInfinity),
        TIMESTAMP_NEG_INFINITY => Ok(TimestampTzValue::NegInfinity),
        _ => DateTime::from_timestamp_micros(micros)
            .map(|dt| TimestampTzValue::Timestamp(dt.with_timezone(&time_zone)))
            .ok_or_else(|| out_of_range("TIMESTAMP WITH TIME ZONE", micros)),
    }
}

/// Any offset-carrying instant becomes UTC microseconds.
pub fn encode_timestamp_tz(ts: &DateTime<FixedOffset>) -> Result<i64> {
    encode_naive(&ts.naive_utc(), TimestampUnit::Micros)
}

pub fn decode_interval(native: NativeInterval) -> IntervalValue {
    native.into()
}

pub fn encode_interval(interval: &IntervalValue) -> NativeInterval {
    (*interval).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(0, ymd(1970, 1, 1))]
    #[case(-1, ymd(1969, 12, 31))]
    #[case(19_723, ymd(2024, 1, 1))]
    fn test_date_round_trip(#[case] days: i32, #[case] date: NaiveDate) {
        assert_eq!(decode_date(days).unwrap(), DateValue::Date(date));
        assert_eq!(encode_date(&DateValue::Date(date)), days);
    }

    #[test]
    fn test_date_infinity_sentinels() {
        assert_eq!(decode_date(i32::MAX).unwrap(), DateValue::PosInfinity);
        assert_eq!(decode_date(-i32::MAX).unwrap(), DateValue::NegInfinity);
        assert_eq!(encode_date(&DateValue::NegInfinity), -i32::MAX);
    }

    #[test]
    fn test_time_round_trip() {
        let time = TimeValue::Time(NaiveTime::from_hms_micro_opt(13, 45, 30, 123_456).unwrap());
        let micros = encode_time(&time);
        assert_eq!(micros, ((13 * 3600 + 45 * 60 + 30) * 1_000_000) + 123_456);
        assert_eq!(decode_time(micros).unwrap(), time);
        assert!(decode_time(-1).is_err());
        assert!(decode_time(MICROS_PER_DAY + 1).is_err());
    }

    #[test]
    fn test_end_of_day_round_trip() {
        assert_eq!(decode_time(86_400_000_000).unwrap(), TimeValue::EndOfDay);
        assert_eq!(encode_time(&TimeValue::EndOfDay), 86_400_000_000);

        let last = TimeValue::Time(NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap());
        assert_eq!(decode_time(86_399_999_999).unwrap(), last);

        let bits = encode_time_tz(&TimeValue::EndOfDay, -3600).unwrap();
        assert_eq!(decode_time_tz(bits).unwrap(), (TimeValue::EndOfDay, -3600));
    }

    #[rstest]
    #[case(0)]
    #[case(3600)]
    #[case(-(5 * 3600 + 1800))]
    #[case(MAX_TZ_OFFSET)]
    #[case(-MAX_TZ_OFFSET)]
    fn test_time_tz_packing(#[case] offset: i32) {
        let time = TimeValue::Time(NaiveTime::from_hms_micro_opt(8, 0, 1, 5).unwrap());
        let bits = encode_time_tz(&time, offset).unwrap();
        assert_eq!(decode_time_tz(bits).unwrap(), (time, offset));
    }

    #[test]
    fn test_time_tz_rejects_wide_offset() {
        let time = TimeValue::Time(NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        assert!(encode_time_tz(&time, MAX_TZ_OFFSET + 1).is_err());
    }

    #[rstest]
    #[case(TimestampUnit::Seconds, 1_700_000_000)]
    #[case(TimestampUnit::Millis, 1_700_000_000_123)]
    #[case(TimestampUnit::Micros, 1_700_000_000_123_456)]
    #[case(TimestampUnit::Nanos, 1_700_000_000_123_456_789)]
    #[case(TimestampUnit::Micros, -1)]
    fn test_timestamp_round_trip(#[case] unit: TimestampUnit, #[case] raw: i64) {
        let decoded = decode_timestamp(raw, unit).unwrap();
        assert_eq!(encode_timestamp(&decoded, unit).unwrap(), raw);
    }

    #[test]
    fn test_timestamp_infinity_sentinels() {
        for unit in [TimestampUnit::Seconds, TimestampUnit::Nanos] {
            assert_eq!(decode_timestamp(i64::MAX, unit).unwrap(), TimestampValue::PosInfinity);
            assert_eq!(decode_timestamp(-i64::MAX, unit).unwrap(), TimestampValue::NegInfinity);
        }
    }

    #[test]
    fn test_timestamp_out_of_unit_range() {
        let far = ymd(2300, 1, 1).and_hms_opt(0, 0, 0).unwrap();
        assert!(encode_timestamp(&TimestampValue::Timestamp(far), TimestampUnit::Nanos).is_err());
        assert!(encode_timestamp(&TimestampValue::Timestamp(far), TimestampUnit::Micros).is_ok());
    }

    #[test]
    fn test_timestamp_tz_in_session_zone() {
        let tz: Tz = "Europe/Berlin".parse().unwrap();
        let decoded = decode_timestamp_tz(0, tz).unwrap();
        let TimestampTzValue::Timestamp(dt) = decoded else {
            panic!("expected a finite timestamp");
        };
        assert_eq!(dt.to_rfc3339(), "1970-01-01T01:00:00+01:00");

        let back = encode_timestamp_tz(&dt.fixed_offset()).unwrap();
        assert_eq!(back, 0);
    }

    #[test]
    fn test_interval_is_lossless() {
        let native = NativeInterval {
            months: 1,
            days: 32,
            micros: -7,
        };
        assert_eq!(encode_interval(&decode_interval(native)), native);
    }
}
