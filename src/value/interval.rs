//! INTERVAL values and their ISO-8601 duration form.
//!
//! An interval is the engine's `(months, days, micros)` triple. The three
//! fields are independent: a month is not a fixed number of days, so no
//! normalization ever happens and equality compares all three fields.
//!
//! The textual form is the ISO-8601 duration subset
//! `[-]P[nY][nM][nD][T[nH][nM][n[.f]S]]`, where every numeric group may carry
//! its own `-` sign and a `-` before `P` negates every group.

use std::fmt;
use std::str::FromStr;

use engine::NativeInterval;
use serde::Serialize;

use crate::error::{DuckError, Result};

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SECOND;
const MICROS_PER_HOUR: i64 = 60 * MICROS_PER_MINUTE;

/// Fractional second digits kept by the parser.
const FRACTION_DIGITS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct IntervalValue {
    pub months: i32,
    pub days: i32,
    pub micros: i64,
}

/// Groups collected by the scanner before folding into the triple.
#[derive(Default)]
struct Groups {
    years: i64,
    months: i64,
    days: i64,
    hours: i64,
    minutes: i64,
    seconds: i64,
    fraction_micros: i64,
}

impl IntervalValue {
    pub const fn new(months: i32, days: i32, micros: i64) -> Self {
        Self {
            months,
            days,
            micros,
        }
    }

    /// Parse an ISO-8601 duration.
    ///
    /// Fractional seconds are left-justified to six digits and truncated,
    /// never rounded; the seconds' sign carries onto the fraction.
    pub fn parse_iso8601(input: &str) -> Result<Self> {
        let fail = || {
            DuckError::argument(format!(
                "The argument `{}` can't be parsed as an ISO 8601 duration",
                input
            ))
        };

        let (negate, body) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input),
        };
        let body = body.strip_prefix('P').ok_or_else(fail)?;

        let mut groups = Groups::default();
        let mut buffer = String::new();
        let mut seen_t = false;
        let mut committed = false;

        for c in body.chars() {
            match c {
                '0'..='9' | '.' | '-' => buffer.push(c),
                'T' if !seen_t && buffer.is_empty() => seen_t = true,
                'Y' if !seen_t => groups.years = take_whole(&mut buffer).ok_or_else(fail)?,
                'M' if !seen_t => groups.months = take_whole(&mut buffer).ok_or_else(fail)?,
                'D' if !seen_t => groups.days = take_whole(&mut buffer).ok_or_else(fail)?,
                'H' if seen_t => groups.hours = take_whole(&mut buffer).ok_or_else(fail)?,
                'M' if seen_t => groups.minutes = take_whole(&mut buffer).ok_or_else(fail)?,
                'S' if seen_t => {
                    let (seconds, fraction) = take_seconds(&mut buffer).ok_or_else(fail)?;
                    groups.seconds = seconds;
                    groups.fraction_micros = fraction;
                }
                _ => return Err(fail()),
            }
            if matches!(c, 'Y' | 'M' | 'D' | 'H' | 'S') {
                committed = true;
            }
        }
        if !buffer.is_empty() || !committed {
            return Err(fail());
        }

        let interval = groups.fold().ok_or_else(fail)?;
        if negate {
            interval.checked_neg().ok_or_else(fail)
        } else {
            Ok(interval)
        }
    }

    /// Shortest ISO-8601 duration that parses back to this interval.
    pub fn to_iso8601(&self) -> String {
        if *self == Self::default() {
            return "PT0S".to_string();
        }

        let mut out = String::from("P");
        let years = self.months / 12;
        let months = self.months % 12;
        if years != 0 {
            out.push_str(&format!("{}Y", years));
        }
        if months != 0 {
            out.push_str(&format!("{}M", months));
        }
        if self.days != 0 {
            out.push_str(&format!("{}D", self.days));
        }

        if self.micros != 0 {
            out.push('T');
            let hours = self.micros / MICROS_PER_HOUR;
            let rest = self.micros % MICROS_PER_HOUR;
            let minutes = rest / MICROS_PER_MINUTE;
            let rest = rest % MICROS_PER_MINUTE;
            let seconds = rest / MICROS_PER_SECOND;
            let fraction = rest % MICROS_PER_SECOND;

            if hours != 0 {
                out.push_str(&format!("{}H", hours));
            }
            if minutes != 0 {
                out.push_str(&format!("{}M", minutes));
            }
            if seconds != 0 || fraction != 0 {
                let sign = if rest < 0 { "-" } else { "" };
                out.push_str(sign);
                out.push_str(&seconds.unsigned_abs().to_string());
                if fraction != 0 {
                    let digits = format!("{:06}", fraction.unsigned_abs());
                    out.push('.');
                    out.push_str(digits.trim_end_matches('0'));
                }
                out.push('S');
            }
        }
        out
    }

    fn checked_neg(self) -> Option<Self> {
        Some(Self {
            months: self.months.checked_neg()?,
            days: self.days.checked_neg()?,
            micros: self.micros.checked_neg()?,
        })
    }
}

impl Groups {
    fn fold(&self) -> Option<IntervalValue> {
        let months = self.years.checked_mul(12)?.checked_add(self.months)?;
        let seconds = self
            .hours
            .checked_mul(3600)?
            .checked_add(self.minutes.checked_mul(60)?)?
            .checked_add(self.seconds)?;
        let micros = seconds
            .checked_mul(MICROS_PER_SECOND)?
            .checked_add(self.fraction_micros)?;
        Some(IntervalValue {
            months: i32::try_from(months).ok()?,
            days: i32::try_from(self.days).ok()?,
            micros,
        })
    }
}

/// Commit the buffer as a whole number.
fn take_whole(buffer: &mut String) -> Option<i64> {
    let value = buffer.parse::<i64>().ok();
    buffer.clear();
    value
}

/// Commit the buffer as seconds with an optional fraction.
/// Returns whole seconds and signed microseconds.
fn take_seconds(buffer: &mut String) -> Option<(i64, i64)> {
    let text = std::mem::take(buffer);
    let negative = text.starts_with('-');
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (text.as_str(), ""),
    };

    let seconds = match whole {
        "" | "-" if !fraction.is_empty() => 0,
        _ => whole.parse::<i64>().ok()?,
    };
    if !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let mut digits: String = fraction.chars().take(FRACTION_DIGITS).collect();
    while digits.len() < FRACTION_DIGITS {
        digits.push('0');
    }
    let micros = digits.parse::<i64>().ok()?;
    Some((seconds, if negative { -micros } else { micros }))
}

impl fmt::Display for IntervalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl FromStr for IntervalValue {
    type Err = DuckError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_iso8601(s)
    }
}

impl From<NativeInterval> for IntervalValue {
    fn from(native: NativeInterval) -> Self {
        Self::new(native.months, native.days, native.micros)
    }
}

impl From<IntervalValue> for NativeInterval {
    fn from(value: IntervalValue) -> Self {
        NativeInterval {
            months: value.months,
            days: value.days,
            micros: value.micros,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_full_duration() {
        let interval = IntervalValue::parse_iso8601("P1Y2M3DT4H5M6.7S").unwrap();
        assert_eq!(interval, IntervalValue::new(14, 3, 14_706_700_000));
    }

    #[test]
    fn test_fraction_is_truncated_not_rounded() {
        let interval = IntervalValue::parse_iso8601("P1Y2M3DT4H5M6.000007S").unwrap();
        assert_eq!(interval.micros, 14_706_000_007);

        let interval = IntervalValue::parse_iso8601("PT0.1234569S").unwrap();
        assert_eq!(interval.micros, 123_456);
    }

    #[test]
    fn test_negative_groups() {
        let interval = IntervalValue::parse_iso8601("P-1Y-2M-3DT-12H-34M-56.987654S").unwrap();
        assert_eq!(interval.months, -14);
        assert_eq!(interval.days, -3);
        assert_eq!(
            interval.micros,
            -(12 * 3600 + 34 * 60 + 56) * 1_000_000 - 987_654
        );
    }

    #[test]
    fn test_leading_minus_negates_every_group() {
        let interval = IntervalValue::parse_iso8601("-P1DT1S").unwrap();
        assert_eq!(interval, IntervalValue::new(0, -1, -1_000_000));
    }

    #[test]
    fn test_months_and_minutes_share_letter() {
        let interval = IntervalValue::parse_iso8601("P5MT5M").unwrap();
        assert_eq!(interval, IntervalValue::new(5, 0, 300_000_000));
    }

    #[rstest]
    #[case("1Y2M3DT4H5M6.7")]
    #[case("P")]
    #[case("P1")]
    #[case("P1W")]
    #[case("P1Y2X")]
    #[case("PT1Y")]
    #[case("P1H")]
    #[case("P1.5D")]
    #[case("PTT1S")]
    #[case("P99999999999Y")]
    fn test_malformed_input_is_argument_error(#[case] input: &str) {
        let err = IntervalValue::parse_iso8601(input).unwrap_err();
        assert!(matches!(err, DuckError::Argument { .. }));
        assert!(err.to_string().contains(input));
    }

    #[rstest]
    #[case(IntervalValue::new(0, 0, 0), "PT0S")]
    #[case(IntervalValue::new(14, 3, 14_706_700_000), "P1Y2M3DT4H5M6.7S")]
    #[case(IntervalValue::new(-14, 0, 0), "P-1Y-2M")]
    #[case(IntervalValue::new(0, 32, 0), "P32D")]
    #[case(IntervalValue::new(0, 0, -500_000), "PT-0.5S")]
    #[case(IntervalValue::new(0, 0, 7), "PT0.000007S")]
    fn test_format(#[case] interval: IntervalValue, #[case] expected: &str) {
        assert_eq!(interval.to_iso8601(), expected);
    }

    #[rstest]
    #[case(IntervalValue::new(14, 3, 14_706_700_000))]
    #[case(IntervalValue::new(-14, -3, -45_296_987_654))]
    #[case(IntervalValue::new(1, -1, 1))]
    #[case(IntervalValue::new(i32::MAX, i32::MIN, i64::MAX))]
    #[case(IntervalValue::new(0, 0, i64::MIN))]
    fn test_format_parses_back(#[case] interval: IntervalValue) {
        let text = interval.to_string();
        assert_eq!(text.parse::<IntervalValue>().unwrap(), interval, "via {}", text);
    }

    #[test]
    fn test_no_normalization_between_fields() {
        let days = IntervalValue::parse_iso8601("P32D").unwrap();
        let month_days = IntervalValue::parse_iso8601("P1M2D").unwrap();
        assert_ne!(days, month_days);
    }
}
