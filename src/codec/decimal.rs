//! Decimal codec.
//!
//! A DECIMAL(width, scale) cell stores `value * 10^scale` as an integer whose
//! backing width follows the declared precision (see
//! [`engine::DecimalStorage`]). Decoding is exact: the unscaled integer and
//! the scale become a `BigDecimal` directly, with no floating point step.

use bigdecimal::BigDecimal;
use engine::{DecimalStorage, LogicalType, NativeValue, VectorData};
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

use super::{layout_mismatch, slot_missing, wide};
use crate::error::{DuckError, Result};
use crate::value::DecimalValue;

fn pow10(exp: u64) -> BigInt {
    num_traits::pow(BigInt::from(10), exp as usize)
}

/// Rescale `value` to exactly `scale` fractional digits, rounding half away
/// from zero when digits are dropped. Returns the unscaled integer.
///
/// Dropping more digits than the value has rounds to zero without building
/// the divisor.
pub fn rescale(value: &BigDecimal, scale: u8) -> BigInt {
    let (digits, exponent) = value.as_bigint_and_exponent();
    let target = i64::from(scale);
    if exponent <= target {
        return digits * pow10(target.abs_diff(exponent));
    }

    let dropped = exponent.abs_diff(target);
    if digits.is_zero() || dropped > value.digits() {
        return BigInt::zero();
    }
    let divisor = pow10(dropped);
    let quotient = &digits / &divisor;
    let remainder = &digits % &divisor;
    if remainder.abs() * 2 >= divisor {
        quotient + digits.signum()
    } else {
        quotient
    }
}

/// Scale a host decimal into DECIMAL(width, scale).
///
/// Fails with a range error naming the value when the rounded result needs
/// more than `width` digits.
pub fn to_decimal(value: &BigDecimal, width: u8, scale: u8) -> Result<DecimalValue> {
    DecimalValue::new(0, width, scale)?;
    let (digits, exponent) = value.as_bigint_and_exponent();
    if !digits.is_zero() {
        // digits left of the point; only the rounding carry can add one more
        let integer_digits = value.digits() as i64 - exponent;
        if integer_digits > i64::from(width) - i64::from(scale) {
            return Err(DuckError::range(format!(
                "value {} does not fit DECIMAL({},{})",
                value, width, scale
            )));
        }
    }
    let unscaled = rescale(value, scale);
    if unscaled.abs() >= pow10(u64::from(width)) {
        return Err(DuckError::range(format!(
            "value {} does not fit DECIMAL({},{})",
            value, width, scale
        )));
    }
    let unscaled = unscaled.to_i128().ok_or_else(|| {
        DuckError::range(format!("value {} does not fit DECIMAL({},{})", value, width, scale))
    })?;
    DecimalValue::new(unscaled, width, scale)
}

/// Bind form of a decimal: the unscaled integer travels as HUGEINT words.
pub fn encode(value: &BigDecimal, width: u8, scale: u8) -> Result<NativeValue> {
    let decimal = to_decimal(value, width, scale)?;
    let words = wide::to_wide(&BigInt::from(decimal.unscaled))?;
    Ok(NativeValue::Decimal {
        width,
        scale,
        value: words,
    })
}

/// Decimal scale a host value has on its own, clamped to what DECIMAL allows.
pub fn natural_scale(value: &BigDecimal) -> u8 {
    let (_, exponent) = value.as_bigint_and_exponent();
    exponent.clamp(0, i64::from(DecimalValue::MAX_WIDTH)) as u8
}

/// Read the unscaled integer from the backing slot chosen by `width`.
pub fn decode_unscaled(logical_type: &LogicalType, data: &VectorData, row: usize, width: u8) -> Result<BigInt> {
    let mismatch = || layout_mismatch(logical_type, data);
    Ok(match (DecimalStorage::for_width(width), data) {
        (DecimalStorage::Int16, VectorData::Int16(v)) => BigInt::from(*v.get(row).ok_or_else(|| slot_missing(row))?),
        (DecimalStorage::Int32, VectorData::Int32(v)) => BigInt::from(*v.get(row).ok_or_else(|| slot_missing(row))?),
        (DecimalStorage::Int64, VectorData::Int64(v)) => BigInt::from(*v.get(row).ok_or_else(|| slot_missing(row))?),
        (DecimalStorage::HugeInt, VectorData::HugeInt(v)) => {
            wide::from_wide(*v.get(row).ok_or_else(|| slot_missing(row))?)
        }
        _ => return Err(mismatch()),
    })
}

pub fn decode(logical_type: &LogicalType, data: &VectorData, row: usize, width: u8, scale: u8) -> Result<BigDecimal> {
    let unscaled = decode_unscaled(logical_type, data, row, width)?;
    Ok(BigDecimal::new(unscaled, i64::from(scale)))
}

/// Exact text of `unscaled / 10^scale`.
pub fn format_decimal(unscaled: i128, scale: u8) -> String {
    if scale == 0 {
        return unscaled.to_string();
    }
    let digits = unscaled.unsigned_abs().to_string();
    let scale = usize::from(scale);
    let padded = format!("{:0>width$}", digits, width = scale + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - scale);
    let sign = if unscaled < 0 { "-" } else { "" };
    format!("{}{}.{}", sign, int_part, frac_part)
}

/// True when `value` has no fractional digits beyond `scale`.
pub fn is_exact_at(value: &BigDecimal, scale: u8) -> bool {
    let (digits, exponent) = value.as_bigint_and_exponent();
    if exponent <= i64::from(scale) || digits.is_zero() {
        return true;
    }
    let dropped = exponent.abs_diff(i64::from(scale));
    if dropped > value.digits() {
        return false;
    }
    let divisor = pow10(dropped);
    (&digits % &divisor).is_zero()
}
