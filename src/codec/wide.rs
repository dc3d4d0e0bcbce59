//! Wide-integer codec: HUGEINT, UHUGEINT and BIGNUM.
//!
//! A HUGEINT is stored as a signed upper word and an unsigned lower word,
//! `value = upper * 2^64 + lower`. The canonical path converts from the host
//! arbitrary-precision integer with bit arithmetic only: `lower` is the value
//! masked to 64 bits in two's complement and `upper` is the value shifted
//! right by 64 with floor rounding, which carries the borrow a negative
//! lower word needs. The internal path does the same on raw `i128` words for
//! hot loops; both must agree bit for bit.

use engine::{UWideInt, WideInt};
use num_bigint::{BigInt, Sign};
use num_traits::{One, ToPrimitive, Zero};
use uuid::Uuid;

use crate::error::{DuckError, Result};

fn lower_mask() -> BigInt {
    (BigInt::one() << 64u32) - 1
}

fn hugeint_min() -> BigInt {
    -(BigInt::one() << 127u32)
}

fn hugeint_max() -> BigInt {
    (BigInt::one() << 127u32) - 1
}

fn uhugeint_max() -> BigInt {
    (BigInt::one() << 128u32) - 1
}

fn out_of_range(value: &BigInt, type_name: &str) -> DuckError {
    DuckError::range(format!("value {} is out of range for {}", value, type_name))
}

/// Split an arbitrary-precision integer into HUGEINT words.
pub fn to_wide(value: &BigInt) -> Result<WideInt> {
    if *value < hugeint_min() || *value > hugeint_max() {
        return Err(out_of_range(value, "HUGEINT"));
    }
    let lower = (value & lower_mask())
        .to_u64()
        .ok_or_else(|| out_of_range(value, "HUGEINT"))?;
    let upper = (value >> 64u32)
        .to_i64()
        .ok_or_else(|| out_of_range(value, "HUGEINT"))?;
    Ok(WideInt::new(upper, lower))
}

/// Join HUGEINT words. Never fails.
pub fn from_wide(wide: WideInt) -> BigInt {
    (BigInt::from(wide.upper) << 64u32) + BigInt::from(wide.lower)
}

/// Raw-word split without the arbitrary-precision round trip.
pub const fn to_wide_internal(value: i128) -> (i64, u64) {
    ((value >> 64) as i64, value as u64)
}

/// Raw-word join without the arbitrary-precision round trip.
pub const fn from_wide_internal(upper: i64, lower: u64) -> i128 {
    ((upper as i128) << 64) | lower as i128
}

/// Split a non-negative integer into UHUGEINT words.
pub fn to_uwide(value: &BigInt) -> Result<UWideInt> {
    if value.sign() == Sign::Minus || *value > uhugeint_max() {
        return Err(out_of_range(value, "UHUGEINT"));
    }
    let lower = (value & lower_mask())
        .to_u64()
        .ok_or_else(|| out_of_range(value, "UHUGEINT"))?;
    let upper = (value >> 64u32)
        .to_u64()
        .ok_or_else(|| out_of_range(value, "UHUGEINT"))?;
    Ok(UWideInt::new(upper, lower))
}

pub fn from_uwide(wide: UWideInt) -> BigInt {
    (BigInt::from(wide.upper) << 64u32) + BigInt::from(wide.lower)
}

/// Whether `value` fits a HUGEINT.
pub fn fits_hugeint(value: &BigInt) -> bool {
    *value >= hugeint_min() && *value <= hugeint_max()
}

const UUID_SIGN_FLIP: u64 = 1 << 63;

/// UUIDs are stored as HUGEINT with the top bit flipped so that signed
/// comparison orders them like their unsigned text.
pub fn uuid_from_wide(wide: WideInt) -> Uuid {
    let upper = (wide.upper as u64) ^ UUID_SIGN_FLIP;
    Uuid::from_u128((u128::from(upper) << 64) | u128::from(wide.lower))
}

pub fn uuid_to_wide(uuid: &Uuid) -> WideInt {
    let bits = uuid.as_u128();
    WideInt::new((((bits >> 64) as u64) ^ UUID_SIGN_FLIP) as i64, bits as u64)
}

const BIGNUM_HEADER: usize = 3;
const BIGNUM_POSITIVE: u8 = 0x80;

/// Decode a BIGNUM blob.
///
/// Layout: a 3-byte header whose top bit is set for non-negative values and
/// whose remaining 23 bits hold the payload length, then the magnitude in
/// big-endian bytes. Negative values store header and payload bit-inverted.
pub fn decode_bignum(bytes: &[u8]) -> Result<BigInt> {
    if bytes.len() < BIGNUM_HEADER {
        return Err(DuckError::invalid_state(format!(
            "BIGNUM blob of {} bytes is shorter than its header",
            bytes.len()
        )));
    }
    let negative = bytes[0] & BIGNUM_POSITIVE == 0;
    let payload = &bytes[BIGNUM_HEADER..];
    if negative {
        let magnitude: Vec<u8> = payload.iter().map(|b| !b).collect();
        Ok(-BigInt::from_bytes_be(Sign::Plus, &magnitude))
    } else {
        Ok(BigInt::from_bytes_be(Sign::Plus, payload))
    }
}

/// Encode a BIGNUM blob; inverse of [`decode_bignum`].
pub fn encode_bignum(value: &BigInt) -> Vec<u8> {
    let (sign, mut magnitude) = value.to_bytes_be();
    if value.is_zero() {
        magnitude = vec![0];
    }
    let len = magnitude.len() as u32;
    let header = [
        BIGNUM_POSITIVE | ((len >> 16) & 0x7f) as u8,
        (len >> 8) as u8,
        len as u8,
    ];
    let mut out: Vec<u8> = header.iter().chain(magnitude.iter()).copied().collect();
    if sign == Sign::Minus {
        out.iter_mut().for_each(|b| *b = !*b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn boundary_values() -> Vec<i128> {
        vec![
            0,
            1,
            -1,
            i64::MAX as i128,
            i64::MAX as i128 + 1,
            i64::MIN as i128,
            i64::MIN as i128 - 1,
            u64::MAX as i128,
            u64::MAX as i128 + 1,
            -(u64::MAX as i128),
            -(u64::MAX as i128) - 1,
            i128::MAX,
            i128::MIN,
            i128::MAX - 1,
            i128::MIN + 1,
            0x1234_5678_9abc_def0_0fed_cba9_8765_4321,
            -0x1234_5678_9abc_def0_0fed_cba9_8765_4321,
        ]
    }

    #[test]
    fn test_round_trip_over_boundaries() {
        for v in boundary_values() {
            let n = BigInt::from(v);
            assert_eq!(from_wide(to_wide(&n).unwrap()), n, "value {}", v);
        }
    }

    #[test]
    fn test_internal_path_matches_canonical_path() {
        for v in boundary_values() {
            let canonical = to_wide(&BigInt::from(v)).unwrap();
            let (upper, lower) = to_wide_internal(v);
            assert_eq!((canonical.upper, canonical.lower), (upper, lower), "value {}", v);
            assert_eq!(from_wide_internal(upper, lower), v);
            assert_eq!(WideInt::from_i128(v), canonical);
        }
    }

    #[test]
    fn test_internal_path_matches_over_stride() {
        let mut v: i128 = i128::MIN;
        let step: i128 = i128::MAX / 997;
        while let Some(next) = v.checked_add(step) {
            let canonical = to_wide(&BigInt::from(v)).unwrap();
            assert_eq!((canonical.upper, canonical.lower), to_wide_internal(v));
            v = next;
        }
    }

    #[test]
    fn test_negative_lower_word_borrows_from_upper() {
        let wide = to_wide(&BigInt::from(-1)).unwrap();
        assert_eq!(wide, WideInt::new(-1, u64::MAX));

        let wide = to_wide(&BigInt::from(-(1i128 << 64))).unwrap();
        assert_eq!(wide, WideInt::new(-1, 0));
    }

    #[rstest]
    #[case(BigInt::from(1) << 127u32)]
    #[case(-(BigInt::from(1) << 127u32) - 1)]
    fn test_out_of_range_carries_decimal_string(#[case] value: BigInt) {
        let err = to_wide(&value).unwrap_err();
        assert!(matches!(err, DuckError::Range { .. }));
        assert!(err.to_string().contains(&value.to_string()));
    }

    #[test]
    fn test_unsigned_round_trip() {
        for v in [0u128, 1, u64::MAX as u128, u64::MAX as u128 + 1, u128::MAX] {
            let n = BigInt::from(v);
            let wide = to_uwide(&n).unwrap();
            assert_eq!(wide, UWideInt::from_u128(v));
            assert_eq!(from_uwide(wide), n);
        }
        assert!(to_uwide(&BigInt::from(-1)).is_err());
        assert!(to_uwide(&(BigInt::from(u128::MAX) + 1)).is_err());
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(-1)]
    #[case(255)]
    #[case(-256)]
    #[case(i128::MAX)]
    #[case(i128::MIN)]
    fn test_bignum_blob(#[case] value: i128) {
        let n = BigInt::from(value);
        assert_eq!(decode_bignum(&encode_bignum(&n)).unwrap(), n);
    }

    #[test]
    fn test_uuid_storage_flips_top_bit() {
        let uuid = Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap();
        let wide = uuid_to_wide(&uuid);
        assert_eq!(wide, WideInt::new(i64::MIN, 1));
        assert_eq!(uuid_from_wide(wide), uuid);

        let max = Uuid::from_u128(u128::MAX);
        assert_eq!(uuid_to_wide(&max), WideInt::new(i64::MAX, u64::MAX));
    }

    #[test]
    fn test_bignum_layout() {
        assert_eq!(encode_bignum(&BigInt::from(1)), vec![0x80, 0x00, 0x01, 0x01]);
        assert_eq!(encode_bignum(&BigInt::from(-1)), vec![0x7f, 0xff, 0xfe, 0xfe]);
        assert!(decode_bignum(&[0x80]).is_err());
    }
}
