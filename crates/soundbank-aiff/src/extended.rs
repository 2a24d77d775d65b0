//! 80-bit IEEE-754 extended precision floats.
//!
//! AIFF stores the sample rate in the 68881/x87 extended layout: one sign
//! bit, a 15-bit exponent biased by 16383, and a 64-bit mantissa with an
//! explicit integer bit. There is no NaN encoding; NaN and infinities are
//! written as infinity.

use byteorder::{BigEndian, ByteOrder};

const EXPONENT_BIAS: i32 = 16383;
const INFINITY_EXPONENT: u16 = 0x7fff;
const SIGN_BIT: u16 = 0x8000;

/// Splits a finite non-zero value into a fraction in [0.5, 1) and a power
/// of two, so that `value == fraction * 2^exp`.
fn frexp(value: f64) -> (f64, i32) {
    if value == 0.0 || !value.is_finite() {
        return (value, 0);
    }
    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    if biased == 0 {
        // Subnormal: normalize first.
        let (fraction, exp) = frexp(value * 2f64.powi(64));
        return (fraction, exp - 64);
    }
    let fraction = f64::from_bits((bits & !(0x7ff << 52)) | (1022 << 52));
    (fraction, biased - 1022)
}

/// Computes `value * 2^exp` without overflowing the intermediate power.
fn ldexp(mut value: f64, mut exp: i32) -> f64 {
    while exp > 1023 && value.is_finite() {
        value *= 2f64.powi(1023);
        exp -= 1023;
    }
    while exp < -1022 && value != 0.0 {
        value *= 2f64.powi(-1022);
        exp += 1022;
    }
    value * 2f64.powi(exp)
}

/// Encodes a double as a 10-byte big-endian extended float.
pub fn to_extended(value: f64) -> [u8; 10] {
    let mut bytes = [0u8; 10];

    let (sign, magnitude) = if value < 0.0 {
        (SIGN_BIT, -value)
    } else {
        (0, value)
    };

    if magnitude == 0.0 {
        return bytes;
    }

    let (fraction, exp) = frexp(magnitude);
    let (exponent, hi, lo) = if exp > 16384 || fraction.is_nan() || fraction >= 1.0 {
        (sign | INFINITY_EXPONENT, 0u32, 0u32)
    } else {
        let exponent = (exp + EXPONENT_BIAS - 1) as u16 | sign;
        let shifted = ldexp(fraction, 32);
        let hi = shifted.floor();
        let rest = ldexp(shifted - hi, 32);
        let lo = rest.floor();
        (exponent, hi as u32, lo as u32)
    };

    BigEndian::write_u16(&mut bytes[0..2], exponent);
    BigEndian::write_u32(&mut bytes[2..6], hi);
    BigEndian::write_u32(&mut bytes[6..10], lo);
    bytes
}

/// Decodes a 10-byte big-endian extended float.
pub fn from_extended(bytes: &[u8; 10]) -> f64 {
    let exponent = BigEndian::read_u16(&bytes[0..2]) & INFINITY_EXPONENT;
    let hi = BigEndian::read_u32(&bytes[2..6]);
    let lo = BigEndian::read_u32(&bytes[6..10]);

    let magnitude = if exponent == 0 && hi == 0 && lo == 0 {
        0.0
    } else if exponent == INFINITY_EXPONENT {
        f64::INFINITY
    } else {
        let exp = exponent as i32 - EXPONENT_BIAS;
        ldexp(hi as f64, exp - 31) + ldexp(lo as f64, exp - 63)
    };

    if bytes[0] & 0x80 != 0 {
        -magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sample_rates() {
        assert_eq!(
            to_extended(44100.0),
            [0x40, 0x0E, 0xAC, 0x44, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(
            to_extended(22050.0),
            [0x40, 0x0D, 0xAC, 0x44, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(to_extended(1.0), [0x3F, 0xFF, 0x80, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_round_trip() {
        for value in [44100.0, 8000.0, 32000.5, -1.25, 0.001, 1e300, -7.0e-300] {
            let decoded = from_extended(&to_extended(value));
            assert!(
                ((decoded - value) / value).abs() < 1e-12,
                "{value} decoded as {decoded}"
            );
        }
    }

    #[test]
    fn test_zero() {
        assert_eq!(to_extended(0.0), [0; 10]);
        assert_eq!(to_extended(-0.0), [0; 10]);
        assert_eq!(from_extended(&[0; 10]), 0.0);
    }

    #[test]
    fn test_infinity_and_nan() {
        let inf = to_extended(f64::INFINITY);
        assert_eq!(inf, [0x7F, 0xFF, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(from_extended(&inf), f64::INFINITY);
        assert_eq!(to_extended(f64::NAN), inf);

        let neg = to_extended(f64::NEG_INFINITY);
        assert_eq!(neg[0], 0xFF);
        assert_eq!(from_extended(&neg), f64::NEG_INFINITY);

        // stable through a second round trip
        assert_eq!(to_extended(from_extended(&inf)), inf);
    }

    #[test]
    fn test_frexp() {
        assert_eq!(frexp(1.0), (0.5, 1));
        assert_eq!(frexp(44100.0).1, 16);
        let (fraction, exp) = frexp(f64::MIN_POSITIVE / 4.0);
        assert_eq!(fraction, 0.5);
        assert_eq!(exp, -1023);
    }
}
