//! Binary-coded decimal octets, including the signed quarter-hour timezone
//! encoding used by `TP-SCTS`/`TP-DT` (spec §4.1).
//!
//! Wire order is nibble-swapped, the same convention the semi-octet digit
//! codec uses for addresses: the tens digit occupies the low nibble (it is
//! the first semi-octet transmitted), the units digit the high nibble. This
//! is what the worked timestamp example in spec §8 requires (`0x81` decodes
//! to year 18, not 81) even though it reads against a literal "high nibble
//! is n/10" phrasing of the rule.

use crate::error::FieldError;

/// Encodes `0 ≤ n ≤ 99` as a nibble-swapped BCD octet.
pub fn encode_bcd(n: u8) -> Result<u8, FieldError> {
    if n > 99 {
        return Err(FieldError::InvalidInteger(n as i32));
    }
    let tens = n / 10;
    let units = n % 10;
    Ok((units << 4) | tens)
}

/// Decodes a nibble-swapped BCD octet back to `0..=99`. Fails if either
/// nibble exceeds 9.
pub fn decode_bcd(b: u8) -> Result<u8, FieldError> {
    let tens = b & 0x0f;
    let units = b >> 4;
    if tens > 9 || units > 9 {
        return Err(FieldError::InvalidOctet(b));
    }
    Ok(tens * 10 + units)
}

/// Encodes a signed quarter-hour timezone. The sign bit lives in bit 3 of
/// the tens-digit (low) nibble, which TS 23.040's valid timezone range
/// (`-48..=48`) never otherwise sets, so it cannot collide with a real
/// digit. `n` must be in `-99..=99`.
pub fn encode_signed_bcd(n: i32) -> Result<u8, FieldError> {
    if !(-99..=99).contains(&n) {
        return Err(FieldError::InvalidInteger(n));
    }
    let mag = n.unsigned_abs() as u8;
    let mut b = encode_bcd(mag)?;
    if n < 0 {
        b |= 0x08;
    }
    Ok(b)
}

/// Decodes a signed BCD octet back to `-99..=99`.
pub fn decode_signed_bcd(b: u8) -> Result<i32, FieldError> {
    let negative = b & 0x08 != 0;
    let magnitude_octet = b & !0x08;
    let mag = decode_bcd(magnitude_octet)? as i32;
    Ok(if negative { -mag } else { mag })
}
