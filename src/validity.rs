//! `TP-VP`: not-present, relative, absolute, or enhanced validity periods
//! (spec §3, §4.6).

use crate::codec::bcd;
use crate::error::FieldError;
use crate::timestamp::Timestamp;
use chrono::Duration;

const MINUTES_PER_DAY: i64 = 1440;
const MINUTES_PER_WEEK: i64 = MINUTES_PER_DAY * 7;

/// `TP-VPF` values (spec §3): the 2-bit validity-period-format selector in
/// a SUBMIT TPDU's first octet.
pub const VPF_NOT_PRESENT: u8 = 0;
pub const VPF_ENHANCED: u8 = 1;
pub const VPF_RELATIVE: u8 = 2;
pub const VPF_ABSOLUTE: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidityPeriod {
    NotPresent,
    Relative(Duration),
    Absolute(Timestamp),
    Enhanced { efi: u8, validity: EnhancedValidity },
}

/// The payload of an enhanced validity period, selected by `efi & 0x07`
/// (spec §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnhancedValidity {
    NotPresent,
    Relative(Duration),
    Seconds(u8),
    /// BCD `hh mm ss`, unsigned (spec §4.6 subformat 3).
    HourMinSec(u8, u8, u8),
}

impl ValidityPeriod {
    pub fn vpf(&self) -> u8 {
        match self {
            ValidityPeriod::NotPresent => VPF_NOT_PRESENT,
            ValidityPeriod::Enhanced { .. } => VPF_ENHANCED,
            ValidityPeriod::Relative(_) => VPF_RELATIVE,
            ValidityPeriod::Absolute(_) => VPF_ABSOLUTE,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, FieldError> {
        match self {
            ValidityPeriod::NotPresent => Ok(vec![]),
            ValidityPeriod::Relative(d) => Ok(vec![encode_relative(*d)?]),
            ValidityPeriod::Absolute(ts) => Ok(ts.encode()?.to_vec()),
            ValidityPeriod::Enhanced { efi, validity } => {
                let mut payload = [0u8; 6];
                match validity {
                    EnhancedValidity::NotPresent => {}
                    EnhancedValidity::Relative(d) => payload[0] = encode_relative(*d)?,
                    EnhancedValidity::Seconds(s) => payload[0] = *s,
                    EnhancedValidity::HourMinSec(h, m, s) => {
                        payload[0] = bcd::encode_bcd(*h)?;
                        payload[1] = bcd::encode_bcd(*m)?;
                        payload[2] = bcd::encode_bcd(*s)?;
                    }
                }
                let mut out = Vec::with_capacity(7);
                out.push(*efi);
                out.extend_from_slice(&payload);
                Ok(out)
            }
        }
    }

    pub fn decode(vpf: u8, bytes: &[u8]) -> Result<(ValidityPeriod, usize), FieldError> {
        match vpf {
            VPF_NOT_PRESENT => Ok((ValidityPeriod::NotPresent, 0)),
            VPF_RELATIVE => {
                if bytes.is_empty() {
                    return Err(FieldError::Underflow);
                }
                Ok((ValidityPeriod::Relative(decode_relative(bytes[0])), 1))
            }
            VPF_ABSOLUTE => {
                let (ts, n) = Timestamp::decode(bytes)?;
                Ok((ValidityPeriod::Absolute(ts), n))
            }
            VPF_ENHANCED => {
                if bytes.len() < 7 {
                    return Err(FieldError::Underflow);
                }
                let efi = bytes[0];
                let subformat = efi & 0x07;
                let payload = &bytes[1..7];
                let validity = match subformat {
                    0 => {
                        for &b in payload {
                            if b != 0 {
                                return Err(FieldError::NonZero);
                            }
                        }
                        EnhancedValidity::NotPresent
                    }
                    1 => {
                        for &b in &payload[1..] {
                            if b != 0 {
                                return Err(FieldError::NonZero);
                            }
                        }
                        EnhancedValidity::Relative(decode_relative(payload[0]))
                    }
                    2 => {
                        for &b in &payload[1..] {
                            if b != 0 {
                                return Err(FieldError::NonZero);
                            }
                        }
                        EnhancedValidity::Seconds(payload[0])
                    }
                    3 => {
                        for &b in &payload[3..] {
                            if b != 0 {
                                return Err(FieldError::NonZero);
                            }
                        }
                        EnhancedValidity::HourMinSec(
                            bcd::decode_bcd(payload[0])?,
                            bcd::decode_bcd(payload[1])?,
                            bcd::decode_bcd(payload[2])?,
                        )
                    }
                    _ => return Err(FieldError::Invalid),
                };
                Ok((ValidityPeriod::Enhanced { efi, validity }, 7))
            }
            _ => Err(FieldError::Invalid),
        }
    }
}

/// Encodes a duration into the piecewise-linear relative-validity byte
/// (spec §3), picking the coarsest range that contains it.
fn encode_relative(d: Duration) -> Result<u8, FieldError> {
    let minutes = d.num_minutes();
    if minutes <= 0 {
        return Err(FieldError::Invalid);
    }
    if minutes <= 12 * 60 {
        let steps = (minutes + 4) / 5; // ceil to 5-minute steps, 1..=144
        return Ok((steps.clamp(1, 144) - 1) as u8);
    }
    if minutes <= 24 * 60 {
        let extra = minutes - 12 * 60;
        let steps = (extra + 29) / 30; // ceil to 30-minute steps, 1..=24
        return Ok((143 + steps.clamp(1, 24)) as u8);
    }
    let days = (minutes + MINUTES_PER_DAY - 1) / MINUTES_PER_DAY;
    if days >= 2 && days <= 30 {
        return Ok((166 + days) as u8);
    }
    let weeks = (minutes + MINUTES_PER_WEEK - 1) / MINUTES_PER_WEEK;
    if weeks <= 63 {
        return Ok((192 + weeks.max(5)) as u8);
    }
    Err(FieldError::Invalid)
}

/// Decodes the relative-validity byte back to a duration (spec §3's four
/// piecewise ranges).
fn decode_relative(b: u8) -> Duration {
    match b {
        0..=143 => Duration::minutes((b as i64 + 1) * 5),
        144..=167 => Duration::minutes(12 * 60 + (b as i64 - 143) * 30),
        168..=196 => Duration::days(b as i64 - 166),
        197..=255 => Duration::weeks(b as i64 - 192),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_round_trips_five_minute_steps() {
        for minutes in (5..=720).step_by(5) {
            let encoded = encode_relative(Duration::minutes(minutes)).unwrap();
            assert_eq!(decode_relative(encoded), Duration::minutes(minutes));
        }
    }

    #[test]
    fn relative_picks_coarsest_matching_range() {
        assert_eq!(encode_relative(Duration::minutes(5)).unwrap(), 0);
        assert_eq!(encode_relative(Duration::hours(12)).unwrap(), 143);
        assert_eq!(encode_relative(Duration::hours(24)).unwrap(), 167);
        assert_eq!(encode_relative(Duration::days(30)).unwrap(), 196);
    }

    #[test]
    fn vpf_matches_variant() {
        assert_eq!(ValidityPeriod::NotPresent.vpf(), VPF_NOT_PRESENT);
        assert_eq!(ValidityPeriod::Relative(Duration::hours(1)).vpf(), VPF_RELATIVE);
    }

    #[test]
    fn enhanced_seconds_round_trips() {
        let vp = ValidityPeriod::Enhanced { efi: 2, validity: EnhancedValidity::Seconds(30) };
        let bytes = vp.encode().unwrap();
        assert_eq!(bytes.len(), 7);
        let (decoded, n) = ValidityPeriod::decode(VPF_ENHANCED, &bytes).unwrap();
        assert_eq!(n, 7);
        assert_eq!(decoded, vp);
    }

    #[test]
    fn enhanced_nonzero_pad_is_rejected() {
        let mut bytes = [0u8; 7];
        bytes[0] = 2; // seconds subformat
        bytes[1] = 30;
        bytes[2] = 1; // should be zero pad
        assert_eq!(ValidityPeriod::decode(VPF_ENHANCED, &bytes), Err(FieldError::NonZero));
    }

    #[test]
    fn enhanced_reserved_subformat_is_invalid() {
        let mut bytes = [0u8; 7];
        bytes[0] = 5;
        assert_eq!(ValidityPeriod::decode(VPF_ENHANCED, &bytes), Err(FieldError::Invalid));
    }
}
