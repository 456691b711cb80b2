//! `TP-SCTS`/`TP-DT`: a 7-octet BCD timestamp with a signed quarter-hour
//! time zone (spec §4.5).

use crate::codec::bcd;
use crate::error::FieldError;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike};

/// A service-center/discharge timestamp: wall-clock fields to second
/// precision plus a time zone in units of 15 minutes (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// Offset from UTC in 15-minute units, `-48..=48`.
    pub tz_quarter_hours: i32,
}

impl Timestamp {
    pub fn encode(&self) -> Result<[u8; 7], FieldError> {
        let yy = (self.year.rem_euclid(100)) as u8;
        Ok([
            bcd::encode_bcd(yy)?,
            bcd::encode_bcd(self.month)?,
            bcd::encode_bcd(self.day)?,
            bcd::encode_bcd(self.hour)?,
            bcd::encode_bcd(self.minute)?,
            bcd::encode_bcd(self.second)?,
            bcd::encode_signed_bcd(self.tz_quarter_hours)?,
        ])
    }

    /// Decodes 7 octets, returning the timestamp and bytes consumed (7).
    pub fn decode(bytes: &[u8]) -> Result<(Timestamp, usize), FieldError> {
        if bytes.len() < 7 {
            return Err(FieldError::Underflow);
        }
        let yy = bcd::decode_bcd(bytes[0])? as i32;
        // spec §3: years < 70 map to 20xx, else 19xx.
        let year = if yy < 70 { 2000 + yy } else { 1900 + yy };
        let month = bcd::decode_bcd(bytes[1])?;
        let day = bcd::decode_bcd(bytes[2])?;
        let hour = bcd::decode_bcd(bytes[3])?;
        let minute = bcd::decode_bcd(bytes[4])?;
        let second = bcd::decode_bcd(bytes[5])?;
        let tz_quarter_hours = bcd::decode_signed_bcd(bytes[6])?;
        Ok((Timestamp { year, month, day, hour, minute, second, tz_quarter_hours }, 7))
    }

    /// The wall-clock instant as a fixed-offset `chrono` value, if the
    /// fields form a valid calendar date.
    pub fn to_datetime(&self) -> Option<DateTime<FixedOffset>> {
        let date = NaiveDate::from_ymd_opt(self.year, self.month as u32, self.day as u32)?;
        let time = date.and_hms_opt(self.hour as u32, self.minute as u32, self.second as u32)?;
        let offset = FixedOffset::east_opt(self.tz_quarter_hours * 15 * 60)?;
        offset.from_local_datetime(&time).single()
    }

    /// Builds a `Timestamp` from a fixed-offset `chrono` value, rounding
    /// the offset to the nearest whole quarter-hour.
    pub fn from_datetime(dt: DateTime<FixedOffset>) -> Self {
        let naive: NaiveDateTime = dt.naive_local();
        let tz_quarter_hours = dt.offset().local_minus_utc() / (15 * 60);
        Timestamp {
            year: naive.year(),
            month: naive.month() as u8,
            day: naive.day() as u8,
            hour: naive.hour() as u8,
            minute: naive.minute() as u8,
            second: naive.second() as u8,
            tz_quarter_hours,
        }
    }
}
