//! TP address codec: type-of-address byte plus digits or an alphanumeric
//! GSM7 label (spec §4.4).

use crate::codec::gsm7;
use crate::codec::gsm7::pack;
use crate::codec::semi_octet;
use crate::error::FieldError;

/// Type-of-number value for an alphanumeric address (a GSM7 label rather
/// than digits).
pub const TON_ALPHANUMERIC: u8 = 5;
pub const TON_INTERNATIONAL: u8 = 1;
pub const TON_UNKNOWN: u8 = 0;
pub const NPI_ISDN: u8 = 1;
pub const NPI_UNKNOWN: u8 = 0;

/// A TP address: originating, destination, or recipient (spec §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub ton: u8,
    pub npi: u8,
    pub addr: String,
}

impl Address {
    pub fn new(ton: u8, npi: u8, addr: impl Into<String>) -> Self {
        Address { ton, npi, addr: addr.into() }
    }

    /// An international (E.164) numeric address. `addr` should not include
    /// a leading `+`; it is presentational only (spec §4.4).
    pub fn international(addr: impl Into<String>) -> Self {
        Address::new(TON_INTERNATIONAL, NPI_ISDN, addr)
    }

    /// An alphanumeric (GSM7 label) address, e.g. a sender name.
    pub fn alphanumeric(addr: impl Into<String>) -> Self {
        Address::new(TON_ALPHANUMERIC, NPI_UNKNOWN, addr)
    }

    pub fn is_alphanumeric(&self) -> bool {
        self.ton == TON_ALPHANUMERIC
    }

    /// The type-of-address octet: bit 7 always set, TON at bits 6..4, NPI
    /// at bits 3..0.
    pub fn toa(&self) -> u8 {
        0x80 | ((self.ton & 0b111) << 4) | (self.npi & 0b1111)
    }

    /// Renders with a leading `+` for international numeric addresses
    /// (spec §4.4: the `+` is presentational only, never part of `addr`).
    pub fn display(&self) -> String {
        if self.ton == TON_INTERNATIONAL && !self.is_alphanumeric() {
            format!("+{}", self.addr)
        } else {
            self.addr.clone()
        }
    }

    /// Serializes `[length, toa, data...]`.
    pub fn encode(&self) -> Result<Vec<u8>, FieldError> {
        let mut out = Vec::new();
        if self.is_alphanumeric() {
            let septets = gsm7::encode(&self.addr, None, None)?;
            let n_septets = septets.len();
            let length_octet = ((7 * n_septets + 3) / 4) as u8;
            out.push(length_octet);
            out.push(self.toa());
            out.extend(pack::pack(&septets, 0));
        } else {
            let length_octet = self.addr.chars().count() as u8;
            out.push(length_octet);
            out.push(self.toa());
            out.extend(semi_octet::encode(&self.addr)?);
        }
        Ok(out)
    }

    /// Deserializes `[length, toa, data...]`, returning the address and the
    /// number of bytes consumed.
    pub fn decode(bytes: &[u8]) -> Result<(Address, usize), FieldError> {
        if bytes.len() < 2 {
            return Err(FieldError::Underflow);
        }
        let length_octet = bytes[0];
        let toa = bytes[1];
        let ton = (toa >> 4) & 0b111;
        let npi = toa & 0b1111;
        let rest = &bytes[2..];

        if ton == TON_ALPHANUMERIC {
            let n_octets = (length_octet as usize + 1) / 2;
            if rest.len() < n_octets {
                return Err(FieldError::Underflow);
            }
            let mut septets = pack::unpack(&rest[..n_octets], 0);
            let n_septets_expected = (length_octet as usize * 4) / 7;
            if septets.len() > n_septets_expected {
                septets.truncate(n_septets_expected);
            }
            let addr = gsm7::decode(&septets, None, None, true)?;
            Ok((Address { ton, npi, addr }, 2 + n_octets))
        } else {
            let n_digits = length_octet as usize;
            let n_octets = (n_digits + 1) / 2;
            if rest.len() < n_octets {
                return Err(FieldError::Underflow);
            }
            let addr = semi_octet::decode(&rest[..n_octets])?;
            if addr.chars().count() != n_digits {
                return Err(FieldError::MissingFill);
            }
            Ok((Address { ton, npi, addr }, 2 + n_octets))
        }
    }
}
