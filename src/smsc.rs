//! The PDU-mode SMSC-address prefix a modem wraps around a TPDU. This is
//! a thin adapter, explicitly not part of the TPDU codec itself (spec §6):
//! a length-in-octets byte, a type-of-address byte, and semi-octet digits,
//! near-identical to [`crate::address::Address`] but with the leading
//! length counting total octets rather than digits.

use crate::codec::semi_octet;
use crate::error::FieldError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Smsc {
    pub ton: u8,
    pub npi: u8,
    pub addr: String,
}

impl Smsc {
    pub fn new(ton: u8, npi: u8, addr: impl Into<String>) -> Self {
        Smsc { ton, npi, addr: addr.into() }
    }

    pub fn international(addr: impl Into<String>) -> Self {
        Smsc::new(crate::address::TON_INTERNATIONAL, crate::address::NPI_ISDN, addr)
    }

    fn toa(&self) -> u8 {
        0x80 | ((self.ton & 0b111) << 4) | (self.npi & 0b1111)
    }

    pub fn encode(&self) -> Result<Vec<u8>, FieldError> {
        if self.addr.is_empty() {
            return Ok(vec![0x00]);
        }
        let digits = semi_octet::encode(&self.addr)?;
        let octets = 1 + digits.len();
        let mut out = Vec::with_capacity(1 + octets);
        out.push(octets as u8);
        out.push(self.toa());
        out.extend(digits);
        Ok(out)
    }

    /// Decodes the prefix, returning it and the number of bytes consumed
    /// (including the leading length octet).
    pub fn decode(bytes: &[u8]) -> Result<(Smsc, usize), FieldError> {
        if bytes.is_empty() {
            return Err(FieldError::Underflow);
        }
        let octets = bytes[0] as usize;
        if octets == 0 {
            return Ok((Smsc::new(0, 0, ""), 1));
        }
        if bytes.len() < 1 + octets {
            return Err(FieldError::Underflow);
        }
        let toa = bytes[1];
        let ton = (toa >> 4) & 0b111;
        let npi = toa & 0b1111;
        let digit_bytes = octets - 1;
        let addr = semi_octet::decode(&bytes[2..2 + digit_bytes])?;
        Ok((Smsc { ton, npi, addr }, 1 + octets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_scenario_2_prefix() {
        let bytes = [0x07, 0x91, 0x16, 0x14, 0x22, 0x09, 0x91, 0xf1];
        let (smsc, consumed) = Smsc::decode(&bytes).unwrap();
        assert_eq!(consumed, 8);
        assert_eq!(smsc.addr, "61412290191");
    }

    #[test]
    fn empty_prefix_round_trips() {
        let smsc = Smsc::new(0, 0, "");
        let bytes = smsc.encode().unwrap();
        assert_eq!(bytes, vec![0x00]);
        let (decoded, consumed) = Smsc::decode(&bytes).unwrap();
        assert_eq!(consumed, 1);
        assert_eq!(decoded.addr, "");
    }

    #[test]
    fn round_trips_international_number() {
        let smsc = Smsc::international("61503975312");
        let bytes = smsc.encode().unwrap();
        let (decoded, consumed) = Smsc::decode(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(decoded.addr, "61503975312");
    }
}
