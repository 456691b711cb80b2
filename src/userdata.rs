//! User Data: a length-prefixed body carrying an optional UDH plus
//! alphabet-dependent payload (spec §4.7).

use crate::codec::gsm7::pack;
use crate::dcs::Alphabet;
use crate::error::FieldError;
use crate::udh::UserDataHeader;

/// A decoded/to-be-encoded UD block. `body` holds the payload in its
/// pre-text form: one septet per byte (low 7 bits) for `Bit7`, raw octets
/// for `Bit8`, and big-endian UTF-16 code units for `Ucs2`. Converting to
/// and from actual text is the caller's job (auto-alphabet selection and
/// GSM7/UCS-2 codecs live a layer up, per §4.7's last paragraph).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserData {
    pub header: UserDataHeader,
    pub alphabet: Alphabet,
    pub body: Vec<u8>,
}

/// Septet-equivalent length of `udh_octets` once padded to a septet
/// boundary, and the fill-bit count used to get there (spec §4.7).
fn udh_fill(udh_octets: usize) -> (usize, u8) {
    let fill_bits = ((7 - (udh_octets % 7)) % 7) as u8;
    (((udh_octets * 8) + fill_bits as usize) / 7, fill_bits)
}

impl UserData {
    pub fn encode(&self) -> Result<Vec<u8>, FieldError> {
        let udh_bytes = if self.header.is_empty() { Vec::new() } else { self.header.encode() };
        let udh_octets = udh_bytes.len();

        match self.alphabet {
            Alphabet::Bit7 => {
                let (udh_septets, fill_bits) = udh_fill(udh_octets);
                let packed = pack::pack(&self.body, fill_bits);
                let udl = self.body.len() + udh_septets;
                let mut out = Vec::with_capacity(1 + udh_bytes.len() + packed.len());
                out.push(udl as u8);
                out.extend_from_slice(&udh_bytes);
                out.extend_from_slice(&packed);
                Ok(out)
            }
            Alphabet::Bit8 | Alphabet::Ucs2 => {
                if self.alphabet == Alphabet::Ucs2 && self.body.len() % 2 != 0 {
                    return Err(FieldError::OddUcs2Length);
                }
                let udl = udh_octets + self.body.len();
                let mut out = Vec::with_capacity(1 + udh_bytes.len() + self.body.len());
                out.push(udl as u8);
                out.extend_from_slice(&udh_bytes);
                out.extend_from_slice(&self.body);
                Ok(out)
            }
        }
    }

    /// Decodes a UD block, returning it and the number of bytes consumed.
    pub fn decode(alphabet: Alphabet, udhi: bool, bytes: &[u8]) -> Result<(UserData, usize), FieldError> {
        if bytes.is_empty() {
            return Err(FieldError::Underflow);
        }
        let udl = bytes[0] as usize;
        let rest = &bytes[1..];

        let (header, header_consumed) =
            if udhi { UserDataHeader::decode(rest)? } else { (UserDataHeader::new(), 0) };
        let udh_octets = header_consumed;
        let body_bytes = &rest[header_consumed..];

        match alphabet {
            Alphabet::Bit7 => {
                let (udh_septets, fill_bits) = udh_fill(udh_octets);
                let body_septets = udl.checked_sub(udh_septets).ok_or(FieldError::Invalid)?;
                let expected_octets = pack::packed_octets(body_septets, fill_bits);
                if body_bytes.len() < expected_octets {
                    return Err(FieldError::Underflow);
                }
                if body_bytes.len() > expected_octets {
                    return Err(FieldError::Overlength);
                }
                let mut septets = pack::unpack(body_bytes, fill_bits);
                if septets.len() < body_septets {
                    return Err(FieldError::Underflow);
                }
                septets.truncate(body_septets);
                let consumed = 1 + header_consumed + expected_octets;
                Ok((UserData { header, alphabet, body: septets }, consumed))
            }
            Alphabet::Bit8 | Alphabet::Ucs2 => {
                let payload_octets = udl.checked_sub(udh_octets).ok_or(FieldError::Invalid)?;
                if alphabet == Alphabet::Ucs2 && payload_octets % 2 != 0 {
                    return Err(FieldError::OddUcs2Length);
                }
                if body_bytes.len() < payload_octets {
                    return Err(FieldError::Underflow);
                }
                if body_bytes.len() > payload_octets {
                    return Err(FieldError::Overlength);
                }
                let consumed = 1 + header_consumed + payload_octets;
                Ok((UserData { header, alphabet, body: body_bytes[..payload_octets].to_vec() }, consumed))
            }
        }
    }
}
