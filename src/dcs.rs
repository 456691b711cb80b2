//! The Data Coding Scheme octet (spec §3, SPEC_FULL §4.13), grouped per
//! 3GPP TS 23.038 §4. Structurally grounded on
//! `examples/other_examples/..._iainh-smpp__src-datatypes-data_coding.rs.rs`'s
//! `DataCoding` (group dispatch + derived-property accessors), adapted from
//! SMPP's single flat byte space to the real 3GPP group layout.

use crate::error::FieldError;

/// Text alphabet a DCS selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alphabet {
    Bit7,
    Bit8,
    Ucs2,
}

/// `TP-DCS` message class, when the DCS carries one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageClass {
    Class0,
    Class1,
    Class2,
    Class3,
    Unknown,
}

/// A single Data Coding Scheme octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dcs(pub u8);

impl Dcs {
    pub fn new(byte: u8) -> Self {
        Dcs(byte)
    }

    /// GSM7 default alphabet, no class, uncompressed: the common case.
    pub fn default_7bit() -> Self {
        Dcs(0x00)
    }

    pub fn ucs2() -> Self {
        Dcs(0x08)
    }

    pub fn bit8() -> Self {
        Dcs(0x04)
    }

    fn group(self) -> u8 {
        self.0 >> 4
    }

    pub fn alphabet(self) -> Result<Alphabet, FieldError> {
        match self.group() {
            0x0..=0x3 => match (self.0 >> 2) & 0b11 {
                0b00 => Ok(Alphabet::Bit7),
                0b01 => Ok(Alphabet::Bit8),
                0b10 => Ok(Alphabet::Ucs2),
                _ => Err(FieldError::Invalid),
            },
            0x4..=0xb => Err(FieldError::Invalid),
            0xc | 0xd => Ok(Alphabet::Bit7),
            0xe => Ok(Alphabet::Ucs2),
            0xf => {
                if self.0 & 0x04 != 0 {
                    Ok(Alphabet::Bit8)
                } else {
                    Ok(Alphabet::Bit7)
                }
            }
            _ => unreachable!(),
        }
    }

    pub fn compressed(self) -> bool {
        matches!(self.group(), 0x0..=0x3) && self.0 & 0x20 != 0
    }

    pub fn message_class(self) -> MessageClass {
        match self.group() {
            0x0..=0x3 => {
                if self.0 & 0x10 != 0 {
                    class_from_bits(self.0 & 0b11)
                } else {
                    MessageClass::Unknown
                }
            }
            0xf => class_from_bits(self.0 & 0b11),
            _ => MessageClass::Unknown,
        }
    }
}

fn class_from_bits(bits: u8) -> MessageClass {
    match bits {
        0 => MessageClass::Class0,
        1 => MessageClass::Class1,
        2 => MessageClass::Class2,
        3 => MessageClass::Class3,
        _ => MessageClass::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_7bit_no_class() {
        let dcs = Dcs::default_7bit();
        assert_eq!(dcs.alphabet().unwrap(), Alphabet::Bit7);
        assert_eq!(dcs.message_class(), MessageClass::Unknown);
        assert!(!dcs.compressed());
    }

    #[test]
    fn ucs2_constant() {
        assert_eq!(Dcs::ucs2().alphabet().unwrap(), Alphabet::Ucs2);
    }

    #[test]
    fn reserved_group_is_invalid() {
        assert_eq!(Dcs(0x90).alphabet(), Err(FieldError::Invalid));
    }

    #[test]
    fn group_1111_selects_alphabet_by_bit_2() {
        assert_eq!(Dcs(0xf0).alphabet().unwrap(), Alphabet::Bit7);
        assert_eq!(Dcs(0xf4).alphabet().unwrap(), Alphabet::Bit8);
        assert_eq!(Dcs(0xf0).message_class(), MessageClass::Class0);
        assert_eq!(Dcs(0xf2).message_class(), MessageClass::Class2);
    }

    #[test]
    fn general_group_with_class_bit_set() {
        let dcs = Dcs(0x11); // general group, class indicator set, class 1
        assert_eq!(dcs.message_class(), MessageClass::Class1);
        assert_eq!(dcs.alphabet().unwrap(), Alphabet::Bit7);
    }

    #[test]
    fn compressed_flag_only_applies_to_general_group() {
        assert!(Dcs(0x20).compressed());
        assert!(!Dcs(0xf0).compressed());
    }
}
