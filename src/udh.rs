//! User Data Header: an ordered list of Information Elements, bounded by
//! a length octet (spec §4.9).

use crate::error::FieldError;

pub const IE_CONCAT_8BIT: u8 = 0x00;
pub const IE_CONCAT_16BIT: u8 = 0x08;
pub const IE_NLI_LOCKING: u8 = 0x25;
pub const IE_NLI_SHIFT: u8 = 0x24;

/// One `{id, data}` Information Element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InformationElement {
    pub id: u8,
    pub data: Vec<u8>,
}

impl InformationElement {
    pub fn new(id: u8, data: impl Into<Vec<u8>>) -> Self {
        InformationElement { id, data: data.into() }
    }

    fn encoded_len(&self) -> usize {
        2 + self.data.len()
    }
}

/// Concatenation reference, total segment count, and 1-based sequence
/// number carried by a concat IE (spec §3, §4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcatInfo {
    pub reference: u16,
    pub total: u8,
    pub seqno: u8,
    pub wide_reference: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDataHeader {
    pub elements: Vec<InformationElement>,
}

impl UserDataHeader {
    pub fn new() -> Self {
        UserDataHeader::default()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn push(&mut self, ie: InformationElement) {
        self.elements.push(ie);
    }

    /// The last IE with the given id, since later elements override
    /// earlier ones (spec §4.9 — used when a template already carries one).
    pub fn ie(&self, id: u8) -> Option<&InformationElement> {
        self.elements.iter().rev().find(|ie| ie.id == id)
    }

    /// Total encoded size including the leading `udhl` octet.
    pub fn encoded_len(&self) -> usize {
        1 + self.elements.iter().map(InformationElement::encoded_len).sum::<usize>()
    }

    pub fn encode(&self) -> Vec<u8> {
        let udhl = self.elements.iter().map(InformationElement::encoded_len).sum::<usize>() as u8;
        let mut out = Vec::with_capacity(1 + udhl as usize);
        out.push(udhl);
        for ie in &self.elements {
            out.push(ie.id);
            out.push(ie.data.len() as u8);
            out.extend_from_slice(&ie.data);
        }
        out
    }

    /// Decodes a UDH, returning it and the number of bytes consumed
    /// (including the `udhl` octet).
    pub fn decode(bytes: &[u8]) -> Result<(UserDataHeader, usize), FieldError> {
        if bytes.is_empty() {
            return Err(FieldError::Underflow);
        }
        let udhl = bytes[0] as usize;
        if bytes.len() < 1 + udhl {
            return Err(FieldError::Underflow);
        }
        let mut elements = Vec::new();
        let mut pos = 1usize;
        let end = 1 + udhl;
        while pos < end {
            if pos + 2 > end {
                return Err(FieldError::Underflow);
            }
            let id = bytes[pos];
            let iedl = bytes[pos + 1] as usize;
            let data_start = pos + 2;
            let data_end = data_start + iedl;
            if data_end > end {
                return Err(FieldError::Underflow);
            }
            elements.push(InformationElement::new(id, bytes[data_start..data_end].to_vec()));
            pos = data_end;
        }
        Ok((UserDataHeader { elements }, end))
    }

    /// Tries the 8-bit concat IE first, then the 16-bit one; any other
    /// layout is "no concatenation" (spec §4.9).
    pub fn concat_info(&self) -> Option<ConcatInfo> {
        if let Some(ie) = self.ie(IE_CONCAT_8BIT) {
            if ie.data.len() == 3 {
                return Some(ConcatInfo {
                    reference: ie.data[0] as u16,
                    total: ie.data[1],
                    seqno: ie.data[2],
                    wide_reference: false,
                });
            }
        }
        if let Some(ie) = self.ie(IE_CONCAT_16BIT) {
            if ie.data.len() == 4 {
                return Some(ConcatInfo {
                    reference: u16::from_be_bytes([ie.data[0], ie.data[1]]),
                    total: ie.data[2],
                    seqno: ie.data[3],
                    wide_reference: true,
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_two_elements() {
        let mut udh = UserDataHeader::new();
        udh.push(InformationElement::new(IE_CONCAT_8BIT, vec![5, 3, 1]));
        udh.push(InformationElement::new(IE_NLI_LOCKING, vec![13]));
        let bytes = udh.encode();
        let (decoded, consumed) = UserDataHeader::decode(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(decoded, udh);
    }

    #[test]
    fn ie_returns_last_match() {
        let mut udh = UserDataHeader::new();
        udh.push(InformationElement::new(0x70, vec![1]));
        udh.push(InformationElement::new(0x70, vec![2]));
        assert_eq!(udh.ie(0x70).unwrap().data, vec![2]);
    }

    #[test]
    fn concat_info_prefers_8bit() {
        let mut udh = UserDataHeader::new();
        udh.push(InformationElement::new(IE_CONCAT_8BIT, vec![5, 2, 1]));
        let info = udh.concat_info().unwrap();
        assert_eq!(info.reference, 5);
        assert_eq!(info.total, 2);
        assert_eq!(info.seqno, 1);
        assert!(!info.wide_reference);
    }

    #[test]
    fn concat_info_falls_back_to_16bit() {
        let mut udh = UserDataHeader::new();
        udh.push(InformationElement::new(IE_CONCAT_16BIT, vec![0x01, 0x2c, 3, 2]));
        let info = udh.concat_info().unwrap();
        assert_eq!(info.reference, 0x012c);
        assert_eq!(info.total, 3);
        assert_eq!(info.seqno, 2);
        assert!(info.wide_reference);
    }

    #[test]
    fn unrecognized_layout_is_no_concatenation() {
        let mut udh = UserDataHeader::new();
        udh.push(InformationElement::new(IE_CONCAT_8BIT, vec![5, 2]));
        assert_eq!(udh.concat_info(), None);
    }

    #[test]
    fn truncated_ie_is_underflow() {
        assert_eq!(UserDataHeader::decode(&[0x03, 0x00, 0x03, 0x01]), Err(FieldError::Underflow));
    }
}
