//! Splits a UTF-8 message across multiple TPDUs, inserting a
//! concatenation IE and respecting escape-pair/surrogate-pair boundaries
//! (spec §4.10).

use crate::codec::gsm7::{self, tables::NationalLanguage};
use crate::codec::ucs2;
use crate::dcs::Alphabet;
use crate::error::{EncodeError, FieldError};
use crate::tpdu::{ud_block_size, Tpdu};
use crate::udh::{InformationElement, UserDataHeader, IE_CONCAT_16BIT, IE_CONCAT_8BIT};
use crate::userdata::UserData;
use std::sync::atomic::{AtomicU16, AtomicU8, Ordering};

/// Process-wide monotonic sources for `TP-MR` and the concatenation
/// reference, incremented atomically so concurrent `encode` calls never
/// collide (spec §5, §9).
#[derive(Debug, Default)]
pub struct Counters {
    mr: AtomicU8,
    concat_ref_8: AtomicU8,
    concat_ref_16: AtomicU16,
}

impl Counters {
    pub fn new() -> Self {
        Counters::default()
    }

    pub fn next_mr(&self) -> u8 {
        self.mr.fetch_add(1, Ordering::SeqCst)
    }

    fn next_concat_ref(&self, wide: bool) -> u16 {
        if wide {
            self.concat_ref_16.fetch_add(1, Ordering::SeqCst)
        } else {
            self.concat_ref_8.fetch_add(1, Ordering::SeqCst) as u16
        }
    }
}

/// Knobs for a single `segment` call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentOptions {
    /// Use the 16-bit concatenation IE instead of the 8-bit one.
    pub wide_concat_ref: bool,
    pub locking: Option<NationalLanguage>,
    pub shift: Option<NationalLanguage>,
}

fn mti_uses_mr(sms_type: crate::tpdu::SmsType) -> bool {
    use crate::tpdu::SmsType::*;
    matches!(sms_type, Submit | Command | StatusReport)
}

/// Septet-equivalent length a UDH of `udh_octets` occupies once padded to
/// a septet boundary (spec §4.7's fill-bit formula, reused here to budget
/// chunk sizes around the header).
fn udh_septets(udh_octets: usize) -> usize {
    let fill_bits = (7 - (udh_octets % 7)) % 7;
    (udh_octets * 8 + fill_bits) / 7
}

fn alphabet_of(template: &Tpdu) -> Result<Alphabet, EncodeError> {
    template
        .dcs
        .ok_or_else(|| EncodeError::new("dcs", FieldError::Invalid))?
        .alphabet()
        .map_err(|e| EncodeError::new("dcs", e))
}

/// Encodes `msg` into the alphabet's body units: septets for `Bit7`, raw
/// bytes for `Bit8`, UCS-2 big-endian code units for `Ucs2`.
fn encode_body(msg: &str, alphabet: Alphabet, opts: &SegmentOptions) -> Result<Vec<u8>, EncodeError> {
    match alphabet {
        Alphabet::Bit7 => gsm7::encode(msg, opts.locking, opts.shift).map_err(|e| EncodeError::new("ud", e)),
        Alphabet::Bit8 => Ok(msg.as_bytes().to_vec()),
        Alphabet::Ucs2 => Ok(ucs2::encode(msg)),
    }
}

/// Splits `body` (in alphabet-specific units) into chunks of at most
/// `budget` units, honoring the no-escape-split / no-surrogate-split
/// rules (spec §4.10 step 5).
fn chunk(body: &[u8], alphabet: Alphabet, budget: usize) -> Vec<Vec<u8>> {
    if budget == 0 || body.is_empty() {
        return vec![];
    }
    let mut chunks = Vec::new();
    let mut start = 0usize;
    while start < body.len() {
        let mut end = (start + budget).min(body.len());
        match alphabet {
            Alphabet::Bit7 => {
                if end < body.len() && end > start && body[end - 1] == gsm7::tables::ESC {
                    let escape_is_paired = end >= 2 && body[end - 2] == gsm7::tables::ESC;
                    if !escape_is_paired {
                        end -= 1;
                    }
                }
            }
            Alphabet::Ucs2 => {
                let budget_units = budget & !1; // round down to even octets
                end = (start + budget_units).min(body.len());
                if end < body.len() && end >= start + 2 {
                    let hi = body[end - 2];
                    if (0xd8..=0xdb).contains(&hi) {
                        end -= 2;
                    }
                }
            }
            Alphabet::Bit8 => {}
        }
        if end <= start {
            end = (start + 1).min(body.len());
        }
        chunks.push(body[start..end].to_vec());
        start = end;
    }
    chunks
}

/// Splits `msg` across TPDUs cloned from `template`, per spec §4.10.
/// Returns an empty sequence for an empty message.
pub fn segment(
    msg: &str,
    template: &Tpdu,
    counters: &Counters,
    options: &SegmentOptions,
) -> Result<Vec<Tpdu>, EncodeError> {
    if msg.is_empty() {
        return Ok(vec![]);
    }

    let alphabet = alphabet_of(template)?;
    let body = encode_body(msg, alphabet, options)?;
    let block_size = ud_block_size(template.sms_type, false);
    let septet_budget = block_size * 8 / 7;
    let template_udh_octets = template.ud.as_ref().map(|u| u.header.encode().len()).unwrap_or(0);

    let no_concat_budget = match alphabet {
        Alphabet::Bit7 => septet_budget.saturating_sub(udh_septets(template_udh_octets)),
        Alphabet::Bit8 | Alphabet::Ucs2 => block_size.saturating_sub(template_udh_octets),
    };

    if body.len() <= no_concat_budget {
        let mut tpdu = template.clone();
        if mti_uses_mr(tpdu.sms_type) {
            tpdu.mr = Some(counters.next_mr());
        }
        let header = tpdu.ud.as_ref().map(|u| u.header.clone()).unwrap_or_default();
        tpdu.ud = Some(UserData { header, alphabet, body });
        return Ok(vec![tpdu]);
    }

    let concat_overhead_octets = if options.wide_concat_ref { 6 } else { 5 };
    let concat_budget = match alphabet {
        Alphabet::Bit7 => {
            septet_budget.saturating_sub(udh_septets(template_udh_octets + concat_overhead_octets))
        }
        Alphabet::Bit8 | Alphabet::Ucs2 => {
            block_size.saturating_sub(template_udh_octets + concat_overhead_octets)
        }
    };

    let chunks = chunk(&body, alphabet, concat_budget);
    let total = chunks.len() as u8;
    let reference = counters.next_concat_ref(options.wide_concat_ref);

    let mut out = Vec::with_capacity(chunks.len());
    for (i, piece) in chunks.into_iter().enumerate() {
        let mut tpdu = template.clone();
        if mti_uses_mr(tpdu.sms_type) {
            tpdu.mr = Some(counters.next_mr());
        }
        let mut header = tpdu.ud.as_ref().map(|u| u.header.clone()).unwrap_or_default();
        let concat_ie = if options.wide_concat_ref {
            InformationElement::new(
                IE_CONCAT_16BIT,
                vec![(reference >> 8) as u8, reference as u8, total, (i + 1) as u8],
            )
        } else {
            InformationElement::new(IE_CONCAT_8BIT, vec![reference as u8, total, (i + 1) as u8])
        };
        header.push(concat_ie);
        tpdu.ud = Some(UserData { header, alphabet, body: piece });
        out.push(tpdu);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use crate::dcs::Dcs;
    use crate::tpdu::SmsType;
    use crate::udh::UserDataHeader;

    fn submit_template() -> Tpdu {
        Tpdu {
            da: Some(Address::international("12345")),
            pid: Some(0),
            dcs: Some(Dcs::default_7bit()),
            ud: Some(UserData { header: UserDataHeader::new(), alphabet: Alphabet::Bit7, body: vec![] }),
            ..template_base()
        }
    }

    fn template_base() -> Tpdu {
        // Build via decode of a minimal valid Submit so every field has a value.
        let (t, _) = Tpdu::decode(&[0x01, 0x00, 0x05, 0x91, 0x21, 0x43, 0xf5, 0x00, 0x00, 0x00], crate::tpdu::Direction::Mo).unwrap();
        let _ = SmsType::Submit;
        t
    }

    #[test]
    fn empty_message_yields_no_segments() {
        let counters = Counters::new();
        let segments = segment("", &submit_template(), &counters, &SegmentOptions::default()).unwrap();
        assert!(segments.is_empty());
    }

    #[test]
    fn short_message_is_a_single_segment() {
        let counters = Counters::new();
        let segments = segment("Hello world", &submit_template(), &counters, &SegmentOptions::default()).unwrap();
        assert_eq!(segments.len(), 1);
        assert!(segments[0].ud.as_ref().unwrap().header.is_empty());
    }

    #[test]
    fn long_message_is_split_with_concat_ie() {
        let counters = Counters::new();
        let long: String = std::iter::repeat('a').take(400).collect();
        let segments = segment(&long, &submit_template(), &counters, &SegmentOptions::default()).unwrap();
        assert!(segments.len() > 1);
        for (i, s) in segments.iter().enumerate() {
            let info = s.ud.as_ref().unwrap().header.concat_info().unwrap();
            assert_eq!(info.total as usize, segments.len());
            assert_eq!(info.seqno as usize, i + 1);
        }
    }

    #[test]
    fn escape_pairs_are_not_split() {
        let counters = Counters::new();
        // Force a tiny budget by using a STATUS-REPORT-sized UD block is
        // impractical here; instead verify the chunker helper directly.
        let body = vec![0x41, gsm7::tables::ESC, 0x65, 0x42]; // A ESC(euro) B
        let chunks = chunk(&body, Alphabet::Bit7, 2);
        for c in &chunks[..chunks.len() - 1] {
            if *c.last().unwrap() == gsm7::tables::ESC {
                panic!("chunk ends in unpaired ESC: {:?}", c);
            }
        }
    }
}
