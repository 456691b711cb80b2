//! Option-driven entry points: `encode`, `unmarshal`, `collect`, `decode`
//! (spec §6). Everything here is built from the lower layers — there is
//! no additional wire logic in this module.

use crate::address::Address;
use crate::codec::gsm7::{self, tables::NationalLanguage};
use crate::codec::ucs2;
use crate::collector::Collector;
use crate::dcs::{Alphabet, Dcs};
use crate::error::{CollectorError, DecodeError, EncodeError, FieldError};
use crate::segment::{self, Counters, SegmentOptions};
use crate::tpdu::{Direction, SmsType, Tpdu};
use crate::udh::{InformationElement, IE_NLI_LOCKING, IE_NLI_SHIFT};
use crate::userdata::UserData;
use chrono::{FixedOffset, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EncodeAs {
    Submit,
    Deliver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ForcedAlphabet {
    Auto,
    Bit8,
    Ucs2,
}

/// Builder for [`encode`]. Mirrors the façade option set in spec §6.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    as_type: EncodeAs,
    alphabet: ForcedAlphabet,
    to: Option<String>,
    from: Option<String>,
    locking_charsets: Vec<NationalLanguage>,
    shift_charsets: Vec<NationalLanguage>,
    template: Option<Tpdu>,
    wide_concat_ref: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            as_type: EncodeAs::Submit,
            alphabet: ForcedAlphabet::Auto,
            to: None,
            from: None,
            locking_charsets: Vec::new(),
            shift_charsets: Vec::new(),
            template: None,
            wide_concat_ref: false,
        }
    }
}

impl EncodeOptions {
    pub fn new() -> Self {
        EncodeOptions::default()
    }

    pub fn as_submit(mut self) -> Self {
        self.as_type = EncodeAs::Submit;
        self
    }

    pub fn as_deliver(mut self) -> Self {
        self.as_type = EncodeAs::Deliver;
        self
    }

    pub fn as_8bit(mut self) -> Self {
        self.alphabet = ForcedAlphabet::Bit8;
        self
    }

    pub fn as_ucs2(mut self) -> Self {
        self.alphabet = ForcedAlphabet::Ucs2;
        self
    }

    pub fn to(mut self, number: impl Into<String>) -> Self {
        self.to = Some(number.into());
        self
    }

    pub fn from(mut self, number: impl Into<String>) -> Self {
        self.from = Some(number.into());
        self
    }

    pub fn with_charset(mut self, nli: NationalLanguage) -> Self {
        self.locking_charsets.push(nli);
        self
    }

    pub fn with_locking_charset(mut self, nli: NationalLanguage) -> Self {
        self.locking_charsets.push(nli);
        self
    }

    pub fn with_shift_charset(mut self, nli: NationalLanguage) -> Self {
        self.shift_charsets.push(nli);
        self
    }

    pub fn with_all_charsets(mut self) -> Self {
        self.locking_charsets = NationalLanguage::ALL.to_vec();
        self.shift_charsets = NationalLanguage::ALL.to_vec();
        self
    }

    pub fn with_template(mut self, tpdu: Tpdu) -> Self {
        self.template = Some(tpdu);
        self
    }

    pub fn with_wide_concat_ref(mut self) -> Self {
        self.wide_concat_ref = true;
        self
    }
}

/// Tries the default table, then each enabled locking table, then each
/// enabled shift table; falls back to UCS-2 (spec §4.7's auto-alphabet
/// selection, operating on the whole message for stability — spec §9).
fn select_alphabet(
    message: &str,
    options: &EncodeOptions,
) -> (Dcs, Option<NationalLanguage>, Option<NationalLanguage>) {
    match options.alphabet {
        ForcedAlphabet::Bit8 => return (Dcs::bit8(), None, None),
        ForcedAlphabet::Ucs2 => return (Dcs::ucs2(), None, None),
        ForcedAlphabet::Auto => {}
    }
    if gsm7::encode(message, None, None).is_ok() {
        return (Dcs::default_7bit(), None, None);
    }
    for &nli in &options.locking_charsets {
        if gsm7::encode(message, Some(nli), None).is_ok() {
            return (Dcs::default_7bit(), Some(nli), None);
        }
    }
    for &nli in &options.shift_charsets {
        if gsm7::encode(message, None, Some(nli)).is_ok() {
            return (Dcs::default_7bit(), None, Some(nli));
        }
    }
    (Dcs::ucs2(), None, None)
}

fn default_template(options: &EncodeOptions) -> Result<Tpdu, EncodeError> {
    match options.as_type {
        EncodeAs::Submit => {
            let mut t = Tpdu::blank(SmsType::Submit);
            let to = options.to.as_deref().unwrap_or("");
            t.da = Some(Address::international(to));
            t.pid = Some(0);
            Ok(t)
        }
        EncodeAs::Deliver => {
            let mut t = Tpdu::blank(SmsType::Deliver);
            let from = options.from.as_deref().unwrap_or("");
            t.oa = Some(Address::international(from));
            t.pid = Some(0);
            let now = Utc::now().with_timezone(&FixedOffset::east_opt(0).unwrap());
            t.scts = Some(crate::timestamp::Timestamp::from_datetime(now));
            Ok(t)
        }
    }
}

/// Builds TPDUs for `message`, selecting an alphabet and segmenting as
/// needed (spec §6).
pub fn encode(message: &str, options: &EncodeOptions, counters: &Counters) -> Result<Vec<Tpdu>, EncodeError> {
    let (dcs, locking, shift) = select_alphabet(message, options);
    let mut template = match &options.template {
        Some(t) => t.clone(),
        None => default_template(options)?,
    };
    template.dcs = Some(dcs);

    let mut header = template.ud.as_ref().map(|u| u.header.clone()).unwrap_or_default();
    if let Some(nli) = locking {
        header.push(InformationElement::new(IE_NLI_LOCKING, vec![nli.nli()]));
    }
    if let Some(nli) = shift {
        header.push(InformationElement::new(IE_NLI_SHIFT, vec![nli.nli()]));
    }
    template.udhi = !header.is_empty();
    let alphabet = dcs.alphabet().map_err(|e| EncodeError::new("dcs", e))?;
    template.ud = Some(UserData { header, alphabet, body: Vec::new() });

    segment::segment(message, &template, counters, &SegmentOptions { wide_concat_ref: options.wide_concat_ref, locking, shift })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnmarshalOptions {
    pub direction: Direction,
}

impl Default for UnmarshalOptions {
    fn default() -> Self {
        UnmarshalOptions { direction: Direction::Mt }
    }
}

/// Parses one TPDU (spec §6). Returns only the TPDU; byte offset is
/// available via [`Tpdu::decode`] directly if a caller needs it.
pub fn unmarshal(bytes: &[u8], options: &UnmarshalOptions) -> Result<Tpdu, DecodeError> {
    Tpdu::decode(bytes, options.direction).map(|(t, _)| t)
}

/// Feeds `tpdu` through `collector` (spec §6). A thin pass-through —
/// reassembly timeout and expiry handling are configured on the
/// `Collector` itself (spec §5's `WithReassemblyTimeout`).
pub fn collect(collector: &Collector, tpdu: Tpdu) -> Result<Option<Vec<Tpdu>>, CollectorError> {
    collector.collect(tpdu)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    pub locking: Option<NationalLanguage>,
    pub shift: Option<NationalLanguage>,
}

/// Reassembles `segments` (already in seqno order) into a UTF-8 string
/// (spec §6).
pub fn decode(segments: &[Tpdu], options: &DecodeOptions) -> Result<String, FieldError> {
    let alphabet = segments
        .first()
        .and_then(|t| t.dcs)
        .map(Dcs::alphabet)
        .transpose()?
        .unwrap_or(Alphabet::Bit7);

    match alphabet {
        Alphabet::Bit7 => {
            let mut out = String::new();
            for t in segments {
                let ud = t.ud.as_ref().ok_or(FieldError::Invalid)?;
                out.push_str(&gsm7::decode(&ud.body, options.locking, options.shift, false)?);
            }
            Ok(out)
        }
        Alphabet::Ucs2 => {
            let bodies: Vec<&[u8]> = segments
                .iter()
                .map(|t| t.ud.as_ref().map(|u| u.body.as_slice()).unwrap_or(&[]))
                .collect();
            ucs2::concatenate(bodies)
        }
        Alphabet::Bit8 => {
            let mut bytes = Vec::new();
            for t in segments {
                let ud = t.ud.as_ref().ok_or(FieldError::Invalid)?;
                bytes.extend_from_slice(&ud.body);
            }
            String::from_utf8(bytes).map_err(|_| FieldError::Invalid)
        }
    }
}
