//! The TPDU codec: a single union record covering all six SMS-TPDU
//! variants, dispatched on `(MTI, direction)` (spec §3, §4.8).
//!
//! The spec standardizes on the union-record model over a tagged-sum
//! alternative because it is the one exposed by the façade (spec §9).

use crate::address::Address;
use crate::dcs::Dcs;
use crate::error::{DecodeError, EncodeError, FieldError};
use crate::timestamp::Timestamp;
use crate::userdata::UserData;
use crate::validity::ValidityPeriod;

/// Mobile-terminated (arriving at the handset) vs mobile-originated
/// (sent by the handset).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Mt,
    Mo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsType {
    Deliver,
    DeliverReport,
    Submit,
    SubmitReport,
    StatusReport,
    Command,
}

impl SmsType {
    pub fn from_mti_direction(mti: u8, direction: Direction) -> Result<Self, FieldError> {
        use Direction::*;
        use SmsType::*;
        match (mti, direction) {
            (0, Mt) => Ok(Deliver),
            (0, Mo) => Ok(DeliverReport),
            (1, Mt) => Ok(SubmitReport),
            (1, Mo) => Ok(Submit),
            (2, Mt) => Ok(StatusReport),
            (2, Mo) => Ok(Command),
            _ => Err(FieldError::UnsupportedMti(mti)),
        }
    }

    pub fn mti(self) -> u8 {
        match self {
            SmsType::Deliver | SmsType::DeliverReport => 0,
            SmsType::Submit | SmsType::SubmitReport => 1,
            SmsType::StatusReport | SmsType::Command => 2,
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            SmsType::Deliver | SmsType::SubmitReport | SmsType::StatusReport => Direction::Mt,
            SmsType::DeliverReport | SmsType::Submit | SmsType::Command => Direction::Mo,
        }
    }
}

/// PI (parameter-indicator) bits: presence of PID, DCS, and UDL/UD in
/// report TPDUs (spec §3).
pub const PI_PID: u8 = 0x01;
pub const PI_DCS: u8 = 0x02;
pub const PI_UDL: u8 = 0x04;

/// A union record carrying every field any of the six variants use; only
/// the subset relevant to `sms_type` is populated (spec §3, §9).
#[derive(Debug, Clone, PartialEq)]
pub struct Tpdu {
    pub sms_type: SmsType,

    pub udhi: bool,
    pub rp: bool,
    /// DELIVER/STATUS-REPORT "more messages to send".
    pub mms: bool,
    /// DELIVER/STATUS-REPORT loop prevention.
    pub lp: bool,
    /// DELIVER status-report-indication.
    pub sri: bool,
    /// STATUS-REPORT/COMMAND status-report-qualifier.
    pub srq: bool,
    /// SUBMIT reject-duplicates.
    pub rd: bool,
    /// SUBMIT status-report-request.
    pub srr: bool,

    pub mr: Option<u8>,
    pub oa: Option<Address>,
    pub da: Option<Address>,
    pub ra: Option<Address>,
    pub pid: Option<u8>,
    pub dcs: Option<Dcs>,
    pub scts: Option<Timestamp>,
    pub dt: Option<Timestamp>,
    pub st: Option<u8>,
    pub vp: Option<ValidityPeriod>,
    pub fcs: Option<u8>,
    pub pi: Option<u8>,
    pub ct: Option<u8>,
    pub mn: Option<u8>,
    pub ud: Option<UserData>,
}

impl Tpdu {
    /// A blank TPDU of the given variant, every optional field unset.
    /// Starting point for building a template by hand or from the façade.
    pub fn blank(sms_type: SmsType) -> Self {
        Self::new(sms_type)
    }

    fn new(sms_type: SmsType) -> Self {
        Tpdu {
            sms_type,
            udhi: false,
            rp: false,
            mms: false,
            lp: false,
            sri: false,
            srq: false,
            rd: false,
            srr: false,
            mr: None,
            oa: None,
            da: None,
            ra: None,
            pid: None,
            dcs: None,
            scts: None,
            dt: None,
            st: None,
            vp: None,
            fcs: None,
            pi: None,
            ct: None,
            mn: None,
            ud: None,
        }
    }

    fn require<'a, T>(&self, field: &'static str, value: &'a Option<T>) -> Result<&'a T, EncodeError> {
        value.as_ref().ok_or_else(|| EncodeError::new(field, FieldError::Invalid))
    }

    /// Bit positions: `RP`(7) `UDHI`(6), then per variant. This follows
    /// the worked decode in scenario 2 (a bare `0x04` first octet must
    /// decode with `UDHI=false`, `MMS=true`) rather than a literal
    /// top-to-bottom reading of the field list in §4.8.1, which would put
    /// `UDHI` at bit 2 and contradict that example.
    fn first_octet(&self) -> u8 {
        let mti = self.sms_type.mti();
        let udhi_bit = if self.udhi { 0x40 } else { 0 };
        let rp_bit = if self.rp { 0x80 } else { 0 };
        match self.sms_type {
            SmsType::Deliver => {
                let sri = if self.sri { 0x20 } else { 0 };
                let lp = if self.lp { 0x10 } else { 0 };
                let mms = if self.mms { 0x04 } else { 0 };
                mti | udhi_bit | sri | lp | mms | rp_bit
            }
            SmsType::Submit => {
                let srr = if self.srr { 0x20 } else { 0 };
                let vpf = self.vp.as_ref().map(ValidityPeriod::vpf).unwrap_or(0) << 3;
                let rd = if self.rd { 0x04 } else { 0 };
                mti | udhi_bit | srr | vpf | rd | rp_bit
            }
            SmsType::StatusReport => {
                let srq = if self.srq { 0x20 } else { 0 };
                let lp = if self.lp { 0x10 } else { 0 };
                let mms = if self.mms { 0x04 } else { 0 };
                mti | udhi_bit | srq | lp | mms | rp_bit
            }
            SmsType::Command => {
                let srr = if self.srr { 0x20 } else { 0 };
                mti | udhi_bit | srr | rp_bit
            }
            SmsType::DeliverReport | SmsType::SubmitReport => mti | udhi_bit | rp_bit,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut out = vec![self.first_octet()];
        match self.sms_type {
            SmsType::Deliver => {
                out.extend(self.require("oa", &self.oa)?.encode().map_err(|e| EncodeError::new("oa", e))?);
                out.push(*self.require("pid", &self.pid)?);
                out.push(self.require("dcs", &self.dcs)?.0);
                out.extend(self.require("scts", &self.scts)?.encode().map_err(|e| EncodeError::new("scts", e))?);
                out.extend(self.require("ud", &self.ud)?.encode().map_err(|e| EncodeError::new("ud", e))?);
            }
            SmsType::DeliverReport => {
                out.push(*self.require("fcs", &self.fcs)?);
                self.encode_report_tail(&mut out, false)?;
            }
            SmsType::Submit => {
                out.push(self.mr.unwrap_or(0));
                out.extend(self.require("da", &self.da)?.encode().map_err(|e| EncodeError::new("da", e))?);
                out.push(*self.require("pid", &self.pid)?);
                out.push(self.require("dcs", &self.dcs)?.0);
                if let Some(vp) = &self.vp {
                    out.extend(vp.encode().map_err(|e| EncodeError::new("vp", e))?);
                }
                out.extend(self.require("ud", &self.ud)?.encode().map_err(|e| EncodeError::new("ud", e))?);
            }
            SmsType::SubmitReport => {
                out.push(*self.require("fcs", &self.fcs)?);
                let pi = self.require("pi", &self.pi)?;
                out.push(*pi);
                out.extend(self.require("scts", &self.scts)?.encode().map_err(|e| EncodeError::new("scts", e))?);
                self.encode_pi_optionals(&mut out, *pi)?;
            }
            SmsType::StatusReport => {
                out.push(self.mr.unwrap_or(0));
                out.extend(self.require("ra", &self.ra)?.encode().map_err(|e| EncodeError::new("ra", e))?);
                out.extend(self.require("scts", &self.scts)?.encode().map_err(|e| EncodeError::new("scts", e))?);
                out.extend(self.require("dt", &self.dt)?.encode().map_err(|e| EncodeError::new("dt", e))?);
                out.push(*self.require("st", &self.st)?);
                if let Some(pi) = self.pi {
                    out.push(pi);
                    self.encode_pi_optionals(&mut out, pi)?;
                }
            }
            SmsType::Command => {
                out.push(self.mr.unwrap_or(0));
                out.push(*self.require("pid", &self.pid)?);
                out.push(*self.require("ct", &self.ct)?);
                out.push(*self.require("mn", &self.mn)?);
                out.extend(self.require("da", &self.da)?.encode().map_err(|e| EncodeError::new("da", e))?);
                out.extend(self.require("ud", &self.ud)?.encode().map_err(|e| EncodeError::new("ud", e))?);
            }
        }
        Ok(out)
    }

    fn encode_report_tail(&self, out: &mut Vec<u8>, _: bool) -> Result<(), EncodeError> {
        let pi = self.require("pi", &self.pi)?;
        out.push(*pi);
        self.encode_pi_optionals(out, *pi)
    }

    fn encode_pi_optionals(&self, out: &mut Vec<u8>, pi: u8) -> Result<(), EncodeError> {
        if pi & PI_PID != 0 {
            out.push(*self.require("pid", &self.pid)?);
        }
        if pi & PI_DCS != 0 {
            out.push(self.require("dcs", &self.dcs)?.0);
        }
        if pi & PI_UDL != 0 {
            out.extend(self.require("ud", &self.ud)?.encode().map_err(|e| EncodeError::new("ud", e))?);
        }
        Ok(())
    }

    /// Decodes a TPDU of the given direction, returning it and the number
    /// of bytes consumed.
    pub fn decode(bytes: &[u8], direction: Direction) -> Result<(Tpdu, usize), DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::new("firstOctet", 0, FieldError::Underflow));
        }
        let first = bytes[0];
        let mti = first & 0b11;
        let sms_type = SmsType::from_mti_direction(mti, direction)
            .map_err(|e| DecodeError::new("firstOctet", 0, e))?;
        let udhi = first & 0x40 != 0;
        let rp = first & 0x80 != 0;
        let mut t = Tpdu::new(sms_type);
        t.udhi = udhi;
        t.rp = rp;
        let mut pos = 1usize;

        match sms_type {
            SmsType::Deliver => {
                t.sri = first & 0x20 != 0;
                t.lp = first & 0x10 != 0;
                t.mms = first & 0x04 != 0;
                let (oa, n) = Address::decode(&bytes[pos..])
                    .map_err(|e| DecodeError::new("oa", pos, e))?;
                pos += n;
                t.pid = Some(byte_at(bytes, pos, "pid")?);
                pos += 1;
                t.dcs = Some(Dcs::new(byte_at(bytes, pos, "dcs")?));
                pos += 1;
                let (scts, n) = Timestamp::decode(&bytes[pos..])
                    .map_err(|e| DecodeError::new("scts", pos, e))?;
                pos += n;
                let (ud, n) = decode_ud(&t, bytes, pos)?;
                pos += n;
                t.oa = Some(oa);
                t.scts = Some(scts);
                t.ud = Some(ud);
            }
            SmsType::DeliverReport => {
                t.fcs = Some(byte_at(bytes, pos, "fcs")?);
                pos += 1;
                let pi = byte_at(bytes, pos, "pi")?;
                pos += 1;
                t.pi = Some(pi);
                decode_pi_optionals(&mut t, bytes, &mut pos, pi)?;
            }
            SmsType::Submit => {
                t.srr = first & 0x20 != 0;
                t.rd = first & 0x04 != 0;
                let vpf = (first >> 3) & 0b11;
                t.mr = Some(byte_at(bytes, pos, "mr")?);
                pos += 1;
                let (da, n) = Address::decode(&bytes[pos..])
                    .map_err(|e| DecodeError::new("da", pos, e))?;
                pos += n;
                t.pid = Some(byte_at(bytes, pos, "pid")?);
                pos += 1;
                t.dcs = Some(Dcs::new(byte_at(bytes, pos, "dcs")?));
                pos += 1;
                if vpf != ValidityPeriod::NotPresent.vpf() {
                    let (vp, n) = ValidityPeriod::decode(vpf, &bytes[pos..])
                        .map_err(|e| DecodeError::new("vp", pos, e))?;
                    pos += n;
                    t.vp = Some(vp);
                }
                let (ud, n) = decode_ud(&t, bytes, pos)?;
                pos += n;
                t.da = Some(da);
                t.ud = Some(ud);
            }
            SmsType::SubmitReport => {
                t.fcs = Some(byte_at(bytes, pos, "fcs")?);
                pos += 1;
                let pi = byte_at(bytes, pos, "pi")?;
                pos += 1;
                t.pi = Some(pi);
                let (scts, n) = Timestamp::decode(&bytes[pos..])
                    .map_err(|e| DecodeError::new("scts", pos, e))?;
                pos += n;
                t.scts = Some(scts);
                decode_pi_optionals(&mut t, bytes, &mut pos, pi)?;
            }
            SmsType::StatusReport => {
                t.srq = first & 0x20 != 0;
                t.lp = first & 0x10 != 0;
                t.mms = first & 0x04 != 0;
                t.mr = Some(byte_at(bytes, pos, "mr")?);
                pos += 1;
                let (ra, n) = Address::decode(&bytes[pos..])
                    .map_err(|e| DecodeError::new("ra", pos, e))?;
                pos += n;
                let (scts, n) = Timestamp::decode(&bytes[pos..])
                    .map_err(|e| DecodeError::new("scts", pos, e))?;
                pos += n;
                let (dt, n) = Timestamp::decode(&bytes[pos..])
                    .map_err(|e| DecodeError::new("dt", pos, e))?;
                pos += n;
                t.ra = Some(ra);
                t.scts = Some(scts);
                t.dt = Some(dt);
                t.st = Some(byte_at(bytes, pos, "st")?);
                pos += 1;
                if pos < bytes.len() {
                    let pi = byte_at(bytes, pos, "pi")?;
                    pos += 1;
                    t.pi = Some(pi);
                    decode_pi_optionals(&mut t, bytes, &mut pos, pi)?;
                }
            }
            SmsType::Command => {
                t.srr = first & 0x20 != 0;
                t.mr = Some(byte_at(bytes, pos, "mr")?);
                pos += 1;
                t.pid = Some(byte_at(bytes, pos, "pid")?);
                pos += 1;
                t.ct = Some(byte_at(bytes, pos, "ct")?);
                pos += 1;
                t.mn = Some(byte_at(bytes, pos, "mn")?);
                pos += 1;
                let (da, n) = Address::decode(&bytes[pos..])
                    .map_err(|e| DecodeError::new("da", pos, e))?;
                pos += n;
                let (ud, n) = decode_ud(&t, bytes, pos)?;
                pos += n;
                t.da = Some(da);
                t.ud = Some(ud);
            }
        }
        Ok((t, pos))
    }
}

fn byte_at(bytes: &[u8], pos: usize, field: &'static str) -> Result<u8, DecodeError> {
    bytes.get(pos).copied().ok_or_else(|| DecodeError::new(field, pos, FieldError::Underflow))
}

fn decode_ud(t: &Tpdu, bytes: &[u8], pos: usize) -> Result<(UserData, usize), DecodeError> {
    let dcs = t.dcs.unwrap_or_else(Dcs::default_7bit);
    let alphabet = dcs.alphabet().map_err(|e| DecodeError::new("ud", pos, e))?;
    UserData::decode(alphabet, t.udhi, &bytes[pos..]).map_err(|e| DecodeError::new("ud", pos, e))
}

fn decode_pi_optionals(t: &mut Tpdu, bytes: &[u8], pos: &mut usize, pi: u8) -> Result<(), DecodeError> {
    if pi & PI_PID != 0 {
        t.pid = Some(byte_at(bytes, *pos, "pid")?);
        *pos += 1;
    }
    if pi & PI_DCS != 0 {
        t.dcs = Some(Dcs::new(byte_at(bytes, *pos, "dcs")?));
        *pos += 1;
    }
    if pi & PI_UDL != 0 {
        let (ud, n) = decode_ud(t, bytes, *pos)?;
        t.ud = Some(ud);
        *pos += n;
    }
    Ok(())
}

/// Maximum UD octets (payload + UDH + its length byte) for a variant,
/// before the 7-bit 8/7 expansion (spec §4.8.3). `rp_error` distinguishes
/// the two report sizes (RP-ACK vs RP-ERROR).
pub fn ud_block_size(sms_type: SmsType, rp_error: bool) -> usize {
    match sms_type {
        SmsType::Submit | SmsType::Deliver => 140,
        SmsType::DeliverReport => {
            if rp_error {
                158
            } else {
                159
            }
        }
        SmsType::SubmitReport => {
            if rp_error {
                151
            } else {
                152
            }
        }
        SmsType::Command => 146,
        SmsType::StatusReport => 131,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::gsm7;
    use crate::dcs::Dcs;
    use crate::udh::UserDataHeader;

    #[test]
    fn encodes_scenario_1_submit() {
        let septets = gsm7::encode("Hello world", None, None).unwrap();
        let tpdu = Tpdu {
            mr: Some(0),
            da: Some(Address::international("12345")),
            pid: Some(0),
            dcs: Some(Dcs::default_7bit()),
            vp: None,
            ud: Some(UserData { header: UserDataHeader::new(), alphabet: crate::dcs::Alphabet::Bit7, body: septets }),
            ..Tpdu::new(SmsType::Submit)
        };
        let bytes = tpdu.encode().unwrap();
        assert_eq!(
            bytes,
            vec![0x01, 0x00, 0x05, 0x91, 0x21, 0x43, 0xf5, 0x00, 0x00, 0x0b, 0xc8, 0x32, 0x9b, 0xfd, 0x06, 0xdd, 0xdf, 0x72, 0x36, 0x19]
        );
    }

    #[test]
    fn decodes_scenario_2_deliver() {
        let bytes = [0x04, 0x0b, 0x91, 0x16, 0x05, 0x93, 0x57, 0x13, 0xf2, 0x00, 0x00, 0x81, 0x40, 0x80, 0x61, 0x13, 0x91, 0x23, 0x04, 0xd7, 0xf7, 0x9b, 0x0e];
        let (tpdu, consumed) = Tpdu::decode(&bytes, Direction::Mt).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(tpdu.sms_type, SmsType::Deliver);
        assert_eq!(tpdu.oa.as_ref().unwrap().display(), "+61503975312");
        let scts = tpdu.scts.unwrap();
        assert_eq!((scts.year, scts.month, scts.day, scts.hour, scts.minute, scts.second), (2018, 4, 8, 16, 31, 19));
        let text = gsm7::decode(&tpdu.ud.unwrap().body, None, None, true).unwrap();
        assert_eq!(text, "Woot");
    }

    #[test]
    fn rejects_unknown_direction_pairing() {
        // MTI=3 is not defined for either direction.
        assert!(Tpdu::decode(&[0x03], Direction::Mt).is_err());
    }
}
