//! The literal end-to-end scenarios enumerated alongside the testable
//! properties: one test per scenario.

use sms_tpdu::codec::gsm7::tables::NationalLanguage;
use sms_tpdu::codec::ucs2;
use sms_tpdu::dcs::{Alphabet, Dcs};
use sms_tpdu::tpdu::{Direction, SmsType, Tpdu};
use sms_tpdu::udh::{InformationElement, UserDataHeader, IE_CONCAT_8BIT, IE_NLI_LOCKING};
use sms_tpdu::userdata::UserData;
use sms_tpdu::{collect, decode, encode, unmarshal, Address, Collector, DecodeOptions, EncodeOptions, Smsc, UnmarshalOptions};
use std::time::Duration;

#[test]
fn scenario_1_hello_world_submit() {
    let counters = sms_tpdu::Counters::new();
    let options = EncodeOptions::new().to("12345");
    let segments = encode("Hello world", &options, &counters).unwrap();
    assert_eq!(segments.len(), 1);
    let bytes = segments[0].encode().unwrap();
    assert_eq!(
        bytes,
        vec![0x01, 0x00, 0x05, 0x91, 0x21, 0x43, 0xf5, 0x00, 0x00, 0x0b, 0xc8, 0x32, 0x9b, 0xfd, 0x06, 0xdd, 0xdf, 0x72, 0x36, 0x19]
    );
}

#[test]
fn scenario_2_deliver_after_stripping_smsc_prefix() {
    let full = [
        0x07, 0x91, 0x16, 0x14, 0x22, 0x09, 0x91, 0xf1, 0x04, 0x0b, 0x91, 0x16, 0x05, 0x93, 0x57, 0x13, 0xf2, 0x00, 0x00, 0x81, 0x40, 0x80,
        0x61, 0x13, 0x91, 0x23, 0x04, 0xd7, 0xf7, 0x9b, 0x0e,
    ];
    let (_smsc, consumed) = Smsc::decode(&full).unwrap();
    assert_eq!(consumed, 8);

    let tpdu = unmarshal(&full[consumed..], &UnmarshalOptions { direction: Direction::Mt }).unwrap();
    assert_eq!(tpdu.sms_type, SmsType::Deliver);
    assert_eq!(tpdu.oa.as_ref().unwrap().display(), "+61503975312");
    let scts = tpdu.scts.unwrap();
    assert_eq!((scts.year, scts.month, scts.day, scts.hour, scts.minute, scts.second), (2018, 4, 8, 16, 31, 19));

    let text = decode(std::slice::from_ref(&tpdu), &DecodeOptions::default()).unwrap();
    assert_eq!(text, "Woot");
}

#[test]
fn scenario_3_emoji_as_ucs2() {
    let counters = sms_tpdu::Counters::new();
    let options = EncodeOptions::new().to("12345");
    let segments = encode("hello 😁", &options, &counters).unwrap();
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].dcs, Some(Dcs::ucs2()));
    assert_eq!(
        segments[0].ud.as_ref().unwrap().body,
        vec![0x00, 0x68, 0x00, 0x65, 0x00, 0x6c, 0x00, 0x6c, 0x00, 0x6f, 0x00, 0x20, 0xd8, 0x3d, 0xde, 0x01]
    );
}

#[test]
fn scenario_4_urdu_locking_table() {
    let counters = sms_tpdu::Counters::new();
    let options = EncodeOptions::new().to("12345").with_charset(NationalLanguage::Urdu);
    let segments = encode("hi \u{062a}", &options, &counters).unwrap();
    assert_eq!(segments.len(), 1);
    let ud = segments[0].ud.as_ref().unwrap();
    assert_eq!(ud.header.ie(IE_NLI_LOCKING).unwrap().data, vec![13]);
    assert_eq!(ud.body[ud.body.len() - 1], 0x07);
}

#[test]
fn scenario_5_long_ucs2_message_survives_concatenation_and_collection() {
    // A message long enough to force multi-part UCS-2 segmentation, with a
    // supplementary-plane scalar (whose UTF-16 form is a surrogate pair)
    // placed late enough that it can land on a chunk boundary.
    let filler: String = std::iter::repeat("abcdefghij ").take(30).collect();
    let message = format!("this is a very long message that needs chunking {filler}so the emoji 😁 lands across a boundary");

    let counters = sms_tpdu::Counters::new();
    let options = EncodeOptions::new().as_deliver().from("15551234567").as_ucs2();
    let segments = encode(&message, &options, &counters).unwrap();
    assert!(segments.len() >= 2, "expected the message to be split across multiple TPDUs");

    let collector = Collector::new(Duration::from_secs(30), None);
    let mut result = None;
    for tpdu in segments {
        if let Some(ordered) = collect(&collector, tpdu).unwrap() {
            result = Some(ordered);
        }
    }
    let ordered = result.expect("collector should have completed the conversation");

    let bodies: Vec<&[u8]> = ordered.iter().map(|t| t.ud.as_ref().unwrap().body.as_slice()).collect();
    assert_eq!(ucs2::concatenate(bodies).unwrap(), message);

    let rebuilt = decode(&ordered, &DecodeOptions::default()).unwrap();
    assert_eq!(rebuilt, message);
}

fn deliver_with_concat(oa: &str, reference: u8, total: u8, seqno: u8) -> Tpdu {
    let mut header = UserDataHeader::new();
    header.push(InformationElement::new(IE_CONCAT_8BIT, vec![reference, total, seqno]));
    let (mut t, _) = Tpdu::decode(
        &[0x00, 0x0b, 0x91, 0x16, 0x05, 0x93, 0x57, 0x13, 0xf2, 0x00, 0x00, 0x81, 0x40, 0x80, 0x61, 0x13, 0x91, 0x23, 0x00],
        Direction::Mt,
    )
    .unwrap();
    t.sms_type = SmsType::Deliver;
    t.oa = Some(Address::international(oa));
    t.dcs = Some(Dcs::default_7bit());
    t.ud = Some(UserData { header, alphabet: Alphabet::Bit7, body: vec![] });
    t
}

#[test]
fn scenario_6_completed_conversation_reopens_cleanly() {
    let collector = Collector::new(Duration::from_secs(60), None);
    let first = collect(&collector, deliver_with_concat("+1234", 5, 2, 1)).unwrap();
    assert!(first.is_none());
    let second = collect(&collector, deliver_with_concat("+1234", 5, 2, 2)).unwrap();
    assert_eq!(second.unwrap().len(), 2);

    let reopened = collect(&collector, deliver_with_concat("+1234", 5, 2, 1)).unwrap();
    assert!(reopened.is_none(), "a repeat after completion should open a fresh single-member pipe, not error");
}
