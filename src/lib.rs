//! Encode and decode SMS TPDUs (3GPP TS 23.040 / TS 23.038) for GSM modems
//! running in PDU mode: addresses, timestamps, validity periods, user data
//! headers, the six TPDU variants, multi-part segmentation, and reassembly.

#![forbid(unsafe_code)]

pub mod address;
pub mod codec;
pub mod collector;
pub mod dcs;
pub mod error;
pub mod facade;
pub mod segment;
pub mod smsc;
pub mod timestamp;
pub mod tpdu;
pub mod udh;
pub mod userdata;
pub mod validity;

pub use address::Address;
pub use collector::Collector;
pub use dcs::{Alphabet, Dcs, MessageClass};
pub use error::{CollectorError, DecodeError, EncodeError, FieldError};
pub use facade::{collect, decode, encode, unmarshal, DecodeOptions, EncodeOptions, UnmarshalOptions};
pub use segment::Counters;
pub use smsc::Smsc;
pub use timestamp::Timestamp;
pub use tpdu::{Direction, SmsType, Tpdu};
pub use udh::{InformationElement, UserDataHeader};
pub use userdata::UserData;
pub use validity::ValidityPeriod;
