//! Bit-level field codecs (spec §4.1-§4.3): the leaves everything else in
//! this crate is built from.

pub mod bcd;
pub mod gsm7;
pub mod semi_octet;
pub mod ucs2;
