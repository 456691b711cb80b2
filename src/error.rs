//! Error taxonomy shared by every codec in this crate.
//!
//! `FieldError` carries the leaf cause; `DecodeError`/`EncodeError` nest it
//! behind a dotted field path as each parent decoder/encoder hands control
//! back up, the way `s7::error::Error` wraps a reason string rather than
//! boxing an opaque `dyn Error`.

use thiserror::Error;

/// Leaf errors raised by the bit-level and field-level codecs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("source ran out of bytes before the field completed")]
    Underflow,
    #[error("source had more bytes than the declared length")]
    Overlength,
    #[error("value is not a member of its allowed set")]
    Invalid,
    #[error("digit {0:#04x} is not a valid semi-octet digit")]
    InvalidDigit(u8),
    #[error("semi-octet fill nibble did not match the declared length")]
    MissingFill,
    #[error("octet {0:#04x} is not a valid BCD digit pair")]
    InvalidOctet(u8),
    #[error("integer {0} is out of range for a BCD octet")]
    InvalidInteger(i32),
    #[error("rune {0:?} has no representation in the selected GSM7 table(s)")]
    InvalidUtf8(char),
    #[error("septet {0:#04x} is not defined in the selected GSM7 table")]
    InvalidSeptet(u8),
    #[error("byte length must be even for UCS-2")]
    InvalidLength,
    #[error("dangling high surrogate at end of input")]
    DanglingSurrogate(u8, u8),
    #[error("UCS-2 body has an odd octet length")]
    OddUcs2Length,
    #[error("reserved padding byte was not zero")]
    NonZero,
    #[error("decoder has no handler for this SMS type")]
    UnsupportedSmsType,
    #[error("message-type-indicator {0} is not recognized")]
    UnsupportedMti(u8),
    #[error("encoder's requested alphabet conflicts with the supplied DCS template")]
    DcsConflict,
}

/// A decode failure, tagged with the dotted field path and byte offset at
/// which it occurred. Parent decoders rewrap child errors by prefixing
/// their own field name and base offset (spec §4.8.4/§7).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}@{offset}: {source}")]
pub struct DecodeError {
    pub path: String,
    pub offset: usize,
    #[source]
    pub source: FieldError,
}

impl DecodeError {
    pub fn new(field: impl Into<String>, offset: usize, source: FieldError) -> Self {
        DecodeError { path: field.into(), offset, source }
    }

    /// Prefix `field` onto the path and shift `offset` by `base`, as done by
    /// every parent decoder when a child field fails.
    pub fn nest(mut self, field: &str, base: usize) -> Self {
        self.path = format!("{field}.{}", self.path);
        self.offset += base;
        self
    }
}

/// An encode failure, tagged with the dotted field path (spec §4.8.4/§7).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {source}")]
pub struct EncodeError {
    pub path: String,
    #[source]
    pub source: FieldError,
}

impl EncodeError {
    pub fn new(field: impl Into<String>, source: FieldError) -> Self {
        EncodeError { path: field.into(), source }
    }

    pub fn nest(mut self, field: &str) -> Self {
        self.path = format!("{field}.{}", self.path);
        self
    }
}

/// Faults raised by the reassembly collector (spec §4.11/§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CollectorError {
    #[error("collector is closed")]
    Closed,
    #[error("segment slot was already filled")]
    DuplicateSegment,
    #[error("segment sequence number is out of range for the declared total")]
    ReassemblyInconsistency,
}

pub type DecodeResult<T> = Result<T, DecodeError>;
pub type EncodeResult<T> = Result<T, EncodeError>;
