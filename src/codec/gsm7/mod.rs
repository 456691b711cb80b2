//! The GSM 7-bit alphabet: character tables (`tables`) and septet packing
//! (`pack`), composed into rune-aware `encode`/`decode` (spec §4.2).

pub mod pack;
pub mod tables;

use crate::error::FieldError;
use tables::{Gsm7Table, NationalLanguage, ESC};

/// Encodes `text` to a septet stream (one septet per output byte, high bit
/// clear), trying the default table, then an optional locking table, then
/// an optional single-shift table for each rune in turn.
///
/// A rune found in the default table emits its septet directly. A rune
/// found only in the shift table emits `ESC` followed by the shifted
/// septet. A rune found only in the locking table (when one is supplied)
/// emits that table's septet. Anything else is `InvalidUtf8`.
pub fn encode(
    text: &str,
    locking: Option<NationalLanguage>,
    shift: Option<NationalLanguage>,
) -> Result<Vec<u8>, FieldError> {
    let locking_table = locking.map(NationalLanguage::locking_table);
    let shift_table = shift.map(NationalLanguage::shift_table);

    let mut out = Vec::with_capacity(text.chars().count());
    for c in text.chars() {
        if let Some(s) = tables::DEFAULT.septet_for_char(c) {
            out.push(s);
            continue;
        }
        if let Some(table) = locking_table {
            if let Some(s) = table.septet_for_char(c) {
                out.push(s);
                continue;
            }
        }
        if let Some(table) = shift_table {
            if let Some(s) = table.septet_for_char(c) {
                out.push(ESC);
                out.push(s);
                continue;
            }
        }
        return Err(FieldError::InvalidUtf8(c));
    }
    Ok(out)
}

/// Decodes a septet stream back to text, consulting the locking/shift
/// tables (if supplied) for `ESC`-prefixed and non-default septets.
///
/// `strict` rejects any septet that isn't defined in whichever table
/// would have produced it (used for alphanumeric addresses, spec §4.2).
pub fn decode(
    septets: &[u8],
    locking: Option<NationalLanguage>,
    shift: Option<NationalLanguage>,
    strict: bool,
) -> Result<String, FieldError> {
    let locking_table: &Gsm7Table = locking.map(NationalLanguage::locking_table).unwrap_or(&tables::DEFAULT);
    let shift_table: &Gsm7Table = shift.map(NationalLanguage::shift_table).unwrap_or(&tables::DEFAULT_EXTENSION);

    let mut out = String::with_capacity(septets.len());
    let mut i = 0;
    while i < septets.len() {
        let s = septets[i];
        if s == ESC {
            i += 1;
            if i >= septets.len() {
                // A dangling escape at end of stream decodes as nothing
                // further to shift into; fall back to its base character.
                out.push(locking_table.char_for_septet(ESC).unwrap_or(' '));
                break;
            }
            let shifted = septets[i];
            match shift_table.char_for_septet(shifted) {
                Some(c) => out.push(c),
                None if strict => return Err(FieldError::InvalidSeptet(shifted)),
                None => out.push(' '),
            }
        } else {
            match locking_table.char_for_septet(s) {
                Some(c) => out.push(c),
                None if strict => return Err(FieldError::InvalidSeptet(s)),
                None => out.push('?'),
            }
        }
        i += 1;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_default_alphabet() {
        let text = "Hello world";
        let septets = encode(text, None, None).unwrap();
        assert_eq!(decode(&septets, None, None, true).unwrap(), text);
    }

    #[test]
    fn urdu_locking_table_example() {
        // spec §8 scenario 4.
        let septets = encode("hi \u{062a}", Some(NationalLanguage::Urdu), None).unwrap();
        assert_eq!(septets, vec![
            tables::DEFAULT.septet_for_char('h').unwrap(),
            tables::DEFAULT.septet_for_char('i').unwrap(),
            tables::DEFAULT.septet_for_char(' ').unwrap(),
            0x07,
        ]);
    }

    #[test]
    fn rejects_unrepresentable_rune_with_no_tables() {
        assert_eq!(encode("€", None, None), Err(FieldError::InvalidUtf8('€')));
    }

    #[test]
    fn shift_table_emits_escape_prefix() {
        let septets = encode("€", None, None.or(Some(NationalLanguage::Turkish))).unwrap();
        assert_eq!(septets, vec![ESC, 0x65]);
    }
}
