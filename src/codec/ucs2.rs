//! UCS-2 (big-endian UTF-16) text codec, with surrogate-pair awareness
//! across concatenated segments (spec §4.3).

use crate::error::FieldError;

/// Encodes `text` as big-endian UTF-16 code units (2 bytes per BMP
/// scalar, 4 for a supplementary-plane scalar via a surrogate pair).
pub fn encode(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out
}

/// Decodes a single segment's worth of big-endian UTF-16 bytes. A dangling
/// high surrogate at the very end of `bytes` is returned as a carry rather
/// than an error, so a caller reassembling segments can prepend it to the
/// next segment's bytes (spec §4.3/§7).
pub fn decode_segment(bytes: &[u8]) -> Result<(String, Option<(u8, u8)>), FieldError> {
    if bytes.len() % 2 != 0 {
        return Err(FieldError::InvalidLength);
    }

    let units: Vec<u16> = bytes.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]])).collect();

    let mut out = String::with_capacity(units.len());
    let mut i = 0;
    while i < units.len() {
        let u = units[i];
        if (0xd800..=0xdbff).contains(&u) {
            if i + 1 == units.len() {
                let b = bytes[bytes.len() - 2..].try_into().unwrap();
                let [hi, lo]: [u8; 2] = b;
                return Ok((out, Some((hi, lo))));
            }
            let low = units[i + 1];
            if !(0xdc00..=0xdfff).contains(&low) {
                return Err(FieldError::InvalidLength);
            }
            let c = 0x10000 + (((u as u32 - 0xd800) << 10) | (low as u32 - 0xdc00));
            out.push(char::from_u32(c).ok_or(FieldError::InvalidLength)?);
            i += 2;
            continue;
        }
        if (0xdc00..=0xdfff).contains(&u) {
            return Err(FieldError::InvalidLength);
        }
        out.push(char::from_u32(u as u32).ok_or(FieldError::InvalidLength)?);
        i += 1;
    }
    Ok((out, None))
}

/// Decodes a single, complete UCS-2 buffer. A dangling high surrogate at
/// the end is a hard error here (there is no next segment to carry it
/// into); use `concatenate` when reassembling multiple segments.
pub fn decode(bytes: &[u8]) -> Result<String, FieldError> {
    let (text, carry) = decode_segment(bytes)?;
    match carry {
        None => Ok(text),
        Some((hi, lo)) => Err(FieldError::DanglingSurrogate(hi, lo)),
    }
}

/// Decodes and joins UCS-2 segments in order, carrying a dangling high
/// surrogate from one segment's end into the next segment's start (spec
/// §8 "Chunk concatenation" / "No surrogate split").
pub fn concatenate<'a, I: IntoIterator<Item = &'a [u8]>>(segments: I) -> Result<String, FieldError> {
    let mut out = String::new();
    let mut carry: Option<(u8, u8)> = None;

    for segment in segments {
        let mut buf;
        let bytes: &[u8] = if let Some((hi, lo)) = carry.take() {
            buf = Vec::with_capacity(segment.len() + 2);
            buf.push(hi);
            buf.push(lo);
            buf.extend_from_slice(segment);
            &buf
        } else {
            segment
        };

        let (text, next_carry) = decode_segment(bytes)?;
        out.push_str(&text);
        carry = next_carry;
    }

    match carry {
        None => Ok(out),
        Some((hi, lo)) => Err(FieldError::DanglingSurrogate(hi, lo)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_bmp_and_supplementary() {
        let bytes = encode("hello 😁");
        assert_eq!(
            bytes,
            vec![0x00, 0x68, 0x00, 0x65, 0x00, 0x6c, 0x00, 0x6c, 0x00, 0x6f, 0x00, 0x20, 0xd8, 0x3d, 0xde, 0x01]
        );
        assert_eq!(decode(&bytes).unwrap(), "hello 😁");
    }

    #[test]
    fn odd_length_is_invalid() {
        assert_eq!(decode(&[0x00]), Err(FieldError::InvalidLength));
    }

    #[test]
    fn dangling_high_surrogate_is_a_carry() {
        let bytes = [0x00, 0x68, 0xd8, 0x3d];
        let (text, carry) = decode_segment(&bytes).unwrap();
        assert_eq!(text, "h");
        assert_eq!(carry, Some((0xd8, 0x3d)));
        assert_eq!(decode(&bytes), Err(FieldError::DanglingSurrogate(0xd8, 0x3d)));
    }

    #[test]
    fn concatenate_rejoins_split_surrogate_pair() {
        let whole = "this is a very long message that needs chunking so the emoji 😁 lands across a boundary";
        let full_bytes = encode(whole);
        // split such that the surrogate pair straddles the boundary
        let emoji_start = full_bytes
            .windows(2)
            .position(|w| w == [0xd8, 0x3d])
            .unwrap();
        let split_at = emoji_start + 2;
        let (a, b) = full_bytes.split_at(split_at);
        assert_eq!(concatenate([a, b]).unwrap(), whole);
    }
}
