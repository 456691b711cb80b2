//! Septet <-> octet packing for the 7-bit alphabet (spec §4.2).

/// Unpacks `fillBits` (0..6) of leading padding, then a little-endian
/// stream of 7-bit septets, from `src` into one septet per output byte
/// (low 7 bits populated).
pub fn unpack(src: &[u8], fill_bits: u8) -> Vec<u8> {
    debug_assert!(fill_bits < 7);
    let mut bits: Vec<bool> = Vec::with_capacity(src.len() * 8);
    for &byte in src {
        for i in 0..8 {
            bits.push((byte >> i) & 1 == 1);
        }
    }
    bits.drain(0..fill_bits as usize);

    let mut out = Vec::with_capacity(bits.len() / 7);
    for chunk in bits.chunks(7) {
        if chunk.len() < 7 {
            break;
        }
        let mut septet = 0u8;
        for (i, &bit) in chunk.iter().enumerate() {
            if bit {
                septet |= 1 << i;
            }
        }
        out.push(septet);
    }
    out
}

/// Packs a septet stream into octets, writing `fillBits` (0..6) zero bits
/// first. Inverse of `unpack`.
pub fn pack(src: &[u8], fill_bits: u8) -> Vec<u8> {
    debug_assert!(fill_bits < 7);
    let mut bits: Vec<bool> = Vec::with_capacity(fill_bits as usize + src.len() * 7);
    bits.resize(fill_bits as usize, false);
    for &septet in src {
        for i in 0..7 {
            bits.push((septet >> i) & 1 == 1);
        }
    }

    let mut out = Vec::with_capacity((bits.len() + 7) / 8);
    for chunk in bits.chunks(8) {
        let mut byte = 0u8;
        for (i, &bit) in chunk.iter().enumerate() {
            if bit {
                byte |= 1 << i;
            }
        }
        out.push(byte);
    }
    out
}

/// Octets needed to hold `septets` 7-bit units plus `fill_bits` leading
/// padding bits (spec §4.7/§4.8.3: `⌈(7·septets + fillBits)/8⌉`).
pub fn packed_octets(septets: usize, fill_bits: u8) -> usize {
    (7 * septets + fill_bits as usize + 7) / 8
}

/// Maximum septets recoverable from `octets` octets once `fill_bits`
/// leading padding bits are discarded.
pub fn unpacked_septets(octets: usize, fill_bits: u8) -> usize {
    (octets * 8).saturating_sub(fill_bits as usize) / 7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_world_packs_to_known_bytes() {
        // "Hello world" in default GSM7 septets.
        let septets: Vec<u8> = "Hello world"
            .chars()
            .map(|c| super::super::tables::DEFAULT.septet_for_char(c).unwrap())
            .collect();
        let packed = pack(&septets, 0);
        assert_eq!(
            packed,
            vec![0xc8, 0x32, 0x9b, 0xfd, 0x06, 0xdd, 0xdf, 0x72, 0x36, 0x19]
        );
        assert_eq!(unpack(&packed, 0), septets);
    }

    #[test]
    fn round_trips_with_every_fill_width() {
        let septets: Vec<u8> = (0u8..40).map(|x| x % 0x80).collect();
        for fill in 0..7u8 {
            let packed = pack(&septets, fill);
            let unpacked = unpack(&packed, fill);
            // unpack may lose a trailing partial septet; compare the
            // overlap only.
            assert_eq!(&unpacked[..septets.len().min(unpacked.len())], &septets[..septets.len().min(unpacked.len())]);
        }
    }

    #[test]
    fn octet_count_matches_spec_formula() {
        assert_eq!(packed_octets(11, 0), 10);
        assert_eq!(packed_octets(1, 0), 1);
        assert_eq!(packed_octets(8, 0), 7);
    }
}
