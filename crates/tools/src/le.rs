//! Little-endian fixed-width reads at absolute offsets.
//!
//! Readers built on these never keep a cursor: every field is addressed
//! arithmetically, so callers may seek in any order.

pub fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(4)?;
    let word: [u8; 4] = bytes.get(offset..end)?.try_into().ok()?;
    Some(u32::from_le_bytes(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_words_at_offsets() {
        let bytes = [0xFF, 0x01, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];
        assert_eq!(read_u32(&bytes, 1), Some(1));
        assert_eq!(read_u32(&bytes, 5), Some(u32::MAX));
        assert_eq!(read_u32(&bytes, 6), None);
        assert_eq!(read_u32(&bytes, usize::MAX), None);
    }
}
