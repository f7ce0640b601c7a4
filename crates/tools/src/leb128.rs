//! Unsigned LEB128 length prefixes, capped at four bytes (28 bits).
//!
//! Four bytes cover every string the batch format can address, so longer
//! prefixes are never produced and a fifth byte is never read.

pub const MAX_PREFIX_LEN: usize = 4;

/// Read a LEB128 value starting at `offset`.
///
/// Returns the decoded value and the number of prefix bytes consumed, or
/// `None` when the buffer ends before the prefix terminates.
pub fn read_u32(bytes: &[u8], offset: usize) -> Option<(u32, usize)> {
    let mut value = 0u32;
    let mut shift = 0u32;
    for i in 0..MAX_PREFIX_LEN {
        let byte = *bytes.get(offset + i)?;
        value |= u32::from(byte & 0x7F) << shift;
        if byte < 0x80 {
            return Some((value, i + 1));
        }
        shift += 7;
    }
    // Four continuation bytes: the value is complete by definition.
    Some((value, MAX_PREFIX_LEN))
}

/// Append `value` as a LEB128 prefix.
pub fn write_u32(out: &mut Vec<u8>, mut value: u32) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}
