//! UTF-8 decoding helpers for string payloads embedded in binary buffers.
//!
//! Payload bytes come from a remote process and are not trusted to be valid
//! UTF-8. Decoding always makes forward progress by emitting U+FFFD for each
//! invalid sequence, so a corrupt string never aborts a batch.

use std::borrow::Cow;

/// Decode `bytes` as UTF-8, borrowing when the input is already valid.
///
/// Invalid sequences (including truncated multi-byte sequences at the end of
/// the slice) are replaced with U+FFFD and decoding continues. Four-byte
/// sequences decode to scalar values above U+FFFF directly.
pub fn decode_utf8_lossy(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => {
            let mut text = String::with_capacity(bytes.len());
            decode_bytes(&mut text, bytes);
            Cow::Owned(text)
        }
    }
}

fn decode_bytes(text: &mut String, mut bytes: &[u8]) {
    while !bytes.is_empty() {
        match std::str::from_utf8(bytes) {
            Ok(s) => {
                text.push_str(s);
                break;
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                // `valid_up_to` guarantees the prefix is well-formed.
                if let Ok(s) = std::str::from_utf8(valid) {
                    text.push_str(s);
                }
                text.push('\u{FFFD}');
                match e.error_len() {
                    Some(len) => bytes = &rest[len..],
                    // Truncated sequence at the end of the slice.
                    None => break,
                }
            }
        }
    }
}
