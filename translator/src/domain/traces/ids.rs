//! Trace and span identifier encoding.

const SHORT_ID_LEN: usize = 8;
const LONG_ID_LEN: usize = 16;

/// Encode a raw trace/span identifier as lowercase hex.
///
/// 128-bit identifiers whose leading 8 bytes are all zero are treated as
/// zero-padded 64-bit identifiers, e.g. `0000000000000000f798a1e7f33c8af6`
/// encodes as `f798a1e7f33c8af6`.
pub fn encode_id(id: &[u8]) -> String {
    match id.len() {
        LONG_ID_LEN if is_zero_padded(id) => hex::encode(&id[SHORT_ID_LEN..]),
        _ => hex::encode(id),
    }
}

/// Encode an optional identifier; empty input means "absent".
pub fn encode_optional_id(id: &[u8]) -> Option<String> {
    if id.is_empty() {
        None
    } else {
        Some(encode_id(id))
    }
}

#[inline]
fn is_zero_padded(id: &[u8]) -> bool {
    id[..SHORT_ID_LEN].iter().all(|b| *b == 0)
}
