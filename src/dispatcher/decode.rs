//! Request path decoding.

use crate::error::DecodeError;

/// Percent-decode a request path. `+` decodes to a space.
///
/// Unlike lenient decoders, a `%` that is not followed by two hex digits is an error,
/// as is a decoded byte sequence that is not UTF-8.
pub fn decode_path(raw: &str) -> Result<String, DecodeError> {
    if !raw.bytes().any(|b| b == b'%' || b == b'+') {
        return Ok(raw.to_string());
    }
    validate_escapes(raw)?;

    // `+` is replaced first so an escaped `%2B` still decodes to a literal plus.
    let spaced = raw.replace('+', " ");
    let decoded = urlencoding::decode_binary(spaced.as_bytes());
    String::from_utf8(decoded.into_owned()).map_err(|_| DecodeError::InvalidUtf8)
}

/// Every `%` must be followed by two hex digits.
fn validate_escapes(raw: &str) -> Result<(), DecodeError> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        match (bytes.get(i + 1), bytes.get(i + 2)) {
            (Some(hi), Some(lo)) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => i += 3,
            (Some(_), Some(_)) => return Err(DecodeError::InvalidHex(i)),
            _ => return Err(DecodeError::Truncated(i)),
        }
    }
    Ok(())
}
