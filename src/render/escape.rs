//! HTML escaping for double-brace substitutions.

/// Entity for a byte that must be escaped, or `None` to pass it through.
#[inline]
#[must_use]
pub fn escape_byte(byte: u8) -> Option<&'static [u8]> {
    match byte {
        b'&' => Some(b"&amp;"),
        b'<' => Some(b"&lt;"),
        b'>' => Some(b"&gt;"),
        b'"' => Some(b"&quot;"),
        b'\'' => Some(b"&#39;"),
        _ => None,
    }
}

/// Append `input` to `out` with `& < > " '` replaced by entities.
pub fn escape_html_into(input: &[u8], out: &mut Vec<u8>) {
    out.reserve(input.len());
    for &byte in input {
        match escape_byte(byte) {
            Some(entity) => out.extend_from_slice(entity),
            None => out.push(byte),
        }
    }
}

#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = Vec::with_capacity(input.len());
    escape_html_into(input.as_bytes(), &mut out);
    // Only ASCII bytes were replaced, by ASCII entities.
    String::from_utf8(out).unwrap_or_default()
}
