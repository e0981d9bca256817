//! netascii line-ending translation, applied once over a whole buffer.

/// Expands every LF to CRLF for the wire.
pub fn encode(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    for &b in bytes {
        if b == b'\n' {
            out.push(b'\r');
        }
        out.push(b);
    }
    out
}

/// Collapses every CRLF back to a local LF, left to right in one pass.
pub fn decode(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\r' && bytes.get(i + 1) == Some(&b'\n') {
            i += 1; // drop the CR, keep the LF
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}
