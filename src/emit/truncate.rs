// src/emit/truncate.rs

/// Maximum number of body bytes kept from the original text.
pub const MAX_BODY: usize = 4096;

/// Inserted between the head and tail of a truncated body.
pub const TRUNCATION_MARKER: &str = "...\n=== OUTPUT TRUNCATED ===\n";

/// Cut the middle out of bodies longer than [`MAX_BODY`] bytes.
///
/// Keeps the first `MAX_BODY / 2` bytes and the last `MAX_BODY / 2 - 1`
/// bytes around [`TRUNCATION_MARKER`]. Works on bytes, so the result is the
/// same for the same input regardless of where characters begin; a
/// multi-byte character split at either cut becomes U+FFFD.
pub fn truncate_body(body: &str) -> String {
    let bytes = body.as_bytes();
    if bytes.len() <= MAX_BODY {
        return body.to_string();
    }

    let head = &bytes[..MAX_BODY / 2];
    let tail = &bytes[bytes.len() - (MAX_BODY / 2 - 1)..];

    let mut out = String::with_capacity(MAX_BODY + TRUNCATION_MARKER.len());
    out.push_str(&String::from_utf8_lossy(head));
    out.push_str(TRUNCATION_MARKER);
    out.push_str(&String::from_utf8_lossy(tail));
    out
}
