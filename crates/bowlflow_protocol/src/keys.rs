//! Remote-store key rules.

/// Returns true if the code is already safe to use as a remote record key.
pub fn is_safe_record_key(code: &str) -> bool {
    !code.is_empty() && !code.chars().any(is_forbidden)
}

/// Turn a bowl code into a remote record key.
///
/// The remote store forbids `. $ # [ ] /` in keys; each occurrence is
/// replaced with `_`. Codes are full scanned strings (usually URLs), so
/// this is lossy but stable.
pub fn record_key(code: &str) -> String {
    code.chars()
        .map(|ch| if is_forbidden(ch) { '_' } else { ch })
        .collect()
}

fn is_forbidden(ch: char) -> bool {
    matches!(ch, '.' | '$' | '#' | '[' | ']' | '/')
}
