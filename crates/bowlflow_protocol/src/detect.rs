//! Scan-string classification.

/// Substrings a scanner-produced bowl code must contain (case-sensitive).
const CODE_MARKERS: [&str; 2] = ["VYT.TO/", "VYTAL"];

/// Classify a raw scanner string as a bowl code.
///
/// Trims whitespace; returns `None` for empty input or input without a
/// recognized marker. The returned code is the ENTIRE trimmed string, not
/// an extracted token: two raw inputs carrying the same marker but
/// different surrounding text are different bowls. Known risk: a change to
/// the scanner's encoded prefix/suffix silently mints new bowl identities
/// instead of matching existing ones.
pub fn detect_code(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if CODE_MARKERS.iter().any(|marker| trimmed.contains(marker)) {
        Some(trimmed)
    } else {
        None
    }
}
