//! Small string helpers.

/// Truncate `s` to at most `max_chars` characters, appending `...` when
/// anything was cut. Always splits on a char boundary.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
