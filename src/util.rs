//! Shared utility functions

/// Length of `s` in characters, which is how passage lengths are measured
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Shorten `s` to at most `max_chars` characters, ending in "..." when cut
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if char_len(s) <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut truncated: String = s.chars().take(keep).collect();
    truncated.push_str("...");
    truncated
}
