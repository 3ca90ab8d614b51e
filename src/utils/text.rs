/// First `max_chars` characters of `s`, with `...` appended when cut.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", s[..idx].trim_end()),
        None => s.to_string(),
    }
}

/// Single-line preview of user or model text for log records.
pub fn log_preview(s: &str) -> String {
    let flat = s.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_with_ellipsis(&flat, 80)
}
