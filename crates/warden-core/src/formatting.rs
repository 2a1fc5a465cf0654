//! Small text helpers for Telegram HTML output and log fields.

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Truncate to at most `max_chars` characters, appending `...` when something was cut.
pub fn truncate_text(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out = s.chars().take(max_chars).collect::<String>();
    out.push_str("...");
    out
}

/// Error detail as it goes into a log field: single line, bounded length.
pub fn log_detail(err: &impl std::fmt::Display) -> String {
    const MAX_DETAIL: usize = 300;
    let one_line = err.to_string().replace('\n', " ");
    truncate_text(&one_line, MAX_DETAIL)
}
