// ============================================================================
// Log Sanitization
// ============================================================================
//
// Search text arrives straight from query strings and is echoed into log
// lines. Newlines, ANSI escapes and other control characters are stripped so
// a crafted query cannot forge log entries or rewrite a terminal, and long
// input is truncated on a character boundary.
//
// ============================================================================

use regex::Regex;
use once_cell::sync::Lazy;

/// Maximum number of characters of user input kept in a log line
const MAX_LOG_CHARS: usize = 200;

static ANSI_ESCAPE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").expect("ANSI escape pattern is valid")
});

/// Sanitize user input for safe logging
///
/// # Examples:
/// ```
/// use pharmacy_locator::utils::log_sanitizer::sanitize_for_log;
///
/// assert_eq!(
///     sanitize_for_log("paracetamol\nINFO: Fake log entry"),
///     "paracetamol INFO: Fake log entry"
/// );
/// assert_eq!(sanitize_for_log("test\x1b[31mred\x1b[0m"), "testred");
/// ```
pub fn sanitize_for_log(input: &str) -> String {
    let no_ansi = ANSI_ESCAPE_REGEX.replace_all(input, "");

    let cleaned: String = no_ansi
        .chars()
        .filter_map(|c| match c {
            '\n' | '\r' | '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect();

    match cleaned.char_indices().nth(MAX_LOG_CHARS) {
        Some((cut, _)) => format!("{}...", &cleaned[..cut]),
        None => cleaned,
    }
}

/// Sanitize an optional string for logging, rendering `None` literally.
pub fn sanitize_option_for_log(input: Option<&str>) -> String {
    match input {
        Some(value) => sanitize_for_log(value),
        None => "None".to_string(),
    }
}
