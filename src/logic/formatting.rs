//! Formatting and display logic
//!
//! Pure functions for formatting data for human-readable display.

use reqwest::Url;

const MAX_INPUT_CHARS: usize = 1000;

fn digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// Format a South African phone number for display
///
/// Ten digits starting with `0` become `0xx xxx xxxx`; eleven digits starting
/// with `27` become `+27 xx xxx xxxx`. Anything else is returned unchanged.
///
/// # Examples
/// ```
/// use servicefinder::logic::formatting::format_phone_number;
///
/// assert_eq!(format_phone_number("0821234567"), "082 123 4567");
/// assert_eq!(format_phone_number("+27 82 123 4567"), "+27 82 123 4567");
/// assert_eq!(format_phone_number("27821234567"), "+27 82 123 4567");
/// assert_eq!(format_phone_number("12345"), "12345");
/// ```
pub fn format_phone_number(phone: &str) -> String {
    let d = digits(phone);

    if d.len() == 10 && d.starts_with('0') {
        return format!("{} {} {}", &d[..3], &d[3..6], &d[6..]);
    }
    if d.len() == 11 && d.starts_with("27") {
        return format!("+{} {} {} {}", &d[..2], &d[2..4], &d[4..7], &d[7..]);
    }

    phone.to_string()
}

/// North American style `(xxx) xxx-xxxx` for any ten-digit number
///
/// # Examples
/// ```
/// use servicefinder::logic::formatting::format_phone;
///
/// assert_eq!(format_phone("082-123-4567"), "(082) 123-4567");
/// assert_eq!(format_phone("123"), "123");
/// ```
pub fn format_phone(phone: &str) -> String {
    let d = digits(phone);
    if d.len() == 10 {
        format!("({}) {}-{}", &d[..3], &d[3..6], &d[6..])
    } else {
        phone.to_string()
    }
}

/// Trim, drop angle brackets and cap at 1000 characters
pub fn sanitize_input(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .take(MAX_INPUT_CHARS)
        .collect()
}

/// Cut to `max_chars` characters and append `...` when anything was removed
///
/// # Examples
/// ```
/// use servicefinder::logic::formatting::truncate_text;
///
/// assert_eq!(truncate_text("Leak repairs", 4), "Leak...");
/// assert_eq!(truncate_text("Leak", 4), "Leak");
/// ```
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Absolute http(s) URL
pub fn is_valid_url(url: &str) -> bool {
    Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Compact star bar for a 0-5 rating, rounded to whole stars
///
/// # Examples
/// ```
/// use servicefinder::logic::formatting::format_stars;
///
/// assert_eq!(format_stars(4.4), "★★★★☆");
/// assert_eq!(format_stars(0.0), "☆☆☆☆☆");
/// ```
pub fn format_stars(rating: f64) -> String {
    let filled = rating.round().clamp(0.0, 5.0) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}
