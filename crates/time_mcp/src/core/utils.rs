use chrono::{DateTime, TimeZone, Utc};

/// Substrings that are never allowed in a caller-supplied format
pub const DANGEROUS_PATTERNS: &[&str] = &["../", "./", "\\", "%", "$", "`", "$(", "${"];

/// Literal timezone names accepted without consulting the IANA database.
///
/// Matching is case-sensitive: `utc` is not an alias.
pub const UTC_ALIASES: &[&str] = &["UTC", "GMT"];

/// Common abbreviations accepted by validation
pub const COMMON_ABBREVIATIONS: &[&str] = &[
    "EST", "CST", "MST", "PST", "EDT", "CDT", "MDT", "PDT", "CET", "EET", "WET", "JST", "KST",
    "IST",
];

/// Format tokens and the strftime specifiers they translate to.
///
/// Longer tokens come first so that `YYYY` is never read as two `YY`.
const FORMAT_TOKENS: &[(&str, &str)] = &[
    ("YYYY", "%Y"),
    ("yyyy", "%Y"),
    ("SSS", "%3f"),
    ("YY", "%y"),
    ("yy", "%y"),
    ("MM", "%m"),
    ("DD", "%d"),
    ("dd", "%d"),
    ("HH", "%H"),
    ("hh", "%I"),
    ("mm", "%M"),
    ("ss", "%S"),
];

/// Reference instant used to self-test format strings: 2006-01-02T15:04:05Z
pub fn reference_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5)
        .single()
        .unwrap_or_default()
}

/// Find the first forbidden substring in a format string
pub fn find_dangerous_pattern(format: &str) -> Option<&'static str> {
    DANGEROUS_PATTERNS
        .iter()
        .copied()
        .find(|pattern| format.contains(pattern))
}

/// Translate a token-based format (e.g. `YYYY-MM-DD`) into a strftime layout.
///
/// Tokens are replaced wherever they occur, including inside words the caller
/// meant literally: `"MMM"` becomes `"%mM"`. Everything else is copied as-is.
pub fn translate_format(format: &str) -> String {
    let mut layout = String::with_capacity(format.len() + 8);
    let mut rest = format;

    'scan: while !rest.is_empty() {
        for (token, specifier) in FORMAT_TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                layout.push_str(specifier);
                rest = tail;
                continue 'scan;
            }
        }

        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            layout.push(c);
        }
        rest = chars.as_str();
    }

    layout
}

/// Whether `timezone` is shaped like `±HH:MM`, `±HHMM` or a sign followed by one to four digits.
///
/// Only the shape is checked; `+9999` passes.
pub fn is_utc_offset(timezone: &str) -> bool {
    let Some(body) = timezone
        .strip_prefix('+')
        .or_else(|| timezone.strip_prefix('-'))
    else {
        return false;
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    match body.split_once(':') {
        Some((hours, minutes)) => {
            hours.len() == 2 && minutes.len() == 2 && all_digits(hours) && all_digits(minutes)
        }
        None => body.len() <= 4 && all_digits(body),
    }
}

/// Whether a timezone matches one of the formats recognized without the IANA database
pub fn is_recognized_timezone_format(timezone: &str) -> bool {
    UTC_ALIASES.contains(&timezone)
        || is_utc_offset(timezone)
        || COMMON_ABBREVIATIONS.contains(&timezone)
}
