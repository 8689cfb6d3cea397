//! Common utility functions shared across the codebase.

use chrono::{SecondsFormat, Utc};

/// Environment variable that pins the run clock for reproducible output.
pub const TIMESTAMP_ENV: &str = "MSGGEN_TIMESTAMP";

/// Collapse all runs of whitespace (including newlines) to single spaces
/// and trim the ends.
///
/// # Examples
///
/// ```
/// use msggen::utils::collapse_whitespace;
///
/// assert_eq!(collapse_whitespace("Seg\nlvl"), "Seg lvl");
/// assert_eq!(collapse_whitespace("  Field   Name \r\n"), "Field Name");
/// assert_eq!(collapse_whitespace(""), "");
/// ```
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Current time as an ISO-8601 UTC string, honoring `MSGGEN_TIMESTAMP`
/// when set (used for reproducible runs and determinism tests).
pub fn now_iso8601() -> String {
    if let Ok(pinned) = std::env::var(TIMESTAMP_ENV) {
        if !pinned.trim().is_empty() {
            return pinned.trim().to_string();
        }
    }
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Upper-case the first character of a string, leaving the rest alone.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Lower-case the first character of a string, leaving the rest alone.
pub fn decapitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Convert a camel-case identifier to kebab-case for URL paths.
///
/// ```
/// use msggen::utils::kebab_case;
///
/// assert_eq!(kebab_case("createApplication"), "create-application");
/// assert_eq!(kebab_case("CBACardQuery"), "cbacard-query");
/// ```
pub fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
    }
    out
}
