//! HTTP cache control module
//!
//! Provides `ETag` generation, HTTP date handling and conditional request checks.

use chrono::{DateTime, NaiveDateTime, Utc};
use sha2::{Digest, Sha256};

/// Cache-Control applied to every bundled asset
pub const ASSET_CACHE_CONTROL: &str = "public, must-revalidate, max-age=600";

/// IMF-fixdate layout used by `Last-Modified` and friends
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";
const RFC850_FORMAT: &str = "%A, %d-%b-%y %H:%M:%S GMT";
const ASCTIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Generate `ETag` from a SHA-256 digest of the content
///
/// # Arguments
/// * `content` - File content
///
/// # Returns
/// Quoted lowercase hex `ETag` string, stable across processes and builds
pub fn generate_etag(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    format!("\"{hex}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Single value, byte-for-byte comparison.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| client_etag == etag)
}

/// How entity tags in a list are compared against the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagComparison {
    /// `If-Match`: weak tags never match
    Strong,
    /// `If-None-Match`: the `W/` prefix is ignored
    Weak,
}

/// Whether a comma-separated entity tag list (or `*`) names `etag`
pub fn etag_list_matches(list: &str, etag: &str, comparison: TagComparison) -> bool {
    list.split(',')
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty())
        .any(|candidate| {
            if candidate == "*" {
                return true;
            }
            match candidate.strip_prefix("W/") {
                Some(opaque) => comparison == TagComparison::Weak && opaque == etag,
                None => candidate == etag,
            }
        })
}

/// Format a timestamp as an HTTP date
pub fn format_http_date(time: &DateTime<Utc>) -> String {
    time.format(HTTP_DATE_FORMAT).to_string()
}

/// Parse an HTTP date; `None` when malformed
///
/// Accepts IMF-fixdate and the obsolete RFC 850 and asctime layouts.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }
    [RFC850_FORMAT, ASCTIME_FORMAT]
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(value, layout).ok())
        .map(|naive| naive.and_utc())
}

/// Compare the last modification time against a date header
///
/// `Some(true)` when the resource changed after the given date, `None` when
/// the header is absent or unparseable. Both sides are compared in whole
/// seconds.
pub fn modified_since(header: Option<&str>, last_modified: &DateTime<Utc>) -> Option<bool> {
    header
        .and_then(parse_http_date)
        .map(|date| last_modified.timestamp() > date.timestamp())
}

/// `If-Range` check: true when a Range header may be honoured
///
/// An entity tag must strongly equal the current `ETag`; a date must equal
/// the last modification time exactly.
pub fn if_range_allows(if_range: Option<&str>, etag: &str, last_modified: &DateTime<Utc>) -> bool {
    let Some(value) = if_range.map(str::trim) else {
        return true;
    };

    if value.starts_with('"') || value.starts_with("W/") {
        return value == etag;
    }

    parse_http_date(value).is_some_and(|date| last_modified.timestamp() == date.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn bundled() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_generate_etag() {
        let etag = generate_etag(b"hello world");
        assert_eq!(
            etag,
            "\"b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9\""
        );
    }

    #[test]
    fn test_etag_consistency() {
        let etag1 = generate_etag(b"same content");
        let etag2 = generate_etag(b"same content");
        assert_eq!(etag1, etag2);
    }

    #[test]
    fn test_etag_difference() {
        let etag1 = generate_etag(b"content a");
        let etag2 = generate_etag(b"content b");
        assert_ne!(etag1, etag2);
    }

    #[test]
    fn test_check_etag_match() {
        let etag = "\"abc123\"";
        assert!(check_etag_match(Some("\"abc123\""), etag));
        assert!(!check_etag_match(Some("\"xyz\", \"abc123\""), etag));
        assert!(!check_etag_match(Some("*"), etag));
        assert!(!check_etag_match(Some("abc123"), etag));
        assert!(!check_etag_match(None, etag));
    }

    #[test]
    fn test_etag_list_matches() {
        let etag = "\"abc\"";
        assert!(etag_list_matches("\"abc\"", etag, TagComparison::Strong));
        assert!(etag_list_matches("\"x\", \"abc\"", etag, TagComparison::Strong));
        assert!(etag_list_matches("*", etag, TagComparison::Strong));
        assert!(!etag_list_matches("W/\"abc\"", etag, TagComparison::Strong));
        assert!(etag_list_matches("W/\"abc\"", etag, TagComparison::Weak));
        assert!(etag_list_matches("\"x\",W/\"abc\"", etag, TagComparison::Weak));
        assert!(!etag_list_matches("\"x\", \"y\"", etag, TagComparison::Weak));
        assert!(!etag_list_matches("abc", etag, TagComparison::Weak));
    }

    #[test]
    fn test_http_date() {
        let formatted = format_http_date(&bundled());
        assert_eq!(formatted, "Fri, 01 Mar 2024 12:30:00 GMT");
        assert_eq!(parse_http_date(&formatted), Some(bundled()));
        assert_eq!(parse_http_date("yesterday"), None);
    }

    #[test]
    fn test_obsolete_http_dates() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 15, 12, 30, 0).unwrap();
        assert_eq!(
            parse_http_date("Friday, 15-Mar-24 12:30:00 GMT"),
            Some(expected)
        );
        assert_eq!(parse_http_date("Fri Mar 15 12:30:00 2024"), Some(expected));
        assert_eq!(
            parse_http_date("Fri Mar  1 12:30:00 2024"),
            Some(bundled())
        );
    }

    #[test]
    fn test_modified_since() {
        let t = bundled();
        let same = format_http_date(&t);
        let later = format_http_date(&(t + Duration::hours(1)));
        let earlier = format_http_date(&(t - Duration::hours(1)));

        assert_eq!(modified_since(Some(&same), &t), Some(false));
        assert_eq!(modified_since(Some(&later), &t), Some(false));
        assert_eq!(modified_since(Some(&earlier), &t), Some(true));
        assert_eq!(modified_since(Some("garbage"), &t), None);
        assert_eq!(modified_since(None, &t), None);
    }

    #[test]
    fn test_if_range() {
        let t = bundled();
        let etag = "\"abc\"";
        assert!(if_range_allows(None, etag, &t));
        assert!(if_range_allows(Some("\"abc\""), etag, &t));
        assert!(!if_range_allows(Some("\"old\""), etag, &t));
        assert!(!if_range_allows(Some("W/\"abc\""), etag, &t));
        assert!(if_range_allows(Some(&format_http_date(&t)), etag, &t));
        assert!(!if_range_allows(
            Some(&format_http_date(&(t - Duration::seconds(1)))),
            etag,
            &t
        ));
        assert!(!if_range_allows(
            Some(&format_http_date(&(t + Duration::seconds(1)))),
            etag,
            &t
        ));
        assert!(!if_range_allows(Some("not a date"), etag, &t));
    }
}
