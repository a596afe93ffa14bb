use chrono::{DateTime, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;

const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Parses the date strings authors put in front-matter.
/// Accepts a plain date, a date with time, or a full RFC 3339 timestamp.
pub fn parse_date_time(buf: &str) -> Option<NaiveDateTime> {
    let buf = buf.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(buf) {
        return Some(dt.naive_utc());
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(buf, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(buf, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// "2023-03-05" becomes "March 5, 2023". Unparseable input is returned as is.
pub fn format_long_date(buf: &str) -> String {
    match parse_date_time(buf) {
        Some(dt) => dt.format("%B %-d, %Y").to_string(),
        None => buf.to_string(),
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    escaped
}

pub fn strip_tags(html: &str) -> String {
    lazy_static! {
        static ref TAG_REGEX: Regex = Regex::new(r"<[^>]*>").unwrap();
    }
    TAG_REGEX.replace_all(html, "").to_string()
}

pub fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Anchor slug for a heading: ASCII, lowercase, dash separated.
pub fn slugify(text: &str) -> String {
    let ascii = unidecode::unidecode(text).to_lowercase();

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else if c.is_whitespace() {
            pending_dash = true;
        }
    }
    slug
}
