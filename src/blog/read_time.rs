use lazy_static::lazy_static;
use regex::Regex;

const WORDS_PER_MINUTE: u64 = 250;
const SECONDS_PER_IMAGE: u64 = 10;

pub fn count_words(body: &str) -> usize {
    body.split_whitespace().count()
}

/// Markdown `![alt](src)` images plus raw `<img>` tags.
pub fn count_images(body: &str) -> usize {
    lazy_static! {
        static ref MD_IMAGE_REGEX: Regex = Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap();
        static ref HTML_IMAGE_REGEX: Regex = Regex::new(r"(?i)<img\b").unwrap();
    }

    MD_IMAGE_REGEX.find_iter(body).count() + HTML_IMAGE_REGEX.find_iter(body).count()
}

/// Reading time label for a post body, e.g. "3 min read".
pub fn estimate(body: &str) -> String {
    label(count_words(body), count_images(body))
}

pub fn label(words: usize, images: usize) -> String {
    // Everything scaled to "words per minute" seconds to stay in integers.
    let scaled = words as u64 * 60 + images as u64 * SECONDS_PER_IMAGE * WORDS_PER_MINUTE;
    let per_minute = 60 * WORDS_PER_MINUTE;

    if scaled < per_minute {
        return "Less than 1 min read".to_string();
    }
    let minutes = scaled.div_ceil(per_minute);
    format!("{} min read", minutes)
}
