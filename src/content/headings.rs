use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::text_utils::{decode_entities, slugify, strip_tags};

#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    pub id: String,
    pub text: String,
    pub level: u8,
}

struct IdAllocator {
    used: HashSet<String>,
}

impl IdAllocator {
    fn new() -> Self {
        IdAllocator { used: HashSet::new() }
    }

    fn allocate(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base = "section".to_string();
        }

        let mut id = base.clone();
        let mut n = 1;
        while self.used.contains(&id) {
            id = format!("{}-{}", base, n);
            n += 1;
        }
        self.used.insert(id.clone());
        id
    }
}

/// Gives every `<h1>`..`<h6>` a unique id plus a self-link and collects them in document order.
pub fn anchor_headings(html: &str) -> (String, Vec<TocEntry>) {
    lazy_static! {
        static ref HEADING_REGEX: Regex = Regex::new(r"(?s)<h([1-6])>(.*?)</h[1-6]>").unwrap();
        static ref LINK_REGEX: Regex = Regex::new(r"(?i)<a[\s>]").unwrap();
    }

    let mut ids = IdAllocator::new();
    let mut toc = vec![];

    let anchored = HEADING_REGEX.replace_all(html, |cap: &Captures| {
        let level = &cap[1];
        let inner = &cap[2];
        let text = decode_entities(strip_tags(inner).trim());
        let id = ids.allocate(&text);

        toc.push(TocEntry {
            id: id.clone(),
            text,
            level: level.parse().unwrap_or(1),
        });

        if LINK_REGEX.is_match(inner) {
            format!("<h{0} id=\"{1}\"><a class=\"heading-anchor\" href=\"#{1}\"></a>{2}</h{0}>", level, id, inner)
        } else {
            format!("<h{0} id=\"{1}\"><a class=\"heading-anchor\" href=\"#{1}\">{2}</a></h{0}>", level, id, inner)
        }
    });

    (anchored.to_string(), toc)
}
