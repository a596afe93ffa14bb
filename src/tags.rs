use std::collections::{BTreeMap, BTreeSet};

/// Anything carrying a set of author-assigned tags.
pub trait Tagged {
    fn tags(&self) -> &[String];

    fn has_tag(&self, tag: &str) -> bool {
        self.tags().iter().any(|t| t == tag)
    }
}

/// Keeps the items carrying every selected tag. An empty selection keeps everything.
/// Comparison is exact and case-sensitive.
pub fn filter_by_tags<'a, T: Tagged>(items: &'a [T], selected: &[String]) -> Vec<&'a T> {
    items.iter()
        .filter(|item| selected.iter().all(|tag| item.has_tag(tag)))
        .collect()
}

/// Sorted, de-duplicated union of the tags of all items.
pub fn all_tags<T: Tagged>(items: &[T]) -> Vec<String> {
    let tags: BTreeSet<&String> = items.iter()
        .flat_map(|item| item.tags().iter())
        .collect();
    tags.into_iter().cloned().collect()
}

/// Number of items carrying each tag, sorted by tag.
pub fn tag_counts<T: Tagged>(items: &[T]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&String, usize> = BTreeMap::new();
    for item in items {
        let unique: BTreeSet<&String> = item.tags().iter().collect();
        for tag in unique {
            *counts.entry(tag).or_insert(0) += 1;
        }
    }
    counts.into_iter().map(|(tag, count)| (tag.clone(), count)).collect()
}

/// The listing UI is single-select: a requested tag nobody uses selects nothing.
pub fn selection_from_query<T: Tagged>(items: &[T], tag: Option<String>) -> Vec<String> {
    match tag {
        Some(tag) if items.iter().any(|item| item.has_tag(&tag)) => vec![tag],
        _ => vec![],
    }
}
