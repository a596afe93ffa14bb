use std::collections::HashSet;

use crate::content::TocEntry;

/// Table of contents that follows which heading the reader is looking at.
#[derive(Debug, Clone)]
pub struct TableOfContents {
    entries: Vec<TocEntry>,
    active: Option<usize>,
}

impl TableOfContents {
    pub fn new(entries: Vec<TocEntry>) -> Self {
        TableOfContents { entries, active: None }
    }

    pub fn entries(&self) -> &[TocEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.map(|i| self.entries[i].id.as_str())
    }

    /// Takes the ids currently in view. The first visible heading in document order becomes
    /// active; with nothing visible the previous one stays.
    pub fn update_visible<'a, I>(&mut self, visible_ids: I) -> Option<&str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let visible: HashSet<&str> = visible_ids.into_iter().collect();
        if let Some(pos) = self.entries.iter().position(|e| visible.contains(e.id.as_str())) {
            self.active = Some(pos);
        }
        self.active_id()
    }

    /// Clicking an entry jumps straight to it.
    pub fn select(&mut self, id: &str) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(pos) => {
                self.active = Some(pos);
                true
            }
            None => false,
        }
    }
}
