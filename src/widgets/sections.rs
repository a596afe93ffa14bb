use crate::content::CollapsibleSection;

/// Open/closed state of every collapsible block on a page, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionToggles {
    sections: Vec<CollapsibleSection>,
    open: Vec<bool>,
}

impl SectionToggles {
    pub fn new(sections: Vec<CollapsibleSection>) -> Self {
        let open = sections.iter().map(|s| s.open).collect();
        SectionToggles { sections, open }
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn title(&self, index: usize) -> Option<&str> {
        self.sections.get(index).map(|s| s.title.as_str())
    }

    pub fn is_open(&self, index: usize) -> bool {
        self.open.get(index).copied().unwrap_or(false)
    }

    /// Flips a section and returns its new state. Unknown indexes stay closed.
    pub fn toggle(&mut self, index: usize) -> bool {
        match self.open.get_mut(index) {
            Some(open) => {
                *open = !*open;
                *open
            }
            None => false,
        }
    }

    pub fn set_all(&mut self, open: bool) {
        self.open.iter_mut().for_each(|o| *o = open);
    }

    /// Back to the state the page was rendered with.
    pub fn reset(&mut self) {
        for (open, section) in self.open.iter_mut().zip(self.sections.iter()) {
            *open = section.open;
        }
    }
}
