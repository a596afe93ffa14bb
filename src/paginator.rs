/// Fixed-size pages over a slice. Pages are numbered from 1.
pub struct Paginator<'a, T> {
    items: &'a [T],
    page_size: usize,
}

impl<'a, T> Paginator<'a, T> {
    pub fn from(items: &'a [T], page_size: u32) -> Self {
        Paginator {
            items,
            page_size: page_size.max(1) as usize,
        }
    }

    /// Zero for an empty slice.
    pub fn page_count(&self) -> u32 {
        self.items.len().div_ceil(self.page_size) as u32
    }

    /// Out of range pages fall back to the first one.
    pub fn clamp_page(&self, page: u32) -> u32 {
        if page == 0 || page > self.page_count() { 1 } else { page }
    }

    pub fn get_page(&self, page: u32) -> Result<&'a [T], String> {
        if page == 0 {
            return Err("Page has to be greater than 0".to_string());
        }
        self.items.chunks(self.page_size)
            .nth(page as usize - 1)
            .ok_or_else(|| format!("Page {} is past the last page ({})", page, self.page_count()))
    }
}
