use pixdrop_core::GalleryItem;

/// Client-side view of the gallery: newest first, filtered by a search term.
#[derive(Debug, Clone, Default)]
pub struct GalleryView {
    items: Vec<GalleryItem>,
    search: String,
}

impl GalleryView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole item set. Items without a timestamp sort last.
    pub fn replace(&mut self, mut items: Vec<GalleryItem>) {
        items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        self.items = items;
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = term.trim().to_lowercase();
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// Items matching the current search term, in display order.
    pub fn visible(&self) -> Vec<GalleryItem> {
        if self.search.is_empty() {
            return self.items.clone();
        }
        self.items
            .iter()
            .filter(|item| item.search_text().contains(&self.search))
            .cloned()
            .collect()
    }
}
