// ABOUTME: Book catalog mapping quote titles to links for attribution
// ABOUTME: Loaded from the [books] config table; matching ignores case and surrounding space

use quoordinates_core::traits::BookLookup;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct BookCatalog {
    links: HashMap<String, String>,
}

fn normalize(title: &str) -> String {
    title.trim().to_lowercase()
}

impl BookCatalog {
    pub fn new(books: &HashMap<String, String>) -> Self {
        let links = books
            .iter()
            .map(|(title, url)| (normalize(title), url.clone()))
            .collect();
        Self { links }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl BookLookup for BookCatalog {
    fn lookup(&self, title: &str) -> Option<String> {
        self.links.get(&normalize(title)).cloned()
    }
}
