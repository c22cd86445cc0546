//! Pure helpers behind the public project and photo grids.

use serde::Serialize;

use crate::entities::document::{ContentKind, Document};

/// Sentinel label that disables filtering.
pub const ALL_LABEL: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Category(String),
}

impl CategoryFilter {
    /// Maps a UI tab label onto the category tag stored in documents.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.is_empty() || label.eq_ignore_ascii_case(ALL_LABEL) {
            return CategoryFilter::All;
        }

        let tag = match label.to_lowercase().as_str() {
            "websites" | "website" | "web" => "web".to_string(),
            "games" | "game" | "game dev" | "gamedev" => "games".to_string(),
            "mobile" | "apps" | "mobile apps" => "mobile".to_string(),
            other => other.to_string(),
        };
        CategoryFilter::Category(tag)
    }

    pub fn matches(&self, category: Option<&str>) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Category(tag) => category == Some(tag.as_str()),
        }
    }
}

/// Linear scan keeping input order.
pub fn filter_by_category<K: ContentKind>(
    items: Vec<Document<K>>,
    filter: &CategoryFilter,
) -> Vec<Document<K>> {
    if *filter == CategoryFilter::All {
        return items;
    }
    items
        .into_iter()
        .filter(|doc| filter.matches(doc.data.category()))
        .collect()
}

const TILE_PATTERN: [&str; 20] = [
    "col-span-2 row-span-2",
    "col-span-1 row-span-1",
    "col-span-1 row-span-2",
    "col-span-1 row-span-1",
    "col-span-2 row-span-1",
    "col-span-1 row-span-1",
    "col-span-1 row-span-1",
    "col-span-1 row-span-2",
    "col-span-2 row-span-1",
    "col-span-1 row-span-1",
    "col-span-1 row-span-1",
    "col-span-2 row-span-2",
    "col-span-1 row-span-1",
    "col-span-1 row-span-2",
    "col-span-1 row-span-1",
    "col-span-2 row-span-1",
    "col-span-1 row-span-1",
    "col-span-1 row-span-1",
    "col-span-1 row-span-2",
    "col-span-2 row-span-1",
];

/// Length of the repeating tile cycle.
pub const TILE_PERIOD: usize = TILE_PATTERN.len();

/// Span classes for the tile at `index`. Depends on nothing but the index so
/// server and client rendering agree.
pub fn tile_class(index: usize) -> &'static str {
    TILE_PATTERN[index % TILE_PERIOD]
}

#[derive(Debug, Serialize)]
pub struct Tiled<T> {
    pub tile: &'static str,
    #[serde(flatten)]
    pub item: T,
}

pub fn with_tiles<T>(items: Vec<T>) -> Vec<Tiled<T>> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| Tiled { tile: tile_class(index), item })
        .collect()
}
