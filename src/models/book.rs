//! Book data structures.

use serde::{Deserialize, Serialize};

/// Placeholder title when extraction yields no usable text.
pub const TITLE_MISSING: &str = "title missing";
/// Placeholder author when extraction yields no usable text.
pub const AUTHOR_MISSING: &str = "author missing";
/// Placeholder description when extraction yields no usable text.
pub const DESCRIPTION_MISSING: &str = "description missing";
/// Placeholder image URL when extraction yields no usable text.
pub const IMAGE_MISSING: &str = "image missing";

/// A single entry of the fetched bestseller list: position plus the
/// resolved link to its detail page. Rebuilt from scratch every cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedLink {
    /// 1-based position in the bestseller list
    pub rank: u32,

    /// Absolute URL of the detail page
    pub url: String,
}

/// A book as extracted from a detail page and persisted in the catalog.
///
/// `isbn` is the natural key used for deduplication and merging; it is the
/// empty string when the detail page carried no recognizable ISBN. The
/// descriptive fields may hold sentinel placeholders when extraction came
/// up empty after all attempts; callers must treat those as ordinary data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    /// 13-digit ISBN, or empty when the page carried none
    #[serde(default)]
    pub isbn: String,

    /// Book title
    pub title: String,

    /// Author display string
    pub author: String,

    /// Plain-text description with markup stripped
    pub description: String,

    /// Cover image URL
    pub image_url: String,

    /// Current bestseller rank; `None` for unranked catalog entries
    #[serde(default)]
    pub rank: Option<u32>,

    /// Number of users who favorited this book
    #[serde(default)]
    pub favorite_count: u32,

    /// Storage-assigned identifier; `None` until first persisted
    #[serde(default)]
    pub local_id: Option<u64>,
}

impl Book {
    /// Whether this record carries a usable natural key.
    pub fn has_isbn(&self) -> bool {
        !self.isbn.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_isbn() {
        let mut book = Book {
            isbn: "9780000000000".to_string(),
            title: "Test".to_string(),
            author: "Author".to_string(),
            description: "Desc".to_string(),
            image_url: "https://example.com/cover.jpg".to_string(),
            rank: Some(1),
            favorite_count: 0,
            local_id: None,
        };
        assert!(book.has_isbn());

        book.isbn.clear();
        assert!(!book.has_isbn());
    }

    #[test]
    fn test_serde_defaults_for_optional_fields() {
        let json = r#"{
            "title": "T",
            "author": "A",
            "description": "D",
            "image_url": "I"
        }"#;
        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.isbn, "");
        assert_eq!(book.rank, None);
        assert_eq!(book.favorite_count, 0);
        assert_eq!(book.local_id, None);
    }
}
