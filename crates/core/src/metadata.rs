//! Book structure consumed by the engine.
//!
//! The engine owns no biblical data. Everything it knows about books,
//! chapters and verse counts comes through [`MetadataProvider`].

use crate::id::BookId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Canonical grouping of books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Testament {
    /// Old Testament
    #[serde(rename = "OT")]
    Old,
    /// New Testament
    #[serde(rename = "NT")]
    New,
}

impl Testament {
    /// Short code used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Testament::Old => "OT",
            Testament::New => "NT",
        }
    }
}

/// Source of book structure and canonical order.
pub trait MetadataProvider: Send + Sync {
    /// Testament the book belongs to, `None` for unknown books.
    fn testament(&self, book: &BookId) -> Option<Testament>;

    /// Number of chapters in the book, 0 for unknown books.
    fn total_chapters(&self, book: &BookId) -> u32;

    /// Number of verses in a chapter, 0 when unknown.
    fn total_verses(&self, book: &BookId, chapter: u32) -> u32;

    /// All books in canonical reading order.
    fn list_books(&self) -> Vec<BookId>;
}

impl<T: MetadataProvider + ?Sized> MetadataProvider for Arc<T> {
    fn testament(&self, book: &BookId) -> Option<Testament> {
        (**self).testament(book)
    }

    fn total_chapters(&self, book: &BookId) -> u32 {
        (**self).total_chapters(book)
    }

    fn total_verses(&self, book: &BookId, chapter: u32) -> u32 {
        (**self).total_verses(book, chapter)
    }

    fn list_books(&self) -> Vec<BookId> {
        (**self).list_books()
    }
}

/// Errors raised while building a canon.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// Canon document is not valid JSON or has the wrong shape
    #[error("invalid canon document: {0}")]
    Json(#[from] serde_json::Error),

    /// The same book id appears twice
    #[error("duplicate book id: {0}")]
    DuplicateBook(BookId),

    /// A book declares no chapters
    #[error("book {0} has no chapters")]
    EmptyBook(BookId),
}

/// Structure of one book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInfo {
    /// Book id
    pub id: BookId,

    /// Testament the book belongs to
    pub testament: Testament,

    /// Verse count of chapter `i + 1` at index `i`
    pub verses: Vec<u32>,
}

impl BookInfo {
    /// Describe a book.
    pub fn new(id: impl Into<BookId>, testament: Testament, verses: Vec<u32>) -> Self {
        Self {
            id: id.into(),
            testament,
            verses,
        }
    }
}

#[derive(Deserialize)]
struct CanonDocument {
    books: Vec<BookInfo>,
}

/// In-memory canon, ordered as given.
#[derive(Debug, Clone, Default)]
pub struct CanonMetadata {
    books: Vec<BookInfo>,
    index: HashMap<BookId, usize>,
}

impl CanonMetadata {
    /// Build a canon from books listed in reading order.
    pub fn new(books: Vec<BookInfo>) -> Result<Self, MetadataError> {
        let mut index = HashMap::with_capacity(books.len());
        for (pos, book) in books.iter().enumerate() {
            if book.verses.is_empty() {
                return Err(MetadataError::EmptyBook(book.id.clone()));
            }
            if index.insert(book.id.clone(), pos).is_some() {
                return Err(MetadataError::DuplicateBook(book.id.clone()));
            }
        }
        Ok(Self { books, index })
    }

    /// Parse a canon document: `{ "books": [ { "id", "testament", "verses" } ] }`.
    pub fn from_json(json: &str) -> Result<Self, MetadataError> {
        let doc: CanonDocument = serde_json::from_str(json)?;
        Self::new(doc.books)
    }

    /// Look up a book.
    pub fn book(&self, id: &BookId) -> Option<&BookInfo> {
        self.index.get(id).map(|pos| &self.books[*pos])
    }

    /// Number of books.
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Whether the canon has no books.
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

impl MetadataProvider for CanonMetadata {
    fn testament(&self, book: &BookId) -> Option<Testament> {
        self.book(book).map(|b| b.testament)
    }

    fn total_chapters(&self, book: &BookId) -> u32 {
        self.book(book).map_or(0, |b| b.verses.len() as u32)
    }

    fn total_verses(&self, book: &BookId, chapter: u32) -> u32 {
        if chapter == 0 {
            return 0;
        }
        self.book(book)
            .and_then(|b| b.verses.get(chapter as usize - 1))
            .copied()
            .unwrap_or(0)
    }

    fn list_books(&self) -> Vec<BookId> {
        self.books.iter().map(|b| b.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CanonMetadata {
        CanonMetadata::from_json(
            r#"{"books": [
                {"id": "GEN", "testament": "OT", "verses": [31, 25, 24]},
                {"id": "MAT", "testament": "NT", "verses": [25, 23]}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_lookup() {
        let canon = sample();
        let gen = BookId::new("GEN");
        assert_eq!(canon.testament(&gen), Some(Testament::Old));
        assert_eq!(canon.total_chapters(&gen), 3);
        assert_eq!(canon.total_verses(&gen, 2), 25);
        assert_eq!(canon.total_verses(&gen, 0), 0);
        assert_eq!(canon.total_verses(&gen, 4), 0);
        assert_eq!(canon.list_books(), vec![gen, BookId::new("MAT")]);
    }

    #[test]
    fn test_unknown_book() {
        let canon = sample();
        let x = BookId::new("XYZ");
        assert_eq!(canon.testament(&x), None);
        assert_eq!(canon.total_chapters(&x), 0);
    }

    #[test]
    fn test_rejects_duplicates_and_empty_books() {
        let dup = CanonMetadata::new(vec![
            BookInfo::new("GEN", Testament::Old, vec![1]),
            BookInfo::new("GEN", Testament::Old, vec![1]),
        ]);
        assert!(matches!(dup, Err(MetadataError::DuplicateBook(_))));

        let empty = CanonMetadata::new(vec![BookInfo::new("GEN", Testament::Old, vec![])]);
        assert!(matches!(empty, Err(MetadataError::EmptyBook(_))));
    }

    #[test]
    fn test_rejects_bad_testament() {
        let bad = CanonMetadata::from_json(r#"{"books":[{"id":"GEN","testament":"XX","verses":[1]}]}"#);
        assert!(matches!(bad, Err(MetadataError::Json(_))));
    }
}
