//! Identifiers for books and chapters.

use serde::{Deserialize, Serialize};

/// Identifier of a book in the canon (e.g. `"GEN"`, `"JHN"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    /// Create a book id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for BookId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<&str> for BookId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BookId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for BookId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reference to one chapter of one book.
///
/// Chapters are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BibleRef {
    /// Book the chapter belongs to
    pub book_id: BookId,

    /// Chapter number, starting at 1
    pub chapter: u32,
}

impl BibleRef {
    /// Create a new chapter reference.
    pub fn new(book_id: impl Into<BookId>, chapter: u32) -> Self {
        Self {
            book_id: book_id.into(),
            chapter,
        }
    }
}

impl std::fmt::Display for BibleRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.book_id, self.chapter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bible_ref_serializes_camel_case() {
        let r = BibleRef::new("GEN", 3);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json, serde_json::json!({"bookId": "GEN", "chapter": 3}));
    }

    #[test]
    fn test_book_id_display_and_parse() {
        let id: BookId = "JHN".parse().unwrap();
        assert_eq!(id.to_string(), "JHN");
        assert_eq!(BibleRef::new(id, 1).to_string(), "JHN 1");
    }
}
