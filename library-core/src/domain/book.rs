//! Book domain model

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ids::BookId;

/// Availability of a catalog entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    /// On the shelf and can be borrowed
    #[default]
    Available,
    /// Out on loan
    Borrowed,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Borrowed => "borrowed",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog entry
///
/// `status` only moves through `mark_as_borrowed` / `mark_as_returned`.
/// A transition that does not apply is a no-op reported as `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub year: i32,
    #[serde(default)]
    status: BookStatus,
}

impl Book {
    pub fn new(id: BookId, title: impl Into<String>, author: impl Into<String>, year: i32) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            year,
            status: BookStatus::Available,
        }
    }

    pub fn status(&self) -> BookStatus {
        self.status
    }

    pub fn is_available(&self) -> bool {
        self.status == BookStatus::Available
    }

    /// available -> borrowed
    pub fn mark_as_borrowed(&mut self) -> bool {
        if self.is_available() {
            self.status = BookStatus::Borrowed;
            true
        } else {
            false
        }
    }

    /// borrowed -> available
    pub fn mark_as_returned(&mut self) -> bool {
        if self.status == BookStatus::Borrowed {
            self.status = BookStatus::Available;
            true
        } else {
            false
        }
    }

    /// Case-insensitive substring match on title or author
    ///
    /// The empty query matches every book.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query) || self.author.to_lowercase().contains(&query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> Book {
        Book::new(BookId(1), "Test Book", "Author", 2020)
    }

    #[test]
    fn test_new_book_is_available() {
        let book = book();
        assert!(book.is_available());
        assert_eq!(book.status(), BookStatus::Available);
    }

    #[test]
    fn test_double_borrow() {
        let mut book = book();
        assert!(book.mark_as_borrowed());
        assert!(!book.mark_as_borrowed());
        assert_eq!(book.status(), BookStatus::Borrowed);
        assert!(!book.is_available());
    }

    #[test]
    fn test_borrow_return_round_trip() {
        let mut book = book();
        assert!(book.mark_as_borrowed());
        assert!(book.mark_as_returned());
        assert!(book.is_available());
        assert!(book.mark_as_borrowed());
    }

    #[test]
    fn test_return_when_available_is_noop() {
        let mut book = book();
        assert!(!book.mark_as_returned());
        assert_eq!(book.status(), BookStatus::Available);
    }

    #[test]
    fn test_matches_title_and_author() {
        let book = Book::new(BookId(2), "Another Book", "Other Author", 1999);
        assert!(book.matches("another"));
        assert!(book.matches("AUTHOR"));
        assert!(book.matches(""));
        assert!(!book.matches("test"));
    }

    #[test]
    fn test_status_serialization() {
        let mut book = book();
        book.mark_as_borrowed();
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["status"], "borrowed");
        assert_eq!(BookStatus::Available.to_string(), "available");

        let parsed: Book = serde_json::from_str(
            r#"{"id": 9, "title": "T", "author": "A", "year": 2001}"#,
        )
        .unwrap();
        assert!(parsed.is_available());
    }
}
