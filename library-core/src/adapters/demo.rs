//! Demo data for onboarding and manual testing
//!
//! A small fixed catalog and two reader accounts. Demo passwords are public
//! by construction; never enable demo mode on a real installation.

use crate::domain::{Book, BookId, UserId};

/// Password shared by every demo account
pub const DEMO_PASSWORD: &str = "demo-password";

/// A demo account before its credential is hashed
#[derive(Debug, Clone)]
pub struct DemoUser {
    pub id: UserId,
    pub email: &'static str,
    pub role: &'static str,
}

/// Generate the demo catalog
pub fn generate_demo_books() -> Vec<Book> {
    vec![
        Book::new(BookId(1), "The Rust Programming Language", "Steve Klabnik", 2018),
        Book::new(BookId(2), "Programming Rust", "Jim Blandy", 2021),
        Book::new(BookId(3), "Rust for Rustaceans", "Jon Gjengset", 2021),
        Book::new(BookId(4), "The Pragmatic Programmer", "Andrew Hunt", 1999),
        Book::new(BookId(5), "Designing Data-Intensive Applications", "Martin Kleppmann", 2017),
        Book::new(BookId(6), "Structure and Interpretation of Computer Programs", "Harold Abelson", 1985),
    ]
}

/// Generate the demo accounts
pub fn generate_demo_users() -> Vec<DemoUser> {
    vec![
        DemoUser {
            id: UserId(1),
            email: "reader@demo.library",
            role: "reader",
        },
        DemoUser {
            id: UserId(2),
            email: "librarian@demo.library",
            role: "librarian",
        },
    ]
}
