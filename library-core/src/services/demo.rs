//! Demo service - seed a registry with sample data
//!
//! Demo mode provides a small catalog and two accounts for trying out the
//! lending workflow without entering real members.

use crate::adapters::demo::{generate_demo_books, generate_demo_users, DEMO_PASSWORD};
use crate::domain::result::Result;

use super::library::LibrarySystem;

/// Demo service for seeding sample data
#[derive(Debug, Default, Clone, Copy)]
pub struct DemoService;

impl DemoService {
    pub fn new() -> Self {
        Self
    }

    /// Add the demo catalog and accounts
    ///
    /// Every demo account logs in with [`DEMO_PASSWORD`].
    pub fn seed(&self, library: &mut LibrarySystem) -> Result<()> {
        for book in generate_demo_books() {
            library.add_book(book);
        }
        for user in generate_demo_users() {
            library.register_user(user.id, user.email, user.role, DEMO_PASSWORD)?;
        }
        tracing::debug!(
            books = library.books().len(),
            users = library.users().len(),
            "seeded demo data"
        );
        Ok(())
    }
}
