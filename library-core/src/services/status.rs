//! Status service - registry summaries

use rust_decimal::Decimal;
use serde::Serialize;

use super::library::LibrarySystem;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub total_books: usize,
    pub available_books: usize,
    pub borrowed_books: usize,
    pub total_users: usize,
    pub blocked_users: usize,
    pub open_loans: usize,
    pub overdue_loans: usize,
    pub outstanding_fines: Decimal,
}

impl LibrarySystem {
    /// Get overall status summary, evaluated at the registry's clock
    pub fn status(&self) -> StatusSummary {
        let available_books = self.books().iter().filter(|b| b.is_available()).count();

        StatusSummary {
            total_books: self.books().len(),
            available_books,
            borrowed_books: self.books().len() - available_books,
            total_users: self.users().len(),
            blocked_users: self.users().iter().filter(|u| u.is_blocked()).count(),
            open_loans: self.open_loans().len(),
            overdue_loans: self.overdue_loans().len(),
            outstanding_fines: self.total_outstanding_fines(),
        }
    }
}
