//! Library registry - catalog, members and loans
//!
//! Owns every entity. Entities never reach back into the registry; loans
//! point at users and books by id and are resolved here.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::adapters::SystemClock;
use crate::domain::result::{Error, Result};
use crate::domain::{Argon2Params, Book, BookId, Loan, LoanId, LoanPolicy, User, UserId};
use crate::ports::Clock;
use crate::services::logging::{LogEvent, LoggingService};

/// The lending registry
///
/// Collections keep insertion order. Ids are assumed unique; nothing here
/// enforces it, and lookups return the first match.
pub struct LibrarySystem {
    books: Vec<Book>,
    users: Vec<User>,
    loans: Vec<Loan>,
    next_loan_id: u64,
    policy: LoanPolicy,
    credentials: Argon2Params,
    clock: Arc<dyn Clock>,
    logger: Option<Arc<LoggingService>>,
}

impl fmt::Debug for LibrarySystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibrarySystem")
            .field("books", &self.books.len())
            .field("users", &self.users.len())
            .field("loans", &self.loans.len())
            .field("next_loan_id", &self.next_loan_id)
            .field("policy", &self.policy)
            .field("has_logger", &self.logger.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for LibrarySystem {
    fn default() -> Self {
        Self::new()
    }
}

impl LibrarySystem {
    /// Empty registry on the system clock with default policies
    pub fn new() -> Self {
        Self {
            books: Vec::new(),
            users: Vec::new(),
            loans: Vec::new(),
            next_loan_id: 1,
            policy: LoanPolicy::default(),
            credentials: Argon2Params::default(),
            clock: Arc::new(SystemClock),
            logger: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_policy(mut self, policy: LoanPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Cost parameters used by `register_user`
    pub fn with_credentials(mut self, params: Argon2Params) -> Self {
        self.credentials = params;
        self
    }

    pub fn with_logger(mut self, logger: Arc<LoggingService>) -> Self {
        self.logger = Some(logger);
        self
    }

    fn journal(&self, event: LogEvent) {
        if let Some(logger) = &self.logger {
            logger.log(event);
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn policy(&self) -> &LoanPolicy {
        &self.policy
    }

    // === Catalog ===

    /// Append to the catalog. Duplicate ids are not checked.
    pub fn add_book(&mut self, book: Book) {
        self.journal(LogEvent::new("book_added").with_book(book.id));
        self.books.push(book);
    }

    /// Remove every book with this id. Absent ids are ignored.
    pub fn remove_book(&mut self, book_id: BookId) {
        let before = self.books.len();
        self.books.retain(|b| b.id != book_id);
        if self.books.len() < before {
            self.journal(LogEvent::new("book_removed").with_book(book_id));
        }
    }

    /// Books whose title or author contains `query`, ignoring case
    ///
    /// Results keep catalog order; the empty query returns the whole catalog.
    pub fn search_books(&self, query: &str) -> Vec<&Book> {
        self.books.iter().filter(|b| b.matches(query)).collect()
    }

    pub fn book(&self, book_id: BookId) -> Option<&Book> {
        self.books.iter().find(|b| b.id == book_id)
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    // === Users ===

    pub fn add_user(&mut self, user: User) {
        self.journal(LogEvent::new("user_added").with_user(user.id));
        self.users.push(user);
    }

    /// Create a user with the registry's credential parameters and add it
    pub fn register_user(
        &mut self,
        id: UserId,
        email: impl Into<String>,
        role: impl Into<String>,
        password: &str,
    ) -> Result<UserId> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(Error::validation("email cannot be empty"));
        }
        let user = User::new(id, email, role, password, &self.credentials)?;
        self.add_user(user);
        Ok(id)
    }

    pub fn user(&self, user_id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == user_id)
    }

    fn user_mut(&mut self, user_id: UserId) -> Result<&mut User> {
        self.users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| Error::not_found(format!("user {user_id}")))
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// First user with this exact email whose password verifies
    pub fn authenticate_user(&self, email: &str, password: &str) -> Option<&User> {
        let found = self
            .users
            .iter()
            .find(|u| u.email == email && u.login(password));

        match found {
            Some(user) => self.journal(LogEvent::new("login_succeeded").with_user(user.id)),
            None => self.journal(LogEvent::new("login_failed")),
        }
        found
    }

    /// Change a member's password; false if unknown or rejected
    pub fn change_password(&mut self, user_id: UserId, old_password: &str, new_password: &str) -> bool {
        let changed = match self.user_mut(user_id) {
            Ok(user) => user.change_password(old_password, new_password),
            Err(_) => false,
        };

        let event = if changed {
            "password_changed"
        } else {
            "password_change_rejected"
        };
        self.journal(LogEvent::new(event).with_user(user_id));
        changed
    }

    pub fn block_user(&mut self, user_id: UserId) -> Result<()> {
        self.user_mut(user_id)?.block();
        self.journal(LogEvent::new("user_blocked").with_user(user_id));
        Ok(())
    }

    pub fn unblock_user(&mut self, user_id: UserId) -> Result<()> {
        self.user_mut(user_id)?.unblock();
        self.journal(LogEvent::new("user_unblocked").with_user(user_id));
        Ok(())
    }

    // === Loans ===

    /// Lend a book to a user
    ///
    /// The book moves to borrowed and a loan stamped with the clock's time
    /// is recorded. Nothing changes on failure.
    pub fn borrow_book(&mut self, user_id: UserId, book_id: BookId) -> Result<LoanId> {
        match self.open_loan(user_id, book_id) {
            Ok(loan_id) => {
                self.journal(
                    LogEvent::new("loan_opened")
                        .with_user(user_id)
                        .with_book(book_id)
                        .with_loan(loan_id),
                );
                Ok(loan_id)
            }
            Err(e) => {
                tracing::debug!(%user_id, %book_id, error = %e, "borrow rejected");
                self.journal(
                    LogEvent::new("borrow_rejected")
                        .with_user(user_id)
                        .with_book(book_id)
                        .with_error(e.to_string()),
                );
                Err(e)
            }
        }
    }

    fn open_loan(&mut self, user_id: UserId, book_id: BookId) -> Result<LoanId> {
        let user = self
            .user(user_id)
            .ok_or_else(|| Error::not_found(format!("user {user_id}")))?;
        if user.is_blocked() {
            return Err(Error::Blocked(user_id.to_string()));
        }

        let book = self
            .books
            .iter_mut()
            .find(|b| b.id == book_id)
            .ok_or_else(|| Error::not_found(format!("book {book_id}")))?;
        if !book.mark_as_borrowed() {
            return Err(Error::Unavailable(book_id.to_string()));
        }

        let loan_id = LoanId(self.next_loan_id);
        self.next_loan_id += 1;
        let loan = Loan::opened_at(loan_id, user_id, book_id, self.clock.now(), self.policy);
        self.loans.push(loan);
        Ok(loan_id)
    }

    /// Close a loan at `at` and put its book back on the shelf
    ///
    /// Both changes happen together. A loan whose book has since left the
    /// catalog still closes.
    pub fn close_loan(&mut self, loan_id: LoanId, at: DateTime<Utc>) -> Result<()> {
        let loan = self
            .loans
            .iter_mut()
            .find(|l| l.id == loan_id)
            .ok_or_else(|| Error::not_found(format!("loan {loan_id}")))?;
        if !loan.close(at) {
            return Err(Error::LoanClosed(loan_id.to_string()));
        }
        let (user_id, book_id) = (loan.user_id, loan.book_id);

        match self.books.iter_mut().find(|b| b.id == book_id) {
            Some(book) => {
                if !book.mark_as_returned() {
                    tracing::warn!(%loan_id, %book_id, "closed loan for a book that was not borrowed");
                }
            }
            None => tracing::warn!(%loan_id, %book_id, "closed loan for a book no longer in the catalog"),
        }

        self.journal(
            LogEvent::new("loan_closed")
                .with_user(user_id)
                .with_book(book_id)
                .with_loan(loan_id),
        );
        Ok(())
    }

    /// Close a loan now
    pub fn return_book(&mut self, loan_id: LoanId) -> Result<()> {
        let now = self.clock.now();
        self.close_loan(loan_id, now)
    }

    pub fn loan(&self, loan_id: LoanId) -> Option<&Loan> {
        self.loans.iter().find(|l| l.id == loan_id)
    }

    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    pub fn open_loans(&self) -> Vec<&Loan> {
        self.loans.iter().filter(|l| l.is_open()).collect()
    }

    pub fn overdue_loans(&self) -> Vec<&Loan> {
        let now = self.clock.now();
        self.loans.iter().filter(|l| l.is_overdue_as_of(now)).collect()
    }

    pub fn loans_for_user(&self, user_id: UserId) -> Vec<&Loan> {
        self.loans.iter().filter(|l| l.user_id == user_id).collect()
    }

    /// Sum of fines currently accruing on a user's open loans
    pub fn outstanding_fines(&self, user_id: UserId) -> Decimal {
        self.sum_fines(self.loans.iter().filter(|l| l.user_id == user_id))
    }

    pub fn total_outstanding_fines(&self) -> Decimal {
        self.sum_fines(self.loans.iter())
    }

    /// Totals saturate at `Decimal::MAX`
    fn sum_fines<'a>(&self, loans: impl Iterator<Item = &'a Loan>) -> Decimal {
        let now = self.clock.now();
        loans.fold(Decimal::ZERO, |total, l| total.saturating_add(l.fine_as_of(now)))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::adapters::FixedClock;
    use crate::domain::credential::test_params;
    use crate::domain::BookStatus;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap()
    }

    fn setup() -> (LibrarySystem, Arc<FixedClock>, Arc<LoggingService>) {
        let clock = Arc::new(FixedClock::new(start()));
        let logger = Arc::new(LoggingService::new("test"));
        let mut library = LibrarySystem::new()
            .with_clock(clock.clone())
            .with_credentials(test_params())
            .with_logger(Arc::clone(&logger));

        library
            .register_user(UserId(1), "test@example.com", "reader", "password123")
            .unwrap();
        library.add_book(Book::new(BookId(1), "Test Book", "Test Author", 2020));
        library.add_book(Book::new(BookId(2), "Another Book", "Other Author", 2021));
        (library, clock, logger)
    }

    fn titles(books: &[&Book]) -> Vec<String> {
        books.iter().map(|b| b.title.clone()).collect()
    }

    #[test]
    fn test_search_by_author_and_title() {
        let (library, _, _) = setup();
        assert_eq!(titles(&library.search_books("Author")), ["Test Book", "Another Book"]);
        assert_eq!(titles(&library.search_books("Test")), ["Test Book"]);
        assert_eq!(titles(&library.search_books("other author")), ["Another Book"]);
        assert!(library.search_books("missing").is_empty());
    }

    #[test]
    fn test_empty_query_returns_catalog_in_order() {
        let (mut library, _, _) = setup();
        library.add_book(Book::new(BookId(3), "Third", "Someone", 2022));
        assert_eq!(
            titles(&library.search_books("")),
            ["Test Book", "Another Book", "Third"]
        );
    }

    #[test]
    fn test_remove_book_removes_all_duplicates() {
        let (mut library, _, _) = setup();
        library.add_book(Book::new(BookId(1), "Duplicate", "Someone", 2022));
        assert_eq!(library.books().len(), 3);

        library.remove_book(BookId(1));
        assert_eq!(library.books().len(), 1);
        assert!(library.book(BookId(1)).is_none());

        library.remove_book(BookId(99));
        assert_eq!(library.books().len(), 1);
    }

    #[test]
    fn test_authenticate_user() {
        let (library, _, _) = setup();
        let user = library.authenticate_user("test@example.com", "password123");
        assert_eq!(user.map(|u| u.id), Some(UserId(1)));

        assert!(library.authenticate_user("test@example.com", "wrong").is_none());
        assert!(library.authenticate_user("TEST@example.com", "password123").is_none());
    }

    #[test]
    fn test_authenticate_first_match_with_duplicate_emails() {
        let (mut library, _, _) = setup();
        library
            .register_user(UserId(2), "test@example.com", "reader", "other-password")
            .unwrap();
        library
            .register_user(UserId(3), "test@example.com", "reader", "password123")
            .unwrap();

        let found = library.authenticate_user("test@example.com", "other-password");
        assert_eq!(found.map(|u| u.id), Some(UserId(2)));

        let found = library.authenticate_user("test@example.com", "password123");
        assert_eq!(found.map(|u| u.id), Some(UserId(1)));
    }

    #[test]
    fn test_authenticate_skips_blocked_user() {
        let (mut library, _, _) = setup();
        library.block_user(UserId(1)).unwrap();
        assert!(library.authenticate_user("test@example.com", "password123").is_none());
    }

    #[test]
    fn test_borrow_and_return() {
        let (mut library, clock, _) = setup();
        let loan_id = library.borrow_book(UserId(1), BookId(1)).unwrap();
        assert_eq!(loan_id, LoanId(1));
        assert_eq!(library.book(BookId(1)).unwrap().status(), BookStatus::Borrowed);

        let loan = library.loan(loan_id).unwrap();
        assert_eq!(loan.borrow_date(), start());
        assert!(loan.is_open());

        clock.advance(Duration::days(3));
        library.return_book(loan_id).unwrap();

        let loan = library.loan(loan_id).unwrap();
        assert_eq!(loan.return_date(), Some(start() + Duration::days(3)));
        assert!(library.book(BookId(1)).unwrap().is_available());
    }

    #[test]
    fn test_borrow_unavailable_book() {
        let (mut library, _, _) = setup();
        library.borrow_book(UserId(1), BookId(1)).unwrap();

        let err = library.borrow_book(UserId(1), BookId(1)).unwrap_err();
        assert!(matches!(err, Error::Unavailable(_)));
        assert_eq!(library.loans().len(), 1);
    }

    #[test]
    fn test_borrow_rejections_leave_state_untouched() {
        let (mut library, _, _) = setup();

        assert!(matches!(
            library.borrow_book(UserId(9), BookId(1)),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            library.borrow_book(UserId(1), BookId(9)),
            Err(Error::NotFound(_))
        ));

        library.block_user(UserId(1)).unwrap();
        assert!(matches!(
            library.borrow_book(UserId(1), BookId(1)),
            Err(Error::Blocked(_))
        ));

        assert!(library.loans().is_empty());
        assert!(library.books().iter().all(Book::is_available));
    }

    #[test]
    fn test_close_loan_twice() {
        let (mut library, _, _) = setup();
        let loan_id = library.borrow_book(UserId(1), BookId(1)).unwrap();
        library.close_loan(loan_id, start() + Duration::days(1)).unwrap();

        let err = library.close_loan(loan_id, start() + Duration::days(2)).unwrap_err();
        assert!(matches!(err, Error::LoanClosed(_)));
        assert_eq!(
            library.loan(loan_id).unwrap().return_date(),
            Some(start() + Duration::days(1))
        );
    }

    #[test]
    fn test_close_unknown_loan() {
        let (mut library, _, _) = setup();
        assert!(matches!(
            library.close_loan(LoanId(5), start()),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_close_loan_after_book_removed() {
        let (mut library, _, _) = setup();
        let loan_id = library.borrow_book(UserId(1), BookId(2)).unwrap();
        library.remove_book(BookId(2));

        library.close_loan(loan_id, start()).unwrap();
        assert!(!library.loan(loan_id).unwrap().is_open());
    }

    #[test]
    fn test_fines_follow_clock() {
        let (mut library, clock, _) = setup();
        let first = library.borrow_book(UserId(1), BookId(1)).unwrap();
        library.borrow_book(UserId(1), BookId(2)).unwrap();

        clock.advance(Duration::days(20));
        assert_eq!(library.overdue_loans().len(), 2);
        assert_eq!(library.outstanding_fines(UserId(1)), Decimal::from(12));

        library.return_book(first).unwrap();
        assert_eq!(library.overdue_loans().len(), 1);
        assert_eq!(library.open_loans().len(), 1);
        assert_eq!(library.total_outstanding_fines(), Decimal::from(6));
        assert_eq!(library.loans_for_user(UserId(1)).len(), 2);
    }

    #[test]
    fn test_fine_totals_saturate() {
        let (library, clock, _) = setup();
        let mut library = library.with_policy(LoanPolicy {
            daily_fine: Decimal::MAX,
            ..LoanPolicy::default()
        });
        library.borrow_book(UserId(1), BookId(1)).unwrap();
        library.borrow_book(UserId(1), BookId(2)).unwrap();

        clock.advance(Duration::days(16));
        assert_eq!(library.outstanding_fines(UserId(1)), Decimal::MAX);
        assert_eq!(library.total_outstanding_fines(), Decimal::MAX);
        assert_eq!(library.status().outstanding_fines, Decimal::MAX);
    }

    #[test]
    fn test_change_password_through_registry() {
        let (mut library, _, _) = setup();
        assert!(!library.change_password(UserId(1), "password123", "short"));
        assert!(library.change_password(UserId(1), "password123", "newpassword456"));
        assert!(!library.change_password(UserId(42), "password123", "newpassword456"));

        assert!(library.authenticate_user("test@example.com", "newpassword456").is_some());
    }

    #[test]
    fn test_register_user_requires_email() {
        let (mut library, _, _) = setup();
        let err = library.register_user(UserId(2), "  ", "reader", "password123").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(library.users().len(), 1);
    }

    #[test]
    fn test_block_unknown_user() {
        let (mut library, _, _) = setup();
        assert!(matches!(library.block_user(UserId(7)), Err(Error::NotFound(_))));
        assert!(matches!(library.unblock_user(UserId(7)), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_journal_records_ids_only() {
        let (mut library, _, logger) = setup();
        library.authenticate_user("test@example.com", "password123");
        library.authenticate_user("test@example.com", "nope");
        let loan_id = library.borrow_book(UserId(1), BookId(1)).unwrap();
        let _ = library.borrow_book(UserId(1), BookId(1));

        let recent = logger.get_recent(4);
        let names: Vec<_> = recent.iter().map(|e| e.event.as_str()).collect();
        assert_eq!(names, ["borrow_rejected", "loan_opened", "login_failed", "login_succeeded"]);
        assert_eq!(recent[1].loan_id, Some(loan_id));

        let errors = logger.get_errors(10);
        assert_eq!(errors.len(), 1);

        let dump = serde_json::to_string(&logger.get_recent(100)).unwrap();
        assert!(!dump.contains("password123"));
        assert!(!dump.contains("test@example.com"));
    }

    #[test]
    fn test_debug_summarizes() {
        let (library, _, _) = setup();
        let rendered = format!("{library:?}");
        assert!(rendered.contains("books: 2"));
        assert!(rendered.contains("users: 1"));
    }
}
