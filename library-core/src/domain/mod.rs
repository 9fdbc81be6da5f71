//! Core domain entities
//!
//! All lending entities are defined here. These are pure data structures
//! with their business rules - no I/O and no knowledge of the registry.

mod book;
pub mod credential;
mod ids;
mod loan;
pub mod result;
mod user;

pub use book::{Book, BookStatus};
pub use credential::{Argon2Params, Credential};
pub use ids::{BookId, LoanId, UserId};
pub use loan::{Loan, LoanPolicy, DEFAULT_GRACE_PERIOD_DAYS};
pub use user::{User, MIN_PASSWORD_LEN};
