//! Loan domain model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ids::{BookId, LoanId, UserId};

pub const DEFAULT_GRACE_PERIOD_DAYS: i64 = 14;

/// Fine rules applied to open loans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoanPolicy {
    /// Days after borrowing during which no fine accrues
    pub grace_period_days: i64,
    /// Fine per whole day past the grace period
    pub daily_fine: Decimal,
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self {
            grace_period_days: DEFAULT_GRACE_PERIOD_DAYS,
            daily_fine: Decimal::ONE,
        }
    }
}

/// A user borrowing a book
///
/// Open while `return_date` is unset. Only the registry closes a loan, and a
/// closed loan never reopens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub user_id: UserId,
    pub book_id: BookId,
    borrow_date: DateTime<Utc>,
    return_date: Option<DateTime<Utc>>,
    policy: LoanPolicy,
}

impl Loan {
    /// Open a loan stamped with the current time and the default policy
    pub fn new(id: LoanId, user_id: UserId, book_id: BookId) -> Self {
        Self::opened_at(id, user_id, book_id, Utc::now(), LoanPolicy::default())
    }

    pub fn opened_at(
        id: LoanId,
        user_id: UserId,
        book_id: BookId,
        borrow_date: DateTime<Utc>,
        policy: LoanPolicy,
    ) -> Self {
        Self {
            id,
            user_id,
            book_id,
            borrow_date,
            return_date: None,
            policy,
        }
    }

    pub fn borrow_date(&self) -> DateTime<Utc> {
        self.borrow_date
    }

    pub fn return_date(&self) -> Option<DateTime<Utc>> {
        self.return_date
    }

    pub fn policy(&self) -> &LoanPolicy {
        &self.policy
    }

    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }

    /// Set the return date. Returns false if the loan was already closed.
    pub(crate) fn close(&mut self, at: DateTime<Utc>) -> bool {
        if self.return_date.is_some() {
            return false;
        }
        self.return_date = Some(at);
        true
    }

    /// Whole days between borrowing and `now`
    pub fn days_elapsed(&self, now: DateTime<Utc>) -> i64 {
        (now - self.borrow_date).num_days()
    }

    /// Fine owed at `now`
    ///
    /// Returned loans owe nothing, however late they came back; fines only
    /// accrue while a loan is open. Saturates at `Decimal::MAX`.
    pub fn fine_as_of(&self, now: DateTime<Utc>) -> Decimal {
        if self.return_date.is_some() {
            return Decimal::ZERO;
        }
        let days_overdue = self
            .days_elapsed(now)
            .saturating_sub(self.policy.grace_period_days)
            .max(0);
        Decimal::from(days_overdue).saturating_mul(self.policy.daily_fine)
    }

    pub fn is_overdue_as_of(&self, now: DateTime<Utc>) -> bool {
        self.return_date.is_none() && self.days_elapsed(now) > self.policy.grace_period_days
    }

    /// Fine owed right now
    ///
    /// Money is a `Decimal`, not a float: 6 days overdue at the default
    /// policy is exactly `6`, never `5.999..`.
    pub fn calculate_fine(&self) -> Decimal {
        self.fine_as_of(Utc::now())
    }

    pub fn is_overdue(&self) -> bool {
        self.is_overdue_as_of(Utc::now())
    }
}
