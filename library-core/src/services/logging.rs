//! Logging service - structured event journal
//!
//! Records what happened in the registry as structured events held in
//! memory. Only ids and event names are recorded: no passwords, no emails,
//! no titles.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::{BookId, LoanId, UserId};

/// Entries kept by default before the oldest are dropped
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Counter for generating unique IDs within the same millisecond
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique ID based on timestamp + counter
fn generate_id() -> u64 {
    let timestamp = u64::try_from(now_ms()).unwrap_or_default();

    // Lower 16 bits carry the counter (65536 unique IDs per millisecond)
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
    (timestamp << 16) | counter
}

/// Get current unix timestamp in milliseconds
fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// A log event to be recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_id: Option<BookId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_id: Option<LoanId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl LogEvent {
    /// Create a new log event with just an event name
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            user_id: None,
            book_id: None,
            loan_id: None,
            error_message: None,
        }
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_book(mut self, book_id: BookId) -> Self {
        self.book_id = Some(book_id);
        self
    }

    pub fn with_loan(mut self, loan_id: LoanId) -> Self {
        self.loan_id = Some(loan_id);
        self
    }

    /// Set error information
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

/// A recorded log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: i64,
    pub app_version: String,
    pub event: String,
    pub user_id: Option<UserId>,
    pub book_id: Option<BookId>,
    pub loan_id: Option<LoanId>,
    pub error_message: Option<String>,
}

/// Service for structured event logging
///
/// Shared between the registry and its owner behind an `Arc`; every method
/// takes `&self`. Holds at most `capacity` entries, dropping the oldest.
#[derive(Debug)]
pub struct LoggingService {
    entries: Mutex<VecDeque<LogEntry>>,
    capacity: usize,
    app_version: String,
}

impl LoggingService {
    pub fn new(app_version: impl Into<String>) -> Self {
        Self::with_capacity(app_version, DEFAULT_CAPACITY)
    }

    /// A capacity of zero is treated as one
    pub fn with_capacity(app_version: impl Into<String>, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
            app_version: app_version.into(),
        }
    }

    fn entries(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        // A panic while holding the lock cannot leave the queue half-pushed
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Log an event
    ///
    /// The id, timestamp and app version are filled in by the service.
    pub fn log(&self, event: LogEvent) {
        tracing::debug!(
            event = %event.event,
            error = event.error_message.as_deref().unwrap_or_default(),
            "journal"
        );

        let entry = LogEntry {
            id: generate_id(),
            timestamp: now_ms(),
            app_version: self.app_version.clone(),
            event: event.event,
            user_id: event.user_id,
            book_id: event.book_id,
            loan_id: event.loan_id,
            error_message: event.error_message,
        };
        let mut entries = self.entries();
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Log a simple event with just a name
    pub fn log_event(&self, event: &str) {
        self.log(LogEvent::new(event))
    }

    /// Log an error
    pub fn log_error(&self, event: &str, message: &str) {
        self.log(LogEvent::new(event).with_error(message))
    }

    /// Most recent entries first, up to `limit`
    pub fn get_recent(&self, limit: usize) -> Vec<LogEntry> {
        self.entries().iter().rev().take(limit).cloned().collect()
    }

    /// Most recent entries carrying an error, up to `limit`
    pub fn get_errors(&self, limit: usize) -> Vec<LogEntry> {
        self.entries()
            .iter()
            .rev()
            .filter(|e| e.error_message.is_some())
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn count(&self) -> usize {
        self.entries().len()
    }

    /// Delete entries older than the specified timestamp (unix ms)
    pub fn delete_before(&self, timestamp_ms: i64) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|e| e.timestamp >= timestamp_ms);
        before - entries.len()
    }
}
