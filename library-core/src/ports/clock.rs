//! Clock port - source of the current time

use chrono::{DateTime, Utc};

/// Time source for stamping loans and evaluating fines
///
/// The registry never reads the system time directly so that elapsed-day
/// rules can be driven deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
