//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. The registry is
//! the hub; the others report on it, seed it or journal what it does.

mod demo;
mod library;
pub mod logging;
mod status;

pub use demo::DemoService;
pub use library::LibrarySystem;
pub use logging::{LogEntry, LogEvent, LoggingService};
pub use status::StatusSummary;
