//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - System and manually driven clocks for the Clock port
//! - Demo catalog and accounts for demo mode

pub mod clock;
pub mod demo;

pub use clock::{FixedClock, SystemClock};
