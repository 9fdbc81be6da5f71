//! Library Core - business logic for a small lending library
//!
//! This crate implements the lending domain following hexagonal architecture:
//!
//! - **domain**: Core entities (User, Book, Loan) and their rules
//! - **ports**: Trait definitions for external dependencies (Clock)
//! - **services**: The registry plus journaling, status and demo seeding
//! - **adapters**: Concrete implementations (system clock, demo data)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use config::Config;
use services::{DemoService, LibrarySystem, LoggingService};

// Re-export commonly used types at crate root
pub use domain::result::Error;
pub use domain::{Book, BookId, BookStatus, Loan, LoanId, LoanPolicy, User, UserId};
pub use services::{LogEntry, LogEvent, StatusSummary};

/// Main context for library operations
///
/// Bundles the configuration, the registry and the journal the registry
/// writes to.
#[derive(Debug)]
pub struct LibraryContext {
    pub config: Config,
    pub library: LibrarySystem,
    pub logger: Arc<LoggingService>,
}

impl LibraryContext {
    /// Build a context from an already loaded configuration
    ///
    /// With demo mode on, the registry starts with the demo catalog and
    /// accounts.
    pub fn new(config: Config) -> Result<Self> {
        let logger = Arc::new(LoggingService::new(env!("CARGO_PKG_VERSION")));
        let mut library = LibrarySystem::new()
            .with_policy(config.loan_policy)
            .with_credentials(config.credentials.clone())
            .with_logger(Arc::clone(&logger));

        if config.demo_mode {
            DemoService::new()
                .seed(&mut library)
                .context("Failed to seed demo data")?;
        }

        Ok(Self {
            config,
            library,
            logger,
        })
    }

    /// Load `settings.json` from `library_dir` and build a context
    pub fn open(library_dir: &Path) -> Result<Self> {
        let config = Config::load(library_dir)
            .with_context(|| format!("Failed to load config from {}", library_dir.display()))?;
        Self::new(config)
    }
}
