//! Configuration management
//!
//! Settings live in `settings.json` inside the library directory:
//! ```json
//! {
//!   "app": { "demoMode": false },
//!   "loans": { "gracePeriodDays": 14, "dailyFine": "1.00" },
//!   "credentials": { "timeCost": 3, "memoryCost": 65536, "parallelism": 4 }
//! }
//! ```
//! Every field is optional.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::result::Error;
use crate::domain::{Argon2Params, LoanPolicy};

const SETTINGS_FILE: &str = "settings.json";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(default)]
    loans: LoanPolicy,
    #[serde(default)]
    credentials: Argon2Params,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default)]
    demo_mode: bool,
}

/// Library configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub demo_mode: bool,
    pub loan_policy: LoanPolicy,
    pub credentials: Argon2Params,
}

impl Config {
    /// Load config from the library directory
    ///
    /// A missing or unparseable settings file falls back to defaults.
    /// Environment overrides:
    /// 1. `LIBRARY_DEMO_MODE` (true/false, 1/0, yes/no)
    /// 2. `LIBRARY_GRACE_PERIOD_DAYS` (non-negative integer)
    pub fn load(library_dir: &Path) -> Result<Self> {
        Self::load_with_env(
            library_dir,
            std::env::var("LIBRARY_DEMO_MODE").ok().as_deref(),
            std::env::var("LIBRARY_GRACE_PERIOD_DAYS").ok().as_deref(),
        )
    }

    /// `load` with the environment overrides passed in
    fn load_with_env(
        library_dir: &Path,
        demo_mode: Option<&str>,
        grace_days: Option<&str>,
    ) -> Result<Self> {
        let settings_path = library_dir.join(SETTINGS_FILE);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {}", settings_path.display()))?;
            serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %settings_path.display(), error = %e, "ignoring unparseable settings");
                SettingsFile::default()
            })
        } else {
            SettingsFile::default()
        };

        let mut config = Self::from_settings(raw);
        config.apply_env(demo_mode, grace_days)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse settings JSON without touching the filesystem or environment
    pub fn from_json(json: &str) -> crate::domain::result::Result<Self> {
        let raw: SettingsFile = serde_json::from_str(json)?;
        let config = Self::from_settings(raw);
        config.validate()?;
        Ok(config)
    }

    fn from_settings(raw: SettingsFile) -> Self {
        Self {
            demo_mode: raw.app.demo_mode,
            loan_policy: raw.loans,
            credentials: raw.credentials,
        }
    }

    fn apply_env(&mut self, demo_mode: Option<&str>, grace_days: Option<&str>) -> Result<()> {
        match demo_mode {
            Some("true" | "1" | "yes" | "TRUE" | "YES") => self.demo_mode = true,
            Some("false" | "0" | "no" | "FALSE" | "NO") => self.demo_mode = false,
            _ => {}
        }

        if let Some(days) = grace_days {
            self.loan_policy.grace_period_days = days
                .trim()
                .parse()
                .with_context(|| format!("Invalid LIBRARY_GRACE_PERIOD_DAYS: {days:?}"))?;
        }
        Ok(())
    }

    fn validate(&self) -> crate::domain::result::Result<()> {
        if self.loan_policy.grace_period_days < 0 {
            return Err(Error::Config("grace period cannot be negative".to_string()));
        }
        if self.loan_policy.daily_fine.is_sign_negative() {
            return Err(Error::Config("daily fine cannot be negative".to_string()));
        }
        self.credentials
            .validate()
            .map_err(|e| Error::Config(format!("invalid credentials: {e}")))?;
        Ok(())
    }
}
