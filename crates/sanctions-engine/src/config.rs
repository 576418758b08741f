//! Reconciliation job configuration.

use crate::schedule::{DailySchedule, ScheduleError};
use crate::verifier::VerifyMode;

/// Default schedule: 22:00 UTC every day.
pub const DEFAULT_SCHEDULE: &str = "0 22 * * *";

/// Job configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// When the daily pass fires.
    pub schedule: DailySchedule,
    /// Which jurisdictions a candidate is verified against.
    pub verify_mode: VerifyMode,
    /// Abort the pass when the catalog is empty instead of restoring every
    /// restricted seller.
    pub abort_on_empty_catalog: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            schedule: DailySchedule::DEFAULT,
            verify_mode: VerifyMode::default(),
            abort_on_empty_catalog: true,
        }
    }
}

impl ReconcileConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `RECONCILE_SCHEDULE` (default: `0 22 * * *`)
    /// - `RECONCILE_VERIFY_MODE` (`coarse` | `whole_catalog`, default: `coarse`)
    /// - `RECONCILE_ABORT_ON_EMPTY_CATALOG` (default: `true`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let schedule = std::env::var("RECONCILE_SCHEDULE")
            .unwrap_or_else(|_| DEFAULT_SCHEDULE.to_string())
            .parse()?;
        let verify_mode = match std::env::var("RECONCILE_VERIFY_MODE") {
            Ok(raw) => raw.parse().map_err(ConfigError::InvalidVerifyMode)?,
            Err(_) => VerifyMode::default(),
        };
        let abort_on_empty_catalog = env_bool("RECONCILE_ABORT_ON_EMPTY_CATALOG", true)?;
        Ok(Self {
            schedule,
            verify_mode,
            abort_on_empty_catalog,
        })
    }
}

fn env_bool(var: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidBool(var.to_string(), raw)),
        },
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid RECONCILE_SCHEDULE: {0}")]
    InvalidSchedule(#[from] ScheduleError),
    #[error("invalid RECONCILE_VERIFY_MODE: {0}")]
    InvalidVerifyMode(String),
    #[error("invalid boolean for {0}: {1:?}")]
    InvalidBool(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fires_at_22_utc() {
        let cfg = ReconcileConfig::default();
        assert_eq!(cfg.schedule, DEFAULT_SCHEDULE.parse().unwrap());
        assert_eq!(cfg.verify_mode, VerifyMode::CoarseMembership);
        assert!(cfg.abort_on_empty_catalog);
    }

    #[test]
    fn env_bool_accepts_common_spellings() {
        std::env::set_var("TEST_RECONCILE_BOOL", "off");
        assert!(!env_bool("TEST_RECONCILE_BOOL", true).unwrap());
        std::env::set_var("TEST_RECONCILE_BOOL", "Yes");
        assert!(env_bool("TEST_RECONCILE_BOOL", false).unwrap());
        std::env::set_var("TEST_RECONCILE_BOOL", "perhaps");
        assert!(env_bool("TEST_RECONCILE_BOOL", false).is_err());
        std::env::remove_var("TEST_RECONCILE_BOOL");
        assert!(env_bool("TEST_RECONCILE_BOOL", true).unwrap());
    }
}
