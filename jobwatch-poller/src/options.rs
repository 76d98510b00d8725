//! Poller configuration
//!
//! Defines the tunables of a poller: base cadence, fast-retry budget,
//! pause persistence and whether polling begins as soon as the poller is
//! spawned.

use std::time::Duration;

/// Default cadence of the dashboard (bulk) poller
pub const DEFAULT_BULK_INTERVAL: Duration = Duration::from_secs(10);

/// Default cadence of the detail (single-job) poller
pub const DEFAULT_SINGLE_JOB_INTERVAL: Duration = Duration::from_secs(5);

/// Default number of fast retries before falling back to the base cadence
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Smallest base interval a poller runs with; shorter ones are raised to it
pub const MIN_BASE_INTERVAL: Duration = Duration::from_millis(100);

const ENV_POLL_INTERVAL_MS: &str = "JOBWATCH_POLL_INTERVAL_MS";
const ENV_MAX_RETRIES: &str = "JOBWATCH_MAX_RETRIES";

/// Poller configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerOptions {
    /// Delay between polls while work is active
    pub base_interval: Duration,

    /// Consecutive failures retried with exponential backoff before the
    /// retry counter resets
    pub max_retries: u32,

    /// Key under which the pause flag is persisted, if any
    pub persist_key: Option<String>,

    /// Start polling as soon as the poller is spawned
    pub auto_start: bool,
}

impl PollerOptions {
    /// Creates options with the given base interval and defaults elsewhere
    pub fn new(base_interval: Duration) -> Self {
        Self {
            base_interval,
            max_retries: DEFAULT_MAX_RETRIES,
            persist_key: None,
            auto_start: true,
        }
    }

    /// Defaults for the dashboard poller
    pub fn bulk() -> Self {
        Self::new(DEFAULT_BULK_INTERVAL)
    }

    /// Defaults for the job detail poller
    pub fn single_job() -> Self {
        Self::new(DEFAULT_SINGLE_JOB_INTERVAL)
    }

    pub fn with_base_interval(mut self, base_interval: Duration) -> Self {
        self.base_interval = base_interval;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Persists the pause flag under `key` so it survives restarts
    pub fn with_persist_key(mut self, key: impl Into<String>) -> Self {
        self.persist_key = Some(key.into());
        self
    }

    pub fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    /// Overrides fields from environment variables
    ///
    /// Recognized environment variables:
    /// - JOBWATCH_POLL_INTERVAL_MS (optional, milliseconds)
    /// - JOBWATCH_MAX_RETRIES (optional)
    ///
    /// Unparseable values are ignored.
    pub fn from_env(defaults: Self) -> Self {
        Self::from_vars(defaults, |name| std::env::var(name).ok())
    }

    fn from_vars(defaults: Self, var: impl Fn(&str) -> Option<String>) -> Self {
        let base_interval = var(ENV_POLL_INTERVAL_MS)
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.base_interval);

        let max_retries = var(ENV_MAX_RETRIES)
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(defaults.max_retries);

        Self {
            base_interval,
            max_retries,
            ..defaults
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.base_interval.is_zero() {
            anyhow::bail!("base_interval must be greater than 0");
        }

        if let Some(key) = &self.persist_key {
            if key.trim().is_empty() {
                anyhow::bail!("persist_key cannot be empty");
            }
        }

        Ok(())
    }
}

impl Default for PollerOptions {
    fn default() -> Self {
        Self::bulk()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_defaults() {
        let bulk = PollerOptions::bulk();
        assert_eq!(bulk.base_interval, Duration::from_secs(10));
        assert_eq!(bulk.max_retries, 3);
        assert!(bulk.persist_key.is_none());
        assert!(bulk.auto_start);

        let single = PollerOptions::single_job();
        assert_eq!(single.base_interval, Duration::from_secs(5));
        assert!(single.validate().is_ok());
    }

    #[test]
    fn test_options_validation() {
        let mut options = PollerOptions::default();
        assert!(options.validate().is_ok());

        options.base_interval = Duration::ZERO;
        assert!(options.validate().is_err());

        options.base_interval = Duration::from_millis(500);
        options.persist_key = Some("  ".to_string());
        assert!(options.validate().is_err());

        options.persist_key = Some("dashboard".to_string());
        assert!(options.validate().is_ok());
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        }
    }

    #[test]
    fn test_env_overrides_variant_defaults() {
        let defaults = PollerOptions::single_job()
            .with_persist_key("job:1")
            .with_auto_start(false);
        let options = PollerOptions::from_vars(
            defaults,
            vars(&[
                ("JOBWATCH_POLL_INTERVAL_MS", "2500"),
                ("JOBWATCH_MAX_RETRIES", " 7 "),
            ]),
        );

        assert_eq!(options.base_interval, Duration::from_millis(2500));
        assert_eq!(options.max_retries, 7);
        // Fields without a variable are carried over untouched
        assert_eq!(options.persist_key.as_deref(), Some("job:1"));
        assert!(!options.auto_start);
    }

    #[test]
    fn test_env_ignores_missing_and_unparseable_values() {
        let options = PollerOptions::from_vars(PollerOptions::bulk(), vars(&[]));
        assert_eq!(options, PollerOptions::bulk());

        let options = PollerOptions::from_vars(
            PollerOptions::bulk(),
            vars(&[
                ("JOBWATCH_POLL_INTERVAL_MS", "fast"),
                ("JOBWATCH_MAX_RETRIES", "-1"),
            ]),
        );
        assert_eq!(options.base_interval, DEFAULT_BULK_INTERVAL);
        assert_eq!(options.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_from_env_without_variables_keeps_defaults() {
        if std::env::var_os(ENV_POLL_INTERVAL_MS).is_some()
            || std::env::var_os(ENV_MAX_RETRIES).is_some()
        {
            return;
        }
        assert_eq!(
            PollerOptions::from_env(PollerOptions::single_job()),
            PollerOptions::single_job()
        );
    }

    #[test]
    fn test_builder_setters() {
        let options = PollerOptions::bulk()
            .with_base_interval(Duration::from_secs(2))
            .with_max_retries(5)
            .with_persist_key("jobs-dashboard")
            .with_auto_start(false);

        assert_eq!(options.base_interval, Duration::from_secs(2));
        assert_eq!(options.max_retries, 5);
        assert_eq!(options.persist_key.as_deref(), Some("jobs-dashboard"));
        assert!(!options.auto_start);
    }
}
