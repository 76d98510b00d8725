//! Observable polling state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of a poller's externally visible state
///
/// One instance per poller. `is_polling` is only set while a fetch is in
/// flight and never while the poller is paused. `retry_count` counts
/// consecutive failed fetches and drops back to zero on success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollingState {
    pub is_polling: bool,
    pub is_paused: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub retry_count: u32,
}

impl PollingState {
    /// Returns true when the most recent fetch failed
    pub fn is_failing(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failing_follows_error() {
        let mut state = PollingState::default();
        assert!(!state.is_failing());

        state.error = Some("API error (status 503): down".to_string());
        state.retry_count = 1;
        assert!(state.is_failing());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(PollingState::default()).unwrap();
        assert_eq!(json["isPolling"], false);
        assert_eq!(json["retryCount"], 0);
    }
}
