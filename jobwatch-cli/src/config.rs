//! Configuration module
//!
//! Handles CLI configuration: API location, credentials and where pause
//! flags are persisted.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use jobwatch_client::DashboardClient;
use jobwatch_poller::{FileStore, PauseStore};
use tracing::warn;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the jobs API
    pub api_url: String,

    /// Bearer token, if the API requires one
    pub token: Option<String>,

    /// Pause flag file; the platform config dir when unset
    pub state_file: Option<PathBuf>,

    /// Timeout applied to every API request
    pub request_timeout: Duration,
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            anyhow::bail!("api_url must start with http:// or https://");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request timeout must be greater than 0");
        }

        Ok(())
    }

    /// Builds the API client
    pub fn client(&self) -> Result<DashboardClient> {
        let http = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let client = DashboardClient::with_client(&self.api_url, http);
        Ok(match &self.token {
            Some(token) => client.with_token(token),
            None => client,
        })
    }

    /// Store for pause flags, in memory when no durable location exists
    pub fn pause_store(&self) -> PauseStore {
        match self.state_file.clone().or_else(FileStore::default_path) {
            Some(path) => PauseStore::new(Arc::new(FileStore::new(path))),
            None => {
                warn!("No config directory available; pause state will not persist");
                PauseStore::in_memory()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            api_url: "http://localhost:8000".to_string(),
            token: None,
            state_file: None,
            request_timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn test_config_validation() {
        let mut config = config();
        assert!(config.validate().is_ok());

        config.api_url = "localhost:8000".to_string();
        assert!(config.validate().is_err());

        config.api_url = "https://jobs.example.com".to_string();
        config.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_client_uses_api_url() {
        let mut config = config();
        config.api_url = "http://localhost:8000/".to_string();
        config.token = Some("secret".to_string());

        let client = config.client().unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_pause_store_uses_state_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config();
        config.state_file = Some(dir.path().join("state.json"));

        config.pause_store().save("dashboard", true);
        assert!(config.pause_store().load("dashboard"));
        assert!(!config.pause_store().load("job:unknown"));
    }
}
