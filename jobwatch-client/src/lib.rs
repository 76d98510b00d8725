//! Jobwatch HTTP Client
//!
//! A small, type-safe HTTP client for the jobs REST API consumed by the
//! Jobwatch dashboard pollers.
//!
//! The pollers never talk to [`DashboardClient`] directly; they go through
//! the [`JobQuery`] trait so that any transport (or a test fake) can feed
//! them.
//!
//! # Example
//!
//! ```no_run
//! use jobwatch_client::DashboardClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = DashboardClient::new("http://localhost:8000");
//!
//!     let jobs = client.list_job_summaries(Some(50)).await?;
//!     println!("{} job(s) on the dashboard", jobs.len());
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use jobs::JobQuery;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// HTTP client for the jobs API
#[derive(Debug, Clone)]
pub struct DashboardClient {
    /// Base URL of the API (e.g., "http://localhost:8000")
    base_url: String,
    /// Bearer token issued by the session provider, if any
    token: Option<String>,
    /// HTTP client instance
    client: Client,
}

impl DashboardClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the jobs API (e.g., "http://localhost:8000")
    ///
    /// # Example
    /// ```
    /// use jobwatch_client::DashboardClient;
    ///
    /// let client = DashboardClient::new("http://localhost:8000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This is where request timeouts live: the pollers impose none of
    /// their own and treat a timed-out request like any other failure.
    ///
    /// # Example
    /// ```
    /// use jobwatch_client::DashboardClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = DashboardClient::with_client("http://localhost:8000", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            client,
        }
    }

    /// Attach a bearer token sent with every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a GET request for an API path, with auth applied
    fn get(&self, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let request = self.client.get(url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Checks the status code and returns an appropriate error if the
    /// request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
