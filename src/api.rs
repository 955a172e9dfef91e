//! HTTP client for the showtimes backend.
//!
//! The backend exposes two JSON endpoints:
//! - `GET /cinemas` returns the full venue catalog
//! - `GET /showtimes?date=YYYY-MM-DD` returns the schedule for one date

use chrono::NaiveDate;
use reqwest::Client;
use thiserror::Error;

use crate::models::{CinemasResponse, Schedule, ShowtimesResponse};

/// Default backend base URL (the local dev backend).
pub const DEFAULT_BASE_URL: &str = "http://localhost:5001";

/// Error type for backend client operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, transport)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned a non-2xx status
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },
}

/// Client for the showtimes backend API.
///
/// Holds a reusable HTTP client; cheap to clone behind an `Arc` and share
/// with spawned loader tasks.
pub struct ShowtimesClient {
    /// Base URL for the backend
    pub base_url: String,
    /// Reusable HTTP client
    client: Client,
}

impl ShowtimesClient {
    /// Create a new client with the default base URL.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    /// Create a new client with a custom base URL.
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Fetch the full venue catalog.
    ///
    /// # Returns
    /// The list of known cinema names, in backend order.
    pub async fn fetch_cinemas(&self) -> Result<Vec<String>, ApiError> {
        let url = format!("{}/cinemas", self.base_url);

        let response = self.client.get(&url).send().await?;
        let body = Self::check_status(response).await?;

        let parsed: CinemasResponse = serde_json::from_str(&body)?;
        Ok(parsed.cinemas)
    }

    /// Fetch the schedule for one calendar date.
    ///
    /// # Arguments
    /// * `date` - The date to fetch, sent as `YYYY-MM-DD`
    ///
    /// # Returns
    /// The schedule keyed by venue name.
    pub async fn fetch_showtimes(&self, date: NaiveDate) -> Result<Schedule, ApiError> {
        let url = format!(
            "{}/showtimes?date={}",
            self.base_url,
            date.format("%Y-%m-%d")
        );

        let response = self.client.get(&url).send().await?;
        let body = Self::check_status(response).await?;

        let parsed: ShowtimesResponse = serde_json::from_str(&body)?;
        Ok(parsed.showtimes)
    }

    /// Reject non-2xx responses, returning the body text otherwise.
    async fn check_status(response: reqwest::Response) -> Result<String, ApiError> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::ServerError { status, message });
        }
        Ok(response.text().await?)
    }
}

impl Default for ShowtimesClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_new() {
        let client = ShowtimesClient::new();
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_client_with_base_url() {
        let client = ShowtimesClient::with_base_url("http://localhost:8080".to_string());
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_client_strips_trailing_slash() {
        let client = ShowtimesClient::with_base_url("http://localhost:8080/".to_string());
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::ServerError {
            status: 500,
            message: "Internal Server Error".to_string(),
        };
        let display = format!("{}", err);
        assert!(display.contains("500"));
        assert!(display.contains("Internal Server Error"));
    }

    #[tokio::test]
    async fn test_fetch_cinemas_with_invalid_server() {
        let client = ShowtimesClient::with_base_url("http://127.0.0.1:1".to_string());
        let result = client.fetch_cinemas().await;
        assert!(matches!(result, Err(ApiError::Http(_))));
    }

    #[tokio::test]
    async fn test_fetch_showtimes_with_invalid_server() {
        let client = ShowtimesClient::with_base_url("http://127.0.0.1:1".to_string());
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let result = client.fetch_showtimes(date).await;
        assert!(matches!(result, Err(ApiError::Http(_))));
    }
}
