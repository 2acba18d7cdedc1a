//! Vale server transport.
//!
//! Talks to a running `vale-server` instead of spawning a process. The
//! request and response contract is the same as the CLI's.

use tracing::debug;

use crate::{CheckError, FindingsByFile};

/// Default address of a local Vale server.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:7777";

/// HTTP client for a Vale server.
#[derive(Debug, Clone)]
pub struct ServerClient {
    client: reqwest::Client,
    url: String,
}

impl ServerClient {
    /// Creates a client for the server at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Returns the endpoint checks are posted to.
    pub fn endpoint(&self) -> String {
        format!("{}/vale", self.url.trim_end_matches('/'))
    }

    /// Submits `text` for checking.
    pub async fn check(&self, text: &str, format: &str) -> Result<FindingsByFile, CheckError> {
        let endpoint = self.endpoint();
        debug!("Posting check to {}", endpoint);

        let response = self
            .client
            .post(&endpoint)
            .form(&[("text", text), ("format", format)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(CheckError::ServerStatus {
                status: status.as_u16(),
                body,
            });
        }

        if body.trim().is_empty() {
            return Ok(FindingsByFile::new());
        }

        Ok(serde_json::from_str(&body)?)
    }
}

impl Default for ServerClient {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_URL)
    }
}
