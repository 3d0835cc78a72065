//! # HTTP Backend Client
//!
//! Concrete [`BackendClient`] over the verification backend's REST API. The
//! flow itself stays transport-agnostic; this client pins the contract:
//!
//! - `POST {base}/api/idv/session` — create a session;
//! - `GET {base}/api/idv/session/{id}` — fetch a session, 404 is not-found;
//! - `POST {base}/api/idv/session/{id}/result` — record the outcome.

use url::Url;

use crate::provider::BackendClient;
use crate::report::ResultRequest;
use crate::session::Session;

/// Errors from backend HTTP calls.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// Transport-level failure.
    #[error("HTTP error calling {endpoint}: {source}")]
    Transport {
        /// Endpoint URL.
        endpoint: String,
        /// Underlying transport error.
        source: reqwest::Error,
    },

    /// The backend returned a non-2xx status.
    #[error("backend {endpoint} returned {status}: {body}")]
    Status {
        /// Endpoint URL.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        /// Endpoint URL.
        endpoint: String,
        /// Underlying deserialization error.
        source: reqwest::Error,
    },
}

/// HTTP implementation of the backend session store seam.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    http: reqwest::Client,
    base: Url,
}

impl HttpBackend {
    /// Create a backend client rooted at the given base URL.
    #[must_use]
    pub fn new(base: Url) -> Self {
        Self::with_client(reqwest::Client::new(), base)
    }

    /// Create a backend client with a caller-supplied `reqwest` client, e.g.
    /// to share connection pools or set default headers.
    #[must_use]
    pub fn with_client(http: reqwest::Client, base: Url) -> Self {
        Self { http, base }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base.as_str().trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

impl BackendClient for HttpBackend {
    async fn create_session(&self) -> anyhow::Result<Session> {
        let endpoint = self.endpoint("api/idv/session");
        let response = self
            .http
            .post(&endpoint)
            .send()
            .await
            .map_err(|source| HttpError::Transport { endpoint: endpoint.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status {
                endpoint,
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }
            .into());
        }
        let session = response
            .json()
            .await
            .map_err(|source| HttpError::Deserialization { endpoint, source })?;
        Ok(session)
    }

    async fn fetch_session(&self, session_id: &str) -> anyhow::Result<Option<Session>> {
        let endpoint = self.endpoint(&format!("api/idv/session/{session_id}"));
        let response = self
            .http
            .get(&endpoint)
            .send()
            .await
            .map_err(|source| HttpError::Transport { endpoint: endpoint.clone(), source })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(HttpError::Status {
                endpoint,
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }
            .into());
        }
        let session = response
            .json()
            .await
            .map_err(|source| HttpError::Deserialization { endpoint, source })?;
        Ok(Some(session))
    }

    async fn report_result(&self, session_id: &str, result: &ResultRequest) -> anyhow::Result<()> {
        let endpoint = self.endpoint(&format!("api/idv/session/{session_id}/result"));
        let response = self
            .http
            .post(&endpoint)
            .json(result)
            .send()
            .await
            .map_err(|source| HttpError::Transport { endpoint: endpoint.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status {
                endpoint,
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }
            .into());
        }
        Ok(())
    }
}
