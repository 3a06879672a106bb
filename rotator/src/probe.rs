//! Checks that a freshly issued credential is accepted by the system it guards

use async_trait::async_trait;
use rotator_core::SecretPayload;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Error)]
pub enum ProbeError {
    #[error("payload has no username or password to probe with")]
    MissingCredential,

    #[error("probe request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("probe request to {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },

    #[error("{url} rejected the credential with status {status}")]
    Rejected { url: String, status: u16 },
}

#[async_trait]
pub trait CredentialProbe: Send + Sync {
    async fn probe(&self, url: &str, payload: &SecretPayload) -> Result<(), ProbeError>;
}

/// `GET` with HTTP basic auth; any non-2xx status fails
#[derive(Debug, Clone)]
pub struct HttpBasicProbe {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpBasicProbe {
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl CredentialProbe for HttpBasicProbe {
    async fn probe(&self, url: &str, payload: &SecretPayload) -> Result<(), ProbeError> {
        let (Some(username), Some(password)) = (&payload.username, &payload.password) else {
            return Err(ProbeError::MissingCredential);
        };

        debug!(url, username = %username, "Probing credential");

        let response = self
            .client
            .get(url)
            .basic_auth(username, Some(password))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProbeError::Timeout {
                        url: url.to_string(),
                        after: self.timeout,
                    }
                } else {
                    ProbeError::Request {
                        url: url.to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ProbeError::Rejected {
                url: url.to_string(),
                status: status.as_u16(),
            })
        }
    }
}
