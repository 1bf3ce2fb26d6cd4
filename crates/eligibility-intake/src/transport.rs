use std::time::Duration;

use async_trait::async_trait;
use eligibility_session::OutboundSubmission;
use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure to deliver a submission; every variant is retryable from the user's side.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("intake endpoint answered with status {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Request(String),
    #[error("failed to build http client: {0}")]
    Client(String),
}

/// Sends a built submission to the intake service.
#[async_trait]
pub trait IntakeTransport: Send + Sync {
    async fn send(&self, submission: &OutboundSubmission) -> Result<(), TransportError>;
}

#[async_trait]
impl<T> IntakeTransport for std::sync::Arc<T>
where
    T: IntakeTransport + ?Sized,
{
    async fn send(&self, submission: &OutboundSubmission) -> Result<(), TransportError> {
        (**self).send(submission).await
    }
}

/// Plain GET with the submission fields in the query string.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| TransportError::Client(err.to_string()))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl IntakeTransport for HttpTransport {
    async fn send(&self, submission: &OutboundSubmission) -> Result<(), TransportError> {
        let url = submission.url();
        tracing::debug!(method = %submission.method, endpoint = %submission.endpoint, "sending submission");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| TransportError::Request(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        Ok(())
    }
}
