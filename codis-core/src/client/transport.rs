use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;
use thiserror::Error;

/// Connection-level failure: the request never produced an HTTP response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("connection failed: {0}")]
pub struct ConnectError(pub String);

/// Status and body of an upstream response, captured before any decoding.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Wire seam below [`StationClient`](crate::client::StationClient), so the
/// retry and payload-validation paths can be exercised without a network.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn get(&self, url: &str) -> Result<RawResponse, ConnectError>;

    async fn post_form(
        &self,
        url: &str,
        form: &[(&'static str, String)],
    ) -> Result<RawResponse, ConnectError>;
}

/// reqwest-backed transport used outside of tests.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Per-request deadline. The upstream occasionally stalls instead of
    /// failing; without this, a hung request would never reach the retry loop.
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self { http }
    }

    async fn read(res: reqwest::Response) -> Result<RawResponse, ConnectError> {
        let status = res.status().as_u16();
        let body = res.text().await.map_err(|e| ConnectError(e.to_string()))?;
        Ok(RawResponse { status, body })
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, ConnectError> {
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ConnectError(e.to_string()))?;
        Self::read(res).await
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(&'static str, String)],
    ) -> Result<RawResponse, ConnectError> {
        let res = self
            .http
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| ConnectError(e.to_string()))?;
        Self::read(res).await
    }
}
