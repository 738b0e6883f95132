//! HTTP client for the CODiS climate-data service.
//!
//! Two endpoints are consumed: the station list (GET, no retry) and the
//! monthly observation report (form-encoded POST, retried with exponential
//! backoff on transient failures). Both reject markup bodies served with a
//! 200 status, which is how the upstream reports its own errors.

use crate::client::transport::{ConnectError, HttpTransport, RawResponse, Transport};
use crate::flatten::flatten;
use crate::model::{ObservationRecord, StationItem};
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

pub mod transport;

pub const DEFAULT_BASE_URL: &str = "https://codis.cwa.gov.tw";

/// Errors from the CODiS endpoints.
///
/// Only [`ApiError::is_transient`] variants are ever retried; everything else
/// signals a request or contract problem that a retry cannot fix.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] ConnectError),

    #[error("server error (HTTP {status})")]
    Server { status: u16 },

    #[error("request rejected (HTTP {status})")]
    Rejected { status: u16 },

    #[error("received markup instead of JSON, upstream likely served an error page: {snippet}")]
    MarkupBody { snippet: String },

    #[error("response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("unexpected response shape: {0}")]
    UnexpectedShape(&'static str),

    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<ApiError>,
    },
}

impl ApiError {
    /// Connection failures and 5xx responses may clear up on their own.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Server { .. })
    }
}

/// Retry policy for transient upstream failures. Injected rather than
/// hard-coded so tests can shorten the waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: u32,
    /// Wait before the first retry; doubles for each one after.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 3, base_delay: Duration::from_secs(1) }
    }
}

impl RetryPolicy {
    /// Backoff slept before retry `attempt` (1-based): base, 2x, 4x, 8x, ...
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.pow(attempt.saturating_sub(1))
    }
}

/// Fetch seam above the HTTP client, so the range pipeline can run against a
/// scripted source in tests.
#[async_trait]
pub trait ReportSource: Send + Sync {
    async fn monthly_report(
        &self,
        station_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ObservationRecord>, ApiError>;
}

#[derive(Debug)]
pub struct StationClient {
    transport: Box<dyn Transport>,
    base_url: String,
    retry: RetryPolicy,
}

impl StationClient {
    pub fn new() -> Self {
        Self::with_transport(
            Box::new(HttpTransport::new()),
            DEFAULT_BASE_URL,
            RetryPolicy::default(),
        )
    }

    pub fn with_transport(
        transport: Box<dyn Transport>,
        base_url: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self { transport, base_url: base_url.into(), retry }
    }

    /// Automatic stations currently in service: code starts with `C0` and the
    /// decommission date is unset. The list endpoint is not retried.
    pub async fn station_list(&self) -> Result<Vec<StationItem>, ApiError> {
        let url = format!("{}/api/station_list", self.base_url);
        let res = self.transport.get(&url).await?;
        let body = check_payload(res)?;

        let parsed: StationListResponse = serde_json::from_str(&body)?;
        let entry = parsed
            .data
            .into_iter()
            .nth(1)
            .ok_or(ApiError::UnexpectedShape("station list is missing its second data entry"))?;

        Ok(entry
            .item
            .into_iter()
            .filter(|s| s.station_id.starts_with("C0") && s.station_end_date.is_empty())
            .collect())
    }

    /// Monthly observation report for one bounded sub-range, flattened.
    /// Transient failures are retried per the configured [`RetryPolicy`].
    pub async fn monthly_report(
        &self,
        station_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ObservationRecord>, ApiError> {
        let mut last = None;
        for attempt in 0..=self.retry.max_retries {
            if attempt > 0 {
                let delay = self.retry.delay(attempt);
                warn!(
                    "station {station_id}: attempt {}/{} failed, retrying in {delay:?}",
                    attempt,
                    self.retry.max_retries + 1,
                );
                tokio::time::sleep(delay).await;
            }
            match self.request_report(station_id, start, end).await {
                Ok(records) => return Ok(records),
                Err(err) if err.is_transient() => {
                    debug!("station {station_id}: {err}");
                    last = Some(err);
                }
                Err(err) => return Err(err),
            }
        }
        Err(match last {
            Some(err) => ApiError::RetriesExhausted {
                attempts: self.retry.max_retries + 1,
                last: Box::new(err),
            },
            None => ApiError::UnexpectedShape("retry loop ended without an attempt"),
        })
    }

    /// One report request, no retry.
    async fn request_report(
        &self,
        station_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ObservationRecord>, ApiError> {
        let url = format!("{}/api/station", self.base_url);
        let form = report_form(station_id, start, end);
        let res = self.transport.post_form(&url, &form).await?;
        let body = check_payload(res)?;

        let value: Value = serde_json::from_str(&body)?;
        let dts = value
            .get("data")
            .and_then(|data| data.get(0))
            .and_then(|first| first.get("dts"))
            .and_then(Value::as_array)
            .ok_or(ApiError::UnexpectedShape("data[0].dts is absent or not a list"))?;

        Ok(dts.iter().filter(|raw| raw.is_object()).map(flatten).collect())
    }
}

impl Default for StationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportSource for StationClient {
    async fn monthly_report(
        &self,
        station_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ObservationRecord>, ApiError> {
        StationClient::monthly_report(self, station_id, start, end).await
    }
}

#[derive(Debug, Deserialize)]
struct StationListResponse {
    data: Vec<StationListEntry>,
}

#[derive(Debug, Deserialize)]
struct StationListEntry {
    #[serde(default)]
    item: Vec<StationItem>,
}

fn report_form(station_id: &str, start: NaiveDate, end: NaiveDate) -> [(&'static str, String); 7] {
    [
        ("type", "report_month".to_string()),
        ("stn_ID", station_id.to_string()),
        ("stn_type", "auto_C0".to_string()),
        ("more", String::new()),
        ("start", api_timestamp(start)),
        ("end", api_timestamp(end)),
        ("item", String::new()),
    ]
}

/// Dates are sent as midnight-anchored local wall-clock instants.
fn api_timestamp(date: NaiveDate) -> String {
    format!("{}T00:00:00", date.format("%Y-%m-%d"))
}

/// Shared checks for both endpoints: non-200 statuses and markup bodies
/// disguised as success are contract violations.
fn check_payload(res: RawResponse) -> Result<String, ApiError> {
    match res.status {
        200 => {}
        status if status >= 500 => return Err(ApiError::Server { status }),
        status => return Err(ApiError::Rejected { status }),
    }
    if res.body.trim_start().starts_with('<') {
        return Err(ApiError::MarkupBody { snippet: truncate_body(&res.body) });
    }
    Ok(res.body)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
