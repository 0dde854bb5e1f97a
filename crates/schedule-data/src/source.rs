//! Fetching the raw schedule document.
//!
//! A [`ScheduleSource`] is either an http(s) URL or a local JSON file.
//! [`fetch_raw`] reads it with a bounded number of retries and parses the
//! body into a [`RawSchedule`].

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use schedule_core::error::{Result, ScheduleError};
use schedule_core::models::RawSchedule;
use tracing::{debug, info, warn};

/// Maximum number of fetch attempts before the last error is returned.
pub const MAX_FETCH_ATTEMPTS: u32 = 3;

/// Default HTTP timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

// ── ScheduleSource ────────────────────────────────────────────────────────────

/// Where the schedule document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleSource {
    Url(String),
    File(PathBuf),
}

impl ScheduleSource {
    /// Classify `source` by scheme. `file://` prefixes are stripped.
    pub fn parse(source: &str) -> Result<Self> {
        let source = source.trim();
        if source.is_empty() {
            return Err(ScheduleError::InvalidSource(source.to_string()));
        }

        let lower = source.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(ScheduleSource::Url(source.to_string()));
        }
        if let Some(path) = source.strip_prefix("file://") {
            if path.is_empty() {
                return Err(ScheduleError::InvalidSource(source.to_string()));
            }
            return Ok(ScheduleSource::File(PathBuf::from(path)));
        }
        if lower.contains("://") {
            return Err(ScheduleError::InvalidSource(source.to_string()));
        }
        Ok(ScheduleSource::File(PathBuf::from(source)))
    }
}

impl fmt::Display for ScheduleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleSource::Url(url) => f.write_str(url),
            ScheduleSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

// ── FetchOptions ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub max_attempts: u32,
    /// Added to the wait before every retry (0, 1x, 2x, ...).
    pub backoff_step: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_attempts: MAX_FETCH_ATTEMPTS,
            backoff_step: Duration::from_millis(100),
        }
    }
}

// ── Fetching ──────────────────────────────────────────────────────────────────

/// Fetch and parse the schedule, retrying up to `options.max_attempts` times.
///
/// Back-off schedule with the default step: 0 ms, 100 ms, 200 ms.
pub async fn fetch_raw(source: &ScheduleSource, options: &FetchOptions) -> Result<RawSchedule> {
    let attempts = options.max_attempts.max(1);
    let mut last_err = None;

    for attempt in 0..attempts {
        if attempt > 0 {
            let wait = options.backoff_step * attempt;
            debug!(attempt, wait_ms = wait.as_millis() as u64, "retrying fetch after back-off");
            tokio::time::sleep(wait).await;
        }

        match fetch_once(source, options).await {
            Ok(raw) => {
                info!(
                    %source,
                    days = raw.schedule.len(),
                    speakers = raw.speakers.len(),
                    "schedule fetched"
                );
                return Ok(raw);
            }
            Err(e) if is_retryable(&e) => {
                warn!(attempt, %source, error = %e, "fetch attempt failed");
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_err.unwrap_or_else(|| ScheduleError::InvalidSource(source.to_string())))
}

/// Parse a schedule document from a JSON string.
pub fn parse_raw(body: &str) -> Result<RawSchedule> {
    Ok(serde_json::from_str(body)?)
}

async fn fetch_once(source: &ScheduleSource, options: &FetchOptions) -> Result<RawSchedule> {
    let body = match source {
        ScheduleSource::File(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ScheduleError::FileRead {
                path: path.clone(),
                source: e,
            })?,
        ScheduleSource::Url(url) => fetch_url(url, options.timeout).await?,
    };
    parse_raw(&body)
}

async fn fetch_url(url: &str, timeout: Duration) -> Result<String> {
    let http_err = |e: reqwest::Error| ScheduleError::Http {
        url: url.to_string(),
        message: e.to_string(),
    };

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(http_err)?;

    let response = client.get(url).send().await.map_err(http_err)?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScheduleError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(http_err)
}

/// Transport and server-side failures are worth retrying; a malformed
/// document or a missing file will not fix itself.
fn is_retryable(err: &ScheduleError) -> bool {
    match err {
        ScheduleError::Http { .. } => true,
        ScheduleError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
        _ => false,
    }
}
