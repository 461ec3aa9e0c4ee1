//! HTTP adapter for the Text Analytics v2.1 sentiment endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

use super::{BatchResponse, Document, Enricher, ServiceError};
use crate::config::Settings;

const SENTIMENT_PATH: &str = "/text/analytics/v2.1/sentiment";
const KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Retry behaviour for transient failures. The default performs no retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Text Analytics client holding the shared key, endpoint and connection pool.
///
/// Holds the subscription key; keep it out of `Debug`.
#[derive(Clone)]
pub struct TextAnalyticsClient {
    http: Client,
    url: String,
    key: String,
    retry: RetryPolicy,
}

impl TextAnalyticsClient {
    /// Build a client against `endpoint` (scheme and host, no path).
    pub fn new(
        endpoint: &str,
        key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        let mut builder = Client::builder()
            .user_agent(concat!("sentiscope/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .brotli(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            url: format!("{}{SENTIMENT_PATH}", endpoint.trim_end_matches('/')),
            key: key.into(),
            retry: RetryPolicy::default(),
        })
    }

    /// Build a client from resolved settings.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let key = settings.require_key()?;
        let client = Self::new(&settings.service_endpoint()?, key, settings.request_timeout)?
            .with_retry(RetryPolicy {
                max_retries: settings.max_retries,
                backoff: settings.retry_backoff,
            });
        Ok(client)
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Full URL of the sentiment endpoint.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn send_once(&self, body: &SentimentRequest<'_>) -> Result<BatchResponse, ServiceError> {
        let transport = |source: reqwest::Error| ServiceError::Transport {
            url: self.url.clone(),
            source,
        };
        let resp = self
            .http
            .post(&self.url)
            .header(KEY_HEADER, &self.key)
            .json(body)
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        let text = resp.text().await.map_err(transport)?;
        if !status.is_success() {
            return Err(status_error(status, &text));
        }
        serde_json::from_str(&text).map_err(|err| ServiceError::Decode(err.to_string()))
    }
}

#[async_trait]
impl Enricher for TextAnalyticsClient {
    #[instrument(skip_all, fields(documents = batch.len()))]
    async fn submit(&self, batch: &[Document]) -> Result<BatchResponse, ServiceError> {
        let body = SentimentRequest {
            documents: batch
                .iter()
                .map(|d| RequestDocument {
                    id: &d.id,
                    language: &d.language,
                    text: d.text.as_deref(),
                })
                .collect(),
        };

        let mut attempt = 0;
        loop {
            match self.send_once(&body).await {
                Ok(resp) => {
                    debug!(attempt, "sentiment request succeeded");
                    return Ok(resp);
                }
                Err(err) if err.is_transient() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    warn!(%err, attempt, "transient failure, retrying");
                    sleep(self.retry.backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct SentimentRequest<'a> {
    documents: Vec<RequestDocument<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestDocument<'a> {
    id: &'a str,
    language: &'a str,
    text: Option<&'a str>,
}

fn status_error(status: StatusCode, body: &str) -> ServiceError {
    let message = error_message(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServiceError::Unauthorized {
            status: status.as_u16(),
            message,
        },
        StatusCode::TOO_MANY_REQUESTS => ServiceError::Throttled { message },
        _ => ServiceError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

/// Pull the human-readable message out of an error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            v.pointer("/error/message")
                .or_else(|| v.pointer("/message"))
                .and_then(|m| m.as_str())
        })
        .map(str::to_owned)
        .unwrap_or_else(|| body.trim().to_string())
}
