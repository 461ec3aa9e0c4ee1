//! Runtime configuration utilities for sentiscope.

use std::{
    env, fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};

/// Azure region used when neither a region nor an endpoint is configured.
pub const DEFAULT_REGION: &str = "eastus";

/// Application configuration resolved from `.env` and defaults.
#[derive(Clone)]
pub struct Settings {
    /// Text Analytics subscription key, required only for remote calls.
    pub subscription_key: Option<String>,
    /// Azure region hosting the Text Analytics resource.
    pub region: String,
    /// Explicit service endpoint overriding the region-derived one.
    pub endpoint: Option<String>,
    /// Language code attached to documents that do not carry one.
    pub language: String,
    /// Maximum simultaneous in-flight requests during table enrichment.
    pub concurrency: usize,
    /// Per-request timeout; `None` leaves it to the HTTP client.
    pub request_timeout: Option<Duration>,
    /// Retries for transient failures; zero means fail once and report.
    pub max_retries: u32,
    /// Pause between retries.
    pub retry_backoff: Duration,
    /// Root folder for enriched tables.
    pub outputs_dir: PathBuf,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let subscription_key = env::var("TEXT_ANALYTICS_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        let region =
            env::var("TEXT_ANALYTICS_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string());
        let endpoint = env::var("TEXT_ANALYTICS_ENDPOINT")
            .ok()
            .filter(|e| !e.trim().is_empty());
        let language = env::var("TEXT_ANALYTICS_LANGUAGE").unwrap_or_else(|_| "en".to_string());
        let concurrency = env::var("ENRICH_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);
        let request_timeout = env::var("TEXT_ANALYTICS_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs);
        let max_retries = env::var("TEXT_ANALYTICS_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let retry_backoff = env::var("TEXT_ANALYTICS_RETRY_BACKOFF_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(500));
        let outputs_dir = env::var("OUTPUTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./outputs"));

        std::fs::create_dir_all(&outputs_dir).context("creating outputs dir")?;

        Ok(Self {
            subscription_key,
            region,
            endpoint,
            language,
            concurrency,
            request_timeout,
            max_retries,
            retry_backoff,
            outputs_dir,
        })
    }

    /// Base URL of the Text Analytics resource.
    ///
    /// An explicit endpoint wins; otherwise the public regional host is used.
    pub fn service_endpoint(&self) -> anyhow::Result<String> {
        if let Some(endpoint) = &self.endpoint {
            return Ok(endpoint.trim_end_matches('/').to_string());
        }
        let region = self.region.trim();
        if region.is_empty() || !region.chars().all(|c| c.is_ascii_alphanumeric()) {
            bail!("invalid Text Analytics region {region:?}");
        }
        Ok(format!(
            "https://{}.api.cognitive.microsoft.com",
            region.to_ascii_lowercase()
        ))
    }

    /// Subscription key or a descriptive error when none is configured.
    pub fn require_key(&self) -> anyhow::Result<&str> {
        match self.subscription_key.as_deref() {
            Some(key) => Ok(key),
            None => bail!("TEXT_ANALYTICS_KEY is not set; pass --key or add it to .env"),
        }
    }

    /// Convenience helper for derived output path segments.
    pub fn join_output<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.outputs_dir.join(path)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            subscription_key: None,
            region: DEFAULT_REGION.to_string(),
            endpoint: None,
            language: "en".to_string(),
            concurrency: 10,
            request_timeout: None,
            max_retries: 0,
            retry_backoff: Duration::from_millis(500),
            outputs_dir: PathBuf::from("./outputs"),
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field(
                "subscription_key",
                &self.subscription_key.as_ref().map(|_| "<redacted>"),
            )
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("language", &self.language)
            .field("concurrency", &self.concurrency)
            .field("request_timeout", &self.request_timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff", &self.retry_backoff)
            .field("outputs_dir", &self.outputs_dir)
            .finish()
    }
}
