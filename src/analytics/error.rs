//! Batch-level failures of the sentiment capability.

use thiserror::Error;

/// Batch-level failure of a sentiment request.
///
/// Any of these aborts the whole batch; no partial results accompany them.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The batch was rejected locally before any network call.
    #[error("invalid batch: {0}")]
    InvalidBatch(String),

    /// Connection, TLS, timeout or body transfer failure.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service refused the subscription key (401/403).
    #[error("credentials rejected ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// The quota or rate limit was exceeded (429).
    #[error("quota exceeded: {message}")]
    Throttled { message: String },

    /// Any other non-success status.
    #[error("service returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be interpreted.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Whether a retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Throttled { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            Self::InvalidBatch(_) | Self::Unauthorized { .. } | Self::Decode(_) => false,
        }
    }
}
