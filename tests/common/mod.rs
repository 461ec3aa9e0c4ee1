#![allow(dead_code)]

use std::{
    collections::HashSet,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use sentiscope::analytics::{
    BatchResponse, Document, DocumentError, Enricher, SentimentResult, ServiceError,
};

/// Deterministic stand-in for the sentiment model.
pub fn fake_score(text: &str) -> f64 {
    let lower = text.to_lowercase();
    if lower.contains("awesome") {
        1.0
    } else if lower.contains("waste") {
        0.11
    } else if lower.contains("hello") {
        0.76
    } else {
        (text.len() % 101) as f64 / 100.0
    }
}

/// Scripted enricher that records traffic and can inject failures by document id.
#[derive(Default)]
pub struct MockEnricher {
    /// Ids whose request fails as a whole.
    pub fail_ids: HashSet<String>,
    /// Ids the service refuses inside a successful response.
    pub reject_ids: HashSet<String>,
    pub delay: Option<Duration>,
    pub calls: AtomicUsize,
    pub documents_seen: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl MockEnricher {
    pub fn failing(ids: &[&str]) -> Self {
        Self {
            fail_ids: ids.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Enricher for MockEnricher {
    async fn submit(&self, batch: &[Document]) -> Result<BatchResponse, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.documents_seen.fetch_add(batch.len(), Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if batch.iter().any(|d| self.fail_ids.contains(&d.id)) {
            return Err(ServiceError::Status {
                status: 503,
                message: "injected failure".into(),
            });
        }

        let mut response = BatchResponse::default();
        for doc in batch {
            if self.reject_ids.contains(&doc.id) {
                response.errors.push(DocumentError {
                    id: doc.id.clone(),
                    message: "Invalid document".into(),
                });
            } else if let Some(text) = &doc.text {
                response.documents.push(SentimentResult {
                    id: doc.id.clone(),
                    score: fake_score(text),
                });
            }
        }
        Ok(response)
    }
}

/// Enricher returning a fixed response regardless of input.
pub struct CannedEnricher(pub BatchResponse);

#[async_trait]
impl Enricher for CannedEnricher {
    async fn submit(&self, _batch: &[Document]) -> Result<BatchResponse, ServiceError> {
        Ok(self.0.clone())
    }
}
