//! Text Analytics sentiment capability: document model, the `Enricher` seam and batch analysis.

pub mod client;
pub mod error;

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use client::{RetryPolicy, TextAnalyticsClient};
pub use error::ServiceError;

/// Documents accepted by a single sentiment request.
pub const MAX_BATCH_DOCUMENTS: usize = 1000;

/// A unit of text submitted for scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub language: String,
    pub text: Option<String>,
}

impl Document {
    pub fn new(id: impl Into<String>, language: impl Into<String>, text: Option<&str>) -> Self {
        Self {
            id: id.into(),
            language: language.into(),
            text: text.map(str::to_owned),
        }
    }

    /// Null or empty text is never sent to the service.
    pub fn is_scorable(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

/// Score returned for one document, 0.0 negative through 1.0 positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub id: String,
    pub score: f64,
}

/// Per-document rejection carried inside an otherwise successful response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentError {
    pub id: String,
    pub message: String,
}

/// Raw answer of one sentiment call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    #[serde(default)]
    pub documents: Vec<SentimentResult>,
    #[serde(default)]
    pub errors: Vec<DocumentError>,
}

/// Validated result of [`analyze`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    /// Scores in the order the service returned them.
    pub results: Vec<SentimentResult>,
    /// Documents the service refused to score.
    pub errors: Vec<DocumentError>,
    /// Ids with null or empty text, never submitted.
    pub skipped: Vec<String>,
}

/// Remote sentiment capability.
///
/// Implementations send the batch as given; filtering and response validation live in
/// [`analyze`].
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn submit(&self, batch: &[Document]) -> Result<BatchResponse, ServiceError>;
}

/// Score a batch in one remote call.
///
/// Documents without text are skipped rather than sent. A response naming an id that was not
/// submitted, a score outside `[0, 1]`, a repeated result, or an id carrying both a score and an
/// error fails the whole batch.
pub async fn analyze<E>(enricher: &E, documents: &[Document]) -> Result<BatchOutcome, ServiceError>
where
    E: Enricher + ?Sized,
{
    validate_batch(documents)?;

    let (submitted, skipped): (Vec<Document>, Vec<Document>) =
        documents.iter().cloned().partition(Document::is_scorable);
    let skipped: Vec<String> = skipped.into_iter().map(|d| d.id).collect();
    if !skipped.is_empty() {
        debug!(ids = ?skipped, "skipping documents without text");
    }
    if submitted.is_empty() {
        debug!("nothing to submit");
        return Ok(BatchOutcome {
            skipped,
            ..BatchOutcome::default()
        });
    }

    let response = enricher.submit(&submitted).await?;

    let known: HashSet<&str> = submitted.iter().map(|d| d.id.as_str()).collect();
    let mut scored: HashSet<&str> = HashSet::new();
    for result in &response.documents {
        if !known.contains(result.id.as_str()) {
            return Err(ServiceError::Decode(format!(
                "result for unknown document id {:?}",
                result.id
            )));
        }
        if !(0.0..=1.0).contains(&result.score) {
            return Err(ServiceError::Decode(format!(
                "score {} for document {:?} is outside [0, 1]",
                result.score, result.id
            )));
        }
        if !scored.insert(result.id.as_str()) {
            return Err(ServiceError::Decode(format!(
                "duplicate result for document {:?}",
                result.id
            )));
        }
    }
    for error in &response.errors {
        if scored.contains(error.id.as_str()) {
            return Err(ServiceError::Decode(format!(
                "document {:?} has both a score and an error",
                error.id
            )));
        }
        debug!(id = %error.id, message = %error.message, "document rejected by service");
    }

    debug!(
        submitted = submitted.len(),
        scored = response.documents.len(),
        rejected = response.errors.len(),
        "sentiment batch complete"
    );
    Ok(BatchOutcome {
        results: response.documents,
        errors: response.errors,
        skipped,
    })
}

fn validate_batch(documents: &[Document]) -> Result<(), ServiceError> {
    if documents.len() > MAX_BATCH_DOCUMENTS {
        return Err(ServiceError::InvalidBatch(format!(
            "{} documents exceed the limit of {MAX_BATCH_DOCUMENTS}",
            documents.len()
        )));
    }
    let mut seen = HashSet::new();
    for doc in documents {
        if doc.id.is_empty() {
            return Err(ServiceError::InvalidBatch("document id is empty".into()));
        }
        if !seen.insert(doc.id.as_str()) {
            return Err(ServiceError::InvalidBatch(format!(
                "duplicate document id {:?}",
                doc.id
            )));
        }
    }
    Ok(())
}

/// The four sample documents scored by the `score` command when no input file is given.
pub fn sample_documents() -> Vec<Document> {
    vec![
        Document::new("1", "en", Some("This is awesome!")),
        Document::new(
            "2",
            "en",
            Some("This was a waste of my time. The speaker put me to sleep."),
        ),
        Document::new("3", "en", None),
        Document::new("4", "en", Some("Hello World")),
    ]
}
