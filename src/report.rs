//! Presentation of direct-flow sentiment results.

use indexmap::IndexMap;
use serde::Serialize;

use crate::analytics::{BatchOutcome, Document};

/// One printed result line, score rounded to two decimals.
pub fn score_line(id: &str, score: f64) -> String {
    format!("Document Id:  {id} , Sentiment Score:  {score:.2}")
}

/// Score lines in the order the service returned them. Skipped and rejected documents produce
/// no line.
pub fn score_lines(outcome: &BatchOutcome) -> Vec<String> {
    outcome
        .results
        .iter()
        .map(|r| score_line(&r.id, r.score))
        .collect()
}

/// What happened to a submitted document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentStatus {
    Scored { score: f64 },
    Skipped,
    Rejected { message: String },
    /// Sent, but the service returned neither a score nor an error.
    Missing,
}

/// Status of every document keyed by id, in submission order.
pub fn collate(documents: &[Document], outcome: &BatchOutcome) -> IndexMap<String, DocumentStatus> {
    let mut statuses: IndexMap<String, DocumentStatus> = documents
        .iter()
        .map(|d| (d.id.clone(), DocumentStatus::Missing))
        .collect();
    for id in &outcome.skipped {
        if let Some(status) = statuses.get_mut(id) {
            *status = DocumentStatus::Skipped;
        }
    }
    for err in &outcome.errors {
        if let Some(status) = statuses.get_mut(&err.id) {
            *status = DocumentStatus::Rejected {
                message: err.message.clone(),
            };
        }
    }
    for result in &outcome.results {
        if let Some(status) = statuses.get_mut(&result.id) {
            *status = DocumentStatus::Scored {
                score: result.score,
            };
        }
    }
    statuses
}

/// JSON line per document: `{"id": ..., "status": ..., ...}`.
pub fn json_lines(statuses: &IndexMap<String, DocumentStatus>) -> serde_json::Result<Vec<String>> {
    #[derive(Serialize)]
    struct Line<'a> {
        id: &'a str,
        #[serde(flatten)]
        status: &'a DocumentStatus,
    }

    statuses
        .iter()
        .map(|(id, status)| serde_json::to_string(&Line { id, status }))
        .collect()
}
