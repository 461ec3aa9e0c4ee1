//! Sentiment enrichment for documents and tables backed by Azure Text Analytics.

pub mod analytics;
pub mod cli;
pub mod config;
pub mod enrich;
pub mod logging;
pub mod report;
pub mod table;
