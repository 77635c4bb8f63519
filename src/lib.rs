//! # rustpubmed
//!
//! PubMed company-affiliation scanner.
//!
//! Searches PubMed through NCBI E-utilities, fetches every matching article
//! with a bounded worker pool, and keeps the ones with at least one author
//! affiliated with a company (pharma, biotech, `Inc`, `GmbH`, ...).
//!
//! ## Modules
//!
//! - [`pubmed`] - esearch/efetch client with 429 backoff
//! - [`retry`] - Backoff state machine for detail fetches
//! - [`document`] - Owned XML tree for E-utilities bodies
//! - [`record`] - `PaperRecord` and the article parser
//! - [`classifier`] - Company keyword and email matching
//! - [`coordinator`] - Order-preserving bounded concurrent map
//! - [`pipeline`] - End-to-end run
//! - [`report`] - Console and CSV output
//! - [`config`] - Pipeline settings
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rustpubmed::{Pipeline, PipelineConfig, PipelineOutcome};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pipeline = Pipeline::new(PipelineConfig::default())?;
//!     if let PipelineOutcome::Papers(records) = pipeline.run("CRISPR[Title]").await? {
//!         println!("Found {} company-affiliated papers", records.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod config;
pub mod coordinator;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod pubmed;
pub mod record;
pub mod report;
pub mod retry;

pub use classifier::AffiliationClassifier;
pub use config::PipelineConfig;
pub use error::{PubmedError, Result};
pub use pipeline::{Pipeline, PipelineOutcome};
pub use record::PaperRecord;
