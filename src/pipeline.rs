//! Search → fetch → parse → filter pipeline.

use crate::classifier::AffiliationClassifier;
use crate::config::PipelineConfig;
use crate::coordinator::map_ordered;
use crate::error::{PubmedError, Result};
use crate::pubmed::PubmedClient;
use crate::record::{parse_record, PaperRecord};
use tracing::{debug, info};

/// Terminal result of a pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The search returned no identifiers (or failed)
    NoPapers,
    /// Identifiers were found but none passed the company filter
    NoRelevantPapers {
        /// Identifiers returned by the search
        found: usize,
        /// Detail documents successfully fetched
        fetched: usize,
    },
    /// Accepted records, in search order
    Papers(Vec<PaperRecord>),
}

impl PipelineOutcome {
    /// Accepted records, empty for the two "nothing" outcomes.
    pub fn records(&self) -> &[PaperRecord] {
        match self {
            PipelineOutcome::Papers(records) => records,
            _ => &[],
        }
    }
}

/// Per-identifier result inside the worker pool
enum Processed {
    Failed,
    Rejected,
    Accepted(PaperRecord),
}

/// Company-affiliation scanner over PubMed
pub struct Pipeline {
    client: PubmedClient,
    classifier: AffiliationClassifier,
    workers: usize,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let classifier = AffiliationClassifier::new(&config.keywords);
        let workers = config.workers;
        let client = PubmedClient::new(config)?;
        Ok(Self {
            client,
            classifier,
            workers,
        })
    }

    /// Replace the classifier, e.g. with a custom keyword set.
    pub fn with_classifier(mut self, classifier: AffiliationClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Run the whole pipeline for `query`.
    ///
    /// Only an empty query is an error; network and parse failures are
    /// absorbed per stage.
    pub async fn run(&self, query: &str) -> Result<PipelineOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PubmedError::Validation("Query must not be empty".to_string()));
        }

        let ids = self.client.search(query).await;
        if ids.is_empty() {
            info!(query = query, "No papers found");
            return Ok(PipelineOutcome::NoPapers);
        }

        let found = ids.len();
        info!(count = found, workers = self.workers, "Fetching paper details");

        let client = &self.client;
        let classifier = &self.classifier;
        let processed = map_ordered(ids, self.workers, move |id: String| async move {
            match client.fetch_detail(&id).await {
                Some(doc) => match parse_record(&id, &doc, classifier).accepted() {
                    Some(record) => Processed::Accepted(record),
                    None => {
                        debug!(id = %id, "No company affiliation");
                        Processed::Rejected
                    }
                },
                None => Processed::Failed,
            }
        })
        .await;

        let fetched = processed
            .iter()
            .filter(|p| !matches!(p, Processed::Failed))
            .count();
        let records: Vec<PaperRecord> = processed
            .into_iter()
            .filter_map(|p| match p {
                Processed::Accepted(record) => Some(record),
                Processed::Rejected | Processed::Failed => None,
            })
            .collect();

        info!(
            found = found,
            fetched = fetched,
            accepted = records.len(),
            "Pipeline complete"
        );

        if records.is_empty() {
            Ok(PipelineOutcome::NoRelevantPapers { found, fetched })
        } else {
            Ok(PipelineOutcome::Papers(records))
        }
    }
}
