//! Pipeline configuration.
//!
//! Defaults mirror NCBI E-utilities usage for anonymous clients. Everything
//! is overridable so tests can point at a mock server and shrink the backoff.

use crate::error::{PubmedError, Result};
use std::time::Duration;
use url::Url;

/// NCBI E-utilities base URL
pub const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/";

/// Default search result cap
pub const DEFAULT_MAX_RESULTS: usize = 50;

/// Default detail worker pool size
pub const DEFAULT_WORKERS: usize = 5;

/// Default attempts per detail fetch under rate limiting
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Keywords marking an affiliation as commercial
pub const DEFAULT_COMPANY_KEYWORDS: &[&str] = &[
    "pharma",
    "biotech",
    "therapeutics",
    "biosciences",
    "medtech",
    "inc",
    "ltd",
    "corp",
    "gmbh",
];

/// Settings shared by the search, fetch and filter stages
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// E-utilities base URL, always ending in `/`
    pub base_url: String,
    /// `retmax` for the search call
    pub max_results: usize,
    /// Concurrent detail fetches
    pub workers: usize,
    /// Attempts per identifier before giving up on 429s
    pub max_attempts: u32,
    /// Backoff time unit; the first delay is two units
    pub backoff_unit: Duration,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
    /// Affiliation keywords (matched lower-cased)
    pub keywords: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            workers: DEFAULT_WORKERS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_unit: Duration::from_secs(1),
            request_timeout: Duration::from_secs(30),
            keywords: DEFAULT_COMPANY_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

impl PipelineConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Check the configuration before any request is made.
    pub fn validate(&self) -> Result<()> {
        if self.max_results == 0 {
            return Err(PubmedError::Config("max_results must be positive".to_string()));
        }
        if self.workers == 0 {
            return Err(PubmedError::Config("workers must be positive".to_string()));
        }
        if self.max_attempts == 0 {
            return Err(PubmedError::Config("max_attempts must be positive".to_string()));
        }
        Url::parse(&self.base_url)
            .map_err(|e| PubmedError::Config(format!("Invalid base URL {}: {}", self.base_url, e)))?;
        Ok(())
    }

    /// Absolute URL of an E-utilities endpoint, e.g. `esearch.fcgi`.
    pub fn endpoint(&self, name: &str) -> Result<Url> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| PubmedError::Config(format!("Invalid base URL {}: {}", self.base_url, e)))?;
        base.join(name)
            .map_err(|e| PubmedError::Config(format!("Invalid endpoint {}: {}", name, e)))
    }
}
