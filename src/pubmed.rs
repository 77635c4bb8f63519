//! NCBI E-utilities client.
//!
//! `esearch` resolves a query to PMIDs; `efetch` retrieves one article per
//! PMID with 429-aware retry. Both recover their failures locally: a failed
//! search is an empty list and a failed fetch is `None`, each logged once.

use crate::config::PipelineConfig;
use crate::document::{Element, RawDetailDocument};
use crate::error::{PubmedError, Result};
use crate::retry::{FetchState, RetryMachine, RetryPolicy};
use reqwest::{Client, StatusCode};
use tracing::{debug, error, info, warn};

const USER_AGENT: &str = concat!("rustpubmed/", env!("CARGO_PKG_VERSION"));

/// Outcome of one efetch request
#[derive(Debug)]
pub enum DetailResponse {
    Document(RawDetailDocument),
    RateLimited,
}

/// E-utilities client for the search and detail endpoints
#[derive(Debug, Clone)]
pub struct PubmedClient {
    client: Client,
    config: PipelineConfig,
}

impl PubmedClient {
    /// Create a client from a validated configuration.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| PubmedError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Search PubMed and return PMIDs in server order.
    ///
    /// Any failure is logged and yields an empty list.
    pub async fn search(&self, query: &str) -> Vec<String> {
        match self.try_search(query).await {
            Ok(ids) => ids,
            Err(e) => {
                error!(query = query, error = %e, "PubMed search failed");
                Vec::new()
            }
        }
    }

    /// Search PubMed, surfacing the failure kind.
    pub async fn try_search(&self, query: &str) -> Result<Vec<String>> {
        let url = self.config.endpoint("esearch.fcgi")?;
        let retmax = self.config.max_results.to_string();

        debug!(query = query, retmax = %retmax, "Sending esearch request");

        let response = self
            .client
            .get(url)
            .query(&[
                ("db", "pubmed"),
                ("term", query),
                ("retmode", "xml"),
                ("retmax", retmax.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PubmedError::Api {
                code: status.as_u16(),
                message: format!("esearch returned {}", status),
            });
        }

        let body = response.text().await?;
        let doc = RawDetailDocument::parse(&body)
            .map_err(|e| PubmedError::Parse(format!("esearch response: {}", e)))?;

        if let Some(message) = doc.find_first("ERROR").and_then(Element::non_empty_text) {
            warn!(query = query, message = %message, "esearch reported an error");
        }

        let ids: Vec<String> = doc
            .find_all("Id")
            .into_iter()
            .filter_map(Element::non_empty_text)
            .collect();

        info!(query = query, count = ids.len(), "Found paper IDs");
        Ok(ids)
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_config(&self.config)
    }

    /// Fetch the detail document for one PMID.
    ///
    /// Retries only on 429, doubling the delay each time, up to
    /// `max_attempts`. Any other failure ends the fetch immediately.
    pub async fn fetch_detail(&self, id: &str) -> Option<RawDetailDocument> {
        let mut retry = RetryMachine::new(self.retry_policy());

        while let FetchState::Attempting { attempt } = retry.state() {
            match self.fetch_detail_once(id).await {
                Ok(DetailResponse::Document(doc)) => {
                    retry.succeed();
                    debug!(id = id, attempt = attempt, "Fetched paper details");
                    return Some(doc);
                }
                Ok(DetailResponse::RateLimited) => {
                    let Some(delay) = retry.rate_limited() else {
                        break;
                    };
                    let event = PubmedError::RateLimited {
                        attempt,
                        delay_ms: delay.as_millis() as u64,
                    };
                    warn!(id = id, error = %event, "Rate limit exceeded, backing off");
                    tokio::time::sleep(delay).await;
                    retry.resume();
                }
                Err(e) => {
                    retry.fail();
                    warn!(id = id, attempt = attempt, error = %e, "Error fetching paper");
                    return None;
                }
            }
        }

        let exhausted = PubmedError::RetriesExhausted {
            id: id.to_string(),
            attempts: retry.attempts(),
        };
        warn!(id = id, error = %exhausted, "Giving up on paper");
        None
    }

    /// One efetch request, without retry.
    pub async fn fetch_detail_once(&self, id: &str) -> Result<DetailResponse> {
        let url = self.config.endpoint("efetch.fcgi")?;

        let response = self
            .client
            .get(url)
            .query(&[("db", "pubmed"), ("id", id), ("retmode", "xml")])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(DetailResponse::RateLimited);
        }
        if !status.is_success() {
            return Err(PubmedError::Api {
                code: status.as_u16(),
                message: format!("efetch returned {}", status),
            });
        }

        let body = response.text().await?;
        let doc = RawDetailDocument::parse(&body)?;
        Ok(DetailResponse::Document(doc))
    }
}
