//! Affiliation classification.
//!
//! Decides whether an author's affiliation names a company and pulls a
//! contact email out of the same free text.

use crate::config::DEFAULT_COMPANY_KEYWORDS;
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("email regex is valid")
});

/// Keyword-based company affiliation classifier
#[derive(Debug, Clone)]
pub struct AffiliationClassifier {
    keywords: Vec<String>,
}

impl AffiliationClassifier {
    /// Build a classifier from a keyword set.
    ///
    /// Keywords are lower-cased once here; blank entries are dropped since
    /// they would match every affiliation.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    /// Case-insensitive substring match against the keyword set.
    ///
    /// No word boundaries: "inc" matches "Vincent" as well as "Acme Inc".
    pub fn is_company_affiliated(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }

    /// First email address in `text`, if any.
    pub fn extract_email(&self, text: &str) -> Option<String> {
        extract_email(text)
    }
}

impl Default for AffiliationClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_COMPANY_KEYWORDS)
    }
}

/// First email address in `text`, if any.
pub fn extract_email(text: &str) -> Option<String> {
    EMAIL_RE.find(text).map(|m| m.as_str().to_string())
}
