//! Paper records and the detail-document parser.

use crate::classifier::AffiliationClassifier;
use crate::document::{Element, RawDetailDocument};

/// One PubMed article with at least one company-affiliated author
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaperRecord {
    /// PubMed identifier (PMID)
    pub id: String,
    /// Article title, empty if absent
    pub title: String,
    /// Publication year, empty if absent
    pub publication_year: String,
    /// Last names of company-affiliated authors
    pub non_academic_authors: Vec<String>,
    /// Company affiliation strings, as written in the record
    pub company_affiliations: Vec<String>,
    /// First email found in any affiliation, empty if none
    pub corresponding_email: String,
}

impl PaperRecord {
    /// Whether the record passes the company-affiliation filter.
    pub fn is_accepted(&self) -> bool {
        !self.company_affiliations.is_empty()
    }

    /// Keep the record only if it passes the filter.
    pub fn accepted(self) -> Option<Self> {
        self.is_accepted().then_some(self)
    }
}

/// Build a candidate record from a detail document.
///
/// `non_academic_authors` and `company_affiliations` are independent lists:
/// an author with a company affiliation but no `LastName` (a collective
/// name, for example) contributes only the affiliation.
pub fn parse_record(
    id: &str,
    doc: &RawDetailDocument,
    classifier: &AffiliationClassifier,
) -> PaperRecord {
    let mut record = PaperRecord {
        id: id.to_string(),
        title: doc
            .find_first("ArticleTitle")
            .map(Element::text)
            .unwrap_or_default(),
        publication_year: doc
            .find_all("PubDate")
            .into_iter()
            .find_map(|d| d.child("Year"))
            .map(Element::text)
            .unwrap_or_default(),
        ..Default::default()
    };

    for author in doc.find_all("Author") {
        let Some(affiliation) = author
            .find_first("Affiliation")
            .and_then(Element::non_empty_text)
        else {
            continue;
        };

        if classifier.is_company_affiliated(&affiliation) {
            if let Some(last_name) = author.child("LastName").and_then(Element::non_empty_text) {
                record.non_academic_authors.push(last_name);
            }
            record.company_affiliations.push(affiliation.clone());
        }

        if record.corresponding_email.is_empty() {
            if let Some(email) = classifier.extract_email(&affiliation) {
                record.corresponding_email = email;
            }
        }
    }

    record
}
