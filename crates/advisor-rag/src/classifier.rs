//! Keyword-overlap domain classifier

use serde::Serialize;

use advisor_core::{Domain, DomainSelector};

use crate::sources::default_keywords;

/// Keyword match count for one domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DomainScore {
    pub domain: Domain,
    pub score: usize,
}

/// Routes a free-text query to one domain, or to all of them
///
/// A domain's score is the number of its keyword phrases contained in the
/// lower-cased query. Containment is plain substring matching, so "cost" also
/// matches inside "costume". Ties go to the earlier domain in [`Domain::ALL`]
/// (migration, then architecture, then costing).
#[derive(Debug, Clone)]
pub struct DomainClassifier {
    keywords: Vec<(Domain, Vec<String>)>,
}

impl DomainClassifier {
    /// Classifier over the built-in keyword tables
    pub fn new() -> Self {
        Self::with_keywords(|domain| {
            default_keywords(domain)
                .iter()
                .map(|kw| kw.to_string())
                .collect()
        })
    }

    /// Classifier over custom keyword tables
    pub fn with_keywords(mut keywords_for: impl FnMut(Domain) -> Vec<String>) -> Self {
        let keywords = Domain::ALL
            .iter()
            .map(|&domain| {
                let words = keywords_for(domain)
                    .into_iter()
                    .map(|kw| kw.to_lowercase())
                    .collect();
                (domain, words)
            })
            .collect();
        Self { keywords }
    }

    /// Per-domain keyword match counts, in priority order
    pub fn scores(&self, query: &str) -> Vec<DomainScore> {
        let query_lower = query.to_lowercase();
        self.keywords
            .iter()
            .map(|(domain, words)| DomainScore {
                domain: *domain,
                score: words.iter().filter(|kw| query_lower.contains(kw.as_str())).count(),
            })
            .collect()
    }

    /// Select the domain(s) a query should be answered from
    pub fn classify(&self, query: &str) -> DomainSelector {
        let mut best: Option<DomainScore> = None;
        for candidate in self.scores(query) {
            if candidate.score == 0 {
                continue;
            }
            // Strictly greater, so an earlier domain keeps a tie
            if best.is_none_or(|b| candidate.score > b.score) {
                best = Some(candidate);
            }
        }

        match best {
            Some(winner) => DomainSelector::Single(winner.domain),
            None => DomainSelector::All,
        }
    }
}

impl Default for DomainClassifier {
    fn default() -> Self {
        Self::new()
    }
}
