//! Cross-language availability resolution

use std::sync::Arc;
use std::time::Duration;

use crate::fetcher::ArticleSource;
use crate::types::Language;

/// Result of probing one candidate in every target language
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Availability {
    /// Languages whose probe succeeded
    pub present: Vec<Language>,
    /// Languages whose probe failed
    pub missing: Vec<Language>,
}

impl Availability {
    /// True iff no language is missing
    pub fn is_everywhere(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Decides whether a title exists in every configured language edition
///
/// Every language is probed, in configuration order, even after a miss, so
/// the result always lists the full set of missing editions. A fixed delay
/// separates consecutive probes.
pub struct AvailabilityResolver {
    source: Arc<dyn ArticleSource>,
    languages: Vec<Language>,
    probe_delay: Duration,
}

impl AvailabilityResolver {
    /// Create a resolver over the given languages
    pub fn new(source: Arc<dyn ArticleSource>, languages: Vec<Language>, probe_delay: Duration) -> Self {
        Self {
            source,
            languages,
            probe_delay,
        }
    }

    /// Probe every language and report which ones have the article
    pub async fn resolve(&self, title: &str) -> Availability {
        let mut present = Vec::with_capacity(self.languages.len());
        let mut missing = Vec::new();

        for (i, &language) in self.languages.iter().enumerate() {
            if i > 0 && !self.probe_delay.is_zero() {
                tokio::time::sleep(self.probe_delay).await;
            }
            if self.source.exists(language, title).await {
                present.push(language);
            } else {
                missing.push(language);
            }
        }

        if !missing.is_empty() {
            let missing_codes: Vec<&str> = missing.iter().map(|l| l.code()).collect();
            tracing::debug!(title, missing = ?missing_codes, "Candidate not available in every language");
        }

        Availability { present, missing }
    }

    /// Logical AND of the per-language existence probes
    pub async fn is_available_everywhere(&self, title: &str) -> bool {
        self.resolve(title).await.is_everywhere()
    }
}
