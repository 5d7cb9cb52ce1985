//! Trait seam between the pipeline and the network

use async_trait::async_trait;

use crate::types::{FetchOutcome, Language};

/// Source of article bodies and existence probes
///
/// Implementations absorb every expected failure (timeouts, connection
/// errors, non-success statuses, pages without a content region) and report
/// it as [`FetchOutcome::NotFound`] or `false`, logging the cause. Nothing
/// here returns an error, so a flaky edition can never abort a run.
///
/// # Examples
///
/// ```no_run
/// use parallel_corpus::fetcher::{ArticleSource, WikipediaClient};
/// use parallel_corpus::config::FetchConfig;
/// use parallel_corpus::Language;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = WikipediaClient::new(FetchConfig::default())?;
/// if client.exists(Language::Cebuano, "Tubig").await {
///     let outcome = client.fetch(Language::Cebuano, "Tubig").await;
///     println!("found: {}", outcome.is_found());
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Fetch and clean the article body
    async fn fetch(&self, language: Language, title: &str) -> FetchOutcome;

    /// Lightweight existence probe; no body parsing
    async fn exists(&self, language: Language, title: &str) -> bool;

    /// Canonical address of the article
    fn article_url(&self, language: Language, title: &str) -> String;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
