//! Live random sampling through the MediaWiki API

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::CandidateSource;
use crate::config::{FetchConfig, RetryConfig};
use crate::error::{Error, Result};
use crate::retry::with_retry;
use crate::types::Language;

/// API caps `rnlimit` for anonymous clients
const MAX_BATCH: usize = 500;

#[derive(Debug, Deserialize)]
struct RandomResponse {
    query: Option<RandomQuery>,
}

#[derive(Debug, Deserialize)]
struct RandomQuery {
    random: Vec<RandomPage>,
}

#[derive(Debug, Deserialize)]
struct RandomPage {
    title: String,
}

/// Samples random main-namespace titles from one edition
pub struct RandomCandidates {
    http_client: reqwest::Client,
    endpoint: String,
}

impl RandomCandidates {
    /// Create a sampler for `language` using the configured API template
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: &FetchConfig, language: Language) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        let endpoint = config.api_url_template.replace("{lang}", language.code());

        Ok(Self {
            http_client,
            endpoint,
        })
    }
}

#[async_trait]
impl CandidateSource for RandomCandidates {
    async fn next_batch(&self, size: usize) -> Result<Vec<String>> {
        let limit = size.clamp(1, MAX_BATCH).to_string();
        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[
                ("action", "query"),
                ("list", "random"),
                ("rnnamespace", "0"),
                ("rnlimit", limit.as_str()),
                ("format", "json"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: RandomResponse = response.json().await?;
        let query = body
            .query
            .ok_or_else(|| Error::CandidateSource("response has no 'query' object".to_string()))?;

        Ok(query.random.into_iter().map(|page| page.title).collect())
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

/// Random sampling with a permanent switch to a backup source
///
/// Each primary call gets the configured retry budget. Once that is spent,
/// the rest of the run draws from the fallback.
pub struct FallbackCandidates {
    primary: Arc<dyn CandidateSource>,
    fallback: Arc<dyn CandidateSource>,
    retry: RetryConfig,
    fell_back: AtomicBool,
}

impl FallbackCandidates {
    /// Wrap `primary`, switching to `fallback` once it keeps failing
    pub fn new(
        primary: Arc<dyn CandidateSource>,
        fallback: Arc<dyn CandidateSource>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            primary,
            fallback,
            retry,
            fell_back: AtomicBool::new(false),
        }
    }

    /// Whether the fallback source is in use
    pub fn is_falling_back(&self) -> bool {
        self.fell_back.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CandidateSource for FallbackCandidates {
    async fn next_batch(&self, size: usize) -> Result<Vec<String>> {
        if self.is_falling_back() {
            return self.fallback.next_batch(size).await;
        }

        match with_retry(&self.retry, || self.primary.next_batch(size)).await {
            Ok(batch) => Ok(batch),
            Err(e) => {
                tracing::warn!(
                    source = self.primary.name(),
                    fallback = self.fallback.name(),
                    error = %e,
                    "Candidate source unreachable, switching to fallback"
                );
                self.fell_back.store(true, Ordering::SeqCst);
                self.fallback.next_batch(size).await
            }
        }
    }

    fn name(&self) -> &'static str {
        if self.is_falling_back() {
            self.fallback.name()
        } else {
            self.primary.name()
        }
    }
}
