//! # parallel-corpus
//!
//! Resumable extraction of a parallel multilingual corpus from Wikipedia.
//!
//! The pipeline has two phases:
//! - **Topic resolution** - candidate titles are probed in every target
//!   language; only titles present everywhere join the ordered master list.
//! - **Extraction** - every (topic, language) pair is fetched, stored as a raw
//!   article, and turned into cleaned, text and metadata artifacts.
//!
//! Both phases checkpoint to disk as they go, so an interrupted run can be
//! restarted and picks up where it stopped without fetching anything twice.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use parallel_corpus::{Config, ExtractionOrchestrator, WikipediaClient, candidate_source_for};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(Config::default());
//!     let client = Arc::new(WikipediaClient::new(config.fetch.clone())?);
//!     let orchestrator = ExtractionOrchestrator::new(config.clone(), client);
//!
//!     let mut events = orchestrator.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let report = orchestrator.run(candidate_source_for(&config)?).await?;
//!     println!("extracted {} articles", report.extracted);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Cross-language availability checks
pub mod availability;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Article fetching and HTML cleaning
pub mod fetcher;
/// Extraction loop, statistics and summary report
pub mod orchestrator;
/// Derived artifacts (cleaned text, rendering, metadata)
pub mod processor;
/// Retry logic with exponential backoff
pub mod retry;
/// On-disk layout and checkpoints
pub mod store;
/// Candidate sources and master topic list construction
pub mod topics;
/// Core types and events
pub mod types;

mod patterns;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod test_helpers;

// Re-export commonly used types
pub use availability::{Availability, AvailabilityResolver};
pub use config::{
    AvailabilityConfig, Config, ExtractionConfig, FetchConfig, RetryConfig, TopicSource,
};
pub use error::{Error, PersistenceError, Result};
pub use fetcher::{ArticleSource, WikipediaClient, clean_text, extract_article_text};
pub use orchestrator::{ExtractionOrchestrator, RunReport};
pub use processor::{ArticleProcessor, ProcessOutcome, derive_artifact};
pub use store::PersistenceStore;
pub use topics::{
    BuildOutcome, CandidateSource, CuratedCandidates, FallbackCandidates, RandomCandidates,
    TopicListBuilder, candidate_source_for,
};
pub use types::{
    ArticleMetadata, AvailabilityCheckpoint, CleanedRecord, Event, ExtractionStatistics,
    FailureStage, FetchOutcome, Language, LanguageStats, MasterTopicList, ProcessedArtifact,
    ProgressCheckpoint, RawArticle, Topic,
};

/// Cancel `token` when the process receives a termination signal.
///
/// Spawns a background task; the orchestrator notices the cancelled token
/// between (topic, language) pairs and returns with `interrupted = true`.
/// Because every checkpoint is written as soon as its article is durable,
/// nothing needs to be rolled back.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use parallel_corpus::{Config, ExtractionOrchestrator, WikipediaClient, cancel_on_signal};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Arc::new(Config::default());
///     let client = Arc::new(WikipediaClient::new(config.fetch.clone())?);
///     let orchestrator = ExtractionOrchestrator::new(config, client);
///     cancel_on_signal(orchestrator.cancellation_token());
///     Ok(())
/// }
/// ```
pub fn cancel_on_signal(
    token: tokio_util::sync::CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = wait_for_signal() => {
                tracing::info!("Stopping after the current article");
                token.cancel();
            }
            _ = token.cancelled() => {}
        }
    })
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            sigint.recv().await;
            tracing::info!("Received SIGINT signal (Ctrl+C)");
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM signal");
        }
        (Err(term), Err(int)) => {
            tracing::error!(sigterm = %term, sigint = %int, "Could not register any signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
