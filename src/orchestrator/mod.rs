//! Extraction orchestration
//!
//! [`ExtractionOrchestrator`] walks the master topic list topic-major,
//! language-minor. For each (topic, language) pair it either skips (already
//! in the language's progress checkpoint) or fetches, persists the raw
//! article, derives the processed artifacts, and then rewrites the progress
//! checkpoint. The checkpoint write is the durability point: a topic is only
//! ever marked complete after its raw article is on disk, so an interrupt at
//! any point leaves state that a later run can resume from without rollback.

pub mod report;

use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::availability::AvailabilityResolver;
use crate::config::Config;
use crate::error::Result;
use crate::fetcher::ArticleSource;
use crate::processor::ArticleProcessor;
use crate::store::PersistenceStore;
use crate::topics::{BuildOutcome, CandidateSource, TopicListBuilder};
use crate::types::{
    Event, ExtractionStatistics, FailureStage, FetchOutcome, Language, MasterTopicList,
    RawArticle, Topic,
};

pub use report::{compute_statistics, render_summary};

/// Summary of one orchestrator run
///
/// The counters cover this run only; `statistics` is rebuilt from the
/// checkpoints and so also reflects earlier runs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunReport {
    /// Pairs fetched, persisted and marked complete
    pub extracted: usize,
    /// Pairs skipped because they were already complete
    pub skipped: usize,
    /// Pairs that failed to fetch or persist
    pub failed: usize,
    /// Extracted pairs whose derived artifacts could not all be written
    pub processing_failures: usize,
    /// Whether the run stopped early on cancellation
    pub interrupted: bool,
    /// Statistics recomputed from the progress checkpoints
    pub statistics: ExtractionStatistics,
    /// Where the summary report was written, if the extraction phase was reached
    pub summary_path: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PairOutcome {
    Skipped,
    Extracted { processed: bool },
    Failed(FailureStage),
}

impl PairOutcome {
    /// Whether the pair went to the network and so should be followed by the request delay
    fn fetched(self) -> bool {
        !matches!(self, PairOutcome::Skipped)
    }
}

/// Drives topic resolution and per-language extraction
pub struct ExtractionOrchestrator {
    config: Arc<Config>,
    source: Arc<dyn ArticleSource>,
    store: PersistenceStore,
    processor: ArticleProcessor,
    event_tx: broadcast::Sender<Event>,
    cancel: CancellationToken,
}

impl ExtractionOrchestrator {
    /// Create an orchestrator writing under `config.extraction.output_dir`
    pub fn new(config: Arc<Config>, source: Arc<dyn ArticleSource>) -> Self {
        let store = PersistenceStore::new(config.output_dir().clone());
        let processor = ArticleProcessor::new(store.clone());
        let (event_tx, _rx) = broadcast::channel(1000);

        Self {
            config,
            source,
            store,
            processor,
            event_tx,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned cancellation token (e.g. one wired to a signal handler)
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops the run between pairs when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Subscribe to progress events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// The store this orchestrator writes to
    pub fn store(&self) -> &PersistenceStore {
        &self.store
    }

    fn emit_event(&self, event: Event) {
        // no receivers is fine
        self.event_tx.send(event).ok();
    }

    /// Topic list builder sharing this orchestrator's source, store, events and token
    pub fn topic_builder(&self, candidates: Arc<dyn CandidateSource>) -> TopicListBuilder {
        let resolver = AvailabilityResolver::new(
            self.source.clone(),
            self.config.languages.clone(),
            self.config.fetch.probe_delay,
        );
        TopicListBuilder::new(
            self.config.clone(),
            self.store.clone(),
            resolver,
            candidates,
            self.event_tx.clone(),
            self.cancel.clone(),
        )
    }

    /// Build (or reload) the master list, then extract every pair
    pub async fn run(&self, candidates: Arc<dyn CandidateSource>) -> Result<RunReport> {
        self.store.init(&self.config.languages).await?;

        let target = self.config.extraction.target_count;
        let list = match self.topic_builder(candidates).build(target).await? {
            BuildOutcome::Loaded(list) | BuildOutcome::Built(list) => list,
            BuildOutcome::Interrupted { confirmed } => {
                tracing::info!(confirmed, "Interrupted before the master list was complete");
                return Ok(RunReport {
                    interrupted: true,
                    ..Default::default()
                });
            }
            BuildOutcome::Empty { checked } => {
                tracing::warn!(checked, "No topics confirmed, nothing to extract");
                return Ok(RunReport::default());
            }
        };

        self.extract(&list).await
    }

    /// Extract every (topic, language) pair of `list` that is not complete yet
    pub async fn extract(&self, list: &MasterTopicList) -> Result<RunReport> {
        self.store.init(&self.config.languages).await?;

        let mut report = RunReport::default();
        let pairs = list.len() * self.config.languages.len();
        tracing::info!(
            topics = list.len(),
            languages = self.config.languages.len(),
            pairs,
            "Starting extraction"
        );

        'topics: for (index, topic) in list.iter().enumerate() {
            for &language in &self.config.languages {
                if self.cancel.is_cancelled() {
                    report.interrupted = true;
                    break 'topics;
                }

                let outcome = self.extract_pair(topic, index, language).await;
                match outcome {
                    PairOutcome::Skipped => report.skipped += 1,
                    PairOutcome::Extracted { processed } => {
                        report.extracted += 1;
                        if !processed {
                            report.processing_failures += 1;
                        }
                    }
                    PairOutcome::Failed(_) => report.failed += 1,
                }

                if outcome.fetched() {
                    self.pause().await;
                }
            }
        }

        if report.interrupted {
            tracing::info!(
                extracted = report.extracted,
                "Extraction interrupted, progress is checkpointed"
            );
        }

        let (statistics, summary_path) = self.summarize(list).await?;
        report.statistics = statistics;
        report.summary_path = Some(summary_path);

        tracing::info!(
            extracted = report.extracted,
            skipped = report.skipped,
            failed = report.failed,
            total_completed = report.statistics.total_completed(),
            "Extraction finished"
        );
        self.emit_event(Event::RunComplete {
            statistics: report.statistics.clone(),
            interrupted: report.interrupted,
        });

        Ok(report)
    }

    /// Recompute statistics from checkpoints and rewrite the summary report
    ///
    /// Returns `None` when no master list exists yet. Never touches the network.
    pub async fn refresh_summary(&self) -> Result<Option<(ExtractionStatistics, PathBuf)>> {
        match self.store.load_master_list().await? {
            Some(list) => Ok(Some(self.summarize(&list).await?)),
            None => Ok(None),
        }
    }

    async fn summarize(&self, list: &MasterTopicList) -> Result<(ExtractionStatistics, PathBuf)> {
        let statistics = compute_statistics(&self.store, &self.config.languages, list).await?;
        let markdown = render_summary(&statistics, list, Utc::now());
        let path = self.store.write_summary(&markdown).await?;
        Ok((statistics, path))
    }

    async fn extract_pair(&self, topic: &Topic, index: usize, language: Language) -> PairOutcome {
        let mut progress = match self.store.load_progress(language).await {
            Ok(progress) => progress,
            Err(e) => {
                tracing::error!(language = %language, topic = %topic, error = %e, "Progress checkpoint unreadable, not fetching");
                return self.failed(topic, language, FailureStage::Checkpoint);
            }
        };
        if progress.is_completed(topic) {
            tracing::debug!(language = %language, topic = %topic, "Already extracted, skipping");
            self.emit_event(Event::ArticleSkipped {
                topic: topic.clone(),
                language,
            });
            return PairOutcome::Skipped;
        }

        let content = match self.source.fetch(language, topic.as_str()).await {
            FetchOutcome::Found(content) => content,
            FetchOutcome::NotFound => {
                tracing::warn!(language = %language, topic = %topic, "Article not found, will retry next run");
                return self.failed(topic, language, FailureStage::Fetch);
            }
        };

        let url = self.source.article_url(language, topic.as_str());
        let raw = RawArticle::new(topic.clone(), language, content, url, index);
        if let Err(e) = self.store.save_raw_article(&raw).await {
            tracing::warn!(language = %language, topic = %topic, error = %e, "Failed to persist raw article");
            return self.failed(topic, language, FailureStage::Persist);
        }

        let processed = self.processor.process(&raw).await;
        if !processed.success() {
            tracing::warn!(
                language = %language,
                topic = %topic,
                failed = processed.failed.len(),
                "Processing failed, raw article kept"
            );
            self.emit_event(Event::ProcessingFailed {
                topic: topic.clone(),
                language,
            });
        }

        progress.mark_completed(topic.clone(), index);
        if let Err(e) = self.store.save_progress(language, &progress).await {
            tracing::error!(language = %language, topic = %topic, error = %e, "Failed to write progress checkpoint");
            return self.failed(topic, language, FailureStage::Checkpoint);
        }

        let word_count = processed.artifact.metadata.word_count;
        tracing::info!(language = %language, topic = %topic, index, word_count, "Extracted article");
        self.emit_event(Event::ArticleExtracted {
            topic: topic.clone(),
            language,
            word_count,
        });

        PairOutcome::Extracted {
            processed: processed.success(),
        }
    }

    fn failed(&self, topic: &Topic, language: Language, stage: FailureStage) -> PairOutcome {
        self.emit_event(Event::ArticleFailed {
            topic: topic.clone(),
            language,
            stage,
        });
        PairOutcome::Failed(stage)
    }

    /// Fixed delay between network requests, cut short by cancellation
    async fn pause(&self) {
        let delay = self.config.extraction.request_delay;
        if delay.is_zero() {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = self.cancel.cancelled() => {}
        }
    }
}
