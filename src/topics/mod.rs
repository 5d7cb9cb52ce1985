//! Master topic list construction
//!
//! [`TopicListBuilder::build`] is resumable:
//! 1. A persisted master list is returned unchanged.
//! 2. Otherwise candidates are drawn in batches, de-duplicated against every
//!    title already probed (including those recorded in the availability
//!    checkpoint), and resolved across all languages.
//! 3. Confirmed topics accumulate; the availability checkpoint is rewritten
//!    every `checkpoint_every` confirmations and on interrupt.
//! 4. Resolution stops at the target or after `max_empty_batches`
//!    consecutive batches in which the source returned no titles at all.
//!    A batch made only of titles already checked is not empty: on resume a
//!    restarted source replays what the checkpoint already covers.
//! 5. A non-empty result is written as the master list even if it is short
//!    of the target. An empty result is never persisted, so the next run
//!    resolves again.

mod curated;
mod random;

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::availability::AvailabilityResolver;
use crate::config::{Config, TopicSource};
use crate::error::Result;
use crate::store::PersistenceStore;
use crate::types::{AvailabilityCheckpoint, Event, MasterTopicList, Topic};

pub use curated::{CuratedCandidates, KNOWN_TOPICS};
pub use random::{FallbackCandidates, RandomCandidates};

/// Source of candidate titles in the source-language edition
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Up to `size` candidate titles; an empty batch means nothing left right now
    async fn next_batch(&self, size: usize) -> Result<Vec<String>>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Candidate source matching the configured mode
///
/// `Random` samples the source edition and falls back to the curated list
/// once the retry budget is spent.
pub fn candidate_source_for(config: &Config) -> Result<Arc<dyn CandidateSource>> {
    match config.extraction.topic_source {
        TopicSource::Curated => Ok(Arc::new(CuratedCandidates::new())),
        TopicSource::Random => {
            let random =
                RandomCandidates::new(&config.fetch, config.availability.source_language)?;
            Ok(Arc::new(FallbackCandidates::new(
                Arc::new(random),
                Arc::new(CuratedCandidates::new()),
                config.retry.clone(),
            )))
        }
    }
}

/// How [`TopicListBuilder::build`] ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildOutcome {
    /// A previous run's master list was reused
    Loaded(MasterTopicList),
    /// Resolution finished and the list was persisted
    Built(MasterTopicList),
    /// Interrupted; progress is in the availability checkpoint
    Interrupted {
        /// Topics confirmed so far
        confirmed: usize,
    },
    /// The source ran dry before any topic was confirmed; nothing was
    /// written as the master list
    Empty {
        /// Titles checked in total, including earlier runs
        checked: usize,
    },
}

impl BuildOutcome {
    /// The master list, unless resolution was interrupted or found nothing
    pub fn into_list(self) -> Option<MasterTopicList> {
        match self {
            BuildOutcome::Loaded(list) | BuildOutcome::Built(list) => Some(list),
            BuildOutcome::Interrupted { .. } | BuildOutcome::Empty { .. } => None,
        }
    }
}

/// Builds (or reloads) the shared master topic list
pub struct TopicListBuilder {
    config: Arc<Config>,
    store: PersistenceStore,
    resolver: AvailabilityResolver,
    candidates: Arc<dyn CandidateSource>,
    event_tx: broadcast::Sender<Event>,
    cancel: CancellationToken,
}

impl TopicListBuilder {
    /// Create a builder
    pub fn new(
        config: Arc<Config>,
        store: PersistenceStore,
        resolver: AvailabilityResolver,
        candidates: Arc<dyn CandidateSource>,
        event_tx: broadcast::Sender<Event>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            store,
            resolver,
            candidates,
            event_tx,
            cancel,
        }
    }

    /// Return the persisted master list, or resolve a new one of up to `target_count` topics
    pub async fn build(&self, target_count: usize) -> Result<BuildOutcome> {
        if let Some(list) = self.store.load_master_list().await? {
            tracing::info!(topics = list.len(), "Using existing master topic list");
            return Ok(BuildOutcome::Loaded(list));
        }

        let settings = &self.config.availability;
        let mut checkpoint = self.store.load_availability().await?;
        let mut seen: HashSet<String> = checkpoint
            .checked
            .iter()
            .cloned()
            .chain(checkpoint.confirmed.iter().map(|t| t.as_str().to_string()))
            .collect();

        if !checkpoint.confirmed.is_empty() {
            tracing::info!(
                confirmed = checkpoint.confirmed.len(),
                checked = checkpoint.checked.len(),
                "Resuming availability resolution"
            );
        }

        let mut unsaved = 0usize;
        let mut empty_batches = 0usize;

        'resolve: while checkpoint.confirmed.len() < target_count {
            if self.cancel.is_cancelled() {
                return self.interrupted(&checkpoint).await;
            }

            let batch = match self.candidates.next_batch(settings.batch_size).await {
                Ok(batch) => batch,
                Err(e) => {
                    tracing::warn!(source = self.candidates.name(), error = %e, "Candidate batch failed");
                    Vec::new()
                }
            };

            let titles: Vec<String> = batch
                .into_iter()
                .map(|title| title.trim().to_string())
                .filter(|title| !title.is_empty())
                .collect();

            if titles.is_empty() {
                empty_batches += 1;
                if empty_batches >= settings.max_empty_batches {
                    tracing::warn!(
                        empty_batches,
                        confirmed = checkpoint.confirmed.len(),
                        "Candidate source exhausted"
                    );
                    break;
                }
                continue;
            }
            empty_batches = 0;

            let fresh: Vec<String> = titles
                .into_iter()
                .filter(|title| seen.insert(title.clone()))
                .collect();
            if fresh.is_empty() {
                tracing::debug!("Candidate batch already checked");
                continue;
            }

            for title in fresh {
                if checkpoint.confirmed.len() >= target_count {
                    break 'resolve;
                }
                if self.cancel.is_cancelled() {
                    return self.interrupted(&checkpoint).await;
                }

                let availability = self.resolver.resolve(&title).await;
                checkpoint.checked.push(title.clone());
                let topic = Topic::new(title);

                if availability.is_everywhere() {
                    checkpoint.confirmed.push(topic.clone());
                    unsaved += 1;
                    tracing::info!(
                        topic = %topic,
                        confirmed = checkpoint.confirmed.len(),
                        target = target_count,
                        "Topic available in every language"
                    );
                    self.event_tx
                        .send(Event::TopicConfirmed {
                            topic,
                            confirmed: checkpoint.confirmed.len(),
                        })
                        .ok();

                    if unsaved >= settings.checkpoint_every {
                        self.save_checkpoint(&checkpoint).await?;
                        unsaved = 0;
                    }
                } else {
                    self.event_tx
                        .send(Event::TopicRejected {
                            topic,
                            missing: availability.missing,
                        })
                        .ok();
                }
            }
        }

        if checkpoint.confirmed.is_empty() {
            self.save_checkpoint(&checkpoint).await?;
            tracing::warn!(
                checked = checkpoint.checked.len(),
                "No topic is available in every language; master list not written"
            );
            return Ok(BuildOutcome::Empty {
                checked: checkpoint.checked.len(),
            });
        }

        let list = MasterTopicList::new(checkpoint.confirmed);
        self.store.save_master_list(&list).await?;
        self.store.clear_availability().await?;

        if list.len() < target_count {
            tracing::warn!(
                topics = list.len(),
                target = target_count,
                "Master topic list is short of the target"
            );
        } else {
            tracing::info!(topics = list.len(), "Master topic list complete");
        }

        Ok(BuildOutcome::Built(list))
    }

    async fn save_checkpoint(&self, checkpoint: &AvailabilityCheckpoint) -> Result<()> {
        self.store.save_availability(checkpoint).await?;
        tracing::debug!(confirmed = checkpoint.confirmed.len(), "Availability checkpoint saved");
        self.event_tx
            .send(Event::AvailabilityCheckpointSaved {
                confirmed: checkpoint.confirmed.len(),
            })
            .ok();
        Ok(())
    }

    async fn interrupted(&self, checkpoint: &AvailabilityCheckpoint) -> Result<BuildOutcome> {
        self.save_checkpoint(checkpoint).await?;
        tracing::info!(
            confirmed = checkpoint.confirmed.len(),
            "Availability resolution interrupted"
        );
        Ok(BuildOutcome::Interrupted {
            confirmed: checkpoint.confirmed.len(),
        })
    }
}
