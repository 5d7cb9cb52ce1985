//! Core types for parallel-corpus

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::Error;

/// A language edition of the encyclopedia that the corpus is extracted from
///
/// The set is fixed; ordering follows declaration order, which is also the
/// default probe and extraction order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Language {
    /// English (`en`)
    #[serde(rename = "en")]
    English,
    /// Filipino / Tagalog (`tl`)
    #[serde(rename = "tl")]
    Filipino,
    /// Cebuano (`ceb`)
    #[serde(rename = "ceb")]
    Cebuano,
    /// Ilokano (`ilo`)
    #[serde(rename = "ilo")]
    Ilokano,
}

impl Language {
    /// Every supported language, in canonical order
    pub const ALL: [Language; 4] = [
        Language::English,
        Language::Filipino,
        Language::Cebuano,
        Language::Ilokano,
    ];

    /// Edition subdomain code
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Filipino => "tl",
            Language::Cebuano => "ceb",
            Language::Ilokano => "ilo",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Filipino => "Filipino",
            Language::Cebuano => "Cebuano",
            Language::Ilokano => "Ilokano",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = Error;

    /// Accepts either the code (`ceb`) or the display name (`cebuano`), case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Language::ALL
            .into_iter()
            .find(|lang| lang.code() == wanted || lang.display_name().to_lowercase() == wanted)
            .ok_or_else(|| Error::InvalidLanguage(s.to_string()))
    }
}

/// Canonical article title used as the join key across languages
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    /// Create a topic from a title, trimming surrounding whitespace
    pub fn new(title: impl Into<String>) -> Self {
        Self(title.into().trim().to_string())
    }

    /// The title as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Topic {
    fn from(title: &str) -> Self {
        Self::new(title)
    }
}

impl From<String> for Topic {
    fn from(title: String) -> Self {
        Self::new(title)
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Ordered list of topics confirmed present in every target language
///
/// Position encodes extraction sequence and is recorded on every raw article
/// as `master_article_index`. The list has no mutating methods; a new list
/// means a full regeneration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MasterTopicList(Vec<Topic>);

impl MasterTopicList {
    /// Freeze an ordered list of topics
    pub fn new(topics: Vec<Topic>) -> Self {
        Self(topics)
    }

    /// Number of topics
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Topics in extraction order
    pub fn topics(&self) -> &[Topic] {
        &self.0
    }

    /// Iterate topics in extraction order
    pub fn iter(&self) -> std::slice::Iter<'_, Topic> {
        self.0.iter()
    }

    /// Position of a topic in the list
    pub fn index_of(&self, topic: &Topic) -> Option<usize> {
        self.0.iter().position(|t| t == topic)
    }
}

/// Outcome of fetching one article
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Article located; contains the cleaned body text
    Found(String),
    /// Article absent, unreachable, or without a content region
    NotFound,
}

impl FetchOutcome {
    /// Whether the article was found
    pub fn is_found(&self) -> bool {
        matches!(self, FetchOutcome::Found(_))
    }
}

/// One fetched article for one (topic, language) pair
///
/// Field names match the on-disk `raw/<topic>.json` layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    /// Topic title
    pub title: Topic,
    /// Language edition
    pub language: Language,
    /// Display name of the language
    pub language_name: String,
    /// Body text as returned by the fetcher
    pub content: String,
    /// Address the article was fetched from
    pub url: String,
    /// Fetch timestamp
    pub extracted_at: DateTime<Utc>,
    /// Position of the topic in the master list
    pub master_article_index: usize,
}

impl RawArticle {
    /// Build a raw article stamped with the current time
    pub fn new(
        title: Topic,
        language: Language,
        content: String,
        url: String,
        master_article_index: usize,
    ) -> Self {
        Self {
            title,
            language,
            language_name: language.display_name().to_string(),
            content,
            url,
            extracted_at: Utc::now(),
            master_article_index,
        }
    }
}

/// Cleaned-text view of a raw article (`processed/<topic>_cleaned.json`)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    /// Topic title
    pub title: Topic,
    /// Language edition
    pub language: Language,
    /// Display name of the language
    pub language_name: String,
    /// Cleaned body text
    pub content: String,
    /// Source address
    pub url: String,
    /// Position of the topic in the master list
    pub master_article_index: usize,
}

/// Metadata view of a raw article (`processed/<topic>_metadata.json`)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    /// Topic title
    pub title: Topic,
    /// Language edition
    pub language: Language,
    /// Display name of the language
    pub language_name: String,
    /// Whitespace-delimited token count of the cleaned text
    pub word_count: usize,
    /// Character count of the cleaned text
    pub char_count: usize,
    /// Non-empty period-delimited segments of the cleaned text
    pub sentence_count: usize,
    /// Non-empty double-newline-delimited segments of the raw body
    ///
    /// Always 1 for articles from `WikipediaClient`, which collapses
    /// whitespace before the raw body is stored.
    pub paragraph_count: usize,
    /// Whether the cleaned text contains an ASCII digit
    pub has_numbers: bool,
    /// Whether the cleaned text contains a link-like substring
    pub has_links: bool,
    /// Source address
    pub url: String,
    /// Fetch timestamp carried over from the raw article
    pub extracted_at: DateTime<Utc>,
    /// Position of the topic in the master list
    pub master_article_index: usize,
}

/// The three co-derived views of a raw article
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessedArtifact {
    /// Cleaned JSON record
    pub cleaned: CleanedRecord,
    /// Human-readable rendering with a header block
    pub text: String,
    /// Metadata record
    pub metadata: ArticleMetadata,
}

/// Per-language record of completed extractions (`<lang>/progress.json`)
///
/// A topic is only ever added after its raw article has been persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressCheckpoint {
    /// Topics whose raw article is durable for this language
    #[serde(default)]
    pub completed_topics: BTreeSet<Topic>,
    /// Master index of the most recently completed topic
    #[serde(default)]
    pub last_index: usize,
}

impl ProgressCheckpoint {
    /// Whether the topic has already been extracted
    pub fn is_completed(&self, topic: &Topic) -> bool {
        self.completed_topics.contains(topic)
    }

    /// Record a completed topic; returns false if it was already present
    pub fn mark_completed(&mut self, topic: Topic, index: usize) -> bool {
        self.last_index = index;
        self.completed_topics.insert(topic)
    }

    /// Number of completed topics
    pub fn completed_count(&self) -> usize {
        self.completed_topics.len()
    }
}

/// Partial result of availability resolution (`availability_progress.json`)
///
/// Append-only within a resolution run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityCheckpoint {
    /// Topics confirmed in every language, in confirmation order
    #[serde(default)]
    pub confirmed: Vec<Topic>,
    /// Every candidate probed so far, confirmed or not
    #[serde(default)]
    pub checked: Vec<String>,
}

/// Counters for a single language
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageStats {
    /// Topics in the master list
    pub target: usize,
    /// Topics with a durable raw article
    pub completed: usize,
    /// Topics not (yet) extracted
    pub failed: usize,
}

impl LanguageStats {
    /// Completion percentage (0.0 when the target is empty)
    pub fn completion_percent(&self) -> f64 {
        if self.target == 0 {
            0.0
        } else {
            self.completed as f64 * 100.0 / self.target as f64
        }
    }
}

/// Reporting view rebuilt from progress checkpoints
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStatistics {
    /// Size of the master list
    pub total_topics: usize,
    /// Per-language counters
    pub languages: BTreeMap<Language, LanguageStats>,
}

impl ExtractionStatistics {
    /// Sum of completed extractions across languages
    pub fn total_completed(&self) -> usize {
        self.languages.values().map(|s| s.completed).sum()
    }

    /// Sum of missing extractions across languages
    pub fn total_failed(&self) -> usize {
        self.languages.values().map(|s| s.failed).sum()
    }
}

/// Stage at which a (topic, language) pair failed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    /// The article could not be fetched
    Fetch,
    /// The raw article could not be written
    Persist,
    /// The language's progress checkpoint could not be read or rewritten
    Checkpoint,
}

/// Progress events emitted while building topics and extracting articles
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A candidate exists in every language and joined the list
    TopicConfirmed {
        /// Candidate title
        topic: Topic,
        /// Number of confirmed topics so far
        confirmed: usize,
    },
    /// A candidate is missing in at least one language
    TopicRejected {
        /// Candidate title
        topic: Topic,
        /// Languages whose probe failed
        missing: Vec<Language>,
    },
    /// The availability checkpoint was written
    AvailabilityCheckpointSaved {
        /// Number of confirmed topics persisted
        confirmed: usize,
    },
    /// A pair was already complete and was not fetched
    ArticleSkipped {
        /// Topic
        topic: Topic,
        /// Language
        language: Language,
    },
    /// A pair was fetched, persisted and marked complete
    ArticleExtracted {
        /// Topic
        topic: Topic,
        /// Language
        language: Language,
        /// Word count of the cleaned text
        word_count: usize,
    },
    /// A pair failed and stays eligible for the next run
    ArticleFailed {
        /// Topic
        topic: Topic,
        /// Language
        language: Language,
        /// Where it failed
        stage: FailureStage,
    },
    /// Derived artifacts could not be written (raw article is still durable)
    ProcessingFailed {
        /// Topic
        topic: Topic,
        /// Language
        language: Language,
    },
    /// The extraction loop finished or was interrupted
    RunComplete {
        /// Statistics recomputed from checkpoints
        statistics: ExtractionStatistics,
        /// Whether the run stopped early on an interrupt
        interrupted: bool,
    },
}
