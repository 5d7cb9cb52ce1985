//! Configuration types for parallel-corpus

use crate::error::{Error, Result};
use crate::types::Language;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where candidate topic titles come from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicSource {
    /// Built-in list of broadly covered topics (default)
    #[default]
    Curated,
    /// Live random sampling of the source edition, falling back to the curated list
    Random,
}

/// Extraction run settings (output location, size, pacing)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Base output directory (default: "./parallel_corpus")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Number of topics to extract per language (default: 100)
    #[serde(default = "default_target_count")]
    pub target_count: usize,

    /// Candidate source mode
    #[serde(default)]
    pub topic_source: TopicSource,

    /// Delay between consecutive (topic, language) pairs (default: 1000 ms)
    #[serde(default = "default_request_delay", with = "millis_serde")]
    pub request_delay: Duration,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            target_count: default_target_count(),
            topic_source: TopicSource::default(),
            request_delay: default_request_delay(),
        }
    }
}

/// HTTP client settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Identifying User-Agent header
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for article GET requests (default: 15 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// Timeout for existence probes (default: 10 seconds)
    #[serde(default = "default_probe_timeout", with = "duration_serde")]
    pub probe_timeout: Duration,

    /// Article address template with `{lang}` and `{title}` placeholders
    #[serde(default = "default_article_url_template")]
    pub article_url_template: String,

    /// MediaWiki API endpoint template with a `{lang}` placeholder
    #[serde(default = "default_api_url_template")]
    pub api_url_template: String,

    /// Delay between existence probes of one candidate (default: 500 ms)
    #[serde(default = "default_probe_delay", with = "millis_serde")]
    pub probe_delay: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout: default_timeout(),
            probe_timeout: default_probe_timeout(),
            article_url_template: default_article_url_template(),
            api_url_template: default_api_url_template(),
            probe_delay: default_probe_delay(),
        }
    }
}

/// Availability resolution settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AvailabilityConfig {
    /// Persist the availability checkpoint after this many confirmations (default: 50)
    #[serde(default = "default_checkpoint_every")]
    pub checkpoint_every: usize,

    /// Candidates requested per batch (default: 20)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Consecutive batches without a new candidate before giving up (default: 5)
    #[serde(default = "default_max_empty_batches")]
    pub max_empty_batches: usize,

    /// Edition candidates are sampled from (default: en)
    #[serde(default = "default_source_language")]
    pub source_language: Language,
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self {
            checkpoint_every: default_checkpoint_every(),
            batch_size: default_batch_size(),
            max_empty_batches: default_max_empty_batches(),
            source_language: default_source_language(),
        }
    }
}

/// Retry configuration for the candidate source
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 30 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// Main configuration
///
/// Built once and shared read-only (behind an `Arc`) by every component.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Target languages, in probe and extraction order
    #[serde(default = "default_languages")]
    pub languages: Vec<Language>,

    /// Run settings
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// HTTP client settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Availability resolution settings
    #[serde(default)]
    pub availability: AvailabilityConfig,

    /// Retry settings for the candidate source
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            languages: default_languages(),
            extraction: ExtractionConfig::default(),
            fetch: FetchConfig::default(),
            availability: AvailabilityConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file and validate it
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read config file '{}': {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&raw).map_err(|e| Error::Config {
            message: format!("invalid config file '{}': {}", path.display(), e),
            key: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Base output directory
    pub fn output_dir(&self) -> &PathBuf {
        &self.extraction.output_dir
    }

    /// Check the configuration for values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.languages.is_empty() {
            return Err(Error::config("languages", "at least one language is required"));
        }
        let mut seen = HashSet::new();
        for lang in &self.languages {
            if !seen.insert(lang) {
                return Err(Error::config(
                    "languages",
                    format!("language '{}' listed more than once", lang),
                ));
            }
        }
        if self.extraction.target_count == 0 {
            return Err(Error::config(
                "target_count",
                "target_count must be greater than zero",
            ));
        }
        let template = &self.fetch.article_url_template;
        if !template.contains("{lang}") || !template.contains("{title}") {
            return Err(Error::config(
                "article_url_template",
                "template must contain both {lang} and {title}",
            ));
        }
        if !self.fetch.api_url_template.contains("{lang}") {
            return Err(Error::config(
                "api_url_template",
                "template must contain {lang}",
            ));
        }
        if self.availability.checkpoint_every == 0 {
            return Err(Error::config(
                "checkpoint_every",
                "checkpoint_every must be greater than zero",
            ));
        }
        if self.availability.batch_size == 0 {
            return Err(Error::config(
                "batch_size",
                "batch_size must be greater than zero",
            ));
        }
        if !(self.retry.backoff_multiplier >= 1.0 && self.retry.backoff_multiplier.is_finite()) {
            return Err(Error::config(
                "backoff_multiplier",
                "backoff_multiplier must be a finite number of at least 1.0",
            ));
        }
        Ok(())
    }
}

fn default_languages() -> Vec<Language> {
    Language::ALL.to_vec()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./parallel_corpus")
}

fn default_target_count() -> usize {
    100
}

fn default_request_delay() -> Duration {
    Duration::from_millis(1000)
}

fn default_user_agent() -> String {
    format!(
        "parallel-corpus/{} (multilingual corpus research)",
        env!("CARGO_PKG_VERSION")
    )
}

fn default_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_probe_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_article_url_template() -> String {
    "https://{lang}.wikipedia.org/wiki/{title}".to_string()
}

fn default_api_url_template() -> String {
    "https://{lang}.wikipedia.org/w/api.php".to_string()
}

fn default_probe_delay() -> Duration {
    Duration::from_millis(500)
}

fn default_checkpoint_every() -> usize {
    50
}

fn default_batch_size() -> usize {
    20
}

fn default_max_empty_batches() -> usize {
    5
}

fn default_source_language() -> Language {
    Language::English
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(30)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Duration serialization helper (milliseconds)
mod millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
