//! On-disk layout of an extraction run
//!
//! ```text
//! <base>/
//!   master_articles.json
//!   availability_progress.json
//!   extraction_summary.md
//!   <lang>/
//!     progress.json
//!     raw/<topic>.json
//!     processed/<topic>_cleaned.json
//!     processed/<topic>.txt
//!     processed/<topic>_metadata.json
//! ```

use std::path::PathBuf;

use crate::error::{PersistenceError, Result};
use crate::types::{Language, Topic};

pub(crate) const MASTER_LIST_FILE: &str = "master_articles.json";
pub(crate) const AVAILABILITY_FILE: &str = "availability_progress.json";
pub(crate) const SUMMARY_FILE: &str = "extraction_summary.md";
pub(crate) const PROGRESS_FILE: &str = "progress.json";
pub(crate) const RAW_DIR: &str = "raw";
pub(crate) const PROCESSED_DIR: &str = "processed";

/// Longest stem accepted; leaves room for the longest suffix under the
/// common 255-byte file name limit
const MAX_STEM_BYTES: usize = 230;

/// Filesystem-safe stem for a topic
///
/// The mapping is injective, so two distinct topics never share a file:
/// the title is percent-encoded, a literal `_` or `.` is encoded too, and
/// spaces then become `_`. ASCII titles stay readable.
///
/// # Examples
///
/// ```
/// use parallel_corpus::store::topic_file_stem;
/// use parallel_corpus::Topic;
///
/// assert_eq!(topic_file_stem(&Topic::from("Ilog Pasig")).unwrap(), "Ilog_Pasig");
/// assert_eq!(topic_file_stem(&Topic::from("AC/DC")).unwrap(), "AC%2FDC");
/// ```
pub fn topic_file_stem(topic: &Topic) -> Result<String> {
    let stem = urlencoding::encode(topic.as_str())
        .replace('_', "%5F")
        .replace('.', "%2E")
        .replace("%20", "_");

    if stem.is_empty() {
        return Err(PersistenceError::InvalidPath {
            path: PathBuf::from(topic.as_str()),
            reason: "topic has no usable characters for a file name".to_string(),
        }
        .into());
    }
    if stem.len() > MAX_STEM_BYTES {
        return Err(PersistenceError::InvalidPath {
            path: PathBuf::from(topic.as_str()),
            reason: format!("encoded file name is {} bytes, limit {}", stem.len(), MAX_STEM_BYTES),
        }
        .into());
    }
    Ok(stem)
}

/// Path builder rooted at the run's base directory
#[derive(Clone, Debug)]
pub struct Layout {
    base: PathBuf,
}

impl Layout {
    /// Root the layout at `base`
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// `<base>/master_articles.json`
    pub fn master_list(&self) -> PathBuf {
        self.base.join(MASTER_LIST_FILE)
    }

    /// `<base>/availability_progress.json`
    pub fn availability(&self) -> PathBuf {
        self.base.join(AVAILABILITY_FILE)
    }

    /// `<base>/extraction_summary.md`
    pub fn summary(&self) -> PathBuf {
        self.base.join(SUMMARY_FILE)
    }

    /// `<base>/<lang>`
    pub fn language_dir(&self, language: Language) -> PathBuf {
        self.base.join(language.code())
    }

    /// `<base>/<lang>/progress.json`
    pub fn progress(&self, language: Language) -> PathBuf {
        self.language_dir(language).join(PROGRESS_FILE)
    }

    /// `<base>/<lang>/raw`
    pub fn raw_dir(&self, language: Language) -> PathBuf {
        self.language_dir(language).join(RAW_DIR)
    }

    /// `<base>/<lang>/processed`
    pub fn processed_dir(&self, language: Language) -> PathBuf {
        self.language_dir(language).join(PROCESSED_DIR)
    }

    /// `<base>/<lang>/raw/<topic>.json`
    pub fn raw_article(&self, language: Language, topic: &Topic) -> Result<PathBuf> {
        let stem = topic_file_stem(topic)?;
        Ok(self.raw_dir(language).join(format!("{stem}.json")))
    }

    /// `<base>/<lang>/processed/<topic>_cleaned.json`
    pub fn cleaned(&self, language: Language, topic: &Topic) -> Result<PathBuf> {
        let stem = topic_file_stem(topic)?;
        Ok(self.processed_dir(language).join(format!("{stem}_cleaned.json")))
    }

    /// `<base>/<lang>/processed/<topic>.txt`
    pub fn text(&self, language: Language, topic: &Topic) -> Result<PathBuf> {
        let stem = topic_file_stem(topic)?;
        Ok(self.processed_dir(language).join(format!("{stem}.txt")))
    }

    /// `<base>/<lang>/processed/<topic>_metadata.json`
    pub fn metadata(&self, language: Language, topic: &Topic) -> Result<PathBuf> {
        let stem = topic_file_stem(topic)?;
        Ok(self.processed_dir(language).join(format!("{stem}_metadata.json")))
    }
}
