//! Durable storage for articles, derived artifacts and checkpoints
//!
//! Every write is a whole-file atomic replace (see [`Layout`] for the
//! directory structure). Checkpoint reads are lenient about content: a
//! missing file is an empty checkpoint, and a file whose bytes cannot be
//! decoded is moved aside to `<name>.corrupt` and also treated as empty, so
//! the run resumes with a warning instead of aborting. A file that cannot be
//! read at all (permissions, I/O) is an error and is left in place, since its
//! contents may be perfectly valid. The master topic list cannot be rebuilt
//! offline, so a corrupt list is an error too.

mod atomic;
mod layout;

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use crate::error::{PersistenceError, Result};
use crate::types::{
    AvailabilityCheckpoint, Language, MasterTopicList, ProgressCheckpoint, RawArticle, Topic,
};

pub(crate) use atomic::{write_atomic, write_json_atomic};
pub use layout::{Layout, topic_file_stem};

/// Outcome of reading a checkpoint file
#[derive(Debug)]
enum Loaded<T> {
    Present(T),
    Missing,
    /// Read succeeded but the bytes do not decode
    Corrupt(String),
    /// The file exists but could not be read
    Unreadable(String),
}

/// File-backed store for one extraction run
#[derive(Clone, Debug)]
pub struct PersistenceStore {
    layout: Layout,
}

impl PersistenceStore {
    /// Create a store rooted at `base_dir` (nothing is created until [`init`](Self::init))
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            layout: Layout::new(base_dir),
        }
    }

    /// Path builder for this store
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Create the base, per-language, `raw/` and `processed/` directories
    ///
    /// Idempotent.
    pub async fn init(&self, languages: &[Language]) -> Result<()> {
        for &language in languages {
            for dir in [self.layout.raw_dir(language), self.layout.processed_dir(language)] {
                tokio::fs::create_dir_all(&dir).await.map_err(|e| {
                    PersistenceError::WriteFailed {
                        path: dir.clone(),
                        reason: format!("failed to create directory: {}", e),
                    }
                })?;
            }
        }
        Ok(())
    }

    // ---- raw articles -------------------------------------------------

    /// Persist a raw article, replacing any earlier fetch of the same pair
    pub async fn save_raw_article(&self, article: &RawArticle) -> Result<PathBuf> {
        let path = self.layout.raw_article(article.language, &article.title)?;
        write_json_atomic(&path, article).await?;
        Ok(path)
    }

    /// Read back a raw article, `None` if it was never written
    pub async fn load_raw_article(
        &self,
        language: Language,
        topic: &Topic,
    ) -> Result<Option<RawArticle>> {
        let path = self.layout.raw_article(language, topic)?;
        match read_json::<RawArticle>(&path).await {
            Loaded::Present(article) => Ok(Some(article)),
            Loaded::Missing => Ok(None),
            Loaded::Corrupt(reason) | Loaded::Unreadable(reason) => {
                Err(PersistenceError::ReadFailed { path, reason }.into())
            }
        }
    }

    // ---- progress checkpoints ----------------------------------------

    /// Load a language's progress
    ///
    /// # Errors
    ///
    /// [`PersistenceError::ReadFailed`] if the file exists but cannot be read.
    /// Undecodable contents are quarantined and read as empty instead.
    pub async fn load_progress(&self, language: Language) -> Result<ProgressCheckpoint> {
        let path = self.layout.progress(language);
        self.load_lenient(&path, "progress checkpoint").await
    }

    /// Durably replace a language's progress
    pub async fn save_progress(
        &self,
        language: Language,
        checkpoint: &ProgressCheckpoint,
    ) -> Result<()> {
        write_json_atomic(&self.layout.progress(language), checkpoint).await
    }

    // ---- master topic list -------------------------------------------

    /// Load the master list if a previous run produced one
    pub async fn load_master_list(&self) -> Result<Option<MasterTopicList>> {
        let path = self.layout.master_list();
        match read_json::<MasterTopicList>(&path).await {
            Loaded::Present(list) => Ok(Some(list)),
            Loaded::Missing => Ok(None),
            Loaded::Corrupt(reason) | Loaded::Unreadable(reason) => {
                Err(PersistenceError::ReadFailed { path, reason }.into())
            }
        }
    }

    /// Persist the master list
    pub async fn save_master_list(&self, list: &MasterTopicList) -> Result<()> {
        write_json_atomic(&self.layout.master_list(), list).await
    }

    // ---- availability checkpoint -------------------------------------

    /// Load the availability checkpoint, with the same error rules as
    /// [`load_progress`](Self::load_progress)
    pub async fn load_availability(&self) -> Result<AvailabilityCheckpoint> {
        let path = self.layout.availability();
        self.load_lenient(&path, "availability checkpoint").await
    }

    /// Persist the availability checkpoint
    pub async fn save_availability(&self, checkpoint: &AvailabilityCheckpoint) -> Result<()> {
        write_json_atomic(&self.layout.availability(), checkpoint).await
    }

    /// Remove the availability checkpoint once the master list exists
    pub async fn clear_availability(&self) -> Result<()> {
        let path = self.layout.availability();
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PersistenceError::WriteFailed {
                path,
                reason: format!("failed to remove: {}", e),
            }
            .into()),
        }
    }

    // ---- misc ---------------------------------------------------------

    /// Write the human-readable run summary
    pub async fn write_summary(&self, markdown: &str) -> Result<PathBuf> {
        let path = self.layout.summary();
        write_atomic(&path, markdown.as_bytes()).await?;
        Ok(path)
    }

    async fn load_lenient<T: DeserializeOwned + Default>(
        &self,
        path: &Path,
        what: &str,
    ) -> Result<T> {
        match read_json::<T>(path).await {
            Loaded::Present(value) => Ok(value),
            Loaded::Missing => Ok(T::default()),
            Loaded::Unreadable(reason) => Err(PersistenceError::ReadFailed {
                path: path.to_path_buf(),
                reason,
            }
            .into()),
            Loaded::Corrupt(reason) => {
                let quarantine = corrupt_path_for(path);
                tracing::warn!(
                    path = %path.display(),
                    moved_to = %quarantine.display(),
                    reason = %reason,
                    "Undecodable {what}, starting from an empty one"
                );
                if let Err(e) = tokio::fs::rename(path, &quarantine).await {
                    tracing::warn!(path = %path.display(), error = %e, "Could not move corrupt file aside");
                }
                Ok(T::default())
            }
        }
    }
}

fn corrupt_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".corrupt");
    path.with_file_name(name)
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Loaded<T> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Loaded::Missing,
        Err(e) => return Loaded::Unreadable(e.to_string()),
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => Loaded::Present(value),
        Err(e) => Loaded::Corrupt(e.to_string()),
    }
}
