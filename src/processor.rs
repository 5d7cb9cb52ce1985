//! Derived artifacts for a raw article
//!
//! [`derive_artifact`] is pure; [`ArticleProcessor::process`] derives and
//! writes the three files. A write failure is reported through
//! [`ProcessOutcome::success`] and never propagated: the raw article is the
//! authoritative copy and the derived files can be regenerated from it.

use std::path::PathBuf;

use crate::fetcher::clean_text;
use crate::patterns::LINK_LIKE;
use crate::store::{PersistenceStore, write_atomic, write_json_atomic};
use crate::types::{ArticleMetadata, CleanedRecord, ProcessedArtifact, RawArticle};

const HEADER_RULE: &str = "========================================";

/// Result of writing the derived artifacts of one article
#[must_use]
#[derive(Debug)]
pub struct ProcessOutcome {
    /// The derived views
    pub artifact: ProcessedArtifact,
    /// Files written successfully
    pub written: Vec<PathBuf>,
    /// Files that could not be written, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl ProcessOutcome {
    /// True when all three artifacts were written
    pub fn success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Number of non-empty period-delimited segments
fn sentence_count(text: &str) -> usize {
    text.split('.').filter(|s| !s.trim().is_empty()).count()
}

/// Number of non-empty blank-line-delimited segments
fn paragraph_count(text: &str) -> usize {
    text.split("\n\n").filter(|p| !p.trim().is_empty()).count()
}

/// Build the cleaned record, text rendering and metadata for a raw article
pub fn derive_artifact(raw: &RawArticle) -> ProcessedArtifact {
    let cleaned_text = clean_text(&raw.content);

    let metadata = ArticleMetadata {
        title: raw.title.clone(),
        language: raw.language,
        language_name: raw.language_name.clone(),
        word_count: cleaned_text.split_whitespace().count(),
        char_count: cleaned_text.chars().count(),
        sentence_count: sentence_count(&cleaned_text),
        paragraph_count: paragraph_count(&raw.content),
        has_numbers: cleaned_text.chars().any(|c| c.is_ascii_digit()),
        has_links: LINK_LIKE.is_match(&cleaned_text),
        url: raw.url.clone(),
        extracted_at: raw.extracted_at,
        master_article_index: raw.master_article_index,
    };

    let text = format!(
        "Title: {title}\n\
         Language: {name} ({code})\n\
         Source: {url}\n\
         Extracted: {extracted}\n\
         Master index: {index}\n\
         Words: {words} | Characters: {chars} | Sentences: {sentences}\n\
         {rule}\n\n\
         {body}\n",
        title = raw.title,
        name = raw.language_name,
        code = raw.language.code(),
        url = raw.url,
        extracted = raw.extracted_at.to_rfc3339(),
        index = raw.master_article_index,
        words = metadata.word_count,
        chars = metadata.char_count,
        sentences = metadata.sentence_count,
        rule = HEADER_RULE,
        body = cleaned_text,
    );

    let cleaned = CleanedRecord {
        title: raw.title.clone(),
        language: raw.language,
        language_name: raw.language_name.clone(),
        content: cleaned_text,
        url: raw.url.clone(),
        master_article_index: raw.master_article_index,
    };

    ProcessedArtifact {
        cleaned,
        text,
        metadata,
    }
}

/// Writes derived artifacts next to the raw articles
#[derive(Clone, Debug)]
pub struct ArticleProcessor {
    store: PersistenceStore,
}

impl ArticleProcessor {
    /// Create a processor writing through `store`
    pub fn new(store: PersistenceStore) -> Self {
        Self { store }
    }

    /// Derive and write the cleaned JSON, `.txt` rendering and metadata JSON
    ///
    /// Each file is attempted even if an earlier one failed.
    pub async fn process(&self, raw: &RawArticle) -> ProcessOutcome {
        let artifact = derive_artifact(raw);
        let layout = self.store.layout();
        let mut written = Vec::with_capacity(3);
        let mut failed = Vec::new();

        let (cleaned_path, text_path, metadata_path) = match (
            layout.cleaned(raw.language, &raw.title),
            layout.text(raw.language, &raw.title),
            layout.metadata(raw.language, &raw.title),
        ) {
            (Ok(c), Ok(t), Ok(m)) => (c, t, m),
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
                tracing::warn!(language = %raw.language, topic = %raw.title, error = %e, "No artifact path for topic");
                failed.push((PathBuf::from(raw.title.as_str()), e.to_string()));
                return ProcessOutcome {
                    artifact,
                    written,
                    failed,
                };
            }
        };

        let results = [
            (
                cleaned_path.clone(),
                write_json_atomic(&cleaned_path, &artifact.cleaned).await,
            ),
            (
                text_path.clone(),
                write_atomic(&text_path, artifact.text.as_bytes()).await,
            ),
            (
                metadata_path.clone(),
                write_json_atomic(&metadata_path, &artifact.metadata).await,
            ),
        ];

        for (path, result) in results {
            match result {
                Ok(()) => written.push(path),
                Err(e) => {
                    tracing::warn!(
                        language = %raw.language,
                        topic = %raw.title,
                        path = %path.display(),
                        error = %e,
                        "Failed to write processed artifact"
                    );
                    failed.push((path, e.to_string()));
                }
            }
        }

        ProcessOutcome {
            artifact,
            written,
            failed,
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Language, Topic};

    fn raw(content: &str) -> RawArticle {
        RawArticle::new(
            Topic::from("Water"),
            Language::Filipino,
            content.to_string(),
            "https://tl.wikipedia.org/wiki/Water".to_string(),
            4,
        )
    }

    #[test]
    fn test_counts_on_simple_text() {
        let artifact = derive_artifact(&raw("Ang tubig ay likido. Mahalaga ito sa buhay."));
        let m = &artifact.metadata;
        assert_eq!(m.word_count, 8);
        assert_eq!(m.sentence_count, 2);
        assert_eq!(m.paragraph_count, 1);
        assert_eq!(m.char_count, "Ang tubig ay likido. Mahalaga ito sa buhay.".chars().count());
        assert!(!m.has_numbers);
        assert!(!m.has_links);
        assert_eq!(m.master_article_index, 4);
    }

    #[test]
    fn test_paragraphs_counted_on_raw_body() {
        let artifact = derive_artifact(&raw("First para.\n\nSecond para.\n\n\n\nThird."));
        assert_eq!(artifact.metadata.paragraph_count, 3);
        // Cleaning collapses the blank lines away
        assert_eq!(artifact.cleaned.content, "First para. Second para. Third.");
    }

    #[test]
    fn test_fetched_html_reports_a_single_paragraph() {
        let html = r#"<div id="mw-content-text"><p>First.</p><p>Second.</p><p>Third.</p></div>"#;
        let content = crate::fetcher::extract_article_text(html).unwrap();
        let artifact = derive_artifact(&raw(&content));
        assert_eq!(artifact.metadata.sentence_count, 3);
        assert_eq!(artifact.metadata.paragraph_count, 1);
    }

    #[test]
    fn test_content_flags() {
        let artifact = derive_artifact(&raw("Founded in 1998, see www.example.org for more"));
        assert!(artifact.metadata.has_numbers);
        assert!(artifact.metadata.has_links);
        assert_eq!(artifact.metadata.sentence_count, 3, "periods inside the address split too");
    }

    #[test]
    fn test_char_count_is_in_characters_not_bytes() {
        let artifact = derive_artifact(&raw("Señora"));
        assert_eq!(artifact.metadata.char_count, 6);
    }

    #[test]
    fn test_empty_segments_are_discarded() {
        assert_eq!(sentence_count("..."), 0);
        assert_eq!(sentence_count("One. . Two."), 2);
        assert_eq!(paragraph_count("\n\n  \n\n"), 0);
    }

    #[test]
    fn test_text_rendering_has_header_block() {
        let artifact = derive_artifact(&raw("Tubig."));
        assert!(artifact.text.starts_with("Title: Water\nLanguage: Filipino (tl)\n"));
        assert!(artifact.text.contains(HEADER_RULE));
        assert!(artifact.text.trim_end().ends_with("Tubig."));
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let article = raw("Same input. Same output.");
        assert_eq!(derive_artifact(&article), derive_artifact(&article));
    }

    #[tokio::test]
    async fn test_process_writes_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = PersistenceStore::new(dir.path());
        store.init(&[Language::Filipino]).await.unwrap();

        let outcome = ArticleProcessor::new(store).process(&raw("Tubig.")).await;
        assert!(outcome.success());
        assert_eq!(outcome.written.len(), 3);

        let processed = dir.path().join("tl/processed");
        assert!(processed.join("Water_cleaned.json").is_file());
        assert!(processed.join("Water.txt").is_file());
        let meta: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(processed.join("Water_metadata.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(meta["word_count"], 1);
        assert_eq!(meta["language"], "tl");
    }

    #[tokio::test]
    async fn test_metadata_write_failure_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let store = PersistenceStore::new(dir.path());
        store.init(&[Language::Filipino]).await.unwrap();
        std::fs::create_dir(dir.path().join("tl/processed/Water_metadata.json")).unwrap();

        let outcome = ArticleProcessor::new(store).process(&raw("Tubig.")).await;
        assert!(!outcome.success());
        assert_eq!(outcome.written.len(), 2, "other artifacts still written");
        assert_eq!(outcome.failed.len(), 1);
        assert!(outcome.failed[0].0.ends_with("Water_metadata.json"));
    }
}
