//! Statistics and the markdown run summary

use chrono::{DateTime, Utc};
use std::fmt::Write as _;

use crate::error::Result;
use crate::store::PersistenceStore;
use crate::types::{ExtractionStatistics, Language, LanguageStats, MasterTopicList};

/// Rebuild statistics from the on-disk progress checkpoints
///
/// Only topics that are both in `list` and in a language's completed set
/// count, so stale entries from an older master list do not inflate totals.
/// In-memory counters are never consulted; this gives the same answer after
/// any sequence of interrupted and resumed runs.
///
/// # Errors
///
/// Fails if a progress checkpoint exists but cannot be read.
pub async fn compute_statistics(
    store: &PersistenceStore,
    languages: &[Language],
    list: &MasterTopicList,
) -> Result<ExtractionStatistics> {
    let mut statistics = ExtractionStatistics {
        total_topics: list.len(),
        ..Default::default()
    };

    for &language in languages {
        let progress = store.load_progress(language).await?;
        let completed = list.iter().filter(|t| progress.is_completed(t)).count();
        statistics.languages.insert(
            language,
            LanguageStats {
                target: list.len(),
                completed,
                failed: list.len() - completed,
            },
        );
    }

    Ok(statistics)
}

/// Render `extraction_summary.md`
pub fn render_summary(
    statistics: &ExtractionStatistics,
    list: &MasterTopicList,
    generated_at: DateTime<Utc>,
) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "# Parallel Corpus Extraction Summary\n");
    let _ = writeln!(out, "Generated: {}\n", generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out, "Master topics: {}\n", statistics.total_topics);

    let _ = writeln!(out, "## Per-language results\n");
    let _ = writeln!(out, "| Language | Code | Completed | Failed | Completion |");
    let _ = writeln!(out, "|----------|------|-----------|--------|------------|");
    for (language, stats) in &statistics.languages {
        let _ = writeln!(
            out,
            "| {} | {} | {}/{} | {} | {:.1}% |",
            language.display_name(),
            language.code(),
            stats.completed,
            stats.target,
            stats.failed,
            stats.completion_percent()
        );
    }

    let _ = writeln!(
        out,
        "\nTotal extracted: {} | Total missing: {}\n",
        statistics.total_completed(),
        statistics.total_failed()
    );

    let _ = writeln!(out, "## Layout\n");
    let _ = writeln!(out, "- `<lang>/raw/<topic>.json`: fetched article text");
    let _ = writeln!(
        out,
        "- `<lang>/processed/`: cleaned JSON, text rendering and metadata per topic"
    );
    let _ = writeln!(out, "- `<lang>/progress.json`: completed topics per language");
    let _ = writeln!(out, "- `master_articles.json`: topic order shared by every language\n");

    let _ = writeln!(out, "## Topics\n");
    for (index, topic) in list.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", index + 1, topic);
    }

    out
}
