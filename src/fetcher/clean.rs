//! Article body extraction and text cleaning

use scraper::Html;

use crate::patterns::{CITATION_MARKER, CONTENT_REGION, PARAGRAPH, WHITESPACE_RUN};

/// Strip bracketed markers and collapse whitespace
///
/// Idempotent: a second application returns its input unchanged.
///
/// # Examples
///
/// ```
/// use parallel_corpus::fetcher::clean_text;
///
/// assert_eq!(clean_text("Water [citation needed] is  wet.[1]"), "Water is wet.");
/// ```
pub fn clean_text(text: &str) -> String {
    let stripped = CITATION_MARKER.replace_all(text, "");
    WHITESPACE_RUN.replace_all(&stripped, " ").trim().to_string()
}

/// Pull the cleaned paragraph text out of a rendered article page
///
/// Returns `None` when the page has no main content region or when the
/// region holds no paragraph text.
pub fn extract_article_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let region = document.select(&CONTENT_REGION).next()?;

    let paragraphs: Vec<String> = region
        .select(&PARAGRAPH)
        .map(|p| p.text().collect::<String>())
        .collect();

    let cleaned = clean_text(&paragraphs.join(" "));
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
