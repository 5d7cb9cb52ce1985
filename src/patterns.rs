//! Compiled regex patterns and CSS selectors.
//!
//! Everything here is compiled once on first use via `LazyLock`. The literals
//! are fixed, so a failed compile is a programming error.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;

/// Bracketed citation or editorial marker such as `[12]` or `[citation needed]`.
/// Spans newlines so a marker broken across lines is removed in one pass.
pub static CITATION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[.*?\]").expect("CITATION_MARKER regex"));

/// Any run of whitespace
pub static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE_RUN regex"));

/// URL-ish substring used for the `has_links` content flag
pub static LINK_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(https?://|www\.)").expect("LINK_LIKE regex"));

/// Main article body region of a rendered wiki page
pub static CONTENT_REGION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#mw-content-text").expect("CONTENT_REGION selector"));

/// Paragraph elements
pub static PARAGRAPH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("PARAGRAPH selector"));
