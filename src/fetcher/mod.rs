//! Article fetching
//!
//! The pipeline only ever sees the [`ArticleSource`] trait, so the HTTP
//! client can be swapped for a scripted source in tests.
//!
//! - [`WikipediaClient`] - `reqwest` + `scraper` implementation
//! - [`clean_text`] / [`extract_article_text`] - the pure cleaning contract

mod clean;
mod http;
mod traits;

pub use clean::{clean_text, extract_article_text};
pub use http::{WikipediaClient, title_to_path};
pub use traits::ArticleSource;
