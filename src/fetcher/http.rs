//! HTTP article source backed by the public wiki editions

use async_trait::async_trait;
use std::time::Duration;

use super::clean::extract_article_text;
use super::traits::ArticleSource;
use crate::config::FetchConfig;
use crate::error::Result;
use crate::types::{FetchOutcome, Language};

/// Article source that talks to `https://{lang}.wikipedia.org`
///
/// One pooled `reqwest::Client` is shared by every request. GETs use the
/// client-level timeout; HEAD probes use the shorter probe timeout.
/// Redirects are followed for both.
pub struct WikipediaClient {
    http_client: reqwest::Client,
    config: FetchConfig,
}

impl WikipediaClient {
    /// Create a client from fetch settings
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created (e.g., TLS backend failure)
    pub fn new(config: FetchConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn probe_timeout(&self) -> Duration {
        self.config.probe_timeout
    }
}

/// Title as it appears in an article address: spaces become underscores,
/// everything else is percent-encoded
pub fn title_to_path(title: &str) -> String {
    urlencoding::encode(&title.trim().replace(' ', "_")).into_owned()
}

#[async_trait]
impl ArticleSource for WikipediaClient {
    async fn fetch(&self, language: Language, title: &str) -> FetchOutcome {
        let url = self.article_url(language, title);
        tracing::debug!(language = %language, title, url = %url, "Fetching article");

        let response = match self.http_client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                let cause = if e.is_timeout() {
                    "timeout"
                } else if e.is_connect() {
                    "connection failed"
                } else {
                    "request failed"
                };
                tracing::warn!(language = %language, title, url = %url, error = %e, cause, "Article fetch failed");
                return FetchOutcome::NotFound;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(language = %language, title, url = %url, status = %status, "Article fetch returned non-success status");
            return FetchOutcome::NotFound;
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(language = %language, title, url = %url, error = %e, "Failed to read article body");
                return FetchOutcome::NotFound;
            }
        };

        match extract_article_text(&body) {
            Some(text) => FetchOutcome::Found(text),
            None => {
                tracing::warn!(language = %language, title, url = %url, "Could not find the main content area of the article");
                FetchOutcome::NotFound
            }
        }
    }

    async fn exists(&self, language: Language, title: &str) -> bool {
        let url = self.article_url(language, title);

        match self
            .http_client
            .head(&url)
            .timeout(self.probe_timeout())
            .send()
            .await
        {
            Ok(response) => {
                let found = response.status().is_success();
                tracing::debug!(language = %language, title, status = %response.status(), found, "Existence probe");
                found
            }
            Err(e) => {
                tracing::warn!(language = %language, title, url = %url, error = %e, "Existence probe failed");
                false
            }
        }
    }

    fn article_url(&self, language: Language, title: &str) -> String {
        self.config
            .article_url_template
            .replace("{lang}", language.code())
            .replace("{title}", &title_to_path(title))
    }

    fn name(&self) -> &'static str {
        "wikipedia"
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> WikipediaClient {
        let config = FetchConfig {
            article_url_template: format!("{}/{{lang}}/wiki/{{title}}", server.uri()),
            timeout: Duration::from_secs(2),
            probe_timeout: Duration::from_secs(1),
            ..Default::default()
        };
        WikipediaClient::new(config).unwrap()
    }

    const SUN_PAGE: &str = r#"<html><body><div id="mw-content-text">
        <p>The Sun is a star.[3]</p><p>It is very hot.</p>
    </div></body></html>"#;

    #[test]
    fn test_article_url_uses_underscores() {
        let client = WikipediaClient::new(FetchConfig::default()).unwrap();
        assert_eq!(
            client.article_url(Language::Filipino, "Ilog Pasig"),
            "https://tl.wikipedia.org/wiki/Ilog_Pasig"
        );
        assert_eq!(
            client.article_url(Language::English, "AC/DC"),
            "https://en.wikipedia.org/wiki/AC%2FDC"
        );
    }

    #[tokio::test]
    async fn test_fetch_found_returns_cleaned_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/en/wiki/Sun"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SUN_PAGE))
            .mount(&server)
            .await;

        let outcome = client_for(&server).fetch(Language::English, "Sun").await;
        assert_eq!(
            outcome,
            FetchOutcome::Found("The Sun is a star. It is very hot.".to_string())
        );
    }

    #[tokio::test]
    async fn test_fetch_404_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ilo/wiki/Earth"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let outcome = client_for(&server).fetch(Language::Ilokano, "Earth").await;
        assert_eq!(outcome, FetchOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_fetch_without_content_region_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/en/wiki/Blank"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<html><body><p>x</p></body></html>"),
            )
            .mount(&server)
            .await;

        let outcome = client_for(&server).fetch(Language::English, "Blank").await;
        assert_eq!(outcome, FetchOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_fetch_timeout_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/en/wiki/Slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(SUN_PAGE)
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let outcome = client_for(&server).fetch(Language::English, "Slow").await;
        assert_eq!(outcome, FetchOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_not_found() {
        let config = FetchConfig {
            article_url_template: "http://127.0.0.1:9/{lang}/wiki/{title}".to_string(),
            timeout: Duration::from_secs(2),
            ..Default::default()
        };
        let client = WikipediaClient::new(config).unwrap();
        assert_eq!(
            client.fetch(Language::English, "Sun").await,
            FetchOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_exists_uses_head_and_status() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/ceb/wiki/Tubig"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/ceb/wiki/Missing_Page"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.exists(Language::Cebuano, "Tubig").await);
        assert!(!client.exists(Language::Cebuano, "Missing Page").await);
    }

    #[tokio::test]
    async fn test_exists_follows_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/tl/wiki/Araw"))
            .respond_with(
                ResponseTemplate::new(301)
                    .insert_header("Location", format!("{}/tl/wiki/Araw_(bituin)", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(path("/tl/wiki/Araw_(bituin)"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        assert!(client_for(&server).exists(Language::Filipino, "Araw").await);
    }
}
