//! Shared test doubles for unit tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetcher::ArticleSource;
use crate::topics::CandidateSource;
use crate::types::{FetchOutcome, Language};

/// In-memory article source that records every call
#[derive(Default)]
pub(crate) struct ScriptedSource {
    articles: HashMap<(Language, String), String>,
    /// Pairs that exist for probes but fail to fetch
    fetch_failures: HashSet<(Language, String)>,
    pub(crate) fetches: Mutex<Vec<(Language, String)>>,
    pub(crate) probes: Mutex<Vec<(Language, String)>>,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register an article in one language
    pub(crate) fn with_article(mut self, language: Language, title: &str, body: &str) -> Self {
        self.articles
            .insert((language, title.to_string()), body.to_string());
        self
    }

    /// Register an article in every listed language
    pub(crate) fn with_everywhere(mut self, languages: &[Language], title: &str) -> Self {
        for lang in languages {
            self.articles.insert(
                (*lang, title.to_string()),
                format!("{} in {}. It is notable.", title, lang.display_name()),
            );
        }
        self
    }

    /// Make fetches of this pair fail while probes still succeed
    pub(crate) fn failing_fetch(mut self, language: Language, title: &str) -> Self {
        self.fetch_failures.insert((language, title.to_string()));
        self
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }

    pub(crate) fn probe_count(&self) -> usize {
        self.probes.lock().unwrap().len()
    }
}

#[async_trait]
impl ArticleSource for ScriptedSource {
    async fn fetch(&self, language: Language, title: &str) -> FetchOutcome {
        let key = (language, title.to_string());
        self.fetches.lock().unwrap().push(key.clone());
        if self.fetch_failures.contains(&key) {
            return FetchOutcome::NotFound;
        }
        match self.articles.get(&key) {
            Some(body) => FetchOutcome::Found(body.clone()),
            None => FetchOutcome::NotFound,
        }
    }

    async fn exists(&self, language: Language, title: &str) -> bool {
        let key = (language, title.to_string());
        self.probes.lock().unwrap().push(key.clone());
        self.articles.contains_key(&key)
    }

    fn article_url(&self, language: Language, title: &str) -> String {
        format!("https://{}.example.org/wiki/{}", language.code(), title.replace(' ', "_"))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Candidate source that hands out pre-scripted batches, then empty ones
pub(crate) struct ScriptedCandidates {
    batches: Mutex<Vec<Result<Vec<String>>>>,
    pub(crate) calls: Mutex<usize>,
}

impl ScriptedCandidates {
    pub(crate) fn new(batches: Vec<Vec<&str>>) -> Self {
        let mut batches: Vec<Result<Vec<String>>> = batches
            .into_iter()
            .map(|b| Ok(b.into_iter().map(String::from).collect()))
            .collect();
        batches.reverse();
        Self {
            batches: Mutex::new(batches),
            calls: Mutex::new(0),
        }
    }

    /// A source whose every call fails
    pub(crate) fn failing(times: usize) -> Self {
        let batches = (0..times)
            .map(|_| Err(Error::CandidateSource("unreachable".into())))
            .collect();
        Self {
            batches: Mutex::new(batches),
            calls: Mutex::new(0),
        }
    }

    pub(crate) fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl CandidateSource for ScriptedCandidates {
    async fn next_batch(&self, _size: usize) -> Result<Vec<String>> {
        *self.calls.lock().unwrap() += 1;
        self.batches.lock().unwrap().pop().unwrap_or_else(|| Ok(Vec::new()))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Config pointing at a temp dir with every delay disabled
pub(crate) fn test_config(output_dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.extraction.output_dir = output_dir.to_path_buf();
    config.extraction.request_delay = std::time::Duration::ZERO;
    config.fetch.probe_delay = std::time::Duration::ZERO;
    config.retry.initial_delay = std::time::Duration::from_millis(1);
    config.retry.max_delay = std::time::Duration::from_millis(5);
    config.retry.jitter = false;
    config
}
