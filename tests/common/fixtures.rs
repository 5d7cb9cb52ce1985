//! Scripted sources and config fixtures

use async_trait::async_trait;
use parallel_corpus::{ArticleSource, CandidateSource, Config, FetchOutcome, Language, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

/// In-memory encyclopedia that records every request
#[derive(Default)]
pub struct FakeWiki {
    pages: HashMap<(Language, String), String>,
    broken: HashSet<(Language, String)>,
    fetches: Mutex<Vec<(Language, String)>>,
    probes: Mutex<Vec<(Language, String)>>,
}

impl FakeWiki {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page in every language, with a body that mentions the language
    pub fn everywhere(mut self, title: &str) -> Self {
        for language in Language::ALL {
            self.pages.insert(
                (language, title.to_string()),
                format!(
                    "{title} ({}). First paragraph.\n\nSecond paragraph with 42 facts.",
                    language.display_name()
                ),
            );
        }
        self
    }

    /// Page in the listed languages only
    pub fn only_in(mut self, title: &str, languages: &[Language]) -> Self {
        for &language in languages {
            self.pages
                .insert((language, title.to_string()), format!("{title} text."));
        }
        self
    }

    /// Page exists for probes but every fetch comes back empty
    pub fn unfetchable(mut self, title: &str, language: Language) -> Self {
        self.broken.insert((language, title.to_string()));
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }

    pub fn fetches(&self) -> Vec<(Language, String)> {
        self.fetches.lock().unwrap().clone()
    }

    pub fn probe_count(&self) -> usize {
        self.probes.lock().unwrap().len()
    }
}

#[async_trait]
impl ArticleSource for FakeWiki {
    async fn fetch(&self, language: Language, title: &str) -> FetchOutcome {
        let key = (language, title.to_string());
        self.fetches.lock().unwrap().push(key.clone());
        if self.broken.contains(&key) {
            return FetchOutcome::NotFound;
        }
        match self.pages.get(&key) {
            Some(body) => FetchOutcome::Found(body.clone()),
            None => FetchOutcome::NotFound,
        }
    }

    async fn exists(&self, language: Language, title: &str) -> bool {
        let key = (language, title.to_string());
        self.probes.lock().unwrap().push(key.clone());
        self.pages.contains_key(&key)
    }

    fn article_url(&self, language: Language, title: &str) -> String {
        format!("https://{}.wikipedia.org/wiki/{}", language.code(), title.replace(' ', "_"))
    }

    fn name(&self) -> &'static str {
        "fake-wiki"
    }
}

/// Candidate titles handed out in fixed batches
pub struct FixedCandidates {
    batches: Mutex<Vec<Vec<String>>>,
}

impl FixedCandidates {
    pub fn new(batches: &[&[&str]]) -> Self {
        let mut batches: Vec<Vec<String>> = batches
            .iter()
            .map(|b| b.iter().map(|t| t.to_string()).collect())
            .collect();
        batches.reverse();
        Self {
            batches: Mutex::new(batches),
        }
    }
}

#[async_trait]
impl CandidateSource for FixedCandidates {
    async fn next_batch(&self, _size: usize) -> Result<Vec<String>> {
        Ok(self.batches.lock().unwrap().pop().unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Config writing under `dir` with no delays
pub fn fast_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.extraction.output_dir = dir.to_path_buf();
    config.extraction.request_delay = Duration::ZERO;
    config.fetch.probe_delay = Duration::ZERO;
    config.availability.max_empty_batches = 2;
    config
}

/// Every file under `dir` except the timestamped summary, with contents
pub fn snapshot(dir: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut files = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in std::fs::read_dir(&current).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else if path.file_name().unwrap() != "extraction_summary.md" {
                files.push((path.clone(), std::fs::read(&path).unwrap()));
            }
        }
    }
    files.sort();
    files
}
