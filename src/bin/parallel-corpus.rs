use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use parallel_corpus::{
    ArticleSource, BuildOutcome, Config, ExtractionOrchestrator, ExtractionStatistics,
    FetchOutcome, Language, TopicSource, WikipediaClient, cancel_on_signal, candidate_source_for,
};
use tracing_subscriber::EnvFilter;

const PREVIEW_CHARS: usize = 1000;

#[derive(Parser, Debug)]
#[command(
    name = "parallel-corpus",
    version,
    about = "Build a parallel corpus of Wikipedia articles available in every target language"
)]
struct Cli {
    /// JSON configuration file; command-line flags override its values.
    #[arg(long, env = "PARALLEL_CORPUS_CONFIG")]
    config: Option<PathBuf>,

    /// Base output directory.
    #[arg(long, env = "PARALLEL_CORPUS_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Number of topics to extract per language.
    #[arg(long)]
    target_count: Option<usize>,

    /// Sample candidate topics at random instead of using the curated list.
    #[arg(long, default_value_t = false)]
    random: bool,

    /// Delay between article requests, in milliseconds.
    #[arg(long)]
    request_delay_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the master topic list (if needed), then extract every article.
    Run,
    /// Only resolve and save the master topic list.
    Topics,
    /// Recompute statistics from checkpoints and rewrite the summary.
    Stats,
    /// Fetch one article and print a preview.
    Fetch {
        /// Language code or name (en, tl, ceb, ilo, English, ...).
        #[arg(long)]
        language: Language,
        /// Article title.
        #[arg(long)]
        title: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = Arc::new(load_config(&cli)?);
    let client = Arc::new(WikipediaClient::new(config.fetch.clone())?);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let orchestrator = ExtractionOrchestrator::new(config.clone(), client);
            let signals = cancel_on_signal(orchestrator.cancellation_token());
            let report = orchestrator.run(candidate_source_for(&config)?).await?;
            signals.abort();

            if report.interrupted {
                println!("Interrupted; rerun the same command to resume.");
            }
            println!(
                "Extracted {} | skipped {} | failed {} this run",
                report.extracted, report.skipped, report.failed
            );
            print_statistics(&report.statistics);
            if let Some(path) = report.summary_path {
                println!("Summary written to {}", path.display());
            }
        }
        Command::Topics => {
            let orchestrator = ExtractionOrchestrator::new(config.clone(), client);
            let signals = cancel_on_signal(orchestrator.cancellation_token());
            orchestrator.store().init(&config.languages).await?;
            let outcome = orchestrator
                .topic_builder(candidate_source_for(&config)?)
                .build(config.extraction.target_count)
                .await?;
            signals.abort();

            match outcome {
                BuildOutcome::Loaded(list) => {
                    println!("Master list already exists with {} topics", list.len());
                }
                BuildOutcome::Built(list) => {
                    println!("Master list saved with {} topics", list.len());
                }
                BuildOutcome::Interrupted { confirmed } => {
                    println!("Interrupted with {} topics confirmed; rerun to resume", confirmed);
                }
                BuildOutcome::Empty { checked } => {
                    println!(
                        "No topic out of {} checked is available in every language; nothing saved",
                        checked
                    );
                }
            }
        }
        Command::Stats => {
            let orchestrator = ExtractionOrchestrator::new(config.clone(), client);
            match orchestrator.refresh_summary().await? {
                Some((statistics, path)) => {
                    print_statistics(&statistics);
                    println!("Summary written to {}", path.display());
                }
                None => println!("No master topic list yet; run `parallel-corpus topics` first"),
            }
        }
        Command::Fetch { language, title } => {
            let url = client.article_url(language, &title);
            match client.fetch(language, &title).await {
                FetchOutcome::Found(text) => {
                    println!("{} ({})", title, url);
                    println!("{}", preview(&text, PREVIEW_CHARS));
                }
                FetchOutcome::NotFound => {
                    println!("No article found at {}", url);
                }
            }
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> parallel_corpus::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };

    if let Some(dir) = &cli.output_dir {
        config.extraction.output_dir = dir.clone();
    }
    if let Some(count) = cli.target_count {
        config.extraction.target_count = count;
    }
    if cli.random {
        config.extraction.topic_source = TopicSource::Random;
    }
    if let Some(ms) = cli.request_delay_ms {
        config.extraction.request_delay = Duration::from_millis(ms);
    }

    config.validate()?;
    Ok(config)
}

fn preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn print_statistics(statistics: &ExtractionStatistics) {
    println!("Master topics: {}", statistics.total_topics);
    for (language, stats) in &statistics.languages {
        println!(
            "  {:<9} {:>4}/{:<4} ({:.1}%)",
            language.display_name(),
            stats.completed,
            stats.target,
            stats.completion_percent()
        );
    }
}
