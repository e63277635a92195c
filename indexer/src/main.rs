use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sitesearch_core::persist::{IndexPaths, DEFAULT_INDEX_FILE, DEFAULT_STORE_FILE};
use sitesearch_core::{SearchOutcome, SearchSession, SessionState, Stemming};
use sitesearch_indexer::fetch::load_session_from_url;
use sitesearch_indexer::{build_site, IndexerConfig};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

#[derive(Parser)]
#[command(name = "sitesearch-indexer")]
#[command(about = "Build and query the full-text index of a static site", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index every page of a generated site
    Build {
        /// JSON config file; flags below override it
        #[arg(long)]
        config: Option<PathBuf>,
        /// Directory holding the generated site
        #[arg(long)]
        site_root: Option<PathBuf>,
        /// Where to write the artifacts (defaults to the site root)
        #[arg(long)]
        output: Option<PathBuf>,
        /// URL prefix of every page, e.g. /SideNote/
        #[arg(long)]
        base_url: Option<String>,
        /// auto, enabled or disabled
        #[arg(long, value_parser = parse_stemming)]
        stemming: Option<Stemming>,
    },
    /// Run one query against built artifacts
    Search {
        query: String,
        /// Directory holding the artifacts
        #[arg(long, conflicts_with = "url")]
        index: Option<PathBuf>,
        /// Base URL the artifacts are served under
        #[arg(long)]
        url: Option<Url>,
        /// Print the rendered page as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn parse_stemming(s: &str) -> Result<Stemming, String> {
    match s.to_ascii_lowercase().as_str() {
        "auto" => Ok(Stemming::Auto),
        "enabled" | "on" => Ok(Stemming::Enabled),
        "disabled" | "off" => Ok(Stemming::Disabled),
        other => Err(format!("unknown stemming mode {other:?}")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { config, site_root, output, base_url, stemming } => {
            let mut cfg = match config {
                Some(path) => IndexerConfig::load(&path)?,
                None => IndexerConfig::default(),
            };
            if let Some(root) = site_root {
                cfg.site.site_root = root;
            }
            if output.is_some() {
                cfg.site.output_dir = output;
            }
            if let Some(base) = base_url {
                cfg.site.base_url = base;
            }
            if let Some(mode) = stemming {
                cfg.search.tokenizer.stemming = mode;
            }
            let report = build_site(&cfg)?;
            println!(
                "indexed {} of {} pages ({} skipped, {} unreadable, stemming {:?}) -> {}",
                report.indexed,
                report.pages_found,
                report.skipped.len(),
                report.unreadable,
                report.stemming,
                report.paths.index().display(),
            );
            Ok(())
        }
        Commands::Search { query, index, url, json } => {
            let session = SearchSession::new(Default::default());
            let state = match url {
                Some(base) => {
                    load_session_from_url(&session, &reqwest::Client::new(), &base, DEFAULT_INDEX_FILE, DEFAULT_STORE_FILE)
                        .await?
                }
                None => {
                    let dir = index.unwrap_or_else(|| PathBuf::from("."));
                    session.load(&IndexPaths::new(&dir))?
                }
            };
            if state == SessionState::Failed {
                let reason = session.failure_reason().unwrap_or_default();
                bail!("search index unavailable: {reason}");
            }

            if json {
                let page = session.search(&query);
                println!("{}", serde_json::to_string_pretty(&page).context("serializing results")?);
                return Ok(());
            }
            match session.outcome(&query) {
                SearchOutcome::Results(results) if results.is_empty() => println!("no matches for {query:?}"),
                SearchOutcome::Results(results) => {
                    for r in results {
                        println!("{:>8.4}  {}", r.score, r.reference);
                    }
                }
                SearchOutcome::Unavailable => bail!("search index unavailable"),
            }
            Ok(())
        }
    }
}
