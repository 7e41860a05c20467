use std::collections::{HashSet, VecDeque};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use reqwest::Client;
use tracing::{debug, info, warn};

use serp_sift::cluster::build_clusters;
use serp_sift::config::{self, Config};
use serp_sift::dedupe::{dedupe_records, normalize_record};
use serp_sift::fetch::{fetch_brave, fetch_searxng, BraveDisabled, SearchHit};
use serp_sift::filters::apply_domain_filters;
use serp_sift::models::{CanonicalRecord, RawRecord};
use serp_sift::terms::{aggregate_terms, DEFAULT_TERM_LIMIT};
use serp_sift::text::extract_phrases;

/// serp-sift - web-search result collection and processing pipeline
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect raw search results into append-only JSONL
    Collect {
        /// File with one query per line
        #[arg(long)]
        queries: PathBuf,

        /// Comma-separated engines (searxng, brave)
        #[arg(long, default_value = "searxng")]
        engines: String,

        /// Output JSONL file (appended to)
        #[arg(long)]
        out: PathBuf,

        /// Expand the queue with anchor-term follow-up phrases
        #[arg(long, default_value_t = false)]
        expand: bool,

        /// Path to config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Anchor terms for query expansion
        #[arg(long, default_value = "config/anchor_terms.txt")]
        anchor_terms: PathBuf,
    },
    /// Process raw JSONL into deduped items, clusters, and term summaries
    Process {
        /// Input JSONL of raw records
        #[arg(long)]
        input: PathBuf,

        /// Output directory for deduped.json, clusters.json, terms.json
        #[arg(long)]
        outdir: PathBuf,

        /// Keyword list driving cluster assignment
        #[arg(long, default_value = "config/keywords.txt")]
        keywords: PathBuf,

        /// Path to config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Path to domains config file
        #[arg(long)]
        domains: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Collect {
            queries,
            engines,
            out,
            expand,
            config,
            anchor_terms,
        } => run_collect(&queries, &engines, &out, expand, config.as_deref(), &anchor_terms).await,
        Command::Process {
            input,
            outdir,
            keywords,
            config,
            domains,
        } => run_process(&input, &outdir, &keywords, config.as_deref(), domains.as_deref()),
    }
}

fn load_config_or_default(path: Option<&Path>) -> Result<Config> {
    let path = path.unwrap_or_else(|| Path::new(config::DEFAULT_CONFIG_PATH));
    debug!("Using config file: {}", path.display());
    config::load_config(path)
}

fn utc_now() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn append_jsonl(path: &Path, records: &[RawRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    for record in records {
        let line = serde_json::to_string(record)?;
        writeln!(file, "{line}").with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

async fn run_collect(
    queries_path: &Path,
    engines: &str,
    out_path: &Path,
    expand: bool,
    config_path: Option<&Path>,
    anchor_terms_path: &Path,
) -> Result<()> {
    let start = std::time::Instant::now();
    let config = load_config_or_default(config_path)?;
    let query_list = config::read_lines(queries_path)?;
    let engine_list: Vec<String> = engines
        .split(',')
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    info!(
        "Collection started - queries={}, engines={:?}, expand={}",
        query_list.len(),
        engine_list,
        expand
    );

    let client = Client::builder()
        .timeout(Duration::from_secs(config.search.timeout_s))
        .build()?;
    let searx_url =
        std::env::var("SEARX_URL").unwrap_or_else(|_| config.search.searx_url.clone());

    let queries_all_path = Path::new("data/queries_all.txt");
    let anchor_terms = if expand {
        if let Some(parent) = queries_all_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        std::fs::write(queries_all_path, "")
            .with_context(|| format!("truncating {}", queries_all_path.display()))?;
        config::load_keywords(anchor_terms_path)?
    } else {
        Vec::new()
    };

    let mut queue: VecDeque<String> = query_list.iter().cloned().collect();
    let mut seen_queries: HashSet<String> = query_list.into_iter().collect();
    let mut collected = 0usize;

    while let Some(query) = queue.pop_front() {
        if expand {
            append_line(queries_all_path, &query)?;
        }

        let mut batch_texts: Vec<String> = Vec::new();
        for engine in &engine_list {
            let hits = match engine.as_str() {
                "searxng" => {
                    fetch_searxng(
                        &client,
                        &query,
                        &searx_url,
                        &config.search.user_agent,
                        config.search.max_retries,
                    )
                    .await
                }
                "brave" => {
                    fetch_brave(
                        &client,
                        &query,
                        &config.search.user_agent,
                        config.search.max_retries,
                    )
                    .await
                }
                other => {
                    warn!("Unknown engine: {}", other);
                    continue;
                }
            };
            let hits = match hits {
                Ok(hits) => hits,
                Err(err) if err.downcast_ref::<BraveDisabled>().is_some() => {
                    warn!("Engine {} unavailable: {}", engine, err);
                    continue;
                }
                Err(err) => {
                    warn!("Engine {} error: {:#}", engine, err);
                    continue;
                }
            };

            let timestamp = utc_now();
            let records: Vec<RawRecord> = hits
                .into_iter()
                .map(|hit| raw_record(&query, engine, &timestamp, hit))
                .collect();
            for record in &records {
                batch_texts.push(format!("{} {}", record.title, record.snippet));
            }
            collected += records.len();
            append_jsonl(out_path, &records)?;
        }

        if expand && !batch_texts.is_empty() {
            let followups =
                extract_phrases(&batch_texts, &anchor_terms, config.expansion.max_followups);
            for phrase in followups {
                if seen_queries.contains(&phrase) {
                    continue;
                }
                if queue.len() >= config.expansion.max_queue_size {
                    break;
                }
                debug!("Enqueued follow-up query - phrase={:?}", phrase);
                append_line(queries_all_path, &phrase)?;
                seen_queries.insert(phrase.clone());
                queue.push_back(phrase);
            }
        }
    }

    info!(
        "Collection completed - duration={:.2}s, records={}, out={}",
        start.elapsed().as_secs_f32(),
        collected,
        out_path.display()
    );
    Ok(())
}

fn raw_record(query: &str, engine: &str, timestamp: &str, hit: SearchHit) -> RawRecord {
    RawRecord {
        query: query.to_string(),
        engine: engine.to_string(),
        rank: hit.rank,
        url: hit.url,
        title: hit.title,
        snippet: hit.snippet,
        timestamp: timestamp.to_string(),
        raw_metadata: hit.raw_metadata,
    }
}

fn append_line(path: &Path, line: &str) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    writeln!(file, "{line}").with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn run_process(
    input_path: &Path,
    out_dir: &Path,
    keywords_path: &Path,
    config_path: Option<&Path>,
    domains_path: Option<&Path>,
) -> Result<()> {
    let start = std::time::Instant::now();
    let config = load_config_or_default(config_path)?;
    let domains_path = domains_path.unwrap_or_else(|| Path::new(config::DEFAULT_DOMAINS_PATH));
    let domains = config::load_domains(domains_path)?;

    let text = std::fs::read_to_string(input_path)
        .with_context(|| format!("reading {}", input_path.display()))?;
    let mut normalized: Vec<CanonicalRecord> = Vec::new();
    let mut skipped = 0usize;
    for (lineno, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let raw: RawRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(err) => {
                warn!("Skipping undecodable record - line={}, error={}", lineno + 1, err);
                skipped += 1;
                continue;
            }
        };
        match normalize_record(raw) {
            Ok(record) => normalized.push(record),
            Err(err) => {
                warn!("Skipping malformed record - line={}, error={}", lineno + 1, err);
                skipped += 1;
            }
        }
    }
    info!(
        "Records loaded - accepted={}, skipped={}, input={}",
        normalized.len(),
        skipped,
        input_path.display()
    );

    let deduped = dedupe_records(normalized, config.dedupe.similarity_threshold)?;
    let mut filtered = apply_domain_filters(deduped, &domains);
    let keywords = config::load_keywords(keywords_path)?;
    let clusters = build_clusters(&mut filtered, &keywords);
    let terms = aggregate_terms(&filtered, DEFAULT_TERM_LIMIT)?;

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    std::fs::write(out_dir.join("deduped.json"), serde_json::to_vec_pretty(&filtered)?)
        .context("writing deduped.json")?;
    std::fs::write(out_dir.join("clusters.json"), serde_json::to_vec_pretty(&clusters)?)
        .context("writing clusters.json")?;
    std::fs::write(out_dir.join("terms.json"), serde_json::to_vec_pretty(&terms)?)
        .context("writing terms.json")?;

    info!(
        "Processing completed - duration={:.2}s, items={}, clusters={}, outdir={}",
        start.elapsed().as_secs_f32(),
        filtered.len(),
        clusters.len(),
        out_dir.display()
    );
    Ok(())
}
