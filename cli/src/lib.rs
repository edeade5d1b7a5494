use anyhow::{Context, Result};
use searchcore::persist::{
    load_config, load_requests, save_answers, save_config, save_requests, SearchConfig,
};
use searchcore::search::DEFAULT_MAX_RESPONSES;
use searchcore::{BuildStats, InvertedIndex, RelativeIndex, SearchServer, TaskScheduler};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config: PathBuf,
    pub requests: PathBuf,
    pub answers: PathBuf,
    /// Worker threads; defaults to the hardware parallelism.
    pub threads: Option<usize>,
    /// Overrides `max_responses` from the config file.
    pub max_responses: Option<usize>,
}

pub struct RunReport {
    pub queries: Vec<String>,
    pub results: Vec<Vec<RelativeIndex>>,
    pub stats: BuildStats,
}

#[derive(Debug, Clone)]
pub struct InitOptions {
    pub files: Vec<String>,
    pub queries: Vec<String>,
    pub max_responses: usize,
    pub name: String,
    pub config: PathBuf,
    pub requests: PathBuf,
}

pub struct Engine {
    pub index: Arc<InvertedIndex>,
    pub config: SearchConfig,
    pub stats: BuildStats,
}

/// Load the config, index every document it names and return the index.
pub fn build_engine(config_path: &Path, threads: Option<usize>) -> Result<Engine> {
    let config = load_config(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let scheduler = match threads {
        Some(n) => TaskScheduler::new(n)?,
        None => TaskScheduler::with_default_workers()?,
    };
    let index = Arc::new(InvertedIndex::with_scheduler(Arc::new(scheduler)));

    tracing::info!(name = %config.config.name, files = config.files.len(), "indexing documents");
    let stats = index.update_document_base(config.document_sources(config_path))?;
    if stats.unavailable > 0 {
        tracing::warn!(unavailable = stats.unavailable, "some documents could not be read");
    }
    Ok(Engine { index, config, stats })
}

/// Build the index, answer every request and write the answers file.
pub fn run(opts: &RunOptions) -> Result<RunReport> {
    let engine = build_engine(&opts.config, opts.threads)?;
    let queries = load_requests(&opts.requests)
        .with_context(|| format!("loading {}", opts.requests.display()))?;
    if queries.is_empty() {
        tracing::warn!(requests = %opts.requests.display(), "no search queries provided");
    }

    let limit = opts.max_responses.unwrap_or(engine.config.config.max_responses);
    let server = SearchServer::new(Arc::clone(&engine.index), limit);
    let results = server.search(&queries);
    tracing::info!(
        queries = queries.len(),
        max_responses = server.max_responses(),
        "search completed"
    );

    save_answers(&opts.answers, &queries, &results)
        .with_context(|| format!("writing {}", opts.answers.display()))?;
    tracing::info!(answers = %opts.answers.display(), "answers saved");
    Ok(RunReport { queries, results, stats: engine.stats })
}

/// Write a config file and a requests file from command-line input. Paths
/// that do not exist are skipped.
pub fn init(opts: &InitOptions) -> Result<SearchConfig> {
    let mut files = Vec::with_capacity(opts.files.len());
    for raw in &opts.files {
        let path = normalize_dashes(raw.trim());
        if path.is_empty() {
            continue;
        }
        if !Path::new(&path).exists() {
            tracing::warn!(%path, "file not found, skipping");
            continue;
        }
        files.push(path);
    }
    let queries: Vec<String> = opts
        .queries
        .iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect();

    let max_responses = if opts.max_responses == 0 {
        tracing::warn!("invalid max responses, using default {DEFAULT_MAX_RESPONSES}");
        DEFAULT_MAX_RESPONSES
    } else {
        opts.max_responses
    };

    let config = SearchConfig::new(opts.name.clone(), max_responses, files);
    save_config(&opts.config, &config)?;
    save_requests(&opts.requests, &queries)?;
    tracing::info!(
        config = %opts.config.display(),
        requests = %opts.requests.display(),
        "data saved"
    );
    Ok(config)
}

/// Replace en and em dashes, which tend to sneak into pasted paths, with `-`.
pub fn normalize_dashes(input: &str) -> String {
    input.replace(['\u{2013}', '\u{2014}'], "-")
}

pub fn format_results(queries: &[String], results: &[Vec<RelativeIndex>]) -> String {
    let mut out = String::new();
    for (query, hits) in queries.iter().zip(results) {
        out.push_str(&format!("Query: {query}\nResults:\n"));
        if hits.is_empty() {
            out.push_str("  No results found.\n");
        }
        for hit in hits {
            out.push_str(&format!("  Document #{} - relevance: {}\n", hit.doc_id, hit.rank));
        }
        out.push('\n');
    }
    out
}
