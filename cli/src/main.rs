use anyhow::Result;
use clap::{Parser, Subcommand};
use search_engine::{build_engine, format_results, init, run, InitOptions, RunOptions};
use searchcore::search::DEFAULT_MAX_RESPONSES;
use searchcore::SearchServer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "search-engine")]
#[command(about = "Index a batch of text files and answer ranked queries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the files from config.json, answer requests.json, write answers.json
    Run {
        #[arg(long, default_value = "config/config.json")]
        config: PathBuf,
        #[arg(long, default_value = "config/requests.json")]
        requests: PathBuf,
        #[arg(long, default_value = "config/answers.json")]
        answers: PathBuf,
        /// Worker threads (default: one per CPU)
        #[arg(long)]
        threads: Option<usize>,
        /// Override max_responses from the config file
        #[arg(long)]
        max_responses: Option<usize>,
    },
    /// Write config.json and requests.json from the given files and queries
    Init {
        /// Document file path (repeatable)
        #[arg(long = "file")]
        files: Vec<String>,
        /// Search query (repeatable)
        #[arg(long = "query")]
        queries: Vec<String>,
        #[arg(long, default_value_t = DEFAULT_MAX_RESPONSES)]
        max_responses: usize,
        #[arg(long, default_value = "search_engine")]
        name: String,
        #[arg(long, default_value = "config.json")]
        config: PathBuf,
        #[arg(long, default_value = "requests.json")]
        requests: PathBuf,
    },
    /// Index the files from config.json and print results for ad-hoc queries as JSON
    Query {
        #[arg(long, default_value = "config/config.json")]
        config: PathBuf,
        #[arg(long)]
        threads: Option<usize>,
        #[arg(required = true)]
        queries: Vec<String>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, requests, answers, threads, max_responses } => {
            let report = run(&RunOptions { config, requests, answers, threads, max_responses })?;
            print!("{}", format_results(&report.queries, &report.results));
        }
        Commands::Init { files, queries, max_responses, name, config, requests } => {
            init(&InitOptions { files, queries, max_responses, name, config, requests })?;
        }
        Commands::Query { config, threads, queries } => {
            let engine = build_engine(&config, threads)?;
            let limit = engine.config.config.max_responses;
            let server = SearchServer::new(Arc::clone(&engine.index), limit);
            let results = server.search(&queries);
            let answers = searchcore::persist::build_answers(&queries, &results);
            println!("{}", serde_json::to_string_pretty(&answers)?);
        }
    }
    Ok(())
}
