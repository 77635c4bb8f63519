//! rustpubmed - PubMed company-affiliation scanner
//!
//! Finds PubMed papers with at least one author affiliated with a
//! pharmaceutical or biotech company.
//!
//! ## Usage
//!
//! ```bash
//! rustpubmed "COVID-19[Title] AND Nature[Journal]"
//! rustpubmed "COVID-19[Title] AND Nature[Journal]" -f results.csv
//! rustpubmed "COVID-19[Title] AND Nature[Journal]" -d
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use rustpubmed::config::{DEFAULT_BASE_URL, DEFAULT_MAX_RESULTS, DEFAULT_WORKERS};
use rustpubmed::{report, Pipeline, PipelineConfig, PipelineOutcome};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Fetch research papers from PubMed with company-affiliated authors.
#[derive(Parser)]
#[command(name = "rustpubmed")]
#[command(version, about, long_about = None)]
struct Cli {
    /// PubMed search query (prompted for if omitted)
    query: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Output CSV file (default: print to console)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Maximum number of search results to process
    #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
    max_results: usize,

    /// Concurrent detail fetches
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// E-utilities base URL
    #[arg(long, env = "PUBMED_API_BASE", default_value = DEFAULT_BASE_URL)]
    base_url: String,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the report
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(io::stderr)
        .init();

    let query = match cli.query {
        Some(query) => query,
        None => prompt_query().context("Failed to read query from stdin")?,
    };

    let config = PipelineConfig::default()
        .with_base_url(cli.base_url)
        .with_max_results(cli.max_results)
        .with_workers(cli.workers);

    let pipeline = Pipeline::new(config).context("Invalid configuration")?;
    let outcome = pipeline.run(&query).await?;

    match outcome {
        PipelineOutcome::NoPapers => {
            println!("No papers found for the given query.");
        }
        PipelineOutcome::NoRelevantPapers { .. } => {
            println!("No relevant papers found.");
        }
        PipelineOutcome::Papers(records) => match cli.file {
            Some(path) => {
                report::write_csv(&path, &records)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Results saved to {}", path.display());
            }
            None => print!("{}", report::render_console(&records)),
        },
    }

    Ok(())
}

fn prompt_query() -> Result<String> {
    print!("Enter your PubMed query: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
