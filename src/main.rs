//! CLI entry point: crawl a keyword's promotional events into a result
//! table, print a preview, and optionally export JSON for downstream
//! reporting.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use promocrawl::utils::DEFAULT_MAX_ITEMS;
use promocrawl::{CrawlConfig, CrawlOrchestrator, CredentialSet, LogProgress, ResultTable};

#[derive(Parser, Debug)]
#[command(
    name = "promocrawl",
    version,
    about = "Crawl promotional-event listings into a result table"
)]
struct Args {
    /// Search keyword
    keyword: String,

    /// Maximum number of listing items to process
    #[arg(long, default_value_t = DEFAULT_MAX_ITEMS)]
    max_items: usize,

    /// Worker pool size; 1 runs sequentially
    #[arg(long, default_value_t = 1)]
    workers: usize,

    /// Run the browser with a visible window
    #[arg(long)]
    headed: bool,

    /// Site root override (e.g. a staging mirror)
    #[arg(long, env = "PROMOCRAWL_BASE_URL")]
    base_url: Option<String>,

    /// Write the result table as JSON to this path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut builder = CrawlConfig::builder(args.keyword.as_str())
        .max_items(args.max_items)
        .workers(args.workers)
        .headless(!args.headed);
    if let Some(base_url) = &args.base_url {
        builder = builder.base_url(base_url.as_str());
    }
    let config = builder.build()?;

    let credentials = CredentialSet::from_env();

    let orchestrator = CrawlOrchestrator::new(config, credentials);
    let table = match orchestrator.run(&LogProgress).await {
        Ok(table) => table,
        Err(e) => {
            eprintln!("crawl failed: {e}");
            std::process::exit(1);
        }
    };

    if table.is_empty() {
        println!("no usable results");
    } else {
        println!("collected {} option rows", table.len());
        print_preview(&table);
    }

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(table.rows())?;
        std::fs::write(path, json)?;
        println!("wrote {}", path.display());
    }

    Ok(())
}

fn print_preview(table: &ResultTable) {
    const PREVIEW_ROWS: usize = 10;
    for row in table.rows().iter().take(PREVIEW_ROWS) {
        println!(
            "{} | {} | {} | {} | {}",
            row.provider_name, row.location, row.event_title, row.option_name, row.option_price
        );
    }
    if table.len() > PREVIEW_ROWS {
        println!("... and {} more rows", table.len() - PREVIEW_ROWS);
    }
}
