// src/main.rs
// =============================================================================
// Entry point of site-mirror.
//
// What happens here:
// 1. Parse the command line (config path, --json, -v)
// 2. Set up logging
// 3. Load and validate the config file
// 4. Build the HTTP fetcher and run the crawl
// 5. Print the report and exit (0 = crawl finished, 2 = could not start)
//
// Per-page problems (timeouts, 404s, write errors) never end the crawl; they
// show up in the logs and in the report. Only a crawl that can't start at all
// exits non-zero.
// =============================================================================

mod cli;
mod config;
mod crawl;
mod fetch;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::FmtSubscriber;

use cli::Cli;
use config::MirrorConfig;
use crawl::{CrawlReport, Crawler};
use fetch::HttpFetcher;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so --json output on stdout stays clean
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level())
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install the log subscriber")?;

    let config = MirrorConfig::load(&cli.config)?;
    let seed = config.seed()?;
    let fetcher = HttpFetcher::new(&config, &seed).context("failed to set up the HTTP client")?;
    let crawler = Crawler::new(&config, fetcher)?;

    let report = crawler.run().await;
    print_report(&report, cli.json)
}

fn print_report(report: &CrawlReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("✅ Mirrored {} in {:.2?}", report.seed_url, report.elapsed());
    println!("   📄 Written: {}", report.pages_written);
    println!("   ⏭️  Skipped (404): {}", report.skipped.len());
    println!("   ⚠️  Failed: {}", report.failed.len());
    for url in &report.failed {
        println!("      {}", url);
    }
    Ok(())
}
