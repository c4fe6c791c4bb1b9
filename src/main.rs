mod browser;
mod catalog;
mod details;
mod extract;
mod store;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use tracing::warn;

use browser::{BrowserAgent, Chromium};
use store::CsvStore;

const DEFAULT_LINKS_FILE: &str = "teachingbooks_links.csv";
const DEFAULT_DATA_FILE: &str = "teachingbooks_data.csv";
const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(60);
/// Settle interval after a pagination click.
const PAGE_SETTLE: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "tb_scraper", about = "Two-phase teachingbooks.net catalog scraper")]
struct Cli {
    /// Pre-harvested reference list (CSV with a Link column); omit to
    /// discover the catalog from scratch
    links: Option<PathBuf>,
}

/// File layout for one run, derived from the CLI argument: a supplied
/// reference list names the output table after its own stem.
struct RunPlan {
    links_path: PathBuf,
    data_path: PathBuf,
    discover: bool,
}

impl RunPlan {
    fn from_arg(links: Option<PathBuf>) -> Self {
        match links {
            Some(path) => {
                let stem = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("teachingbooks")
                    .to_string();
                Self {
                    links_path: path,
                    data_path: PathBuf::from(format!("{stem}_data.csv")),
                    discover: false,
                }
            }
            None => Self {
                links_path: PathBuf::from(DEFAULT_LINKS_FILE),
                data_path: PathBuf::from(DEFAULT_DATA_FILE),
                discover: true,
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let plan = RunPlan::from_arg(cli.links);

    banner("Scraping teachingbooks.net ...");
    let mut agent = Chromium::launch(PAGE_LOAD_TIMEOUT).await?;

    let result = run(&mut agent, &plan).await;

    // Release the browser on every exit path, then surface the run outcome.
    if let Err(e) = agent.close().await {
        warn!("browser shutdown: {e}");
    }
    result?;

    let mins = t0.elapsed().as_secs_f64() / 60.0;
    banner(&format!(
        "teachingbooks.net scraping completed successfully! Elapsed time {mins:.2} mins"
    ));
    Ok(())
}

async fn run<B: BrowserAgent>(agent: &mut B, plan: &RunPlan) -> Result<()> {
    if plan.discover {
        let links = catalog::discover_references(agent, PAGE_SETTLE).await?;
        banner("Exporting links to a csv file ...");
        store::write_links(&plan.links_path, &links)?;
    }

    let links = store::read_links(&plan.links_path)?;
    banner(&format!("Scraping info for {} books ...", links.len()));
    let mut table = CsvStore::new(&plan.data_path);
    details::extract_details(agent, &links, &mut table).await?;
    Ok(())
}

fn banner(msg: &str) {
    println!("{}", "-".repeat(75));
    println!("{msg}");
    println!("{}", "-".repeat(75));
}

// ── Tests ──
