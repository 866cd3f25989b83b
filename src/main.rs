mod filter;
mod models;
mod parser;
mod pipeline;
mod render;
mod report;
mod search;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};

use models::{ProductRecord, Thresholds};
use pipeline::ExtractOptions;
use render::{HttpSession, RenderSession, SnapshotSession, SpiderSession};

#[derive(Parser)]
#[command(
    name = "naver_shop",
    about = "Naver Shopping search extractor with rating/review filters"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search, filter and list products sorted by price
    Search {
        /// Search keyword
        keyword: String,
        /// Result pages to fetch (keep low to avoid being blocked)
        #[arg(
            short = 'n',
            long,
            default_value = "2",
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        max_pages: u32,
        /// How pages are rendered
        #[arg(short, long, value_enum, default_value = "spider")]
        renderer: RendererKind,
        /// Wait after each page load, in milliseconds
        #[arg(long, default_value = "1000")]
        settle_ms: u64,
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Run the parser and filters over saved rendered pages
    Parse {
        /// Rendered HTML files, one per results page
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Keyword shown in the report header
        #[arg(short, long, default_value = "snapshot")]
        keyword: String,
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print the results URL for a keyword
    Url {
        keyword: String,
        #[arg(
            short,
            long,
            default_value = "1",
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        page: u32,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Minimum rating (inclusive)
    #[arg(long, default_value = "4.9")]
    min_rating: f64,
    /// Minimum review count (inclusive)
    #[arg(long, default_value = "100")]
    min_reviews: u64,
}

impl FilterArgs {
    fn thresholds(&self) -> Thresholds {
        Thresholds {
            min_rating: self.min_rating,
            min_reviews: self.min_reviews,
        }
    }
}

#[derive(Args)]
struct OutputArgs {
    /// Emit JSON instead of the text report
    #[arg(long)]
    json: bool,
    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum RendererKind {
    /// Headless Chrome via spider.cloud (needs SPIDER_API_KEY)
    Spider,
    /// Plain HTTP GET, no script execution
    Http,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = execute(cli.command).await;

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

async fn execute(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Search {
            keyword,
            max_pages,
            renderer,
            settle_ms,
            filters,
            output,
        } => {
            let keyword = keyword.trim().to_string();
            anyhow::ensure!(!keyword.is_empty(), "keyword must not be empty");

            let opts = ExtractOptions {
                thresholds: filters.thresholds(),
                max_pages,
                settle: Duration::from_millis(settle_ms),
            };
            let records = match renderer {
                RendererKind::Spider => run(SpiderSession::open()?, &keyword, &opts).await?,
                RendererKind::Http => run(HttpSession::open()?, &keyword, &opts).await?,
            };
            emit(&keyword, &opts, records, &output)
        }
        Commands::Parse {
            files,
            keyword,
            filters,
            output,
        } => {
            let opts = ExtractOptions {
                thresholds: filters.thresholds(),
                max_pages: u32::try_from(files.len()).context("too many snapshot files")?,
                settle: Duration::ZERO,
            };
            let records = run(SnapshotSession::new(files), &keyword, &opts).await?;
            emit(&keyword, &opts, records, &output)
        }
        Commands::Url { keyword, page } => {
            println!("{}", search::page_url(&keyword, page));
            Ok(())
        }
    }
}

async fn run<S: RenderSession>(
    session: S,
    keyword: &str,
    opts: &ExtractOptions,
) -> anyhow::Result<Vec<ProductRecord>> {
    tracing::info!(
        "Searching '{}' ({} pages, rating >= {}, reviews >= {})",
        keyword,
        opts.max_pages,
        opts.thresholds.min_rating,
        opts.thresholds.min_reviews
    );
    pipeline::extract(session, keyword, opts).await
}

fn emit(
    keyword: &str,
    opts: &ExtractOptions,
    mut records: Vec<ProductRecord>,
    output: &OutputArgs,
) -> anyhow::Result<()> {
    report::sort_by_price(&mut records);

    let rendered = if output.json {
        report::render_json(keyword, &opts.thresholds, opts.max_pages, &records)? + "\n"
    } else {
        report::render_text(keyword, &records)
    };

    match &output.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {} products to {}", records.len(), path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
