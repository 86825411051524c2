mod aggregate;
mod config;
mod feed;
mod fetch;
mod report;
mod server;
mod state;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::aggregate::aggregate;
use crate::fetch::FeedClient;

#[derive(Parser)]
#[command(
    name = "newswall",
    version,
    about = "Fetch RSS/Atom feeds and serve them as a report or a signage display"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch feeds once and print the aggregated headlines
    Fetch(FetchArgs),
    /// Run the auto-refreshing signage server
    Signage(SignageArgs),
}

#[derive(Args)]
struct FetchArgs {
    /// RSS or Atom feed URLs
    #[arg(required = true)]
    urls: Vec<String>,
    /// Max number of entries to output
    #[arg(long, default_value_t = 10)]
    limit: usize,
    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 15)]
    timeout: u64,
    /// Filter entries by keyword (case-insensitive)
    #[arg(long)]
    keyword: Option<String>,
    /// Print output as JSON
    #[arg(long)]
    json: bool,
    /// Disable TLS certificate verification
    #[arg(long)]
    insecure: bool,
}

#[derive(Args)]
struct SignageArgs {
    /// RSS or Atom feed URLs (overrides the feeds file)
    urls: Vec<String>,
    /// Path to a feed list file (one URL per line, `#` for comments)
    #[arg(long, default_value = "feeds.txt")]
    feeds_file: PathBuf,
    /// Bind address
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,
    /// HTTP port
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Max number of entries to keep per refresh
    #[arg(long, default_value_t = 240)]
    limit: usize,
    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 15)]
    timeout: u64,
    /// Filter entries by keyword (case-insensitive)
    #[arg(long)]
    keyword: Option<String>,
    /// Refresh interval in seconds
    #[arg(long, default_value_t = 300)]
    refresh_seconds: u64,
    /// Disable TLS certificate verification
    #[arg(long)]
    insecure: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newswall=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Fetch(args) => run_fetch(args).await,
        Command::Signage(args) => run_signage(args).await,
    }
}

async fn run_fetch(args: FetchArgs) -> anyhow::Result<()> {
    let limit = config::ensure_positive("limit", args.limit)?;
    let timeout = config::ensure_positive("timeout", args.timeout)?;
    config::validate_urls(&args.urls)?;

    let client = FeedClient::new(Duration::from_secs(timeout), args.insecure)?;
    let outcomes = client.fetch_all(&args.urls).await;
    let snapshot = aggregate(outcomes, args.keyword.as_deref(), limit);

    for message in &snapshot.errors {
        eprintln!("[WARN] {message}");
    }
    if snapshot.items.is_empty() {
        eprintln!("No feed entries found.");
        return Ok(());
    }

    if args.json {
        println!("{}", report::render_json(&snapshot.items)?);
    } else {
        print!("{}", report::render_plain(&snapshot.items));
    }
    Ok(())
}

async fn run_signage(args: SignageArgs) -> anyhow::Result<()> {
    let limit = config::ensure_positive("limit", args.limit)?;
    let timeout = config::ensure_positive("timeout", args.timeout)?;
    let refresh = config::ensure_positive("refresh-seconds", args.refresh_seconds)?;
    let urls = config::resolve_feeds(&args.urls, &args.feeds_file)?;

    server::run(server::SignageSettings {
        urls,
        bind: args.bind,
        port: args.port,
        limit,
        timeout: Duration::from_secs(timeout),
        keyword: args.keyword,
        refresh: Duration::from_secs(refresh),
        insecure: args.insecure,
    })
    .await
}
