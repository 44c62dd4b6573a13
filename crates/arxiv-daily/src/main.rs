//! arXiv daily CLI - search, record, render and digest new papers.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use arxiv_daily::config::Config;
use arxiv_daily::digest::DigestSender;
use arxiv_daily::pipeline::Pipeline;

/// arXiv daily - track new papers per topic and push a daily digest.
#[derive(Parser)]
#[command(name = "arxiv-daily")]
#[command(about = "Daily arXiv paper tracker")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search, merge, render and send the digest (for cron use)
    Run,

    /// Re-render the documents from the stored record
    Render,

    /// Send only the digest for the stored record
    Digest {
        /// Run date (YYYY-MM-DD); the digest covers the day before
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Send a test message through the configured channel
    TestNotify,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("arxiv_daily=debug,notify=debug,info")
        } else {
            EnvFilter::new("arxiv_daily=info,notify=info,warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    let today = chrono::Local::now().date_naive();

    match cli.command {
        Commands::Run => run_daily(&config, today).await,
        Commands::Render => run_render(&config, today),
        Commands::Digest { date } => run_digest(&config, date.unwrap_or(today)).await,
        Commands::TestNotify => run_test_notify(&config).await,
    }
}

async fn run_daily(config: &Config, today: NaiveDate) -> Result<()> {
    let summary = Pipeline::new(config).run(today).await?;

    println!("\n📊 Daily Run Summary");
    println!("   Topics searched: {}", summary.topics_searched);
    println!("   Fetched: {}", summary.fetched);
    println!("   Stored: {}", summary.stored);
    for path in &summary.documents {
        println!("   Wrote: {}", path.display());
    }
    println!("   Digest: {}", summary.digest);

    if !summary.errors.is_empty() {
        println!("   Errors: {}", summary.errors.len());
        for err in &summary.errors {
            eprintln!("     - {err}");
        }
    }

    Ok(())
}

fn run_render(config: &Config, today: NaiveDate) -> Result<()> {
    let written = Pipeline::new(config).render_only(today)?;
    for path in &written {
        println!("✅ Wrote {}", path.display());
    }
    Ok(())
}

async fn run_digest(config: &Config, run_date: NaiveDate) -> Result<()> {
    tracing::info!(%run_date, "Running digest only");
    let outcome = Pipeline::new(config).digest_only(run_date).await;
    println!("📨 Digest: {outcome}");
    Ok(())
}

async fn run_test_notify(config: &Config) -> Result<()> {
    let sender = DigestSender::from_config(&config.notify, config.digest.clone())
        .context("Notification channel is not usable")?;

    match sender.send_test().await {
        Ok(()) => println!("✅ Test message sent"),
        Err(e) => {
            eprintln!("❌ Test message failed: {e}");
            return Err(e.into());
        }
    }
    Ok(())
}
