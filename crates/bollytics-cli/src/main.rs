mod report;

use std::path::PathBuf;
use std::sync::Arc;

use bollytics_analytics::Reports;
use bollytics_core::{AppConfig, Category, RankCategory, Sources, Window};
use bollytics_ingest::{run_ingestion_cycle, run_trend_export, IngestSettings};
use bollytics_reddit::{ClientSettings, RedditClient};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "bollytics-cli")]
#[command(about = "Bollytics operator command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Run one ingestion cycle now
    Ingest,
    /// Write the trending-word export for every source
    Trends {
        /// Output directory (defaults to `BOLLYTICS_TREND_EXPORT_DIR`)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Words per source (defaults to `BOLLYTICS_TREND_LIMIT`)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print a report for one source
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    Ping,
    Migrate,
}

#[derive(Debug, Subcommand)]
enum ReportCommands {
    /// Leaderboard of posts
    TopPosts {
        #[arg(long)]
        source: String,
        /// top, controversial, `top_and_controversial` or hated
        #[arg(long, default_value = "top")]
        category: RankCategory,
        /// week, month, 6months or year
        #[arg(long, default_value = "month")]
        interval: Window,
    },
    /// Most active authors
    TopUsers {
        #[arg(long)]
        source: String,
        #[arg(long, default_value = "top")]
        category: Category,
        #[arg(long, default_value = "month")]
        interval: Window,
    },
    /// Posts per weekday and hour (UTC)
    Frequency {
        #[arg(long)]
        source: String,
        #[arg(long, default_value = "month")]
        interval: Window,
    },
    /// Most frequent words
    Trending {
        #[arg(long)]
        source: String,
        #[arg(long, default_value = "month")]
        interval: Window,
        #[arg(long, default_value = "25")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("bollytics-cli: pass --help for available commands");
        return Ok(());
    };

    let config = bollytics_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = bollytics_db::PoolConfig::from_app_config(&config);
    let pool = bollytics_db::connect_pool(&config.database_url, pool_config).await?;
    tracing::debug!(command = ?command, "database pool ready");

    match command {
        Commands::Db { command } => run_db(&pool, command).await,
        Commands::Ingest => run_ingest(&pool, &config).await,
        Commands::Trends { dir, limit } => {
            let reports = reports(pool, &config)?;
            let dir = dir.unwrap_or_else(|| config.trend_export_dir.clone());
            let summary =
                run_trend_export(&reports, &dir, limit.unwrap_or(config.trend_limit)).await?;
            for path in &summary.written {
                println!("wrote {}", path.display());
            }
            for (source, error) in &summary.failures {
                eprintln!("failed {source}: {error}");
            }
            if !summary.is_complete() {
                anyhow::bail!("{} source(s) failed to export", summary.failures.len());
            }
            Ok(())
        }
        Commands::Report { command } => report::run(&reports(pool, &config)?, command).await,
    }
}

async fn run_db(pool: &sqlx::PgPool, command: DbCommands) -> anyhow::Result<()> {
    match command {
        DbCommands::Ping => {
            bollytics_db::ping(pool).await?;
            println!("database reachable");
        }
        DbCommands::Migrate => {
            let applied = bollytics_db::run_migrations(pool).await?;
            println!("applied {applied} migration(s)");
        }
    }
    Ok(())
}

async fn run_ingest(pool: &sqlx::PgPool, config: &AppConfig) -> anyhow::Result<()> {
    let credentials = config.reddit.clone().ok_or_else(|| {
        anyhow::anyhow!("REDDIT_CLIENT_ID / REDDIT_CLIENT_SECRET / REDDIT_USER_AGENT must be set")
    })?;
    let sources = bollytics_core::load_sources(&config.sources_path)?;
    let client = RedditClient::new(credentials, ClientSettings::from_app_config(config))?;

    let summary = run_ingestion_cycle(
        pool,
        &client,
        &sources,
        &IngestSettings::from_app_config(config),
    )
    .await?;

    println!(
        "fetched {} / inserted {} / updated {} / unchanged {} / pruned {}",
        summary.fetched, summary.inserted, summary.updated, summary.unchanged, summary.pruned
    );
    Ok(())
}

fn reports(pool: sqlx::PgPool, config: &AppConfig) -> anyhow::Result<Reports> {
    let sources: Sources = bollytics_core::load_sources(&config.sources_path)?;
    Ok(Reports::from_app_config(pool, Arc::new(sources), config))
}
