mod api;
mod middleware;
mod rate_limit;
mod scheduler;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bollytics_analytics::Reports;
use bollytics_core::{AppConfig, Sources};
use bollytics_ingest::{IngestSettings, Ingestor};
use bollytics_reddit::{ClientSettings, RedditClient};
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};
use crate::rate_limit::KeyedRateLimiter;

const RATE_LIMIT_SWEEP_EVERY: Duration = Duration::from_secs(60);
const RATE_LIMIT_MAX_IDLE: Duration = Duration::from_secs(180);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(bollytics_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = bollytics_db::PoolConfig::from_app_config(&config);
    let pool = bollytics_db::connect_pool(&config.database_url, pool_config).await?;
    bollytics_db::run_migrations(&pool).await?;

    let sources = Arc::new(bollytics_core::load_sources(&config.sources_path)?);
    tracing::info!(sources = sources.len(), env = %config.env, "configuration loaded");

    let reports = Reports::from_app_config(pool.clone(), Arc::clone(&sources), &config);
    let ingestor = build_ingestor(&config, pool.clone(), Arc::clone(&sources))?;
    let _scheduler = scheduler::build_scheduler(ingestor, reports.clone(), &config).await?;

    let limiter = config.rate_limit_enabled.then(|| {
        Arc::new(KeyedRateLimiter::new(
            config.rate_limit_rps,
            config.rate_limit_burst,
        ))
    });
    let _sweeper = limiter.as_ref().map(|limiter| {
        rate_limit::spawn_sweeper(
            Arc::clone(limiter),
            RATE_LIMIT_SWEEP_EVERY,
            RATE_LIMIT_MAX_IDLE,
        )
    });

    let app = build_app(AppState { pool, reports }, limiter);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}

fn build_ingestor(
    config: &AppConfig,
    pool: PgPool,
    sources: Arc<Sources>,
) -> anyhow::Result<Option<Arc<Ingestor<RedditClient>>>> {
    let Some(credentials) = config.reddit.clone() else {
        return Ok(None);
    };
    let client = RedditClient::new(credentials, ClientSettings::from_app_config(config))?;
    Ok(Some(Arc::new(Ingestor::new(
        pool,
        client,
        sources,
        IngestSettings::from_app_config(config),
    ))))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
