use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use news_digest::config::{Config, Credentials, DigestConfig, RunMode};
use news_digest::digest::Digest;
use news_digest::mailer::Mailer;
use news_digest::pipeline::Pipeline;
use news_digest::routes::{self, AppState};
use news_digest::session::SessionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "news_digest=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!("Ignoring unreadable .env file: {}", e);
        }
    }

    // Load configuration
    let config_path =
        std::env::var("NEWS_DIGEST_CONFIG").unwrap_or_else(|_| "feeds.toml".to_string());
    let config = Config::load(&config_path)?;
    info!(
        "Loaded {} feeds and {} social accounts from {}",
        config.sources.feeds().count(),
        config.sources.social_accounts().len(),
        config_path
    );

    let credentials = Credentials::from_env();
    if credentials.newsapi_key.is_none() {
        warn!("NEWSAPI_KEY not set, headline fetching disabled");
    }

    let pipeline = Pipeline::from_config(&config, &credentials)?;
    let mode = RunMode::from_flag(std::env::var("SCHEDULE_RUN").ok().as_deref());

    match mode {
        RunMode::Batch => {
            let mail = credentials.mail()?;
            let mailer = Mailer::new(&config.email, &mail)?;
            run_batch(&pipeline, &config.digest, &mailer).await?;
        }
        RunMode::Interactive => {
            let mailer = match credentials.mail() {
                Ok(mail) => Some(Mailer::new(&config.email, &mail)?),
                Err(e) => {
                    warn!("Email disabled: {}", e);
                    None
                }
            };
            serve(config, pipeline, mailer).await?;
        }
    }

    Ok(())
}

/// One unattended run: fetch, write the digest, email it.
async fn run_batch(
    pipeline: &Pipeline,
    digest_config: &DigestConfig,
    mailer: &Mailer,
) -> anyhow::Result<PathBuf> {
    info!("Running unattended batch");
    let snapshot = pipeline.run().await;
    for warning in &snapshot.warnings {
        warn!("Source skipped: {}", warning);
    }

    let digest = Digest::build(
        &snapshot.buckets,
        Local::now().date_naive(),
        digest_config.items_per_section,
    );
    let path = digest.write_to(&digest_config.output_dir)?;
    mailer
        .send_digest(&path)
        .await
        .context("email digest")?;

    info!("Batch complete");
    Ok(path)
}

async fn serve(config: Config, pipeline: Pipeline, mailer: Option<Mailer>) -> anyhow::Result<()> {
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| config.bind_addr.clone());

    let state = Arc::new(AppState {
        pipeline: Arc::new(pipeline),
        store: SessionStore::new(),
        digest: config.digest,
        mailer,
    });
    let app = routes::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Server starting on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
