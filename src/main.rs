use std::net::SocketAddr;
use std::sync::Arc;

use aegis::config::AppConfig;
use aegis::services::openai::OpenAiCompatibleProvider;
use aegis::services::retry::{RetryPolicy, RetryingProvider};
use aegis::services::store::PgVulnerabilityStore;
use aegis::{db, routes, AppState};
use anyhow::Context;
use mimalloc::MiMalloc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// M-MIMALLOC-APP: Use mimalloc as global allocator for improved performance.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aegis=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    let pool = db::create_pool(
        &config.database_url,
        config.database_password.as_deref(),
        config.database_max_connections,
    )
    .await
    .context("Failed to connect to database")?;
    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    let provider =
        OpenAiCompatibleProvider::new(&config.llm).context("Failed to create LLM client")?;
    let llm = RetryingProvider::new(Arc::new(provider), RetryPolicy::from_config(&config.llm));

    let host: std::net::IpAddr = config
        .host
        .parse()
        .with_context(|| format!("Invalid BACKEND_HOST {:?}", config.host))?;
    let addr = SocketAddr::new(host, config.port);

    tracing::info!(
        host = %addr,
        model = %config.llm.model,
        duplicate_policy = ?config.duplicate_policy,
        "Starting Aegis API server"
    );

    let state = AppState {
        store: Arc::new(PgVulnerabilityStore::new(pool)),
        llm: Arc::new(llm),
        config,
    };
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
