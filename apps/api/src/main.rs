mod abuse;
mod address;
mod config;
mod delivery;
mod errors;
mod layout;
mod locale;
mod models;
mod packaging;
mod personalization;
mod recipients;
mod routes;
mod state;
mod submission;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::abuse::{AbuseGuard, CounterStore, InMemoryCounterStore, RedisCounterStore};
use crate::config::Config;
use crate::delivery::BrevoClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::submission::SubmissionService;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting letterqueue v{}", env!("CARGO_PKG_VERSION"));

    // Counter store: Redis when configured, otherwise process memory
    let store = build_store(&config).await;

    // Delivery channel
    let brevo = BrevoClient::new(config.brevo_api_key.clone(), config.brevo_api_url.clone())?;
    info!("Brevo client initialized");

    let settings = config.submission_settings();
    info!(
        "Letters in locale {:?}, copy policy {:?}, limits {:?}",
        config.locale, settings.copy_policy, config.limits
    );

    let guard = AbuseGuard::new(Arc::clone(&store), config.limits.clone());
    let submissions = SubmissionService::new(store, guard, Arc::new(brevo), settings);

    // Build app state
    let state = AppState { submissions };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// An unreachable Redis does not stop the service; abuse control and
/// statistics then work per process.
async fn build_store(config: &Config) -> Arc<dyn CounterStore> {
    match config.redis_url.as_deref() {
        Some(url) => match RedisCounterStore::connect(url).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                warn!(error = %e, "Redis unavailable, falling back to in-memory counters");
                Arc::new(InMemoryCounterStore::new())
            }
        },
        None => {
            info!("REDIS_URL not set, using in-memory counters");
            Arc::new(InMemoryCounterStore::new())
        }
    }
}
