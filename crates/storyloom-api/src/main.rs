//! Storyloom API server entry point.

use std::error::Error;
use std::sync::Arc;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use sqlx::postgres::PgPoolOptions;
use storyloom_api::config::{self, Config};
use storyloom_api::error::AppError;
use storyloom_api::state::AppState;
use storyloom_core::clock::{Clock, SystemClock};
use storyloom_core::rng::SystemRng;
use storyloom_store::pg_repository::ensure_schema;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // RUST_LOG and the OTLP endpoint may come from the file.
    let env_file = config::load_env_file();
    let tracer_provider = init_tracing()?;

    match env_file? {
        Some(path) => tracing::info!(path = %path.display(), "loaded .env file"),
        None => tracing::info!("no .env file found, using process environment"),
    }

    tracing::info!("Starting Storyloom API server");

    let result = run(Config::from_env()?).await;

    if let Some(provider) = tracer_provider {
        if let Err(err) = provider.shutdown() {
            tracing::warn!(error = %err, "tracer provider shutdown failed");
        }
    }

    Ok(result?)
}

/// Installs JSON logging filtered by `RUST_LOG`, plus an OTLP span exporter
/// when `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
fn init_tracing() -> Result<Option<SdkTracerProvider>, Box<dyn Error>> {
    let provider = if std::env::var_os("OTEL_EXPORTER_OTLP_ENDPOINT").is_some() {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .build()?;
        Some(
            SdkTracerProvider::builder()
                .with_batch_exporter(exporter)
                .build(),
        )
    } else {
        None
    };

    let otel_layer = provider
        .as_ref()
        .map(|provider| tracing_opentelemetry::layer().with_tracer(provider.tracer("storyloom-api")));

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().json())
        .with(otel_layer)
        .init();

    Ok(provider)
}

async fn run(config: Config) -> Result<(), AppError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let rng = Box::new(SystemRng::new());

    // Build application state.
    let app_state = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(database_url)
                .await?;
            ensure_schema(&pool).await?;
            tracing::info!(max_connections = config.max_connections, "using PostgreSQL store");
            AppState::postgres(&pool, clock, rng)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store");
            AppState::in_memory(clock, rng)
        }
    };

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = storyloom_api::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
