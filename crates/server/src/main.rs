//! `prometheus-server` -- generation task service binary.
//!
//! Accepts generation requests, runs them against Gemini in the
//! background, and serves task status to polling clients.
//!
//! # Environment variables
//!
//! | Variable          | Required | Default                  | Description                         |
//! |-------------------|----------|--------------------------|-------------------------------------|
//! | `GOOGLE_API_KEY`  | yes      | --                       | Gemini API key                      |
//! | `HOST`            | no       | `0.0.0.0`                | Bind address                        |
//! | `PORT`            | no       | `8000`                   | Bind port                           |
//! | `CORS_ORIGINS`    | no       | `http://localhost:3000`  | Comma-separated allowed origins     |
//! | `SEED_DATA_PATH`  | no       | `semi_data.json`         | Seed catalog file                   |
//! | `GEMINI_ENDPOINT` | no       | Google's hosted endpoint | `generateContent` URL override      |

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use prometheus_core::seeds::SeedCatalog;
use prometheus_server::config::ServerConfig;
use prometheus_server::generator::GeminiGenerator;
use prometheus_server::registry::TaskRegistry;
use prometheus_server::router::build_app_router;
use prometheus_server::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prometheus_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = config.port, "Loaded server configuration");

    let seeds = match SeedCatalog::load(&config.seed_data_path) {
        Ok(catalog) => {
            tracing::info!(
                count = catalog.len(),
                path = %config.seed_data_path.display(),
                "Seed catalog loaded",
            );
            catalog
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to load seed catalog, using fallback");
            SeedCatalog::fallback()
        }
    };

    let api_key = config
        .gemini_api_key
        .clone()
        .expect("GOOGLE_API_KEY must be set");
    let generator = GeminiGenerator::new(config.gemini_endpoint.clone(), api_key);

    let state = AppState {
        registry: Arc::new(TaskRegistry::new()),
        generator: Arc::new(generator),
        seeds: Arc::new(seeds),
    };

    let app = build_app_router(state, &config);

    let addr = SocketAddr::new(config.host.parse().expect("Invalid HOST"), config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
