//! Seismic Response Predictor
//!
//! Estimates the seismic response of a building (base shear, roof
//! displacement, storey drift) and its IS 1893 compliance from a handful
//! of structural parameters.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    SEISMIC PREDICTOR                         │
//! ├──────────────────────────────────────────────────────────────┤
//! │  POST /api/v1/predict                                        │
//! │        │                                                     │
//! │        ▼                                                     │
//! │  ┌───────────┐  ┌──────────────┐  ┌──────────┐  ┌──────────┐ │
//! │  │  Record   │─▶│  Regressor + │─▶│  Derive  │─▶│ Present  │ │
//! │  │  Builder  │  │  Classifier  │  │ (closed  │  │ (tiles,  │ │
//! │  │           │  │  (ONNX/JSON) │  │  form)   │  │  gauge)  │ │
//! │  └───────────┘  └──────────────┘  └──────────┘  └──────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod logic;
mod models;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use logic::model::ResponsePredictor;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging (JSON lines in production)
    let registry = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "seismic_predictor=debug,tower_http=debug".into()));
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Seismic Response Predictor starting ({})...", config.environment);
    tracing::info!(
        "Schema v{} (hash: {:08x})",
        logic::features::SCHEMA_VERSION,
        logic::features::layout::layout_hash()
    );

    // Load both models; either failing is fatal
    let predictor = ResponsePredictor::load(
        &config.regression_model_path,
        &config.classification_model_path,
    )
    .context("failed to load prediction models")?;

    predictor
        .verify_schema()
        .context("model input schema does not match the feature layout")?;

    tracing::info!("Models loaded, schema verified");

    // Build application state
    let state = AppState {
        predictor: Arc::new(predictor),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = config.socket_addr();
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<ResponsePredictor>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/schema", get(handlers::schema::get))
        .route("/api/v1/models", get(handlers::engine::status))
        .route("/api/v1/predict", post(handlers::predict::predict))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
