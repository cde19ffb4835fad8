use axum::{http::HeaderValue, routing::get};
use clap::Parser;
use common::config::{BackendConfig, Config};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::future::ready;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api::{AppState, router};
use crate::model::GenericError;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to config file
    #[arg(short, long, default_value = "target/debug/config/total_config.yaml")]
    pub config: String,
}

/// Parses arguments, loads `.env` and the composed config, then applies environment overrides.
pub fn initialize_executable() -> Result<Config, GenericError> {
    let args = Args::parse();
    if let Err(e) = dotenvy::dotenv() {
        println!("No .env file loaded: {}", e);
    }

    println!("Loading config from: {}", args.config);
    let mut config = Config::load(&args.config)?;
    config.apply_env_overrides();
    Ok(config)
}

pub fn initialize_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_err() {
        eprintln!("Tracing subscriber already installed");
    }
}

fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer, GenericError> {
    let origin = if allowed_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let origins = allowed_origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(origins)
    };
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

pub async fn run_backend(config: BackendConfig, state: AppState) -> Result<(), GenericError> {
    let metrics = PrometheusBuilder::new().install_recorder()?;

    let app = router(state)
        .route("/metrics", get(move || ready(metrics.render())))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.allowed_origins)?);

    tracing::info!("Starting storefront backend at {}", config.server_address);
    let listener = tokio::net::TcpListener::bind(&config.server_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
