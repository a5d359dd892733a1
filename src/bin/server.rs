//! Card verification REST service.
//!
//! Loads the TOML config and the issuer ruleset at startup, then serves
//! the validator behind a single endpoint.
//!
//! # Usage
//!
//! ```bash
//! # Start with the defaults from config.toml
//! pancheck-server
//!
//! # Override individual settings
//! pancheck-server --port 9090 --card-path rules/card_types.json
//! ```
//!
//! # API
//!
//! ```text
//! POST /card/api/verify   {"number": "4111111111111111"}
//! GET  /health
//! ```
//!
//! Non-POST methods on the verify route receive 405 Method Not Allowed.

use axum::{
    extract::State,
    http::{header, Method},
    response::Json,
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use pancheck::{Config, Ruleset, Validator};

#[derive(Parser)]
#[command(name = "pancheck-server", version, about = "Card issuer detection and Luhn validation API")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Listen port, overrides the config file
    #[arg(long)]
    port: Option<u16>,

    /// Access log location, overrides the config file
    #[arg(long)]
    access_log: Option<String>,

    /// Error log location, overrides the config file
    #[arg(long)]
    error_log: Option<String>,

    /// Location of the card types json file, overrides the config file
    #[arg(long)]
    card_path: Option<String>,
}

#[derive(Deserialize)]
struct VerifyRequest {
    number: String,
}

#[derive(Serialize)]
struct VerifyResponse {
    valid: bool,
    issuer: String,
    error: ErrorBody,
    pattern_match: usize,
    length_match: usize,
}

#[derive(Serialize)]
struct ErrorBody {
    code: u8,
    message: &'static str,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn verify(
    State(validator): State<Validator>,
    Json(req): Json<VerifyRequest>,
) -> Json<VerifyResponse> {
    let verdict = validator.validate(&req.number);
    Json(VerifyResponse {
        valid: verdict.valid,
        error: ErrorBody {
            code: verdict.code.code(),
            message: verdict.code.message(),
        },
        pattern_match: verdict.pattern_match,
        length_match: verdict.length_match,
        issuer: verdict.issuer,
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn log_writer(path: &str) -> io::Result<Option<Arc<File>>> {
    if path.is_empty() {
        return Ok(None);
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(Some(Arc::new(file)))
}

/// Access log to stdout or the configured file; a second WARN-and-up
/// layer feeds the error log when one is configured.
fn init_tracing(config: &Config) -> io::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());

    let access = match log_writer(&config.http.access_log_path)? {
        Some(writer) => tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer)
            .boxed(),
        None => tracing_subscriber::fmt::layer().boxed(),
    };

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> =
        vec![access.with_filter(env_filter).boxed()];

    if let Some(writer) = log_writer(&config.http.error_log_path)? {
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(LevelFilter::WARN)
                .boxed(),
        );
    }

    tracing_subscriber::registry().with(layers).init();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match Config::from_path(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load config {}: {}", cli.config.display(), e);
            std::process::exit(1);
        }
    };

    // cmd flags win over the config file
    if let Some(port) = cli.port {
        config.http.port = port;
    }
    if let Some(path) = cli.access_log {
        config.http.access_log_path = path;
    }
    if let Some(path) = cli.error_log {
        config.http.error_log_path = path;
    }
    if let Some(path) = cli.card_path {
        config.http.card_types_path = path;
    }

    if let Err(e) = init_tracing(&config) {
        eprintln!("failed to open log file: {}", e);
        std::process::exit(1);
    }

    let ruleset = match Ruleset::from_path(&config.http.card_types_path) {
        Ok(ruleset) => Arc::new(ruleset),
        Err(e) => {
            tracing::error!(
                path = %config.http.card_types_path,
                "failed to load card types: {}",
                e
            );
            std::process::exit(1);
        }
    };
    tracing::info!(rules = ruleset.len(), "card types loaded");

    let validator = Validator::new(ruleset);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(Any);

    let app = Router::new()
        .route("/card/api/verify", post(verify))
        .route("/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(validator);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http.port));
    tracing::info!("starting http listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("http listening stopped");
}
