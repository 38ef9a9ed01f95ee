//! Listing Price Classifier - Main Entry Point
//!
//! Loads the inference artifacts once, then either serves the prediction page
//! or renders a single prediction to stdout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use listing_price_classifier::{
    config::{AppConfig, DEFAULT_CONFIG_PATH},
    metrics::{MetricsReporter, PredictionMetrics},
    models::inference::InferenceEngine,
    render::render_text,
    server::{create_router, AppState},
    types::listing::{
        ListingFeatures, DEFAULT_MINIMUM_NIGHTS, DEFAULT_NUMBER_OF_REVIEWS,
        DEFAULT_REVIEWS_PER_MONTH,
    },
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "listing-price-classifier", version, about = "Predict listing price categories")]
struct Cli {
    /// Configuration file
    #[arg(long, short, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the prediction page (default)
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Render one prediction to stdout
    Predict {
        #[arg(long, default_value_t = DEFAULT_MINIMUM_NIGHTS)]
        minimum_nights: u32,
        #[arg(long, default_value_t = DEFAULT_NUMBER_OF_REVIEWS)]
        number_of_reviews: u32,
        #[arg(long, default_value_t = DEFAULT_REVIEWS_PER_MONTH)]
        reviews_per_month: f64,
        /// Include per-model probabilities
        #[arg(long)]
        probabilities: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_from_path(&cli.config)?;
    init_logging(&config)?;
    info!(path = %cli.config, "Configuration loaded");

    // Artifacts are loaded once and shared by every pass
    let engine = Arc::new(
        InferenceEngine::new(&config).context("Failed to load inference artifacts")?,
    );
    info!(
        features = ?engine.transformer().feature_names(),
        "Inference engine initialized with {} models: {:?}",
        engine.model_count(),
        engine.model_names()
    );

    match cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config, engine).await
        }
        Command::Predict {
            minimum_nights,
            number_of_reviews,
            reviews_per_month,
            probabilities,
            json,
        } => {
            let features = ListingFeatures::new(minimum_nights, number_of_reviews, reviews_per_month);
            let report = engine.run_pass(&features, probabilities)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_text(&report));
            }
            Ok(())
        }
    }
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(
        format!("listing_price_classifier={}", config.logging.level)
            .parse()
            .context("Invalid logging level")?,
    );

    if config.logging.format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

async fn serve(config: AppConfig, engine: Arc<InferenceEngine>) -> Result<()> {
    let metrics = Arc::new(PredictionMetrics::new());

    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(metrics.clone(), config.metrics.report_interval_secs);
        tokio::spawn(reporter.start());
    }

    let app = create_router(AppState::new(engine, metrics.clone()));

    let address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!(address = %address, "Serving prediction page");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down...");
    metrics.print_summary();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
