//! Face Attribute Batch Service
//!
//! Classifies a fixed batch of face images with an OpenVINO attribute model
//! and serves dominant-attribute results and statistics over REST (Axum).

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use facetally::api::rest::{create_rest_router, AppState};
use facetally::cli::Cli;
use facetally::config::Config;
use facetally::engine::{AttributeClassifier, AttributeSchema, DirectoryImageSource, OpenVinoAdapter};
use facetally::service::{BatchRunner, BatchService};
use facetally::utils::image::prepare_image_folder;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    info!("Starting Face Attribute Batch Service v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        info!("Using default config ({})", e);
        Config::default()
    });

    info!("Configuration loaded:");
    info!("  REST port: {}", config.server.rest_port);
    info!("  Device: {}", config.inference.device);
    info!("  Input size: {}", config.inference.input_size);
    info!("  Images: {} from {:?}", config.batch.image_count, config.batch.images_dir);

    if cli.prepare {
        let renamed = prepare_image_folder(&config.batch.images_dir, config.batch.image_count)?;
        info!("Prepared {} of {} images", renamed, config.batch.image_count);
        return Ok(());
    }

    // Schema errors are fatal, before any image is touched
    let schema = Arc::new(AttributeSchema::load(&config.schema.path)?);

    let adapter = Arc::new(OpenVinoAdapter::load(&config.inference.model_path, &config.inference.device)?);

    let classifier = AttributeClassifier::new(
        adapter,
        schema,
        config.inference.tensor_spec(),
        config.inference.input_name.clone(),
    );
    let source = Arc::new(DirectoryImageSource::new(&config.batch.images_dir));
    let runner = BatchRunner::new(classifier, source).with_timeout(config.inference.image_timeout());

    let service = Arc::new(BatchService::new(runner, config.batch.locators()));

    if config.batch.run_on_startup {
        let service = service.clone();
        tokio::spawn(async move {
            let result = service.run_batch().await;
            for entry in result.statistics.entries.iter() {
                info!("  {:<24} {:>3} ({}%)", entry.key, entry.count, entry.percentage);
            }
        });
    }

    let app_state = Arc::new(AppState {
        service: service.clone(),
        start_time: Instant::now(),
    });
    let rest_router = create_rest_router(app_state);

    let addr = format!("0.0.0.0:{}", config.server.rest_port);
    let listener = TcpListener::bind(&addr).await?;
    info!("REST API listening on http://{}", addr);

    axum::serve(listener, rest_router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received, cleaning up...");
        })
        .await?;

    // A running batch stops before its next image
    service.cancel();

    info!("Goodbye!");
    Ok(())
}
