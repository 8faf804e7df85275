use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ticketcard_core::{
    load_config, validate_config, CardQueue, Clock, CsvDataset, Dataset, DocumentStore,
    FsDocumentStore, PropertyStore, RunnerConfig, SqliteStateStore, SystemClock, TicketRunner,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    if let Err(e) = run() {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Logs go to stderr; stdout carries the run report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("ticketcard {}", VERSION);

    let config_path = std::env::var("TICKETCARD_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;
    let runner_config = RunnerConfig::from_config(&config).context("Invalid ticketing settings")?;

    info!("Configuration loaded successfully");
    info!("Dataset path: {:?}", config.dataset.path);
    info!("State path: {:?}", config.state.path);
    info!("Timezone: {}", config.clock.timezone);

    let dataset: Arc<dyn Dataset> = Arc::new(
        CsvDataset::open(&config.dataset.path)
            .with_context(|| format!("Failed to open dataset {:?}", config.dataset.path))?,
    );

    let state = Arc::new(
        SqliteStateStore::new(&config.state.path).context("Failed to open state store")?,
    );
    let properties: Arc<dyn PropertyStore> = state.clone();
    let queue: Arc<dyn CardQueue> = state;
    info!("State store initialized");

    let documents: Arc<dyn DocumentStore> =
        Arc::new(FsDocumentStore::new(config.documents.root.clone()));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let generate_cards = runner_config.generate_cards;
    let runner = TicketRunner::new(runner_config, dataset, properties, queue, documents, clock);

    if generate_cards {
        runner
            .validate()
            .context("Card template or destination folder is not reachable")?;
    }

    let report = runner.run().context("Ticket run failed")?;

    let json = serde_json::to_string_pretty(&report).context("Failed to encode run report")?;
    println!("{}", json);

    Ok(())
}
