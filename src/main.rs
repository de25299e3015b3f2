use anyhow::{Context, Result};
use clap::Parser;
use config::Config;
use dal::write_bus_stops;
use dotenvy::dotenv;
use services::data_fetcher::{DataMallClient, get_bus_stops};
use tracing::info;

mod config;
mod dal;
mod model;
mod services;
mod telemetry;
mod utils;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    _ = dotenv();

    let config = Config::parse();

    let telemetry = telemetry::init(&config.log_dir, config.otlp_endpoint.as_deref())?;

    let result = run(config).await;

    telemetry.shutdown();

    result
}

/// Fetches every bus stop, then writes them out. A failed fetch still writes an empty file.
#[tracing::instrument(err, skip(config))]
async fn run(config: Config) -> Result<()> {
    let client = DataMallClient::new(config.datamall()).context("Error creating DataMall client")?;

    let stops = get_bus_stops(&client, config.fetch_options()).await;

    let written = write_bus_stops(&stops, &config.output, config.sql_options())
        .await
        .context("Error exporting bus stops")?;

    info!(
        "exported {} bus stops to {}",
        written,
        config.output.display()
    );

    Ok(())
}
