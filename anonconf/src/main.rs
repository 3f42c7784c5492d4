//! Anonimatron configuration generator.
//!
//! Connects to a PostgreSQL database, reads its schema read-only and writes
//! an Anonimatron XML configuration to stdout or to `--output`. Nothing is
//! written unless the whole configuration rendered successfully.

mod settings;

use anonconf_core::render::load_template_body;
use anonconf_core::{
    AnonConfError, ConfigVariables, PostgresAdapter, check_template, collect_tables, init_logging,
};
use clap::Parser;
use settings::{Cli, Settings};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli)?;

    init_logging(settings.debug, settings.verbose)?;
    debug!("Settings: {}", settings.to_log_string());

    if let Err(e) = generate(&settings).await {
        error!("Configuration generation failed: {e}");
        return Err(e);
    }
    Ok(())
}

async fn generate(settings: &Settings) -> anyhow::Result<()> {
    let policy = settings.classification_policy()?;
    let template_body = load_template_body(settings.template.as_deref())?;
    let connection = settings.connection_config();

    info!("Connecting to {}", connection);
    let adapter = PostgresAdapter::connect(connection).await?;
    let collected = collect_tables(&adapter, &settings.target(), &policy).await;
    adapter.close().await;
    let tables = collected?;
    info!("Collected {} tables to anonymize", tables.len());

    let variables =
        ConfigVariables::new(adapter.connection_config(), tables).into_template_variables();
    let xml = check_template(&template_body, &variables)?.render(&variables)?;

    match &settings.output {
        Some(path) => save_config(&xml, path).await?,
        None => print_config(&xml).await?,
    }
    Ok(())
}

/// Writes the configuration to `path`, replacing any existing file.
async fn save_config(xml: &str, path: &Path) -> anonconf_core::Result<()> {
    tokio::fs::write(path, xml)
        .await
        .map_err(|e| AnonConfError::io(format!("Failed to write to {}", path.display()), e))?;
    info!("Configuration saved to {}", path.display());
    Ok(())
}

async fn print_config(xml: &str) -> anonconf_core::Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(xml.as_bytes())
        .await
        .map_err(|e| AnonConfError::io("Failed to write to stdout", e))?;
    stdout
        .flush()
        .await
        .map_err(|e| AnonConfError::io("Failed to flush stdout", e))
}
