pub mod api;
pub mod cli;
pub mod core;
pub mod service;
pub mod sheet;
pub mod store;

use crate::cli::{rates, ui};
use crate::core::config::AppConfig;
use crate::core::snapshot::RatesInput;
use crate::service::RateService;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Record a new snapshot stamped with the current time
    Add(RatesInput),
    /// Show the most recent snapshot
    Latest,
    /// Show the full history
    All,
    /// Write the history to a workbook, the configured path when `None`
    Export(Option<PathBuf>),
    /// Append the rows of a workbook, the configured path when `None`
    Import(Option<PathBuf>),
    /// Serve the HTTP API
    Serve,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Rate book starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = store::open_store(&config)?;
    let service = Arc::new(RateService::from_config(store, &config)?);

    match command {
        AppCommand::Add(input) => {
            let snapshot = service.append(input).await?;
            println!(
                "{} #{} at {}",
                ui::style_text("Recorded snapshot", ui::StyleType::Success),
                snapshot.id,
                snapshot.timestamp.format(sheet::TIMESTAMP_FORMAT)
            );
        }
        AppCommand::Latest => {
            let snapshot = service.latest().await?;
            println!(
                "{}",
                rates::snapshots_table(std::slice::from_ref(&snapshot), &config.base_currency)
            );
        }
        AppCommand::All => {
            let snapshots = service.all().await?;
            if snapshots.is_empty() {
                println!("{}", rates::empty_message());
            } else {
                println!(
                    "{}",
                    rates::snapshots_table(&snapshots, &config.base_currency)
                );
            }
        }
        AppCommand::Export(path) => {
            let path = path.unwrap_or_else(|| service.export_path().to_path_buf());
            let rows = service
                .export_to(&path)
                .await
                .with_context(|| format!("Failed to export snapshots to {}", path.display()))?;
            println!(
                "{} {rows} snapshots to {}",
                ui::style_text("Exported", ui::StyleType::Success),
                path.display()
            );
        }
        AppCommand::Import(path) => {
            let path = path.unwrap_or_else(|| service.export_path().to_path_buf());
            let imported = service
                .import_from(&path)
                .await
                .with_context(|| format!("Failed to import snapshots from {}", path.display()))?;
            println!(
                "{} {} snapshots from {}",
                ui::style_text("Imported", ui::StyleType::Success),
                imported.len(),
                path.display()
            );
        }
        AppCommand::Serve => {
            api::serve(service, &config.server.listen_addr).await?;
        }
    }

    Ok(())
}
