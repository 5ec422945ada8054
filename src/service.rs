//! Operations exposed to the CLI and the HTTP routes

use crate::core::config::AppConfig;
use crate::core::error::{RateError, Result};
use crate::core::snapshot::{RateSnapshot, RatesInput};
use crate::core::store::SnapshotStore;
use crate::sheet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Entry point for every rate operation. Built once and shared.
pub struct RateService {
    store: Arc<dyn SnapshotStore>,
    base_currency: String,
    export_path: PathBuf,
}

impl RateService {
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        base_currency: impl Into<String>,
        export_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            base_currency: base_currency.into(),
            export_path: export_path.into(),
        }
    }

    pub fn from_config(store: Arc<dyn SnapshotStore>, config: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self::new(store, &config.base_currency, config.export_path()?))
    }

    pub fn export_path(&self) -> &Path {
        &self.export_path
    }

    /// Validates `input` and stores it stamped with the current time.
    pub async fn append(&self, input: RatesInput) -> Result<RateSnapshot> {
        let rates = input.validate()?;
        self.store.append(rates).await
    }

    pub async fn latest(&self) -> Result<RateSnapshot> {
        self.store.latest().await
    }

    pub async fn all(&self) -> Result<Vec<RateSnapshot>> {
        self.store.all().await
    }

    /// Writes the full history to `destination`, returns the number of rows.
    pub async fn export_to(&self, destination: &Path) -> Result<usize> {
        let snapshots = self.store.all().await?;
        debug!(count = snapshots.len(), "Exporting snapshots");

        let destination = destination.to_path_buf();
        let base_currency = self.base_currency.clone();
        tokio::task::spawn_blocking(move || {
            sheet::export_snapshots(&snapshots, &destination, &base_currency)
        })
        .await
        .map_err(|e| RateError::io("workbook writer task failed", e))?
    }

    /// Appends every row of `source` as new snapshots.
    pub async fn import_from(&self, source: &Path) -> Result<Vec<RateSnapshot>> {
        sheet::import_snapshots(self.store.as_ref(), source).await
    }

    pub async fn save_to_file(&self) -> Result<usize> {
        self.export_to(&self.export_path).await
    }

    pub async fn read_from_file(&self) -> Result<Vec<RateSnapshot>> {
        self.import_from(&self.export_path).await
    }
}
