pub mod memory;
pub mod sqlite;

use crate::core::config::{AppConfig, StoreBackend};
use crate::core::store::SnapshotStore;
use anyhow::{Context, Result};
use memory::MemorySnapshotStore;
use sqlite::SqliteSnapshotStore;
use std::sync::Arc;
use tracing::debug;

/// Opens the snapshot store selected in the config.
pub fn open_store(config: &AppConfig) -> Result<Arc<dyn SnapshotStore>> {
    match config.store.backend {
        StoreBackend::Sqlite => {
            let path = config.database_path()?;
            let store = SqliteSnapshotStore::open(&path)
                .with_context(|| format!("Failed to open snapshot store at {}", path.display()))?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            debug!("Using in-memory snapshot store");
            Ok(Arc::new(MemorySnapshotStore::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::StoreConfig;
    use crate::core::snapshot::Rates;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_open_sqlite_store_from_config() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            data_path: Some(dir.path().to_string_lossy().into_owned()),
            ..AppConfig::default()
        };

        let store = open_store(&config).unwrap();
        store.append(Rates::new(1.0, 1.0, 1.0, 1.0)).await.unwrap();
        assert!(config.database_path().unwrap().exists());
    }

    #[tokio::test]
    async fn test_open_memory_store_from_config() {
        let config = AppConfig {
            store: StoreConfig {
                backend: StoreBackend::Memory,
                path: None,
            },
            ..AppConfig::default()
        };

        let store = open_store(&config).unwrap();
        assert!(store.all().await.unwrap().is_empty());
    }
}
