//! Snapshot store kept in process memory

use crate::core::error::{RateError, Result};
use crate::core::snapshot::{NewSnapshot, RateSnapshot, Rates};
use crate::core::store::SnapshotStore;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

struct MemoryState {
    snapshots: Vec<RateSnapshot>,
    next_id: i64,
}

impl MemoryState {
    fn push(&mut self, record: NewSnapshot) -> RateSnapshot {
        let snapshot = RateSnapshot {
            id: self.next_id,
            rates: record.rates,
            timestamp: record.timestamp,
        };
        self.next_id += 1;
        self.snapshots.push(snapshot.clone());
        snapshot
    }
}

/// In-memory snapshot store, contents are lost when the process exits
#[derive(Clone)]
pub struct MemorySnapshotStore {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryState {
                snapshots: Vec::new(),
                next_id: 1,
            })),
        }
    }
}

impl Default for MemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn append(&self, rates: Rates) -> Result<RateSnapshot> {
        let mut state = self.inner.lock().await;
        let snapshot = state.push(NewSnapshot::captured_now(rates));
        debug!(id = snapshot.id, "Snapshot APPEND");
        Ok(snapshot)
    }

    async fn append_many(&self, records: Vec<NewSnapshot>) -> Result<Vec<RateSnapshot>> {
        // The lock is held for the whole batch so no other append interleaves.
        let mut state = self.inner.lock().await;
        let stored: Vec<RateSnapshot> = records.into_iter().map(|r| state.push(r)).collect();
        debug!(count = stored.len(), "Snapshot APPEND batch");
        Ok(stored)
    }

    async fn latest(&self) -> Result<RateSnapshot> {
        let state = self.inner.lock().await;
        state
            .snapshots
            .last()
            .cloned()
            .ok_or(RateError::NotFound("rate snapshot"))
    }

    async fn all(&self) -> Result<Vec<RateSnapshot>> {
        let state = self.inner.lock().await;
        Ok(state.snapshots.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_append_then_latest() {
        let store = MemorySnapshotStore::new();

        store.append(Rates::new(0.93, 0.88, 0.0067, 1.08)).await.unwrap();
        store.append(Rates::new(0.94, 0.89, 0.0068, 1.09)).await.unwrap();

        let latest = store.latest().await.unwrap();
        assert_eq!(latest.rates, Rates::new(0.94, 0.89, 0.0068, 1.09));
        assert_eq!(store.all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_ids_strictly_increase() {
        let store = MemorySnapshotStore::new();
        let rates = Rates::new(1.0, 1.0, 1.0, 1.0);

        let mut ids = Vec::new();
        for _ in 0..5 {
            ids.push(store.append(rates).await.unwrap().id);
        }
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = MemorySnapshotStore::new();
        assert!(matches!(
            store.latest().await,
            Err(RateError::NotFound(_))
        ));
        assert!(store.all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_many_keeps_timestamps() {
        let store = MemorySnapshotStore::new();
        store.append(Rates::new(1.0, 1.0, 1.0, 1.0)).await.unwrap();

        let timestamp = NaiveDate::from_ymd_opt(2019, 3, 4)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let stored = store
            .append_many(vec![NewSnapshot {
                rates: Rates::new(0.9, 0.8, 0.007, 1.1),
                timestamp,
            }])
            .await
            .unwrap();

        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, 2);
        assert_eq!(stored[0].timestamp, timestamp);
        assert_eq!(store.latest().await.unwrap(), stored[0]);
    }
}
