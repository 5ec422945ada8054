//! Snapshot store abstraction

use crate::core::error::Result;
use crate::core::snapshot::{NewSnapshot, RateSnapshot, Rates};
use async_trait::async_trait;

/// Append-only collection of rate snapshots.
///
/// Ids are assigned by the store and strictly increase in commit order.
/// Implementations never update or delete a stored snapshot.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Persists `rates` stamped with the current time.
    async fn append(&self, rates: Rates) -> Result<RateSnapshot>;

    /// Persists every record with its own timestamp in a single transaction.
    /// Either all records are stored or none are.
    async fn append_many(&self, records: Vec<NewSnapshot>) -> Result<Vec<RateSnapshot>>;

    /// The snapshot with the highest id, `RateError::NotFound` when empty.
    async fn latest(&self) -> Result<RateSnapshot>;

    /// All snapshots in ascending id order.
    async fn all(&self) -> Result<Vec<RateSnapshot>>;
}
