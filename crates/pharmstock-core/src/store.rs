//! # Persistence Collaborator
//!
//! The storage contract the sale path writes through, plus an in-memory
//! implementation for tests and embedding.
//!
//! ## Write Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sale A: read v7 ──────────────── write(expected 7) ✓  → v8             │
//! │  sale B:   read v7 ──────────────────── write(expected 7) ✗ conflict   │
//! │                                           │                             │
//! │                                           └─► re-read v8, run again    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `write_item` must only succeed when the stored `sync_version` still equals
//! `expected_version`, and must bump it on success. Two sales that read the
//! same version can never both commit.

use chrono::Utc;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{StoreError, StoreResult};
use crate::quantity::QuantityState;
use crate::types::{SaleRecord, StockItem};

// =============================================================================
// Trait
// =============================================================================

/// Storage used by [`crate::service::SaleService`].
pub trait StockStore: Send + Sync {
    /// Fetches the current item, including its `sync_version`.
    fn read_item(&self, id: &str) -> impl Future<Output = StoreResult<StockItem>> + Send;

    /// Replaces the item's quantity fields if its version is still
    /// `expected_version`. Returns the new version.
    fn write_item(
        &self,
        id: &str,
        state: QuantityState,
        expected_version: i64,
    ) -> impl Future<Output = StoreResult<i64>> + Send;

    /// Stores a sale record. Records are never updated afterwards.
    fn append_sale_record(
        &self,
        record: &SaleRecord,
    ) -> impl Future<Output = StoreResult<()>> + Send;
}

impl<T: StockStore> StockStore for Arc<T> {
    fn read_item(&self, id: &str) -> impl Future<Output = StoreResult<StockItem>> + Send {
        (**self).read_item(id)
    }

    fn write_item(
        &self,
        id: &str,
        state: QuantityState,
        expected_version: i64,
    ) -> impl Future<Output = StoreResult<i64>> + Send {
        (**self).write_item(id, state, expected_version)
    }

    fn append_sale_record(
        &self,
        record: &SaleRecord,
    ) -> impl Future<Output = StoreResult<()>> + Send {
        (**self).append_sale_record(record)
    }
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// A [`StockStore`] backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    items: Mutex<HashMap<String, StockItem>>,
    records: Mutex<Vec<SaleRecord>>,
    append_failure: Mutex<Option<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with `items`.
    pub fn with_items(items: impl IntoIterator<Item = StockItem>) -> Self {
        let store = Self::new();
        if let Ok(mut map) = store.items.lock() {
            map.extend(items.into_iter().map(|item| (item.id.clone(), item)));
        }
        store
    }

    /// Full-replacement edit, as a manual stock form would do. Bumps the
    /// version so in-flight sales conflict.
    pub fn replace_item(&self, mut item: StockItem) -> StoreResult<i64> {
        let mut items = lock(&self.items)?;
        let version = items.get(&item.id).map(|i| i.sync_version + 1).unwrap_or(1);
        item.sync_version = version;
        item.updated_at = Utc::now();
        items.insert(item.id.clone(), item);
        Ok(version)
    }

    /// Snapshot of one item.
    pub fn item(&self, id: &str) -> Option<StockItem> {
        lock(&self.items).ok()?.get(id).cloned()
    }

    /// Snapshot of all sale records in append order.
    pub fn records(&self) -> Vec<SaleRecord> {
        lock(&self.records).map(|r| r.clone()).unwrap_or_default()
    }

    /// Makes every following `append_sale_record` fail with `message`
    /// (`None` restores normal behaviour).
    pub fn fail_appends(&self, message: Option<&str>) {
        if let Ok(mut failure) = self.append_failure.lock() {
            *failure = message.map(str::to_string);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> StoreResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
}

impl StockStore for InMemoryStore {
    async fn read_item(&self, id: &str) -> StoreResult<StockItem> {
        lock(&self.items)?
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("StockItem", id))
    }

    async fn write_item(
        &self,
        id: &str,
        state: QuantityState,
        expected_version: i64,
    ) -> StoreResult<i64> {
        if !state.is_valid() {
            return Err(StoreError::Unavailable(format!(
                "refusing to store invalid quantity state {:?}",
                state
            )));
        }

        let mut items = lock(&self.items)?;
        let item = items
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("StockItem", id))?;

        if item.sync_version != expected_version {
            return Err(StoreError::VersionConflict {
                id: id.to_string(),
                expected: expected_version,
                actual: Some(item.sync_version),
            });
        }

        item.container_count = state.container_count;
        item.loose_units = state.loose_units;
        item.updated_at = Utc::now();
        item.sync_version += 1;
        Ok(item.sync_version)
    }

    async fn append_sale_record(&self, record: &SaleRecord) -> StoreResult<()> {
        if let Some(message) = lock(&self.append_failure)?.clone() {
            return Err(StoreError::Unavailable(message));
        }
        if !lock(&self.items)?.contains_key(&record.item_id) {
            return Err(StoreError::not_found("StockItem", &record.item_id));
        }
        lock(&self.records)?.push(record.clone());
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::standard_item;

    #[tokio::test]
    async fn test_conditional_write() {
        let item = standard_item(5, 10, 0);
        let store = InMemoryStore::with_items([item.clone()]);

        let version = store
            .write_item(&item.id, QuantityState::new(4, 10, 7), item.sync_version)
            .await
            .unwrap();
        assert_eq!(version, item.sync_version + 1);

        let err = store
            .write_item(&item.id, QuantityState::new(3, 10, 0), item.sync_version)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::VersionConflict {
                id: item.id.clone(),
                expected: item.sync_version,
                actual: Some(version),
            }
        );

        let stored = store.read_item(&item.id).await.unwrap();
        assert_eq!(stored.container_count, 4);
        assert_eq!(stored.loose_units, 7);
    }

    #[tokio::test]
    async fn test_missing_item() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.read_item("nope").await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.write_item("nope", QuantityState::new(0, 1, 0), 1).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_rejects_invalid_state() {
        let item = standard_item(5, 10, 0);
        let store = InMemoryStore::with_items([item.clone()]);
        let err = store
            .write_item(&item.id, QuantityState::new(4, 10, 10), item.sync_version)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert_eq!(store.item(&item.id).unwrap().container_count, 5);
    }

    #[test]
    fn test_replace_item_bumps_version() {
        let item = standard_item(5, 10, 0);
        let store = InMemoryStore::with_items([item.clone()]);
        let mut edited = item.clone();
        edited.container_count = 20;
        let version = store.replace_item(edited).unwrap();
        assert_eq!(version, item.sync_version + 1);
        assert_eq!(store.item(&item.id).unwrap().container_count, 20);
    }

    #[tokio::test]
    async fn test_append_failure_switch() {
        let item = standard_item(5, 10, 0);
        let store = InMemoryStore::with_items([item.clone()]);
        let record = crate::sale::process_sale(
            &item,
            crate::sale::SaleRequest::new(item.id.clone(), crate::types::SaleUnit::BaseUnit, 1),
            Utc::now(),
        )
        .unwrap()
        .record;

        store.fail_appends(Some("disk full"));
        assert_eq!(
            store.append_sale_record(&record).await,
            Err(StoreError::Unavailable("disk full".to_string()))
        );

        store.fail_appends(None);
        store.append_sale_record(&record).await.unwrap();
        assert_eq!(store.records().len(), 1);
    }
}
