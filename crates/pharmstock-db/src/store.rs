//! # SQLite Stock Store
//!
//! [`StockStore`] over the repositories, so `SaleService` can run against
//! the real database.
//!
//! ```text
//! StockStore::read_item          → StockItemRepository::get_by_id
//! StockStore::write_item         → StockItemRepository::update_quantity
//! StockStore::append_sale_record → SaleRecordRepository::insert
//! ```
//!
//! The item write and the record append are separate statements. A failed
//! append leaves the stock decremented; `SaleService` reports it on the
//! outcome.

use sqlx::SqlitePool;

use crate::repository::item::StockItemRepository;
use crate::repository::sale::SaleRecordRepository;
use pharmstock_core::{QuantityState, SaleRecord, StockItem, StockStore, StoreError, StoreResult};

/// SQLite-backed [`StockStore`].
#[derive(Debug, Clone)]
pub struct SqliteStockStore {
    items: StockItemRepository,
    sales: SaleRecordRepository,
}

impl SqliteStockStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteStockStore {
            items: StockItemRepository::new(pool.clone()),
            sales: SaleRecordRepository::new(pool),
        }
    }
}

impl StockStore for SqliteStockStore {
    async fn read_item(&self, id: &str) -> StoreResult<StockItem> {
        self.items
            .get_by_id(id)
            .await?
            .ok_or_else(|| StoreError::not_found("StockItem", id))
    }

    async fn write_item(
        &self,
        id: &str,
        state: QuantityState,
        expected_version: i64,
    ) -> StoreResult<i64> {
        Ok(self.items.update_quantity(id, state, expected_version).await?)
    }

    async fn append_sale_record(&self, record: &SaleRecord) -> StoreResult<()> {
        Ok(self.sales.insert(record).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
