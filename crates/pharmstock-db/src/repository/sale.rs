//! # Sale Record Repository
//!
//! Append-only storage for completed sales.
//!
//! ## Record Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SaleService::sell                                                      │
//! │     └── write_item (stock_items)      stock leaves the shelf            │
//! │     └── insert (sale_records)         frozen name, label, unit price   │
//! │                                                                         │
//! │  Records are never updated. They disappear only when their stock item  │
//! │  is deleted (ON DELETE CASCADE).                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use pharmstock_core::{SaleRecord, SaleUnit, UnitPrice};

/// Flat row shape of `sale_records`.
///
/// `SaleRecord` nests its unit price, so rows are read through this struct.
#[derive(Debug, sqlx::FromRow)]
struct SaleRecordRow {
    id: String,
    account_id: String,
    item_id: String,
    item_name: String,
    unit: SaleUnit,
    unit_label: String,
    quantity: i64,
    base_units: i64,
    unit_price_cents: i64,
    unit_price_per: i64,
    total_cents: i64,
    sold_at: DateTime<Utc>,
    notes: Option<String>,
}

impl From<SaleRecordRow> for SaleRecord {
    fn from(row: SaleRecordRow) -> Self {
        SaleRecord {
            id: row.id,
            account_id: row.account_id,
            item_id: row.item_id,
            item_name: row.item_name,
            unit: row.unit,
            unit_label: row.unit_label,
            quantity: row.quantity,
            base_units: row.base_units,
            unit_price: UnitPrice {
                cents: row.unit_price_cents,
                per: row.unit_price_per,
            },
            total_cents: row.total_cents,
            sold_at: row.sold_at,
            notes: row.notes,
        }
    }
}

const SELECT_RECORD: &str = r#"
    SELECT
        id,
        account_id,
        item_id,
        item_name,
        unit,
        unit_label,
        quantity,
        base_units,
        unit_price_cents,
        unit_price_per,
        total_cents,
        sold_at,
        notes
    FROM sale_records
"#;

/// Repository for sale record database operations.
#[derive(Debug, Clone)]
pub struct SaleRecordRepository {
    pool: SqlitePool,
}

impl SaleRecordRepository {
    /// Creates a new SaleRecordRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRecordRepository { pool }
    }

    /// Stores a record.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - The item doesn't exist
    /// * `Err(DbError::UniqueViolation)` - Record ID already stored
    pub async fn insert(&self, record: &SaleRecord) -> DbResult<()> {
        debug!(
            id = %record.id,
            item_id = %record.item_id,
            base_units = record.base_units,
            total_cents = record.total_cents,
            "Inserting sale record"
        );

        sqlx::query(
            r#"
            INSERT INTO sale_records (
                id, account_id, item_id, item_name, unit, unit_label,
                quantity, base_units, unit_price_cents, unit_price_per,
                total_cents, sold_at, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&record.id)
        .bind(&record.account_id)
        .bind(&record.item_id)
        .bind(&record.item_name)
        .bind(record.unit)
        .bind(&record.unit_label)
        .bind(record.quantity)
        .bind(record.base_units)
        .bind(record.unit_price.cents)
        .bind(record.unit_price.per)
        .bind(record.total_cents)
        .bind(record.sold_at)
        .bind(&record.notes)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a record by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SaleRecord>> {
        let sql = format!("{SELECT_RECORD} WHERE id = ?1");

        let row = sqlx::query_as::<_, SaleRecordRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(SaleRecord::from))
    }

    /// All records for one item, newest first.
    pub async fn list_for_item(&self, item_id: &str) -> DbResult<Vec<SaleRecord>> {
        let sql = format!("{SELECT_RECORD} WHERE item_id = ?1 ORDER BY sold_at DESC");

        let rows = sqlx::query_as::<_, SaleRecordRow>(&sql)
            .bind(item_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(SaleRecord::from).collect())
    }

    /// An account's records sold on `from..=to` (UTC days), oldest first.
    ///
    /// Feeds `reports::sales_summary` and `reports::daily_sales`.
    pub async fn list_between(
        &self,
        account_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<Vec<SaleRecord>> {
        debug!(%from, %to, "Listing sale records");

        let sql = format!(
            "{SELECT_RECORD} WHERE account_id = ?1 AND date(sold_at) BETWEEN ?2 AND ?3 \
             ORDER BY sold_at"
        );

        let rows = sqlx::query_as::<_, SaleRecordRow>(&sql)
            .bind(account_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(SaleRecord::from).collect())
    }

    /// An account's most recent records, newest first.
    pub async fn list_recent(&self, account_id: &str, limit: u32) -> DbResult<Vec<SaleRecord>> {
        let sql = format!("{SELECT_RECORD} WHERE account_id = ?1 ORDER BY sold_at DESC LIMIT ?2");

        let rows = sqlx::query_as::<_, SaleRecordRow>(&sql)
            .bind(account_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(SaleRecord::from).collect())
    }

    /// Counts all records (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_records")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use crate::testing::{record_for, standard_item};
    use pharmstock_core::DEFAULT_ACCOUNT_ID;

    async fn db_with_item() -> (Database, pharmstock_core::StockItem) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let item = standard_item("Paracetamol 500mg", 5, 10, 0);
        db.items().insert(&item).await.unwrap();
        (db, item)
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get_keeps_frozen_price() {
        let (db, item) = db_with_item().await;
        let mut record = record_for(&item, day(2026, 10, 1), 3);
        record.unit_price = UnitPrice { cents: 1_000, per: 3 };
        record.total_cents = 1_000;
        record.notes = Some("walk-in".to_string());
        db.sales().insert(&record).await.unwrap();

        let loaded = db.sales().get_by_id(&record.id).await.unwrap().unwrap();
        assert_eq!(loaded, record);
        assert_eq!(loaded.unit_price.per, 3);
    }

    #[tokio::test]
    async fn test_insert_for_missing_item_fails() {
        let (db, item) = db_with_item().await;
        let mut record = record_for(&item, day(2026, 10, 1), 3);
        record.item_id = "missing".to_string();

        let err = db.sales().insert(&record).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_between_is_inclusive_of_both_days() {
        let (db, item) = db_with_item().await;
        for d in [1, 2, 3, 4] {
            db.sales()
                .insert(&record_for(&item, day(2026, 10, d), d as i64))
                .await
                .unwrap();
        }

        let records = db
            .sales()
            .list_between(DEFAULT_ACCOUNT_ID, day(2026, 10, 2), day(2026, 10, 3))
            .await
            .unwrap();
        let units: Vec<i64> = records.iter().map(|r| r.base_units).collect();
        assert_eq!(units, vec![2, 3]);

        let other = db
            .sales()
            .list_between("another-account", day(2026, 10, 1), day(2026, 10, 4))
            .await
            .unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_list_recent_and_for_item() {
        let (db, item) = db_with_item().await;
        for d in [5, 7, 6] {
            db.sales()
                .insert(&record_for(&item, day(2026, 10, d), 1))
                .await
                .unwrap();
        }

        let recent = db.sales().list_recent(DEFAULT_ACCOUNT_ID, 2).await.unwrap();
        let days: Vec<NaiveDate> = recent.iter().map(|r| r.sale_date()).collect();
        assert_eq!(days, vec![day(2026, 10, 7), day(2026, 10, 6)]);

        assert_eq!(db.sales().list_for_item(&item.id).await.unwrap().len(), 3);
        assert_eq!(db.sales().count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_records_cascade_with_item() {
        let (db, item) = db_with_item().await;
        db.sales()
            .insert(&record_for(&item, day(2026, 10, 1), 2))
            .await
            .unwrap();

        db.items().delete(&item.id).await.unwrap();
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }
}
