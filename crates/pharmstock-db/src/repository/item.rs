//! # Stock Item Repository
//!
//! Database operations for stock items.
//!
//! ## Two Kinds of Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  update(item)            Full replacement from an edit form.            │
//! │                          Bumps sync_version unconditionally.            │
//! │                                                                         │
//! │  update_quantity(id,     Sale path. Touches only container_count and    │
//! │    state, expected)      loose_units, and only while sync_version is    │
//! │                          still `expected`:                              │
//! │                                                                         │
//! │      UPDATE stock_items SET ..., sync_version = sync_version + 1       │
//! │      WHERE id = ? AND sync_version = ?                                 │
//! │      RETURNING sync_version                                            │
//! │                                                                         │
//! │                          No row back → NotFound or VersionConflict.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use pharmstock_core::validation::{
    validate_quantity_state, validate_search_query, validate_stock_item,
};
use pharmstock_core::{QuantityState, StockItem};

/// Column list matching the `StockItem` fields.
const SELECT_ITEM: &str = r#"
    SELECT
        id,
        account_id,
        name,
        category,
        container_count,
        units_per_container,
        loose_units,
        price_per_container_cents,
        declared_sale_unit,
        container_label,
        base_unit_label,
        barcode,
        expiry_date,
        batch_number,
        manufacturer,
        description,
        created_at,
        updated_at,
        sync_version
    FROM stock_items
"#;

/// Repository for stock item database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = StockItemRepository::new(pool);
///
/// let item = repo.get_by_id("uuid-here").await?;
/// let matches = repo.search(DEFAULT_ACCOUNT_ID, "para", 20).await?;
/// let scanned = repo.get_by_barcode(DEFAULT_ACCOUNT_ID, "8901234567890").await?;
/// ```
#[derive(Debug, Clone)]
pub struct StockItemRepository {
    pool: SqlitePool,
}

impl StockItemRepository {
    /// Creates a new StockItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockItemRepository { pool }
    }

    /// Gets an item by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(StockItem))` - Item found
    /// * `Ok(None)` - Item not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<StockItem>> {
        let sql = format!("{SELECT_ITEM} WHERE id = ?1");

        let item = sqlx::query_as::<_, StockItem>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Looks up an account's item by its exact barcode.
    pub async fn get_by_barcode(&self, account_id: &str, barcode: &str) -> DbResult<Option<StockItem>> {
        let barcode = barcode.trim();
        if barcode.is_empty() {
            return Ok(None);
        }

        let sql = format!("{SELECT_ITEM} WHERE account_id = ?1 AND barcode = ?2");

        let item = sqlx::query_as::<_, StockItem>(&sql)
            .bind(account_id)
            .bind(barcode)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Lists an account's items by name.
    pub async fn list(&self, account_id: &str, limit: u32) -> DbResult<Vec<StockItem>> {
        let sql = format!("{SELECT_ITEM} WHERE account_id = ?1 ORDER BY name COLLATE NOCASE LIMIT ?2");

        let items = sqlx::query_as::<_, StockItem>(&sql)
            .bind(account_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Case-insensitive search for the query anywhere in the name or barcode.
    ///
    /// An empty query lists the account's items. `%` and `_` in the query
    /// match literally.
    pub async fn search(&self, account_id: &str, query: &str, limit: u32) -> DbResult<Vec<StockItem>> {
        let query = validate_search_query(query)?;

        debug!(query = %query, limit = %limit, "Searching stock items");

        if query.is_empty() {
            return self.list(account_id, limit).await;
        }

        let pattern = format!("%{}%", escape_like(&query));
        let sql = format!(
            "{SELECT_ITEM} WHERE account_id = ?1 \
             AND (name LIKE ?2 ESCAPE '\\' OR barcode LIKE ?2 ESCAPE '\\') \
             ORDER BY name COLLATE NOCASE LIMIT ?3"
        );

        let items = sqlx::query_as::<_, StockItem>(&sql)
            .bind(account_id)
            .bind(pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = items.len(), "Search returned items");
        Ok(items)
    }

    /// Items whose expiry date falls on or before `until`.
    pub async fn list_expiring(
        &self,
        account_id: &str,
        until: chrono::NaiveDate,
    ) -> DbResult<Vec<StockItem>> {
        let sql = format!(
            "{SELECT_ITEM} WHERE account_id = ?1 AND expiry_date IS NOT NULL \
             AND expiry_date <= ?2 ORDER BY expiry_date"
        );

        let items = sqlx::query_as::<_, StockItem>(&sql)
            .bind(account_id)
            .bind(until)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Inserts a new item after validating it.
    ///
    /// ## Returns
    /// * `Ok(())` - Item inserted
    /// * `Err(DbError::Validation)` - Item breaks a domain rule
    /// * `Err(DbError::UniqueViolation)` - ID already exists
    pub async fn insert(&self, item: &StockItem) -> DbResult<()> {
        validate_stock_item(item)?;

        debug!(id = %item.id, name = %item.name, "Inserting stock item");

        sqlx::query(
            r#"
            INSERT INTO stock_items (
                id, account_id, name, category,
                container_count, units_per_container, loose_units,
                price_per_container_cents, declared_sale_unit,
                container_label, base_unit_label,
                expiry_date, batch_number, manufacturer, description,
                created_at, updated_at, sync_version, barcode
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
            "#,
        )
        .bind(&item.id)
        .bind(&item.account_id)
        .bind(&item.name)
        .bind(item.category)
        .bind(item.container_count)
        .bind(item.units_per_container)
        .bind(item.loose_units)
        .bind(item.price_per_container_cents)
        .bind(item.declared_sale_unit)
        .bind(&item.container_label)
        .bind(&item.base_unit_label)
        .bind(item.expiry_date)
        .bind(&item.batch_number)
        .bind(&item.manufacturer)
        .bind(&item.description)
        .bind(item.created_at)
        .bind(item.updated_at)
        .bind(item.sync_version)
        .bind(&item.barcode)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Replaces every editable field of an item.
    ///
    /// Not version-checked: the edit wins and any sale that read the old
    /// version will conflict on its write. Returns the new version.
    pub async fn update(&self, item: &StockItem) -> DbResult<i64> {
        validate_stock_item(item)?;

        debug!(id = %item.id, "Updating stock item");

        let version: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE stock_items
            SET
                name = ?2,
                category = ?3,
                container_count = ?4,
                units_per_container = ?5,
                loose_units = ?6,
                price_per_container_cents = ?7,
                declared_sale_unit = ?8,
                container_label = ?9,
                base_unit_label = ?10,
                expiry_date = ?11,
                batch_number = ?12,
                manufacturer = ?13,
                description = ?14,
                updated_at = ?15,
                barcode = ?16,
                sync_version = sync_version + 1
            WHERE id = ?1
            RETURNING sync_version
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(item.category)
        .bind(item.container_count)
        .bind(item.units_per_container)
        .bind(item.loose_units)
        .bind(item.price_per_container_cents)
        .bind(item.declared_sale_unit)
        .bind(&item.container_label)
        .bind(&item.base_unit_label)
        .bind(item.expiry_date)
        .bind(&item.batch_number)
        .bind(&item.manufacturer)
        .bind(&item.description)
        .bind(Utc::now())
        .bind(&item.barcode)
        .fetch_optional(&self.pool)
        .await?;

        version.ok_or_else(|| DbError::not_found("StockItem", &item.id))
    }

    /// Writes new quantity fields if the row is still at `expected_version`.
    ///
    /// ## Returns
    /// * `Ok(version)` - The bumped `sync_version`
    /// * `Err(DbError::VersionConflict)` - Someone wrote first
    /// * `Err(DbError::NotFound)` - Item was deleted
    pub async fn update_quantity(
        &self,
        id: &str,
        state: QuantityState,
        expected_version: i64,
    ) -> DbResult<i64> {
        validate_quantity_state(&state)?;

        debug!(
            id = %id,
            containers = state.container_count,
            loose = state.loose_units,
            expected_version,
            "Updating stock quantity"
        );

        let version: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE stock_items
            SET
                container_count = ?3,
                loose_units = ?4,
                updated_at = ?5,
                sync_version = sync_version + 1
            WHERE id = ?1 AND sync_version = ?2
            RETURNING sync_version
            "#,
        )
        .bind(id)
        .bind(expected_version)
        .bind(state.container_count)
        .bind(state.loose_units)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(version) = version {
            return Ok(version);
        }

        let actual: Option<i64> =
            sqlx::query_scalar("SELECT sync_version FROM stock_items WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match actual {
            None => Err(DbError::not_found("StockItem", id)),
            Some(actual) => Err(DbError::VersionConflict {
                id: id.to_string(),
                expected: expected_version,
                actual,
            }),
        }
    }

    /// Deletes an item and, by cascade, its sale records.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting stock item");

        let result = sqlx::query("DELETE FROM stock_items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("StockItem", id));
        }

        Ok(())
    }

    /// Counts all items (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Escapes `\`, `%` and `_` for a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Helper to generate a new item ID.
pub fn generate_item_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::testing::{opaque_item, standard_item};
    use pharmstock_core::{ItemCategory, ValidationError, DEFAULT_ACCOUNT_ID};

    async fn repo() -> StockItemRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().items()
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let repo = repo().await;
        let mut item = standard_item("Paracetamol 500mg", 5, 10, 3);
        item.expiry_date = chrono::NaiveDate::from_ymd_opt(2027, 3, 31);
        item.base_unit_label = Some("tablet".to_string());
        repo.insert(&item).await.unwrap();

        let loaded = repo.get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, item.name);
        assert_eq!(loaded.quantity(), item.quantity());
        assert_eq!(loaded.category, ItemCategory::Standard);
        assert_eq!(loaded.expiry_date, item.expiry_date);
        assert_eq!(loaded.base_unit_label.as_deref(), Some("tablet"));
        assert_eq!(loaded.sync_version, 1);

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_item() {
        let repo = repo().await;
        let item = standard_item("Broken", 1, 10, 10);

        let err = repo.insert(&item).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_duplicate_id() {
        let repo = repo().await;
        let item = standard_item("Paracetamol 500mg", 1, 10, 0);
        repo.insert(&item).await.unwrap();

        let err = repo.insert(&item).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_quantity_bumps_version() {
        let repo = repo().await;
        let item = standard_item("Paracetamol 500mg", 5, 10, 0);
        repo.insert(&item).await.unwrap();

        let next = item.quantity().decrement(3).unwrap();
        let version = repo.update_quantity(&item.id, next, 1).await.unwrap();
        assert_eq!(version, 2);

        let loaded = repo.get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!((loaded.container_count, loaded.loose_units), (4, 7));
        assert_eq!(loaded.sync_version, 2);
    }

    #[tokio::test]
    async fn test_update_quantity_stale_version_conflicts() {
        let repo = repo().await;
        let item = standard_item("Paracetamol 500mg", 5, 10, 0);
        repo.insert(&item).await.unwrap();

        repo.update_quantity(&item.id, QuantityState::new(4, 10, 7), 1)
            .await
            .unwrap();

        let err = repo
            .update_quantity(&item.id, QuantityState::new(4, 10, 5), 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::VersionConflict { expected: 1, actual: 2, .. }
        ));

        // Losing write changed nothing
        let loaded = repo.get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(loaded.loose_units, 7);
    }

    #[tokio::test]
    async fn test_update_quantity_missing_item() {
        let repo = repo().await;
        let err = repo
            .update_quantity("missing", QuantityState::new(1, 10, 0), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_quantity_rejects_invalid_state() {
        let repo = repo().await;
        let item = standard_item("Paracetamol 500mg", 5, 10, 0);
        repo.insert(&item).await.unwrap();

        let err = repo
            .update_quantity(&item.id, QuantityState::new(-1, 10, 0), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_full_update_invalidates_pending_sale() {
        let repo = repo().await;
        let mut item = standard_item("Paracetamol 500mg", 5, 10, 0);
        repo.insert(&item).await.unwrap();

        item.name = "Paracetamol 650mg".to_string();
        item.container_count = 8;
        assert_eq!(repo.update(&item).await.unwrap(), 2);

        // A sale that read version 1 now loses
        let err = repo
            .update_quantity(&item.id, QuantityState::new(4, 10, 7), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::VersionConflict { .. }));

        let loaded = repo.get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Paracetamol 650mg");
        assert_eq!(loaded.container_count, 8);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_literal() {
        let repo = repo().await;
        repo.insert(&standard_item("Paracetamol 500mg", 1, 10, 0)).await.unwrap();
        repo.insert(&standard_item("Amoxicillin 250mg", 1, 10, 0)).await.unwrap();
        repo.insert(&standard_item("5% Dextrose", 1, 10, 0)).await.unwrap();
        let mut syrup = opaque_item("Cough Syrup", 4);
        syrup.barcode = Some("8907777000022".to_string());
        repo.insert(&syrup).await.unwrap();

        let found = repo.search(DEFAULT_ACCOUNT_ID, "PARA", 20).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Paracetamol 500mg");

        // Anywhere in the name
        let found = repo.search(DEFAULT_ACCOUNT_ID, "500MG", 20).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Paracetamol 500mg");

        let found = repo.search(DEFAULT_ACCOUNT_ID, "0mg", 20).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "Amoxicillin 250mg");

        // Or in the barcode
        let found = repo.search(DEFAULT_ACCOUNT_ID, "7777", 20).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Cough Syrup");

        let found = repo.search(DEFAULT_ACCOUNT_ID, "5%", 20).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "5% Dextrose");

        let found = repo.search(DEFAULT_ACCOUNT_ID, "_", 20).await.unwrap();
        assert!(found.is_empty());

        let all = repo.search(DEFAULT_ACCOUNT_ID, "  ", 20).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].name, "5% Dextrose");

        let err = repo
            .search(DEFAULT_ACCOUNT_ID, &"x".repeat(101), 20)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(ValidationError::TooLong { .. })));
    }

    #[tokio::test]
    async fn test_get_by_barcode() {
        let repo = repo().await;
        let mut item = standard_item("Paracetamol 500mg", 5, 10, 0);
        item.barcode = Some("8901234500011".to_string());
        repo.insert(&item).await.unwrap();
        repo.insert(&standard_item("Amoxicillin 250mg", 1, 10, 0)).await.unwrap();

        let found = repo
            .get_by_barcode(DEFAULT_ACCOUNT_ID, " 8901234500011 ")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, item.id);
        assert_eq!(found.barcode.as_deref(), Some("8901234500011"));

        assert!(repo.get_by_barcode(DEFAULT_ACCOUNT_ID, "89012345").await.unwrap().is_none());
        assert!(repo.get_by_barcode(DEFAULT_ACCOUNT_ID, "").await.unwrap().is_none());
        assert!(repo
            .get_by_barcode("other-account", "8901234500011")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_barcode_unique_within_account() {
        let repo = repo().await;
        let mut first = standard_item("Paracetamol 500mg", 5, 10, 0);
        first.barcode = Some("8901234500011".to_string());
        repo.insert(&first).await.unwrap();

        let mut clash = standard_item("Paracetamol 650mg", 5, 10, 0);
        clash.barcode = first.barcode.clone();
        let err = repo.insert(&clash).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        clash.account_id = "other-account".to_string();
        repo.insert(&clash).await.unwrap();

        // Items without a barcode never clash
        repo.insert(&standard_item("A", 1, 10, 0)).await.unwrap();
        repo.insert(&standard_item("B", 1, 10, 0)).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_sets_barcode() {
        let repo = repo().await;
        let mut item = standard_item("Paracetamol 500mg", 5, 10, 0);
        repo.insert(&item).await.unwrap();

        item.barcode = Some("8901234500011".to_string());
        repo.update(&item).await.unwrap();

        let loaded = repo
            .get_by_barcode(DEFAULT_ACCOUNT_ID, "8901234500011")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.id, item.id);
    }

    #[tokio::test]
    async fn test_list_expiring() {
        let repo = repo().await;
        let mut soon = standard_item("Soon", 1, 10, 0);
        soon.expiry_date = chrono::NaiveDate::from_ymd_opt(2026, 11, 1);
        let mut later = standard_item("Later", 1, 10, 0);
        later.expiry_date = chrono::NaiveDate::from_ymd_opt(2027, 6, 1);
        repo.insert(&soon).await.unwrap();
        repo.insert(&later).await.unwrap();
        repo.insert(&standard_item("Never", 1, 10, 0)).await.unwrap();

        let until = chrono::NaiveDate::from_ymd_opt(2026, 12, 31).unwrap();
        let expiring = repo.list_expiring(DEFAULT_ACCOUNT_ID, until).await.unwrap();
        assert_eq!(expiring.len(), 1);
        assert_eq!(expiring[0].name, "Soon");
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repo().await;
        let item = opaque_item("Cough Syrup", 4);
        repo.insert(&item).await.unwrap();

        repo.delete(&item.id).await.unwrap();
        assert!(repo.get_by_id(&item.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(&item.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
