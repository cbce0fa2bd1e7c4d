//! Fixtures shared by the unit tests.

use chrono::{NaiveDate, TimeZone, Utc};

use crate::money::UnitPrice;
use crate::types::{ItemCategory, SaleRecord, SaleUnit, StockItem};

/// Standard item priced at 10.00 per container.
pub(crate) fn standard_item(containers: i64, per: i64, loose: i64) -> StockItem {
    let now = Utc::now();
    StockItem {
        id: uuid::Uuid::new_v4().to_string(),
        account_id: crate::DEFAULT_ACCOUNT_ID.to_string(),
        name: "Paracetamol 500mg".to_string(),
        category: ItemCategory::Standard,
        container_count: containers,
        units_per_container: per,
        loose_units: loose,
        price_per_container_cents: 1_000,
        declared_sale_unit: SaleUnit::BaseUnit,
        container_label: None,
        base_unit_label: None,
        expiry_date: None,
        barcode: None,
        batch_number: None,
        manufacturer: None,
        description: None,
        created_at: now,
        updated_at: now,
        sync_version: 1,
    }
}

/// Opaque item with `count` units on hand.
pub(crate) fn opaque_item(count: i64) -> StockItem {
    StockItem {
        name: "Cough Syrup 100ml".to_string(),
        category: ItemCategory::Opaque,
        units_per_container: 1,
        declared_sale_unit: SaleUnit::Opaque,
        price_per_container_cents: 12_000,
        ..standard_item(count, 1, 0)
    }
}

/// Sale record at noon UTC on `date`.
pub(crate) fn record_on(
    item_id: &str,
    item_name: &str,
    date: NaiveDate,
    base_units: i64,
    total_cents: i64,
) -> SaleRecord {
    let sold_at = date
        .and_hms_opt(12, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .unwrap_or_else(Utc::now);
    SaleRecord {
        id: uuid::Uuid::new_v4().to_string(),
        account_id: crate::DEFAULT_ACCOUNT_ID.to_string(),
        item_id: item_id.to_string(),
        item_name: item_name.to_string(),
        unit: SaleUnit::BaseUnit,
        unit_label: "tablet".to_string(),
        quantity: base_units,
        base_units,
        unit_price: UnitPrice::fraction(crate::money::Money::from_cents(total_cents), base_units),
        total_cents,
        sold_at,
        notes: None,
    }
}
