//! Fixtures shared by the database tests.

use chrono::{NaiveDate, TimeZone, Utc};

use pharmstock_core::units::unit_price;
use pharmstock_core::{ItemCategory, SaleRecord, SaleUnit, StockItem, DEFAULT_ACCOUNT_ID};

/// Standard item priced at 10.00 per container.
pub(crate) fn standard_item(name: &str, containers: i64, per: i64, loose: i64) -> StockItem {
    let now = Utc::now();
    StockItem {
        id: uuid::Uuid::new_v4().to_string(),
        account_id: DEFAULT_ACCOUNT_ID.to_string(),
        name: name.to_string(),
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
pub(crate) fn opaque_item(name: &str, count: i64) -> StockItem {
    StockItem {
        category: ItemCategory::Opaque,
        declared_sale_unit: SaleUnit::Opaque,
        container_label: Some("bottle".to_string()),
        price_per_container_cents: 12_000,
        ..standard_item(name, count, 1, 0)
    }
}

/// Base-unit sale of `item` at noon UTC on `date`.
pub(crate) fn record_for(item: &StockItem, date: NaiveDate, base_units: i64) -> SaleRecord {
    let price = unit_price(item, SaleUnit::BaseUnit);
    let sold_at = date
        .and_hms_opt(12, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .unwrap_or_else(Utc::now);
    SaleRecord {
        id: uuid::Uuid::new_v4().to_string(),
        account_id: item.account_id.clone(),
        item_id: item.id.clone(),
        item_name: item.name.clone(),
        unit: SaleUnit::BaseUnit,
        unit_label: item.base_unit_label().to_string(),
        quantity: base_units,
        base_units,
        unit_price: price,
        total_cents: price.total_for(base_units).cents(),
        sold_at,
        notes: None,
    }
}
