//! # Domain Types
//!
//! Core domain types used throughout pharmstock.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────┐   ┌─────────────────────┐                     │
//! │  │     StockItem       │   │     SaleRecord      │                     │
//! │  │  ─────────────────  │   │  ─────────────────  │                     │
//! │  │  id (UUID)          │◄──│  item_id (FK)       │                     │
//! │  │  container_count    │   │  unit, quantity     │                     │
//! │  │  units_per_container│   │  base_units         │                     │
//! │  │  loose_units        │   │  unit_price (frozen)│                     │
//! │  │  price_per_container│   │  total_cents        │                     │
//! │  │  sync_version       │   │  sold_at            │                     │
//! │  └─────────────────────┘   └─────────────────────┘                     │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ItemCategory   │   │    SaleUnit     │   │ AccountSettings │       │
//! │  │  Standard       │   │  BaseUnit       │   │  thresholds     │       │
//! │  │  Opaque         │   │  Container      │   │  expiry window  │       │
//! │  └─────────────────┘   │  Opaque         │   │  currency       │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two Representations, One Quantity
//! A stock item stores `container_count` full containers plus `loose_units`
//! from one opened container. The total in base units is always derived,
//! never stored:
//!
//! ```text
//! total = container_count × units_per_container + loose_units
//!         with 0 <= loose_units < units_per_container
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{Money, UnitPrice};
use crate::quantity::QuantityState;
use crate::{
    DEFAULT_CRITICAL_STOCK_THRESHOLD, DEFAULT_EXPIRY_ALERT_DAYS, DEFAULT_LOW_STOCK_THRESHOLD,
};

/// Default base-unit label for standard items.
pub const DEFAULT_BASE_UNIT_LABEL: &str = "tablet";
/// Default container label for standard items.
pub const DEFAULT_CONTAINER_LABEL: &str = "strip";
/// Default unit label for opaque items.
pub const DEFAULT_OPAQUE_LABEL: &str = "piece";

// =============================================================================
// Item Category
// =============================================================================

/// Whether an item can be broken down into base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    /// Divisible: strips of tablets, boxes of sachets.
    #[serde(alias = "medicine")]
    Standard,
    /// Sold only in whole declared units: bottles, tubes, devices.
    #[serde(alias = "other")]
    Opaque,
}

impl ItemCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Standard => "standard",
            ItemCategory::Opaque => "opaque",
        }
    }
}

impl Default for ItemCategory {
    fn default() -> Self {
        ItemCategory::Standard
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Sale Unit
// =============================================================================

/// The unit a sale quantity is expressed in.
///
/// Display labels ("strip", "bottle") live on the item, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleUnit {
    /// Smallest sellable division of a standard item (one tablet).
    BaseUnit,
    /// One full container of a standard item (one strip).
    Container,
    /// One undivided unit of an opaque item.
    Opaque,
}

impl SaleUnit {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SaleUnit::BaseUnit => "base_unit",
            SaleUnit::Container => "container",
            SaleUnit::Opaque => "opaque",
        }
    }

    /// Canonical names plus the free-text unit names found in older data.
    pub const ACCEPTED: [&'static str; 11] = [
        "base_unit",
        "container",
        "opaque",
        "tablet",
        "strip",
        "pack",
        "box",
        "bottle",
        "piece",
        "other",
        "unit",
    ];
}

impl fmt::Display for SaleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SaleUnit {
    type Err = ValidationError;

    /// Parses a unit name, case-insensitively.
    ///
    /// ```text
    /// "base_unit" | "tablet" | "unit"          → BaseUnit
    /// "container" | "strip"  | "pack" | "box"  → Container
    /// "opaque"    | "bottle" | "piece"| "other"→ Opaque
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base_unit" | "tablet" | "tablets" | "unit" => Ok(SaleUnit::BaseUnit),
            "container" | "strip" | "strips" | "pack" | "box" => Ok(SaleUnit::Container),
            "opaque" | "bottle" | "piece" | "other" => Ok(SaleUnit::Opaque),
            _ => Err(ValidationError::NotAllowed {
                field: "unit".to_string(),
                allowed: SaleUnit::ACCEPTED.iter().map(|s| s.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Stock Item
// =============================================================================

/// An inventory entry.
///
/// `container_count` and `loose_units` change only through the sale path or
/// a full-replacement edit. `units_per_container` and
/// `price_per_container_cents` are never touched by a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Account (shop) that owns this item.
    pub account_id: String,

    /// Display name shown at the counter.
    pub name: String,

    pub category: ItemCategory,

    /// Full, unopened containers on hand.
    pub container_count: i64,

    /// Base units in one full container. Always 1 for opaque items.
    pub units_per_container: i64,

    /// Base units left in the opened container, `[0, units_per_container)`.
    pub loose_units: i64,

    /// Price of one full container in minor units.
    pub price_per_container_cents: i64,

    /// Unit the item is normally sold in.
    pub declared_sale_unit: SaleUnit,

    /// Label for one container (or one opaque unit), e.g. "strip", "bottle".
    pub container_label: Option<String>,

    /// Label for one base unit, e.g. "tablet", "capsule".
    pub base_unit_label: Option<String>,

    /// Scanned product code. Unique within an account when set.
    pub barcode: Option<String>,

    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
    pub batch_number: Option<String>,
    pub manufacturer: Option<String>,
    pub description: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    /// Bumped on every write; the version a conditional write expects.
    pub sync_version: i64,
}

impl StockItem {
    /// Returns the container price as Money.
    #[inline]
    pub fn price_per_container(&self) -> Money {
        Money::from_cents(self.price_per_container_cents)
    }

    /// The quantity fields as a standalone value.
    #[inline]
    pub fn quantity(&self) -> QuantityState {
        QuantityState {
            container_count: self.container_count,
            units_per_container: self.units_per_container,
            loose_units: self.loose_units,
        }
    }

    /// Copy of this item holding `state`. Ratio and price fields are kept.
    pub fn with_quantity(&self, state: QuantityState) -> StockItem {
        StockItem {
            container_count: state.container_count,
            loose_units: state.loose_units,
            ..self.clone()
        }
    }

    #[inline]
    pub fn is_opaque(&self) -> bool {
        self.category == ItemCategory::Opaque
    }

    /// Singular label for one container (or one opaque unit).
    pub fn container_label(&self) -> &str {
        match (&self.container_label, self.category) {
            (Some(label), _) if !label.trim().is_empty() => label,
            (_, ItemCategory::Opaque) => DEFAULT_OPAQUE_LABEL,
            (_, ItemCategory::Standard) => DEFAULT_CONTAINER_LABEL,
        }
    }

    /// Singular label for one base unit. Opaque items reuse the container
    /// label.
    pub fn base_unit_label(&self) -> &str {
        if self.is_opaque() {
            return self.container_label();
        }
        match &self.base_unit_label {
            Some(label) if !label.trim().is_empty() => label,
            _ => DEFAULT_BASE_UNIT_LABEL,
        }
    }

    /// Singular label for a sale unit on this item.
    pub fn label_for(&self, unit: SaleUnit) -> &str {
        match unit {
            SaleUnit::BaseUnit => self.base_unit_label(),
            SaleUnit::Container | SaleUnit::Opaque => self.container_label(),
        }
    }
}

/// `"1 strip"`, `"3 strips"`, `"2 boxes"`.
pub fn count_label(count: i64, label: &str) -> String {
    if count == 1 {
        return format!("{} {}", count, label);
    }
    let plural = if label.ends_with('s')
        || label.ends_with('x')
        || label.ends_with("ch")
        || label.ends_with("sh")
    {
        format!("{}es", label)
    } else {
        format!("{}s", label)
    };
    format!("{} {}", count, plural)
}

// =============================================================================
// Sale Record
// =============================================================================

/// One completed sale. Immutable once created.
///
/// Uses snapshot pattern: name, label and unit price are frozen at commit
/// time, so later edits to the item never alter a recorded amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRecord {
    pub id: String,
    pub account_id: String,
    pub item_id: String,
    /// Item name at time of sale (frozen).
    pub item_name: String,
    /// Unit the quantity is expressed in.
    pub unit: SaleUnit,
    /// Display label of `unit` at time of sale (frozen).
    pub unit_label: String,
    /// Quantity sold, in `unit`.
    pub quantity: i64,
    /// Quantity sold, in base units.
    pub base_units: i64,
    /// Price of one `unit` at time of sale (frozen).
    pub unit_price: UnitPrice,
    /// `unit_price.total_for(quantity)`, computed once.
    pub total_cents: i64,
    #[ts(as = "String")]
    pub sold_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl SaleRecord {
    /// Returns the frozen total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Calendar day of the sale (UTC).
    #[inline]
    pub fn sale_date(&self) -> NaiveDate {
        self.sold_at.date_naive()
    }
}

// =============================================================================
// Account Settings
// =============================================================================

/// Per-account configuration consumed by the classifier and alerts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct AccountSettings {
    pub account_id: String,
    /// At or below this many base units an item is "low".
    pub low_stock_threshold: i64,
    /// At or below this many base units an item is "critical".
    pub critical_stock_threshold: i64,
    /// Items expiring within this many days raise an alert.
    pub expiry_alert_days: i64,
    pub currency_symbol: String,
    pub notifications_enabled: bool,
}

impl AccountSettings {
    /// Default settings for an account with no stored row.
    pub fn defaults_for(account_id: impl Into<String>) -> Self {
        AccountSettings {
            account_id: account_id.into(),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            critical_stock_threshold: DEFAULT_CRITICAL_STOCK_THRESHOLD,
            expiry_alert_days: DEFAULT_EXPIRY_ALERT_DAYS,
            currency_symbol: "₹".to_string(),
            notifications_enabled: true,
        }
    }

    /// Formats an amount with this account's currency symbol.
    pub fn format_money(&self, money: Money) -> String {
        money.format_with(&self.currency_symbol)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_item() -> StockItem {
        let now = Utc::now();
        StockItem {
            id: "item-1".to_string(),
            account_id: "acct".to_string(),
            name: "Paracetamol 500mg".to_string(),
            category: ItemCategory::Standard,
            container_count: 5,
            units_per_container: 10,
            loose_units: 3,
            price_per_container_cents: 10_000,
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

    #[test]
    fn test_sale_unit_from_str() {
        assert_eq!("tablet".parse::<SaleUnit>().unwrap(), SaleUnit::BaseUnit);
        assert_eq!("Strip".parse::<SaleUnit>().unwrap(), SaleUnit::Container);
        assert_eq!(" box ".parse::<SaleUnit>().unwrap(), SaleUnit::Container);
        assert_eq!("bottle".parse::<SaleUnit>().unwrap(), SaleUnit::Opaque);
        assert_eq!("opaque".parse::<SaleUnit>().unwrap(), SaleUnit::Opaque);
        assert!(matches!(
            "crate".parse::<SaleUnit>(),
            Err(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_display_matches_serde() {
        assert_eq!(SaleUnit::BaseUnit.to_string(), "base_unit");
        assert_eq!(
            serde_json::to_string(&SaleUnit::BaseUnit).unwrap(),
            "\"base_unit\""
        );
        assert_eq!(ItemCategory::Opaque.to_string(), "opaque");
    }

    #[test]
    fn test_legacy_category_names() {
        let cat: ItemCategory = serde_json::from_str("\"medicine\"").unwrap();
        assert_eq!(cat, ItemCategory::Standard);
        let cat: ItemCategory = serde_json::from_str("\"other\"").unwrap();
        assert_eq!(cat, ItemCategory::Opaque);
    }

    #[test]
    fn test_default_labels() {
        let item = strip_item();
        assert_eq!(item.container_label(), "strip");
        assert_eq!(item.base_unit_label(), "tablet");

        let mut bottle = strip_item();
        bottle.category = ItemCategory::Opaque;
        bottle.container_label = Some("bottle".to_string());
        assert_eq!(bottle.base_unit_label(), "bottle");
        assert_eq!(bottle.label_for(SaleUnit::Opaque), "bottle");

        bottle.container_label = Some("  ".to_string());
        assert_eq!(bottle.container_label(), "piece");
    }

    #[test]
    fn test_count_label() {
        assert_eq!(count_label(1, "strip"), "1 strip");
        assert_eq!(count_label(0, "tablet"), "0 tablets");
        assert_eq!(count_label(2, "box"), "2 boxes");
        assert_eq!(count_label(3, "bottle"), "3 bottles");
    }

    #[test]
    fn test_with_quantity_keeps_ratio_and_price() {
        let item = strip_item();
        let updated = item.with_quantity(QuantityState {
            container_count: 1,
            units_per_container: 10,
            loose_units: 9,
        });
        assert_eq!(updated.container_count, 1);
        assert_eq!(updated.loose_units, 9);
        assert_eq!(updated.units_per_container, 10);
        assert_eq!(updated.price_per_container_cents, 10_000);
        assert_eq!(updated.sync_version, item.sync_version);
    }

    #[test]
    fn test_account_defaults() {
        let settings = AccountSettings::defaults_for("acct");
        assert_eq!(settings.low_stock_threshold, 10);
        assert_eq!(settings.critical_stock_threshold, 5);
        assert_eq!(settings.expiry_alert_days, 30);
        assert_eq!(settings.format_money(Money::from_cents(4_250)), "₹42.50");
    }
}
