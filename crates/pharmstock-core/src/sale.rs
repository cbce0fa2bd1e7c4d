//! # Sale Processor
//!
//! Turns a sale request into a new quantity state plus a frozen sale record.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   SaleRequest ──validate()──► ValidatedSale ──commit()──► CommittedSale │
//! │   (Requested)       │          (Validated)                 (Committed)  │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │                 SaleError  (Rejected)                                   │
//! │                 ├── InvalidQuantity (incl. line total overflow)         │
//! │                 ├── InvalidUnit                                         │
//! │                 ├── InsufficientStock                                   │
//! │                 └── Validation (corrupt stored quantities)              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every step consumes or borrows immutably. A rejected or abandoned sale
//! leaves nothing behind; writing a committed sale to storage is the
//! caller's job (see [`crate::service::SaleService`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreResult, SaleError};
use crate::money::{Money, UnitPrice};
use crate::quantity::QuantityState;
use crate::types::{SaleRecord, SaleUnit, StockItem};
use crate::units::{to_base_units, unit_price};
use crate::validation::{parse_quantity, validate_quantity_state};

// =============================================================================
// Requested
// =============================================================================

/// Raw sale input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRequest {
    pub item_id: String,
    pub unit: SaleUnit,
    pub quantity: i64,
    pub notes: Option<String>,
}

impl SaleRequest {
    pub fn new(item_id: impl Into<String>, unit: SaleUnit, quantity: i64) -> Self {
        SaleRequest {
            item_id: item_id.into(),
            unit,
            quantity,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Builds a request from form text.
    ///
    /// ## Errors
    /// - `InvalidQuantity` for empty, fractional, non-numeric or non-positive
    ///   quantity text
    /// - `Validation` for an unknown unit name
    pub fn parse(item_id: &str, unit_text: &str, quantity_text: &str) -> CoreResult<Self> {
        let unit: SaleUnit = unit_text.parse()?;
        let quantity = parse_quantity(quantity_text)
            .map_err(|e| SaleError::invalid_quantity(e.to_string()))?;
        Ok(SaleRequest::new(item_id, unit, quantity))
    }

    /// Checks the request against `item` and computes the post-sale state.
    ///
    /// Does not modify `item`.
    pub fn validate(self, item: &StockItem) -> CoreResult<ValidatedSale> {
        if self.quantity <= 0 {
            return Err(SaleError::invalid_quantity(format!(
                "quantity must be a positive whole number, got {}",
                self.quantity
            )));
        }
        if self.item_id != item.id {
            return Err(SaleError::ItemNotFound(self.item_id));
        }
        validate_quantity_state(&item.quantity())?;

        let base_units = to_base_units(item, self.unit, self.quantity)?;
        let new_state =
            item.quantity()
                .decrement(base_units)
                .map_err(|e| SaleError::InsufficientStock {
                    item_id: item.id.clone(),
                    available: e.available,
                    requested: e.requested,
                })?;

        let price = unit_price(item, self.unit);
        let total = price.checked_total_for(self.quantity).ok_or_else(|| {
            SaleError::invalid_quantity(format!(
                "total for {} at {} per {} is too large",
                self.quantity,
                Money::from_cents(price.cents),
                price.per
            ))
        })?;
        Ok(ValidatedSale {
            total,
            unit_price: price,
            base_units,
            new_state,
            expected_version: item.sync_version,
            item: item.clone(),
            request: self,
        })
    }
}

// =============================================================================
// Validated
// =============================================================================

/// A sale that fits the current stock. Holds the price captured at
/// validation; a later price edit cannot change it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSale {
    /// Item as read, before the sale.
    pub item: StockItem,
    pub request: SaleRequest,
    pub base_units: i64,
    pub new_state: QuantityState,
    pub unit_price: UnitPrice,
    pub total: Money,
    /// Version a conditional write must find.
    pub expected_version: i64,
}

impl ValidatedSale {
    /// Applies the new state to a copy of the item and builds the record.
    pub fn commit(self, sold_at: DateTime<Utc>) -> CommittedSale {
        let record = SaleRecord {
            id: Uuid::new_v4().to_string(),
            account_id: self.item.account_id.clone(),
            item_id: self.item.id.clone(),
            item_name: self.item.name.clone(),
            unit: self.request.unit,
            unit_label: self.item.label_for(self.request.unit).to_string(),
            quantity: self.request.quantity,
            base_units: self.base_units,
            unit_price: self.unit_price,
            total_cents: self.total.cents(),
            sold_at,
            notes: self.request.notes,
        };

        let mut item = self.item.with_quantity(self.new_state);
        item.updated_at = sold_at;

        CommittedSale {
            item,
            record,
            expected_version: self.expected_version,
        }
    }
}

// =============================================================================
// Committed
// =============================================================================

/// Result of a successful sale, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedSale {
    /// Item with its post-sale quantities.
    pub item: StockItem,
    pub record: SaleRecord,
    pub expected_version: i64,
}

/// Runs one sale against an in-hand item: validate, then commit.
pub fn process_sale(
    item: &StockItem,
    request: SaleRequest,
    sold_at: DateTime<Utc>,
) -> CoreResult<CommittedSale> {
    Ok(request.validate(item)?.commit(sold_at))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::total_base_units;
    use crate::stock::{classify, StockLevel};
    use crate::testing::{opaque_item, standard_item};

    fn sell(item: &StockItem, unit: SaleUnit, quantity: i64) -> CoreResult<CommittedSale> {
        process_sale(item, SaleRequest::new(item.id.clone(), unit, quantity), Utc::now())
    }

    #[test]
    fn test_open_a_strip() {
        let item = standard_item(5, 10, 0);
        let sale = sell(&item, SaleUnit::BaseUnit, 3).unwrap();
        assert_eq!(sale.item.container_count, 4);
        assert_eq!(sale.item.loose_units, 7);
        assert_eq!(total_base_units(&sale.item), 47);
    }

    #[test]
    fn test_sell_the_loose_tablets() {
        let item = standard_item(4, 10, 7);
        let sale = sell(&item, SaleUnit::BaseUnit, 7).unwrap();
        assert_eq!(sale.item.container_count, 4);
        assert_eq!(sale.item.loose_units, 0);
        assert_eq!(total_base_units(&sale.item), 40);
    }

    #[test]
    fn test_sell_out() {
        let item = standard_item(1, 10, 0);
        let sale = sell(&item, SaleUnit::BaseUnit, 10).unwrap();
        assert_eq!(sale.item.container_count, 0);
        assert_eq!(sale.item.loose_units, 0);

        let status = classify(total_base_units(&sale.item), 10, 5);
        assert_eq!(status.level, StockLevel::Critical);
        assert_eq!(status.message, "out of stock");
    }

    #[test]
    fn test_oversell_is_rejected() {
        let item = standard_item(0, 10, 3);
        let err = sell(&item, SaleUnit::BaseUnit, 4).unwrap_err();
        assert_eq!(
            err,
            SaleError::InsufficientStock {
                item_id: item.id.clone(),
                available: 3,
                requested: 4
            }
        );
        assert_eq!(item.container_count, 0);
        assert_eq!(item.loose_units, 3);
    }

    #[test]
    fn test_split_sale_costs_the_same() {
        let mut item = standard_item(5, 10, 0);
        item.price_per_container_cents = 10_000;

        let strip = sell(&item, SaleUnit::Container, 1).unwrap();
        let tablet = sell(&strip.item, SaleUnit::BaseUnit, 1).unwrap();
        let eleven = sell(&item, SaleUnit::BaseUnit, 11).unwrap();

        assert_eq!(tablet.record.unit_price.per_unit().cents(), 1_000);
        assert_eq!(
            strip.record.total() + tablet.record.total(),
            eleven.record.total()
        );
        assert_eq!(total_base_units(&tablet.item), total_base_units(&eleven.item));
    }

    #[test]
    fn test_non_positive_quantity() {
        let item = standard_item(5, 10, 0);
        for qty in [0, -1] {
            assert!(matches!(
                sell(&item, SaleUnit::BaseUnit, qty),
                Err(SaleError::InvalidQuantity { .. })
            ));
        }
    }

    #[test]
    fn test_record_snapshot() {
        let mut item = standard_item(5, 10, 0);
        item.price_per_container_cents = 2_500;
        let sold_at = Utc::now();
        let sale = process_sale(
            &item,
            SaleRequest::new(item.id.clone(), SaleUnit::Container, 2).with_notes("walk-in"),
            sold_at,
        )
        .unwrap();

        let record = &sale.record;
        assert_eq!(record.item_id, item.id);
        assert_eq!(record.item_name, item.name);
        assert_eq!(record.unit, SaleUnit::Container);
        assert_eq!(record.unit_label, "strip");
        assert_eq!(record.quantity, 2);
        assert_eq!(record.base_units, 20);
        assert_eq!(record.total_cents, 5_000);
        assert_eq!(record.sold_at, sold_at);
        assert_eq!(record.notes.as_deref(), Some("walk-in"));
        assert!(Uuid::parse_str(&record.id).is_ok());
        assert_eq!(sale.expected_version, item.sync_version);
    }

    #[test]
    fn test_price_is_captured_at_validation() {
        let mut item = standard_item(5, 10, 0);
        item.price_per_container_cents = 1_000;
        let validated = SaleRequest::new(item.id.clone(), SaleUnit::Container, 1)
            .validate(&item)
            .unwrap();

        item.price_per_container_cents = 9_999;
        let sale = validated.commit(Utc::now());
        assert_eq!(sale.record.total_cents, 1_000);
    }

    #[test]
    fn test_ratio_and_price_untouched() {
        let item = standard_item(5, 10, 0);
        let sale = sell(&item, SaleUnit::BaseUnit, 13).unwrap();
        assert_eq!(sale.item.units_per_container, item.units_per_container);
        assert_eq!(
            sale.item.price_per_container_cents,
            item.price_per_container_cents
        );
    }

    #[test]
    fn test_opaque_sale() {
        let item = opaque_item(12);
        let sale = sell(&item, SaleUnit::Opaque, 5).unwrap();
        assert_eq!(sale.item.container_count, 7);
        assert_eq!(sale.item.loose_units, 0);
        assert!(matches!(
            sell(&item, SaleUnit::BaseUnit, 1),
            Err(SaleError::InvalidUnit { .. })
        ));
    }

    #[test]
    fn test_corrupt_stored_state_is_rejected() {
        let mut item = standard_item(1, 10, 0);
        item.loose_units = 12;
        assert!(matches!(
            sell(&item, SaleUnit::BaseUnit, 1),
            Err(SaleError::Validation(_))
        ));
    }

    #[test]
    fn test_mismatched_item() {
        let item = standard_item(5, 10, 0);
        let err = process_sale(
            &item,
            SaleRequest::new("someone-else", SaleUnit::BaseUnit, 1),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, SaleError::ItemNotFound("someone-else".to_string()));
    }

    #[test]
    fn test_total_too_large_is_rejected() {
        let mut item = standard_item(10_000, 10, 0);
        item.price_per_container_cents = 1_000_000_000_000_000;

        let err = sell(&item, SaleUnit::Container, 10_000).unwrap_err();
        assert!(matches!(err, SaleError::InvalidQuantity { .. }));

        // Small sales of the same item still go through
        let sale = sell(&item, SaleUnit::Container, 2).unwrap();
        assert_eq!(sale.record.total_cents, 2_000_000_000_000_000);
        assert!(sale.record.total_cents > 0);
    }

    #[test]
    fn test_parse_request() {
        let req = SaleRequest::parse("item-1", "strip", " 2 ").unwrap();
        assert_eq!(req.unit, SaleUnit::Container);
        assert_eq!(req.quantity, 2);

        assert!(matches!(
            SaleRequest::parse("item-1", "tablet", "2.5"),
            Err(SaleError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            SaleRequest::parse("item-1", "tablet", "-3"),
            Err(SaleError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            SaleRequest::parse("item-1", "crate", "3"),
            Err(SaleError::Validation(_))
        ));
    }
}
