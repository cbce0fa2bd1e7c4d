//! # Unit Converter
//!
//! Maps a sale quantity in any [`SaleUnit`] to base units, and derives the
//! price of one unit from the container price.
//!
//! ```text
//! ┌──────────────┬───────────────────────────┬──────────────────────────────┐
//! │ unit         │ base units for quantity q │ unit price                   │
//! ├──────────────┼───────────────────────────┼──────────────────────────────┤
//! │ BaseUnit     │ q                         │ price / units_per_container  │
//! │ Container    │ q × units_per_container   │ price                        │
//! │ Opaque       │ q                         │ price                        │
//! └──────────────┴───────────────────────────┴──────────────────────────────┘
//! ```
//!
//! Prices are derived on every call. Nothing here caches a per-unit price.

use crate::error::{CoreResult, SaleError};
use crate::money::UnitPrice;
use crate::quantity::total_base_units;
use crate::types::{ItemCategory, SaleUnit, StockItem};

/// Rejects units that make no sense for the item's category.
///
/// Opaque items have no base unit. Standard items have no opaque unit.
/// Selling an opaque item by "container" is allowed: for those items one
/// container is one unit.
pub fn check_unit(item: &StockItem, unit: SaleUnit) -> CoreResult<()> {
    let allowed = match (item.category, unit) {
        (ItemCategory::Standard, SaleUnit::BaseUnit | SaleUnit::Container) => true,
        (ItemCategory::Opaque, SaleUnit::Opaque | SaleUnit::Container) => true,
        (ItemCategory::Standard, SaleUnit::Opaque) => false,
        (ItemCategory::Opaque, SaleUnit::BaseUnit) => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(SaleError::InvalidUnit {
            item_id: item.id.clone(),
            unit,
            category: item.category,
        })
    }
}

/// Base units equivalent to `quantity` of `unit`.
///
/// ## Errors
/// - `InvalidUnit` when `unit` does not fit the item's category
/// - `InvalidQuantity` when the conversion overflows
pub fn to_base_units(item: &StockItem, unit: SaleUnit, quantity: i64) -> CoreResult<i64> {
    check_unit(item, unit)?;

    match unit {
        SaleUnit::BaseUnit | SaleUnit::Opaque => Ok(quantity),
        SaleUnit::Container => quantity
            .checked_mul(item.units_per_container)
            .ok_or_else(|| {
                SaleError::invalid_quantity(format!(
                    "{} containers of {} is too large",
                    quantity, item.units_per_container
                ))
            }),
    }
}

/// Price of one `unit` of `item`, read from the current container price.
pub fn unit_price(item: &StockItem, unit: SaleUnit) -> UnitPrice {
    match unit {
        SaleUnit::Container | SaleUnit::Opaque => UnitPrice::whole(item.price_per_container()),
        SaleUnit::BaseUnit => {
            UnitPrice::fraction(item.price_per_container(), item.units_per_container)
        }
    }
}

/// How many whole `unit`s can still be sold.
pub fn available_in(item: &StockItem, unit: SaleUnit) -> i64 {
    let total = total_base_units(item);
    match unit {
        SaleUnit::BaseUnit | SaleUnit::Opaque => total,
        SaleUnit::Container => total / item.units_per_container.max(1),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::testing::{opaque_item, standard_item};
    use proptest::prelude::*;

    #[test]
    fn test_container_round_trip() {
        let item = standard_item(5, 10, 0);
        assert_eq!(to_base_units(&item, SaleUnit::Container, 1).unwrap(), 10);
        assert_eq!(to_base_units(&item, SaleUnit::BaseUnit, 10).unwrap(), 10);
    }

    #[test]
    fn test_opaque_counts_one_for_one() {
        let item = opaque_item(12);
        assert_eq!(to_base_units(&item, SaleUnit::Opaque, 3).unwrap(), 3);
        assert_eq!(to_base_units(&item, SaleUnit::Container, 3).unwrap(), 3);
    }

    #[test]
    fn test_base_unit_on_opaque_item_is_rejected() {
        let item = opaque_item(12);
        let err = to_base_units(&item, SaleUnit::BaseUnit, 1).unwrap_err();
        assert_eq!(
            err,
            SaleError::InvalidUnit {
                item_id: item.id.clone(),
                unit: SaleUnit::BaseUnit,
                category: ItemCategory::Opaque,
            }
        );
    }

    #[test]
    fn test_opaque_unit_on_standard_item_is_rejected() {
        let item = standard_item(5, 10, 0);
        assert!(matches!(
            to_base_units(&item, SaleUnit::Opaque, 1),
            Err(SaleError::InvalidUnit { .. })
        ));
    }

    #[test]
    fn test_overflow_is_invalid_quantity() {
        let item = standard_item(5, 10, 0);
        assert!(matches!(
            to_base_units(&item, SaleUnit::Container, i64::MAX),
            Err(SaleError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn test_unit_price() {
        let mut item = standard_item(5, 10, 0);
        item.price_per_container_cents = 10_000;
        assert_eq!(unit_price(&item, SaleUnit::BaseUnit).per_unit().cents(), 1_000);
        assert_eq!(unit_price(&item, SaleUnit::Container).per_unit().cents(), 10_000);

        // a price edit shows up on the next call
        item.price_per_container_cents = 12_000;
        assert_eq!(unit_price(&item, SaleUnit::BaseUnit).per_unit().cents(), 1_200);
    }

    #[test]
    fn test_pricing_is_linear() {
        let mut item = standard_item(5, 10, 0);
        item.price_per_container_cents = 10_000;

        let strip = unit_price(&item, SaleUnit::Container).total_for(1);
        let tablet = unit_price(&item, SaleUnit::BaseUnit).total_for(1);
        let eleven = unit_price(&item, SaleUnit::BaseUnit).total_for(11);

        assert_eq!(strip + tablet, eleven);
        assert_eq!(eleven, Money::from_cents(11_000));
    }

    #[test]
    fn test_available_in() {
        let item = standard_item(4, 10, 7);
        assert_eq!(available_in(&item, SaleUnit::BaseUnit), 47);
        assert_eq!(available_in(&item, SaleUnit::Container), 4);
        assert_eq!(available_in(&opaque_item(12), SaleUnit::Opaque), 12);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_containers_price_like_their_base_units(
            per in 1i64..100,
            containers in 0i64..50,
            price in 0i64..100_000,
        ) {
            let mut item = standard_item(100, per, 0);
            item.price_per_container_cents = price;

            let by_container = unit_price(&item, SaleUnit::Container).total_for(containers);
            let base = to_base_units(&item, SaleUnit::Container, containers).unwrap();
            let by_base = unit_price(&item, SaleUnit::BaseUnit).total_for(base);
            prop_assert_eq!(by_container, by_base);
        }
    }
}
