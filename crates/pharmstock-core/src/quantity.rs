//! # Quantity Model
//!
//! The two-level (container, loose) stock encoding and its only mutation.
//!
//! ## Decrement Walkthrough
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  5 strips × 10 tablets, 0 loose          sell 3 tablets                 │
//! │                                                                         │
//! │  1. take from loose:   min(3, 0) = 0     still need 3                   │
//! │  2. whole strips:      3 / 10   = 0      still need 3                   │
//! │  3. open one strip:    10 - 3   = 7 loose                               │
//! │                                                                         │
//! │  result: 4 strips + 7 loose = 47 tablets                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here mutates in place. [`apply_decrement`] returns a new
//! [`QuantityState`] and the caller decides whether to commit it.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::InsufficientStock;
use crate::types::StockItem;

// =============================================================================
// Quantity State
// =============================================================================

/// On-hand stock of one item, detached from the item record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuantityState {
    /// Full, unopened containers.
    pub container_count: i64,
    /// Base units per full container. Never changed by a decrement.
    pub units_per_container: i64,
    /// Base units from the opened container, `[0, units_per_container)`.
    pub loose_units: i64,
}

impl QuantityState {
    pub const fn new(container_count: i64, units_per_container: i64, loose_units: i64) -> Self {
        QuantityState {
            container_count,
            units_per_container,
            loose_units,
        }
    }

    /// Packs a base-unit total into full containers plus a remainder.
    ///
    /// Used by manual stock edits that enter a single total.
    pub fn from_base_units(total: i64, units_per_container: i64) -> Self {
        let per = units_per_container.max(1);
        let total = total.max(0);
        QuantityState {
            container_count: total / per,
            units_per_container: per,
            loose_units: total % per,
        }
    }

    /// `container_count × units_per_container + loose_units`.
    ///
    /// Saturates at `i64::MAX`. States that pass
    /// [`validate_quantity_state`](crate::validation::validate_quantity_state)
    /// never reach the cap, and the sale path validates before it counts.
    #[inline]
    pub fn total_base_units(&self) -> i64 {
        self.container_count
            .saturating_mul(self.units_per_container)
            .saturating_add(self.loose_units)
    }

    /// True when every field is in range.
    pub fn is_valid(&self) -> bool {
        self.units_per_container >= 1
            && self.container_count >= 0
            && self.loose_units >= 0
            && self.loose_units < self.units_per_container
    }

    /// Removes `base_units` from this state, all or nothing.
    ///
    /// Loose units go first. Then whole containers are consumed, and a
    /// remainder opens one more container leaving
    /// `units_per_container - remainder` loose. A zero amount returns the
    /// state unchanged.
    pub fn decrement(&self, base_units: i64) -> Result<QuantityState, InsufficientStock> {
        debug_assert!(base_units >= 0, "negative decrement: {}", base_units);
        if base_units <= 0 {
            return Ok(*self);
        }

        let available = self.total_base_units();
        if base_units > available {
            return Err(InsufficientStock {
                available,
                requested: base_units,
            });
        }

        let taken_from_loose = base_units.min(self.loose_units);
        let mut loose_units = self.loose_units - taken_from_loose;
        let to_remove = base_units - taken_from_loose;
        if to_remove == 0 {
            return Ok(QuantityState {
                loose_units,
                ..*self
            });
        }

        let per = self.units_per_container;
        let mut container_count = self.container_count - to_remove / per;
        let partial = to_remove % per;
        if partial > 0 {
            container_count -= 1;
            loose_units = per - partial;
        }

        Ok(QuantityState {
            container_count,
            units_per_container: per,
            loose_units,
        })
    }
}

// =============================================================================
// Item-Level Operations
// =============================================================================

/// Total base units on hand for `item`.
#[inline]
pub fn total_base_units(item: &StockItem) -> i64 {
    item.quantity().total_base_units()
}

/// The state `item` would have after selling `base_units`.
///
/// `item` itself is never touched; on failure there is nothing to undo.
pub fn apply_decrement(
    item: &StockItem,
    base_units: i64,
) -> Result<QuantityState, InsufficientStock> {
    item.quantity().decrement(base_units)
}

// =============================================================================
// Unit Tests
// =============================================================================
