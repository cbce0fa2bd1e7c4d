//! # Stock Classifier
//!
//! Maps a base-unit total onto a three-level status.
//!
//! ```text
//!   0          critical           low
//!   │────────────│─────────────────│──────────────────────────►  base units
//!   │  CRITICAL  │    CRITICAL     │      LOW      │    GOOD
//!   │ "out of    │  "only N left"  │ "low stock:   │  "N in stock"
//!   │  stock"    │                 │   N left"     │
//! ```
//!
//! Bands are inclusive at the top: a total equal to `critical` is critical,
//! equal to `low` is low. When `critical > low` the low band is simply empty.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::types::{count_label, AccountSettings, StockItem};
use crate::{DEFAULT_CRITICAL_STOCK_THRESHOLD, DEFAULT_LOW_STOCK_THRESHOLD};

// =============================================================================
// Stock Level
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    Good,
    Low,
    Critical,
}

impl StockLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            StockLevel::Good => "good",
            StockLevel::Low => "low",
            StockLevel::Critical => "critical",
        }
    }

    /// True for `Low` and `Critical`.
    #[inline]
    pub fn needs_attention(&self) -> bool {
        !matches!(self, StockLevel::Good)
    }
}

impl fmt::Display for StockLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Thresholds
// =============================================================================

/// Low and critical limits, in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockThresholds {
    pub low: i64,
    pub critical: i64,
}

impl StockThresholds {
    pub const fn new(low: i64, critical: i64) -> Self {
        StockThresholds { low, critical }
    }
}

impl Default for StockThresholds {
    fn default() -> Self {
        StockThresholds {
            low: DEFAULT_LOW_STOCK_THRESHOLD,
            critical: DEFAULT_CRITICAL_STOCK_THRESHOLD,
        }
    }
}

impl From<&AccountSettings> for StockThresholds {
    fn from(settings: &AccountSettings) -> Self {
        StockThresholds {
            low: settings.low_stock_threshold,
            critical: settings.critical_stock_threshold,
        }
    }
}

// =============================================================================
// Classification
// =============================================================================

/// Output of [`classify`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockStatus {
    pub level: StockLevel,
    pub message: String,
}

/// Classifies a base-unit total against two thresholds.
///
/// Pure: the same three inputs always give the same status.
pub fn classify(total_base_units: i64, low_threshold: i64, critical_threshold: i64) -> StockStatus {
    let (level, message) = if total_base_units <= 0 {
        (StockLevel::Critical, "out of stock".to_string())
    } else if total_base_units <= critical_threshold {
        (StockLevel::Critical, format!("only {} left", total_base_units))
    } else if total_base_units <= low_threshold {
        (StockLevel::Low, format!("low stock: {} left", total_base_units))
    } else {
        (StockLevel::Good, format!("{} in stock", total_base_units))
    };

    StockStatus { level, message }
}

// =============================================================================
// Stock Info
// =============================================================================

/// Stock summary of one item, worded with the item's own labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockInfo {
    pub total_base_units: i64,
    pub level: StockLevel,
    pub message: String,
}

/// Classifies `item` and describes its stock for display.
///
/// ```text
/// total 0                    → "Out of stock"
/// critical                   → "Only 3 tablets left"
/// low                        → "Low stock: 8 tablets"
/// good, loose > 0            → "4 strips + 7 tablets"
/// good, loose = 0            → "5 strips (50 tablets)"
/// good, opaque               → "12 bottles"
/// ```
pub fn stock_info(item: &StockItem, thresholds: &StockThresholds) -> StockInfo {
    let state = item.quantity();
    let total = state.total_base_units();
    let status = classify(total, thresholds.low, thresholds.critical);
    let base = item.base_unit_label();

    let message = match status.level {
        _ if total <= 0 => "Out of stock".to_string(),
        StockLevel::Critical => format!("Only {} left", count_label(total, base)),
        StockLevel::Low => format!("Low stock: {}", count_label(total, base)),
        StockLevel::Good if item.is_opaque() => count_label(total, item.container_label()),
        StockLevel::Good if state.loose_units > 0 => format!(
            "{} + {}",
            count_label(state.container_count, item.container_label()),
            count_label(state.loose_units, base)
        ),
        StockLevel::Good => format!(
            "{} ({})",
            count_label(state.container_count, item.container_label()),
            count_label(total, base)
        ),
    };

    StockInfo {
        total_base_units: total,
        level: status.level,
        message,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{opaque_item, standard_item};
    use proptest::prelude::*;

    #[test]
    fn test_out_of_stock() {
        let status = classify(0, 10, 5);
        assert_eq!(status.level, StockLevel::Critical);
        assert_eq!(status.message, "out of stock");
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(classify(1, 10, 5).level, StockLevel::Critical);
        assert_eq!(classify(5, 10, 5).level, StockLevel::Critical);
        assert_eq!(classify(6, 10, 5).level, StockLevel::Low);
        assert_eq!(classify(10, 10, 5).level, StockLevel::Low);
        assert_eq!(classify(11, 10, 5).level, StockLevel::Good);
    }

    #[test]
    fn test_messages_carry_counts() {
        assert_eq!(classify(3, 10, 5).message, "only 3 left");
        assert_eq!(classify(8, 10, 5).message, "low stock: 8 left");
        assert_eq!(classify(47, 10, 5).message, "47 in stock");
    }

    #[test]
    fn test_reversed_thresholds_have_no_low_band() {
        // critical above low
        assert_eq!(classify(7, 5, 10).level, StockLevel::Critical);
        assert_eq!(classify(10, 5, 10).level, StockLevel::Critical);
        assert_eq!(classify(11, 5, 10).level, StockLevel::Good);
    }

    #[test]
    fn test_default_thresholds() {
        assert_eq!(StockThresholds::default(), StockThresholds::new(10, 5));
    }

    #[test]
    fn test_stock_info_messages() {
        let t = StockThresholds::default();
        assert_eq!(stock_info(&standard_item(0, 10, 0), &t).message, "Out of stock");
        assert_eq!(
            stock_info(&standard_item(0, 10, 3), &t).message,
            "Only 3 tablets left"
        );
        assert_eq!(
            stock_info(&standard_item(0, 10, 8), &t).message,
            "Low stock: 8 tablets"
        );
        assert_eq!(
            stock_info(&standard_item(4, 10, 7), &t).message,
            "4 strips + 7 tablets"
        );
        assert_eq!(
            stock_info(&standard_item(5, 10, 0), &t).message,
            "5 strips (50 tablets)"
        );
        assert_eq!(
            stock_info(&standard_item(1, 20, 1), &t).message,
            "1 strip + 1 tablet"
        );

        let mut syrup = opaque_item(12);
        syrup.container_label = Some("bottle".to_string());
        let info = stock_info(&syrup, &t);
        assert_eq!(info.message, "12 bottles");
        assert_eq!(info.total_base_units, 12);
        assert_eq!(info.level, StockLevel::Good);
    }

    proptest! {
        #[test]
        fn prop_classify_is_pure(total in -5i64..500, low in 0i64..100, critical in 0i64..100) {
            prop_assert_eq!(classify(total, low, critical), classify(total, low, critical));
        }

        #[test]
        fn prop_zero_or_below_is_always_critical(low in 0i64..100, critical in 0i64..100) {
            prop_assert_eq!(classify(0, low, critical).level, StockLevel::Critical);
        }
    }
}
