//! # Catalog Filter
//!
//! Narrows and orders the item list shown at the counter.
//!
//! ```text
//! items ──► query ──► category ──► stock level ──► low / expiring ──► sort
//!           (name or  (exact)      (exact band)    (quick toggles,     (key,
//!           barcode)                                both must hold)     order)
//! ```
//!
//! Every criterion left at its default lets all items through, so
//! `ItemFilter::default()` only sorts by name.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use ts_rs::TS;

use crate::alerts::days_until_expiry;
use crate::stock::{classify, StockLevel, StockThresholds};
use crate::types::{ItemCategory, StockItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Name,
    /// Total base units on hand.
    Stock,
    /// Earliest expiry first; items without a date sort as never expiring.
    Expiry,
    Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Expiry window the "expiring soon" toggle checks against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExpiryWindow {
    #[ts(as = "String")]
    pub today: NaiveDate,
    pub days: i64,
}

/// Catalog filter and sort options.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct ItemFilter {
    /// Case-insensitive substring of the name or barcode. Blank matches all.
    pub query: String,
    pub category: Option<ItemCategory>,
    pub stock_level: Option<StockLevel>,
    /// Keep only low or critical items.
    pub low_stock_only: bool,
    /// Keep only items expiring within the window.
    pub expiring_soon: Option<ExpiryWindow>,
    pub sort_by: SortKey,
    pub order: SortOrder,
}

impl ItemFilter {
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn category(mut self, category: ItemCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn stock_level(mut self, level: StockLevel) -> Self {
        self.stock_level = Some(level);
        self
    }

    pub fn low_stock_only(mut self) -> Self {
        self.low_stock_only = true;
        self
    }

    pub fn expiring_within(mut self, today: NaiveDate, days: i64) -> Self {
        self.expiring_soon = Some(ExpiryWindow { today, days });
        self
    }

    pub fn sort(mut self, sort_by: SortKey, order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.order = order;
        self
    }

    /// True when `item` passes every criterion.
    pub fn matches(&self, item: &StockItem, thresholds: &StockThresholds) -> bool {
        let level = classify(
            item.quantity().total_base_units(),
            thresholds.low,
            thresholds.critical,
        )
        .level;

        matches_query(item, &self.query)
            && self.category.map_or(true, |c| item.category == c)
            && self.stock_level.map_or(true, |l| level == l)
            && (!self.low_stock_only || level.needs_attention())
            && self
                .expiring_soon
                .map_or(true, |w| days_until_expiry(item, w.today, w.days).is_some())
    }
}

fn matches_query(item: &StockItem, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    item.name.to_lowercase().contains(&query)
        || item
            .barcode
            .as_deref()
            .is_some_and(|code| code.to_lowercase().contains(&query))
}

const fn category_rank(category: ItemCategory) -> u8 {
    match category {
        ItemCategory::Standard => 0,
        ItemCategory::Opaque => 1,
    }
}

fn compare(a: &StockItem, b: &StockItem, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::Stock => a
            .quantity()
            .total_base_units()
            .cmp(&b.quantity().total_base_units()),
        SortKey::Expiry => match (a.expiry_date, b.expiry_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortKey::Category => category_rank(a.category).cmp(&category_rank(b.category)),
    }
}

/// Items passing `filter`, sorted by its key and order.
///
/// The sort is stable: items that compare equal keep their input order.
pub fn filter_items<'a>(
    items: &'a [StockItem],
    filter: &ItemFilter,
    thresholds: &StockThresholds,
) -> Vec<&'a StockItem> {
    let mut matched: Vec<&StockItem> = items
        .iter()
        .filter(|item| filter.matches(item, thresholds))
        .collect();

    matched.sort_by(|a, b| {
        let ordering = compare(a, b, filter.sort_by);
        match filter.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    matched
}

// =============================================================================
// Unit Tests
// =============================================================================
