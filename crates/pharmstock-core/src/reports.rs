//! # Reports
//!
//! Pure aggregations over sale records and stock items.
//!
//! Quantities are aggregated in base units. A sale of "2 strips" and one of
//! "3 tablets" add up to 23 base units, never to 5 of anything.
//!
//! ## Periods
//! ```text
//! Week     Sunday ─────────────► Saturday       (the week containing today)
//! Month    1st ────────────────► last day        (the month containing today)
//! Quarter  today − 90 days ────► today
//! ```

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::alerts::days_until_expiry;
use crate::money::{Money, UnitPrice};
use crate::stock::{classify, StockLevel, StockThresholds};
use crate::types::{ItemCategory, SaleRecord, StockItem};

/// Number of items listed in [`SalesSummary::top_items`].
pub const TOP_ITEMS: usize = 5;

// =============================================================================
// Daily Sales
// =============================================================================

/// Sales of one item within a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemSales {
    pub item_id: String,
    pub item_name: String,
    pub base_units: i64,
    pub revenue_cents: i64,
}

/// Totals for one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailySales {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub sale_count: i64,
    pub base_units_sold: i64,
    pub revenue_cents: i64,
    /// Per-item breakdown in first-sold order.
    pub items: Vec<ItemSales>,
}

impl DailySales {
    pub fn revenue(&self) -> Money {
        Money::from_cents(self.revenue_cents)
    }
}

/// Groups records by sale date, newest day first.
pub fn daily_sales(records: &[SaleRecord]) -> Vec<DailySales> {
    let mut days: BTreeMap<NaiveDate, DailySales> = BTreeMap::new();

    for record in records {
        let date = record.sale_date();
        let day = days.entry(date).or_insert_with(|| DailySales {
            date,
            sale_count: 0,
            base_units_sold: 0,
            revenue_cents: 0,
            items: Vec::new(),
        });

        day.sale_count += 1;
        day.base_units_sold += record.base_units;
        day.revenue_cents += record.total_cents;
        add_item_sales(&mut day.items, record);
    }

    days.into_values().rev().collect()
}

fn add_item_sales(items: &mut Vec<ItemSales>, record: &SaleRecord) {
    match items.iter_mut().find(|i| i.item_id == record.item_id) {
        Some(existing) => {
            existing.base_units += record.base_units;
            existing.revenue_cents += record.total_cents;
        }
        None => items.push(ItemSales {
            item_id: record.item_id.clone(),
            item_name: record.item_name.clone(),
            base_units: record.base_units,
            revenue_cents: record.total_cents,
        }),
    }
}

/// Revenue taken on `day`.
pub fn revenue_on(records: &[SaleRecord], day: NaiveDate) -> Money {
    records
        .iter()
        .filter(|r| r.sale_date() == day)
        .map(SaleRecord::total)
        .sum()
}

// =============================================================================
// Periods
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    Week,
    Month,
    Quarter,
}

impl Default for ReportPeriod {
    fn default() -> Self {
        ReportPeriod::Month
    }
}

impl ReportPeriod {
    /// Inclusive `(from, to)` dates of this period around `today`.
    pub fn range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            ReportPeriod::Week => {
                let back = u64::from(today.weekday().num_days_from_sunday());
                let start = today.checked_sub_days(Days::new(back)).unwrap_or(today);
                let end = start.checked_add_days(Days::new(6)).unwrap_or(today);
                (start, end)
            }
            ReportPeriod::Month => {
                let start = today.with_day(1).unwrap_or(today);
                let end = start
                    .checked_add_months(chrono::Months::new(1))
                    .and_then(|next| next.pred_opt())
                    .unwrap_or(today);
                (start, end)
            }
            ReportPeriod::Quarter => {
                let start = today.checked_sub_days(Days::new(90)).unwrap_or(today);
                (start, today)
            }
        }
    }
}

// =============================================================================
// Sales Summary
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyRevenue {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub revenue_cents: i64,
}

/// Sales between two dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesSummary {
    #[ts(as = "String")]
    pub from: NaiveDate,
    #[ts(as = "String")]
    pub to: NaiveDate,
    pub sale_count: i64,
    pub base_units_sold: i64,
    pub revenue_cents: i64,
    /// Best sellers by base units, at most [`TOP_ITEMS`].
    pub top_items: Vec<ItemSales>,
    /// Revenue per day that had sales, oldest first.
    pub daily_revenue: Vec<DailyRevenue>,
}

impl SalesSummary {
    pub fn revenue(&self) -> Money {
        Money::from_cents(self.revenue_cents)
    }
}

/// Summarises records sold on `from..=to`.
pub fn sales_summary(records: &[SaleRecord], from: NaiveDate, to: NaiveDate) -> SalesSummary {
    let in_range: Vec<&SaleRecord> = records
        .iter()
        .filter(|r| (from..=to).contains(&r.sale_date()))
        .collect();

    let mut per_item: Vec<ItemSales> = Vec::new();
    let mut per_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for record in &in_range {
        add_item_sales(&mut per_item, record);
        *per_day.entry(record.sale_date()).or_default() += record.total_cents;
    }

    per_item.sort_by(|a, b| {
        b.base_units
            .cmp(&a.base_units)
            .then_with(|| a.item_name.cmp(&b.item_name))
    });
    per_item.truncate(TOP_ITEMS);

    SalesSummary {
        from,
        to,
        sale_count: in_range.len() as i64,
        base_units_sold: in_range.iter().map(|r| r.base_units).sum(),
        revenue_cents: in_range.iter().map(|r| r.total_cents).sum(),
        top_items: per_item,
        daily_revenue: per_day
            .into_iter()
            .map(|(date, revenue_cents)| DailyRevenue {
                date,
                revenue_cents,
            })
            .collect(),
    }
}

/// [`sales_summary`] over a named period.
pub fn period_summary(
    records: &[SaleRecord],
    period: ReportPeriod,
    today: NaiveDate,
) -> SalesSummary {
    let (from, to) = period.range(today);
    sales_summary(records, from, to)
}

// =============================================================================
// Inventory
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryCount {
    pub category: ItemCategory,
    pub count: i64,
}

/// Snapshot of all stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventorySummary {
    pub item_count: i64,
    pub total_base_units: i64,
    pub out_of_stock: i64,
    /// Critical items, including those out of stock.
    pub critical: i64,
    pub low: i64,
    /// On-hand stock valued at container price.
    pub stock_value_cents: i64,
    pub by_category: Vec<CategoryCount>,
}

pub fn inventory_summary(items: &[StockItem], thresholds: &StockThresholds) -> InventorySummary {
    let mut summary = InventorySummary {
        item_count: items.len() as i64,
        total_base_units: 0,
        out_of_stock: 0,
        critical: 0,
        low: 0,
        stock_value_cents: 0,
        by_category: Vec::new(),
    };
    let mut standard = 0;
    let mut opaque = 0;

    for item in items {
        let total = item.quantity().total_base_units();
        summary.total_base_units += total;
        summary.stock_value_cents +=
            UnitPrice::fraction(item.price_per_container(), item.units_per_container)
                .total_for(total)
                .cents();

        if total == 0 {
            summary.out_of_stock += 1;
        }
        match classify(total, thresholds.low, thresholds.critical).level {
            StockLevel::Critical => summary.critical += 1,
            StockLevel::Low => summary.low += 1,
            StockLevel::Good => {}
        }
        match item.category {
            ItemCategory::Standard => standard += 1,
            ItemCategory::Opaque => opaque += 1,
        }
    }

    summary.by_category = [
        (ItemCategory::Standard, standard),
        (ItemCategory::Opaque, opaque),
    ]
    .into_iter()
    .filter(|(_, count)| *count > 0)
    .map(|(category, count)| CategoryCount { category, count })
    .collect();

    summary
}

/// Items at low or critical level.
pub fn low_stock_items<'a>(
    items: &'a [StockItem],
    thresholds: &StockThresholds,
) -> Vec<&'a StockItem> {
    items
        .iter()
        .filter(|item| {
            classify(
                item.quantity().total_base_units(),
                thresholds.low,
                thresholds.critical,
            )
            .level
            .needs_attention()
        })
        .collect()
}

// =============================================================================
// Daily Snapshot
// =============================================================================

/// End-of-day figures for one account, stored once per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DailySnapshot {
    #[ts(as = "String")]
    pub report_date: NaiveDate,
    pub sale_count: i64,
    pub base_units_sold: i64,
    pub revenue_cents: i64,
    /// Items at or below the low threshold, out of stock included.
    pub low_stock_items: i64,
    /// Items expiring within the alert window.
    pub expiring_items: i64,
    pub total_items: i64,
    #[ts(as = "String")]
    pub generated_at: DateTime<Utc>,
}

impl DailySnapshot {
    pub fn revenue(&self) -> Money {
        Money::from_cents(self.revenue_cents)
    }
}

/// Figures for `today`: sales recorded that day plus the state of `items`.
///
/// Records from other days are ignored, so the caller may pass a wider
/// range. `generated_at` is the time of the call.
pub fn daily_snapshot(
    records: &[SaleRecord],
    items: &[StockItem],
    thresholds: &StockThresholds,
    today: NaiveDate,
    expiry_alert_days: i64,
) -> DailySnapshot {
    let todays: Vec<&SaleRecord> = records
        .iter()
        .filter(|r| r.sale_date() == today)
        .collect();

    DailySnapshot {
        report_date: today,
        sale_count: todays.len() as i64,
        base_units_sold: todays.iter().map(|r| r.base_units).sum(),
        revenue_cents: todays.iter().map(|r| r.total_cents).sum(),
        low_stock_items: items
            .iter()
            .filter(|item| item.quantity().total_base_units() <= thresholds.low)
            .count() as i64,
        expiring_items: items
            .iter()
            .filter(|item| days_until_expiry(item, today, expiry_alert_days).is_some())
            .count() as i64,
        total_items: items.len() as i64,
        generated_at: Utc::now(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
