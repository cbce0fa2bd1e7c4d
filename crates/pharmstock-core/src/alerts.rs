//! # Stock Alerts
//!
//! Works out which alerts a set of items should raise. Delivering them
//! (toasts, push, email) is someone else's job.
//!
//! Per item:
//! - at most one stock alert: critical, or else low
//! - one expiry alert when the expiry date is in `[today, today + window]`

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::stock::{classify, StockLevel, StockThresholds};
use crate::types::{count_label, StockItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    CriticalStock,
    LowStock,
    Expiry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockAlert {
    pub kind: AlertKind,
    pub item_id: String,
    pub title: String,
    pub message: String,
    /// Set for expiry alerts.
    pub days_until_expiry: Option<i64>,
}

/// Days until `item` expires, when that falls in `[today, today + window]`.
///
/// `None` for items without an expiry date, already expired, or further out.
pub fn days_until_expiry(item: &StockItem, today: NaiveDate, window_days: i64) -> Option<i64> {
    let expiry = item.expiry_date?;
    let window_end = today
        .checked_add_days(Days::new(window_days.max(0) as u64))
        .unwrap_or(NaiveDate::MAX);
    (expiry >= today && expiry <= window_end).then(|| (expiry - today).num_days())
}

/// Alerts for `items` as of `today`.
pub fn stock_alerts(
    items: &[StockItem],
    thresholds: &StockThresholds,
    today: NaiveDate,
    expiry_alert_days: i64,
) -> Vec<StockAlert> {
    let mut alerts = Vec::new();
    for item in items {
        let total = item.quantity().total_base_units();
        let remaining = count_label(total, item.base_unit_label());

        match classify(total, thresholds.low, thresholds.critical).level {
            StockLevel::Critical => alerts.push(StockAlert {
                kind: AlertKind::CriticalStock,
                item_id: item.id.clone(),
                title: "Critical Stock Alert!".to_string(),
                message: format!(
                    "{} has only {} remaining. Immediate restocking required!",
                    item.name, remaining
                ),
                days_until_expiry: None,
            }),
            StockLevel::Low => alerts.push(StockAlert {
                kind: AlertKind::LowStock,
                item_id: item.id.clone(),
                title: "Low Stock Alert".to_string(),
                message: format!(
                    "{} is running low with {} remaining. Consider restocking soon.",
                    item.name, remaining
                ),
                days_until_expiry: None,
            }),
            StockLevel::Good => {}
        }

        if let (Some(expiry), Some(days)) = (
            item.expiry_date,
            days_until_expiry(item, today, expiry_alert_days),
        ) {
            alerts.push(StockAlert {
                kind: AlertKind::Expiry,
                item_id: item.id.clone(),
                title: "Expiry Alert".to_string(),
                message: format!(
                    "{} will expire in {} days ({}). Please check and use before expiry.",
                    item.name, days, expiry
                ),
                days_until_expiry: Some(days),
            });
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::standard_item;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_one_stock_alert_per_item() {
        let items = vec![
            standard_item(0, 10, 3),
            standard_item(0, 10, 8),
            standard_item(5, 10, 0),
        ];
        let alerts = stock_alerts(&items, &StockThresholds::default(), date(2026, 1, 1), 30);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].kind, AlertKind::CriticalStock);
        assert!(alerts[0].message.contains("only 3 tablets remaining"));
        assert_eq!(alerts[1].kind, AlertKind::LowStock);
    }

    #[test]
    fn test_expiry_window() {
        let today = date(2026, 1, 1);
        let mut soon = standard_item(5, 10, 0);
        soon.expiry_date = Some(date(2026, 1, 31));
        let mut later = standard_item(5, 10, 0);
        later.expiry_date = Some(date(2026, 2, 1));
        let mut expired = standard_item(5, 10, 0);
        expired.expiry_date = Some(date(2025, 12, 31));
        let mut today_item = standard_item(5, 10, 0);
        today_item.expiry_date = Some(today);

        let alerts = stock_alerts(
            &[soon, later, expired, today_item],
            &StockThresholds::default(),
            today,
            30,
        );
        let days: Vec<Option<i64>> = alerts.iter().map(|a| a.days_until_expiry).collect();
        assert_eq!(days, vec![Some(30), Some(0)]);
        assert!(alerts.iter().all(|a| a.kind == AlertKind::Expiry));
    }

    #[test]
    fn test_days_until_expiry() {
        let today = date(2026, 1, 1);
        let mut item = standard_item(5, 10, 0);
        assert_eq!(days_until_expiry(&item, today, 30), None);

        item.expiry_date = Some(date(2026, 1, 11));
        assert_eq!(days_until_expiry(&item, today, 30), Some(10));
        assert_eq!(days_until_expiry(&item, today, 10), Some(10));
        assert_eq!(days_until_expiry(&item, today, 9), None);
        assert_eq!(days_until_expiry(&item, date(2026, 1, 12), 30), None);
    }

    #[test]
    fn test_low_item_close_to_expiry_raises_both() {
        let mut item = standard_item(0, 10, 2);
        item.expiry_date = Some(date(2026, 1, 5));
        let alerts = stock_alerts(&[item], &StockThresholds::default(), date(2026, 1, 1), 30);
        let kinds: Vec<AlertKind> = alerts.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AlertKind::CriticalStock, AlertKind::Expiry]);
    }
}
