//! # Daily Report Repository
//!
//! Stored end-of-day snapshots, one row per account per day.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use pharmstock_core::reports::DailySnapshot;

const SELECT_REPORT: &str = r#"
    SELECT
        report_date,
        sale_count,
        base_units_sold,
        revenue_cents,
        low_stock_items,
        expiring_items,
        total_items,
        generated_at
    FROM daily_reports
"#;

/// Repository for daily report snapshots.
#[derive(Debug, Clone)]
pub struct DailyReportRepository {
    pool: SqlitePool,
}

impl DailyReportRepository {
    /// Creates a new DailyReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DailyReportRepository { pool }
    }

    /// Stores `snapshot` for its day, replacing an earlier run of the same
    /// day.
    pub async fn upsert(&self, account_id: &str, snapshot: &DailySnapshot) -> DbResult<()> {
        debug!(
            account_id = %account_id,
            date = %snapshot.report_date,
            sales = snapshot.sale_count,
            "Saving daily report"
        );

        sqlx::query(
            r#"
            INSERT INTO daily_reports (
                account_id, report_date, sale_count, base_units_sold, revenue_cents,
                low_stock_items, expiring_items, total_items, generated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT (account_id, report_date) DO UPDATE SET
                sale_count = excluded.sale_count,
                base_units_sold = excluded.base_units_sold,
                revenue_cents = excluded.revenue_cents,
                low_stock_items = excluded.low_stock_items,
                expiring_items = excluded.expiring_items,
                total_items = excluded.total_items,
                generated_at = excluded.generated_at
            "#,
        )
        .bind(account_id)
        .bind(snapshot.report_date)
        .bind(snapshot.sale_count)
        .bind(snapshot.base_units_sold)
        .bind(snapshot.revenue_cents)
        .bind(snapshot.low_stock_items)
        .bind(snapshot.expiring_items)
        .bind(snapshot.total_items)
        .bind(snapshot.generated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// The stored snapshot for one day.
    pub async fn get(&self, account_id: &str, date: NaiveDate) -> DbResult<Option<DailySnapshot>> {
        let sql = format!("{SELECT_REPORT} WHERE account_id = ?1 AND report_date = ?2");

        let report = sqlx::query_as::<_, DailySnapshot>(&sql)
            .bind(account_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?;

        Ok(report)
    }

    /// Most recent snapshots, newest day first.
    pub async fn list_recent(&self, account_id: &str, limit: u32) -> DbResult<Vec<DailySnapshot>> {
        let sql = format!("{SELECT_REPORT} WHERE account_id = ?1 ORDER BY report_date DESC LIMIT ?2");

        let reports = sqlx::query_as::<_, DailySnapshot>(&sql)
            .bind(account_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(reports)
    }

    /// Counts all stored snapshots (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM daily_reports")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
