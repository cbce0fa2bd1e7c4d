//! # Account Settings Repository
//!
//! Per-account thresholds and display preferences. An account without a
//! stored row uses `AccountSettings::defaults_for`.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use pharmstock_core::validation::validate_thresholds;
use pharmstock_core::{AccountSettings, ValidationError};

/// Repository for account settings.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Gets the stored settings for an account.
    pub async fn get(&self, account_id: &str) -> DbResult<Option<AccountSettings>> {
        let settings = sqlx::query_as::<_, AccountSettings>(
            r#"
            SELECT
                account_id,
                low_stock_threshold,
                critical_stock_threshold,
                expiry_alert_days,
                currency_symbol,
                notifications_enabled
            FROM account_settings
            WHERE account_id = ?1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings)
    }

    /// Stored settings, or `fallback` when the account has none.
    pub async fn get_or(&self, fallback: AccountSettings) -> DbResult<AccountSettings> {
        Ok(self.get(&fallback.account_id).await?.unwrap_or(fallback))
    }

    /// Inserts or replaces an account's settings.
    pub async fn upsert(&self, settings: &AccountSettings) -> DbResult<()> {
        validate_thresholds(
            settings.low_stock_threshold,
            settings.critical_stock_threshold,
        )?;
        if settings.expiry_alert_days < 0 {
            return Err(ValidationError::OutOfRange {
                field: "expiry_alert_days".to_string(),
                min: 0,
                max: i64::MAX,
            }
            .into());
        }

        debug!(account_id = %settings.account_id, "Saving account settings");

        sqlx::query(
            r#"
            INSERT INTO account_settings (
                account_id, low_stock_threshold, critical_stock_threshold,
                expiry_alert_days, currency_symbol, notifications_enabled, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (account_id) DO UPDATE SET
                low_stock_threshold = excluded.low_stock_threshold,
                critical_stock_threshold = excluded.critical_stock_threshold,
                expiry_alert_days = excluded.expiry_alert_days,
                currency_symbol = excluded.currency_symbol,
                notifications_enabled = excluded.notifications_enabled,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&settings.account_id)
        .bind(settings.low_stock_threshold)
        .bind(settings.critical_stock_threshold)
        .bind(settings.expiry_alert_days)
        .bind(&settings.currency_symbol)
        .bind(settings.notifications_enabled)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
