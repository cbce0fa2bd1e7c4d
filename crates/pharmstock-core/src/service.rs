//! # Sale Service
//!
//! The `sell` entry point: read, process, write item, append record.
//!
//! ## Commit Ordering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. read_item(id)                     fails → sale rejected             │
//! │  2. process_sale (pure)               fails → sale rejected             │
//! │  3. write_item(state, version)        fails → sale rejected             │
//! │  4. append_sale_record(record)        fails → sale STANDS, error        │
//! │                                               reported in outcome       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock correctness outranks bookkeeping: once step 3 succeeds the stock is
//! gone, so a failed append is reported on [`SaleOutcome::record_error`]
//! rather than turned into an error.
//!
//! `sell` never retries. [`SaleService::sell_with_retry`] re-runs the whole
//! sale on `VersionConflict` for callers that want that.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{CoreResult, SaleError, StoreError};
use crate::sale::{process_sale, SaleRequest};
use crate::stock::{stock_info, StockInfo, StockThresholds};
use crate::store::StockStore;
use crate::types::{SaleRecord, SaleUnit, StockItem};

/// Everything a caller needs after a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleOutcome {
    /// The frozen sale record.
    pub record: SaleRecord,
    /// Item as committed, with its new version.
    pub item: StockItem,
    /// Stock status after the sale.
    pub stock: StockInfo,
    /// Set when the item write succeeded but the record append did not.
    #[serde(skip)]
    pub record_error: Option<StoreError>,
}

impl SaleOutcome {
    /// True when both the item and the record were stored.
    pub fn is_fully_recorded(&self) -> bool {
        self.record_error.is_none()
    }
}

/// Runs sales against a [`StockStore`].
#[derive(Debug, Clone)]
pub struct SaleService<S> {
    store: S,
    thresholds: StockThresholds,
}

impl<S: StockStore> SaleService<S> {
    /// Service using default thresholds.
    pub fn new(store: S) -> Self {
        SaleService {
            store,
            thresholds: StockThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: StockThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn thresholds(&self) -> StockThresholds {
        self.thresholds
    }

    /// Sells `quantity` of `unit` from item `item_id`.
    pub async fn sell(
        &self,
        item_id: &str,
        unit: SaleUnit,
        quantity: i64,
    ) -> CoreResult<SaleOutcome> {
        self.sell_request(SaleRequest::new(item_id, unit, quantity))
            .await
    }

    /// Runs one attempt of `request`.
    pub async fn sell_request(&self, request: SaleRequest) -> CoreResult<SaleOutcome> {
        debug!(
            item_id = %request.item_id,
            unit = %request.unit,
            quantity = request.quantity,
            "Processing sale"
        );

        let item = self.store.read_item(&request.item_id).await?;
        let committed = match process_sale(&item, request, Utc::now()) {
            Ok(committed) => committed,
            Err(e) => {
                debug!(item_id = %item.id, error = %e, "Sale rejected");
                return Err(e);
            }
        };

        let version = match self
            .store
            .write_item(
                &committed.item.id,
                committed.item.quantity(),
                committed.expected_version,
            )
            .await
        {
            Ok(version) => version,
            Err(e) => {
                let err = SaleError::from(e);
                if err.is_retryable() {
                    warn!(item_id = %committed.item.id, error = %err, "Sale lost a version race");
                }
                return Err(err);
            }
        };

        let mut item = committed.item;
        item.sync_version = version;
        let record = committed.record;

        let record_error = match self.store.append_sale_record(&record).await {
            Ok(()) => None,
            Err(e) => {
                warn!(
                    item_id = %item.id,
                    record_id = %record.id,
                    error = %e,
                    "Stock updated but sale record was not stored"
                );
                Some(e)
            }
        };

        info!(
            item_id = %item.id,
            record_id = %record.id,
            base_units = record.base_units,
            total_cents = record.total_cents,
            version,
            "Sale committed"
        );

        Ok(SaleOutcome {
            stock: stock_info(&item, &self.thresholds),
            record,
            item,
            record_error,
        })
    }

    /// Like [`Self::sell`], re-running from a fresh read on
    /// `VersionConflict`, at most `max_attempts` times in total.
    pub async fn sell_with_retry(
        &self,
        item_id: &str,
        unit: SaleUnit,
        quantity: i64,
        max_attempts: u32,
    ) -> CoreResult<SaleOutcome> {
        let max_attempts = max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.sell(item_id, unit, quantity).await {
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    debug!(item_id, attempt, max_attempts, "Retrying sale");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
