//! # pharmstock-core: Stock Ledger Logic for a Pharmacy Counter
//!
//! This crate holds the stock-decrement and unit-conversion ledger as pure
//! functions, plus the `sell` entry point that drives them through an
//! injected store. It performs no I/O of its own.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      pharmstock Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Caller (counter UI, seed tool)                  │   │
//! │  │          sell("item-id", SaleUnit::BaseUnit, 3)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ pharmstock-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   service ──► sale ──► units ──► quantity ──► stock             │   │
//! │  │      │         (pure: validate, convert, decrement, classify)  │   │
//! │  │      ▼                                                          │   │
//! │  │   store::StockStore (trait)   catalog, reports, alerts (pure)   │   │
//! │  └──────┬──────────────────────────────────────────────────────────┘   │
//! │         │                                                               │
//! │  ┌──────▼──────────────────────────────────────────────────────────┐   │
//! │  │              pharmstock-db (SQLite via sqlx)                    │   │
//! │  │        SqliteStockStore, repositories, migrations               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`quantity`] - Two-level (container + loose) stock and its decrement
//! - [`units`] - Sale unit to base unit conversion, unit prices
//! - [`stock`] - Good / low / critical classification
//! - [`sale`] - Request → validated → committed sale
//! - [`store`] - Persistence trait and an in-memory implementation
//! - [`service`] - `sell`, with optional retry on version conflicts
//! - [`catalog`] - Item list search, filters and sort order
//! - [`reports`], [`alerts`] - Pure aggregations for dashboards
//! - [`types`], [`money`], [`error`], [`validation`]
//!
//! ## Example Usage
//!
//! ```rust
//! use pharmstock_core::quantity::QuantityState;
//!
//! // 5 strips of 10, sell 3 tablets
//! let state = QuantityState::new(5, 10, 0);
//! let next = state.decrement(3).unwrap();
//!
//! assert_eq!((next.container_count, next.loose_units), (4, 7));
//! assert_eq!(next.total_base_units(), 47);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod alerts;
pub mod catalog;
pub mod error;
pub mod money;
pub mod quantity;
pub mod reports;
pub mod sale;
pub mod service;
pub mod stock;
pub mod store;
pub mod types;
pub mod units;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{
    CoreResult, InsufficientStock, SaleError, StoreError, StoreResult, ValidationError,
};
pub use catalog::{filter_items, ItemFilter, SortKey, SortOrder};
pub use money::{Money, UnitPrice};
pub use quantity::QuantityState;
pub use sale::SaleRequest;
pub use service::{SaleOutcome, SaleService};
pub use stock::{StockInfo, StockLevel, StockThresholds};
pub use store::{InMemoryStore, StockStore};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Account used when a single shop runs without account management.
pub const DEFAULT_ACCOUNT_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Base units at or below which an item is "low".
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Base units at or below which an item is "critical".
pub const DEFAULT_CRITICAL_STOCK_THRESHOLD: i64 = 5;

/// Days ahead an upcoming expiry raises an alert.
pub const DEFAULT_EXPIRY_ALERT_DAYS: i64 = 30;

/// Largest quantity accepted from form input.
///
/// Catches typos like 1000 for 10; the sale path itself has no upper limit.
pub const MAX_SALE_QUANTITY: i64 = 10_000;
