//! # pharmstock-db: SQLite Persistence for the Stock Ledger
//!
//! Local storage for stock items, sale records and account settings, and the
//! `StockStore` implementation the sale path writes through.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        pharmstock Data Flow                             │
//! │                                                                         │
//! │  SaleService<SqliteStockStore>::sell(id, unit, qty)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  pharmstock-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ StockItemRepo  │    │ 001_initial  │  │   │
//! │  │   │ SqlitePool    │◄───│ SaleRecordRepo │    │   _schema    │  │   │
//! │  │   │ WAL, FKs on   │    │ SettingsRepo   │    │ 002_barcode  │  │   │
//! │  │   │               │    │ DailyReportRepo│    │ 003_reports  │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │          ▲                                                      │   │
//! │  │          └── SqliteStockStore (store.rs)   LedgerConfig         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (pharmstock.db)                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Item, sale record, settings and daily report repositories
//! - [`store`] - `SqliteStockStore`
//! - [`config`] - `LedgerConfig` (TOML + environment)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pharmstock_core::{SaleService, SaleUnit};
//! use pharmstock_db::{Database, LedgerConfig};
//!
//! let config = LedgerConfig::load(None)?;
//! let db = Database::new(config.db_config()).await?;
//!
//! let service = SaleService::new(db.stock_store()).with_thresholds(config.thresholds());
//! let outcome = service.sell(&item_id, SaleUnit::BaseUnit, 3).await?;
//! println!("{}", outcome.stock.message);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::LedgerConfig;
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use store::SqliteStockStore;

// Repository re-exports for convenience
pub use repository::item::StockItemRepository;
pub use repository::report::DailyReportRepository;
pub use repository::sale::SaleRecordRepository;
pub use repository::settings::SettingsRepository;
