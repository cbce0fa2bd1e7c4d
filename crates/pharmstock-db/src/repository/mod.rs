//! # Repository Module
//!
//! Database repository implementations for the stock ledger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Caller                                                                 │
//! │       │  db.items().search(account, "para", 20)                        │
//! │       ▼                                                                 │
//! │  StockItemRepository                                                   │
//! │  ├── get_by_id / get_by_barcode / list / search / list_expiring        │
//! │  ├── insert / update / delete                                          │
//! │  └── update_quantity (version-checked, sale path)                      │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`StockItemRepository`](item::StockItemRepository) - Item CRUD, search, conditional quantity writes
//! - [`SaleRecordRepository`](sale::SaleRecordRepository) - Append-only sale log and date-range reads
//! - [`SettingsRepository`](settings::SettingsRepository) - Per-account thresholds
//! - [`DailyReportRepository`](report::DailyReportRepository) - One end-of-day snapshot per account per day

pub mod item;
pub mod report;
pub mod sale;
pub mod settings;
