//! # Error Types
//!
//! Domain error types for pharmstock-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pharmstock-core errors (this file)                                    │
//! │  ├── SaleError          - Everything `sell` can surface to a caller    │
//! │  ├── InsufficientStock  - Failure of the pure decrement                │
//! │  ├── StoreError         - Failures reported by a StockStore            │
//! │  └── ValidationError    - Input validation failures                    │
//! │                                                                         │
//! │  pharmstock-db errors (separate crate)                                 │
//! │  └── DbError            - SQLite failures, converted into StoreError   │
//! │                                                                         │
//! │  Flow: DbError → StoreError → SaleError → caller                       │
//! │        ValidationError ──────► SaleError                               │
//! │        InsufficientStock ────► SaleError                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only `SaleError::VersionConflict` is recoverable by retrying the whole
//! sale. Everything else is final for that attempt.

use thiserror::Error;

use crate::types::{ItemCategory, SaleUnit};

// =============================================================================
// Sale Error
// =============================================================================

/// Errors surfaced by the sale path.
///
/// A sale that fails with any of these leaves the stock item untouched and
/// produces no sale record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaleError {
    /// Requested quantity is zero, negative, non-integer or too large to
    /// convert into base units.
    #[error("Invalid quantity: {reason}")]
    InvalidQuantity { reason: String },

    /// The unit is not meaningful for the item's category.
    ///
    /// ## When This Occurs
    /// - Selling loose base units of an opaque item (a bottle has no tablets)
    /// - Selling "opaque units" of a standard, divisible item
    #[error("Cannot sell {category} item {item_id} by {unit}")]
    InvalidUnit {
        item_id: String,
        unit: SaleUnit,
        category: ItemCategory,
    },

    /// Requested base units exceed what is on hand.
    ///
    /// ## User Workflow
    /// ```text
    /// Sell 4 tablets
    ///      │
    ///      ▼
    /// On hand: 0 strips + 3 loose tablets = 3
    ///      │
    ///      ▼
    /// InsufficientStock { available: 3, requested: 4 }
    ///      │
    ///      ▼
    /// UI offers: "Only 3 tablets available"
    /// ```
    #[error("Insufficient stock for {item_id}: available {available}, requested {requested}")]
    InsufficientStock {
        item_id: String,
        available: i64,
        requested: i64,
    },

    /// The stock item does not exist (or was deleted mid-sale).
    #[error("Stock item not found: {0}")]
    ItemNotFound(String),

    /// The item changed between read and write. Re-read and retry the whole
    /// sale.
    #[error("Stock item {item_id} was modified concurrently (expected version {expected_version})")]
    VersionConflict {
        item_id: String,
        expected_version: i64,
    },

    /// The backing store could not be read or written.
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// Input or stored data failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl SaleError {
    /// True when the caller should re-fetch and re-issue the sale.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SaleError::VersionConflict { .. })
    }

    pub(crate) fn invalid_quantity(reason: impl Into<String>) -> Self {
        SaleError::InvalidQuantity {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Insufficient Stock
// =============================================================================

/// Failure of [`crate::quantity::apply_decrement`].
///
/// Amounts are in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("insufficient stock: available {available}, requested {requested}")]
pub struct InsufficientStock {
    pub available: i64,
    pub requested: i64,
}

// =============================================================================
// Store Error
// =============================================================================

/// Errors reported by a [`crate::store::StockStore`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No row with this id.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Conditional write failed: the stored version moved on.
    #[error("Version conflict on {id}: expected {expected}, found {actual:?}")]
    VersionConflict {
        id: String,
        expected: i64,
        actual: Option<i64>,
    },

    /// The store could not be reached or the operation failed.
    #[error("{0}")]
    Unavailable(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<StoreError> for SaleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id, .. } => SaleError::ItemNotFound(id),
            StoreError::VersionConflict { id, expected, .. } => SaleError::VersionConflict {
                item_id: id,
                expected_version: expected,
            },
            StoreError::Unavailable(msg) => SaleError::PersistenceFailure(msg),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised at the boundary (UI text, edit forms, stored rows) before any
/// stock arithmetic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, "2.5" for a whole quantity).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience alias for the sale path.
pub type CoreResult<T> = Result<T, SaleError>;

/// Convenience alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
