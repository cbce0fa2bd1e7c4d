//! # Validation Module
//!
//! Input validation for stock items and sale input.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form input                                                   │
//! │  ├── parse_quantity: "2.5", "abc", "-3" rejected                       │
//! │  └── SaleUnit::from_str: unknown unit names rejected                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── validate_stock_item before insert/update                          │
//! │  └── validate_quantity_state before any decrement                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (loose_units < units_per_container)                         │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pharmstock_core::validation::{parse_quantity, validate_item_name};
//!
//! validate_item_name("Paracetamol 500mg").unwrap();
//! assert_eq!(parse_quantity(" 3 ").unwrap(), 3);
//! assert!(parse_quantity("2.5").is_err());
//! ```

use crate::error::ValidationError;
use crate::quantity::QuantityState;
use crate::types::{ItemCategory, SaleUnit, StockItem};
use crate::units::check_unit;
use crate::MAX_SALE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted unit label ("strip", "bottle", ...).
const MAX_LABEL_LEN: usize = 30;

/// Longest accepted barcode (GS1-128 tops out at 48).
const MAX_BARCODE_LEN: usize = 64;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an item name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates an optional unit label. Blank labels mean "use the default".
pub fn validate_label(field: &str, label: Option<&str>) -> ValidationResult<()> {
    match label {
        Some(label) if label.trim().chars().count() > MAX_LABEL_LEN => {
            Err(ValidationError::TooLong {
                field: field.to_string(),
                max: MAX_LABEL_LEN,
            })
        }
        _ => Ok(()),
    }
}

/// Validates an optional barcode: non-blank when set, no whitespace, at
/// most 64 characters.
pub fn validate_barcode(barcode: Option<&str>) -> ValidationResult<()> {
    let Some(barcode) = barcode else {
        return Ok(());
    };

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if barcode.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    if barcode.chars().count() > MAX_BARCODE_LEN {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: MAX_BARCODE_LEN,
        });
    }

    Ok(())
}

/// Validates a search query and returns it trimmed.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale quantity entered by a person.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_SALE_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_SALE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_SALE_QUANTITY,
        });
    }

    Ok(())
}

/// Parses quantity text into a whole, positive number.
///
/// ```text
/// "3"    → 3
/// " 12 " → 12
/// "2.5"  → InvalidFormat (not a whole number)
/// "0"    → MustBePositive
/// ""     → Required
/// ```
pub fn parse_quantity(text: &str) -> ValidationResult<i64> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::Required {
            field: "quantity".to_string(),
        });
    }

    let qty: i64 = text.parse().map_err(|_| ValidationError::InvalidFormat {
        field: "quantity".to_string(),
        reason: format!("'{}' is not a whole number", text),
    })?;

    validate_quantity(qty)?;
    Ok(qty)
}

/// Validates a container size.
pub fn validate_units_per_container(units: i64) -> ValidationResult<()> {
    if units < 1 {
        return Err(ValidationError::MustBePositive {
            field: "units_per_container".to_string(),
        });
    }
    Ok(())
}

/// Validates a price in minor units. Zero is allowed (free samples).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates stock thresholds. Both must be non-negative.
pub fn validate_thresholds(low: i64, critical: i64) -> ValidationResult<()> {
    for (field, value) in [("low_stock_threshold", low), ("critical_stock_threshold", critical)] {
        if value < 0 {
            return Err(ValidationError::OutOfRange {
                field: field.to_string(),
                min: 0,
                max: i64::MAX,
            });
        }
    }
    Ok(())
}

// =============================================================================
// Quantity Validators
// =============================================================================

/// Validates a stored quantity state.
///
/// ## Rules
/// - `units_per_container >= 1`
/// - `container_count >= 0`
/// - `0 <= loose_units < units_per_container`
/// - the base-unit total fits in `i64`
pub fn validate_quantity_state(state: &QuantityState) -> ValidationResult<()> {
    validate_units_per_container(state.units_per_container)?;

    if state.container_count < 0 {
        return Err(ValidationError::OutOfRange {
            field: "container_count".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    if state.loose_units < 0 || state.loose_units >= state.units_per_container {
        return Err(ValidationError::OutOfRange {
            field: "loose_units".to_string(),
            min: 0,
            max: state.units_per_container - 1,
        });
    }

    let total = state
        .container_count
        .checked_mul(state.units_per_container)
        .and_then(|units| units.checked_add(state.loose_units));
    if total.is_none() {
        return Err(ValidationError::OutOfRange {
            field: "container_count".to_string(),
            min: 0,
            max: (i64::MAX - state.loose_units) / state.units_per_container,
        });
    }

    Ok(())
}

/// Validates a whole item before it is stored.
///
/// On top of the field rules, opaque items must hold exactly one base unit
/// per container and no loose units, and the declared sale unit must suit
/// the category.
pub fn validate_stock_item(item: &StockItem) -> ValidationResult<()> {
    validate_item_name(&item.name)?;
    validate_price_cents(item.price_per_container_cents)?;
    validate_quantity_state(&item.quantity())?;
    validate_label("container_label", item.container_label.as_deref())?;
    validate_label("base_unit_label", item.base_unit_label.as_deref())?;
    validate_barcode(item.barcode.as_deref())?;

    if item.category == ItemCategory::Opaque && item.units_per_container != 1 {
        return Err(ValidationError::OutOfRange {
            field: "units_per_container".to_string(),
            min: 1,
            max: 1,
        });
    }

    if check_unit(item, item.declared_sale_unit).is_err() {
        let allowed = match item.category {
            ItemCategory::Standard => [SaleUnit::BaseUnit, SaleUnit::Container],
            ItemCategory::Opaque => [SaleUnit::Opaque, SaleUnit::Container],
        };
        return Err(ValidationError::NotAllowed {
            field: "declared_sale_unit".to_string(),
            allowed: allowed.iter().map(|u| u.to_string()).collect(),
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use pharmstock_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
