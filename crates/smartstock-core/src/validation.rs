//! # Validation Module
//!
//! Input validation for ledger commands.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Dashboard forms                                              │
//! │  ├── Required fields, numeric inputs                                   │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Ledger (THIS MODULE)                                         │
//! │  ├── Field rules (non-empty, lengths, positive prices)                 │
//! │  └── Cross-field rules (selling > purchase, from != to)                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity >= 0)                                             │
//! │  └── UNIQUE (warehouse name, product code)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Text validators return the trimmed value so callers store exactly what
//! was checked.

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest product code accepted.
pub const MAX_PRODUCT_CODE_LEN: usize = 50;

/// Longest name/category/location accepted.
pub const MAX_TEXT_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required text field and returns it trimmed.
///
/// ```rust
/// use smartstock_core::validation::validate_required;
///
/// assert_eq!(validate_required("name", "  Widget ").unwrap(), "Widget");
/// assert!(validate_required("name", "   ").is_err());
/// ```
pub fn validate_required(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(value.to_string())
}

/// Validates an optional product code.
///
/// ## Rules
/// - Blank input means "no code" (legacy products have none)
/// - At most 50 characters
/// - Letters, digits, hyphens and underscores only
///
/// ```rust
/// use smartstock_core::validation::validate_product_code;
///
/// assert_eq!(validate_product_code(Some("PROD-001")).unwrap().as_deref(), Some("PROD-001"));
/// assert_eq!(validate_product_code(Some("  ")).unwrap(), None);
/// assert!(validate_product_code(Some("has space")).is_err());
/// ```
pub fn validate_product_code(code: Option<&str>) -> ValidationResult<Option<String>> {
    let code = match code.map(str::trim) {
        Some(code) if !code.is_empty() => code,
        _ => return Ok(None),
    };

    if code.len() > MAX_PRODUCT_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "productId".to_string(),
            max: MAX_PRODUCT_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "productId".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(Some(code.to_string()))
}

/// Normalizes an optional free-text field: trimmed, blank becomes `None`.
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an initial stock quantity (zero allowed).
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a transfer quantity (must be positive).
pub fn validate_transfer_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a stock adjustment delta (anything but zero).
pub fn validate_delta(delta: i64) -> ValidationResult<()> {
    if delta == 0 {
        return Err(ValidationError::MustBeNonZero {
            field: "delta".to_string(),
        });
    }

    Ok(())
}

/// Validates a price (strictly positive).
///
/// ```rust
/// use smartstock_core::money::Money;
/// use smartstock_core::validation::validate_price;
///
/// assert!(validate_price("purchasePrice", Money::from_cents(1)).is_ok());
/// assert!(validate_price("purchasePrice", Money::zero()).is_err());
/// ```
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates that the selling price is strictly above the purchase price.
pub fn validate_price_order(purchase: Money, selling: Money) -> ValidationResult<()> {
    if selling <= purchase {
        return Err(ValidationError::PriceNotAboveCost { purchase, selling });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required() {
        assert_eq!(validate_required("name", "Widget").unwrap(), "Widget");
        assert!(validate_required("name", "").is_err());
        assert!(validate_required("name", &"A".repeat(201)).is_err());
        assert!(validate_required("name", &"A".repeat(200)).is_ok());
    }

    #[test]
    fn test_validate_product_code() {
        assert!(validate_product_code(Some("PROD-001")).is_ok());
        assert!(validate_product_code(Some("abc_123")).is_ok());
        assert_eq!(validate_product_code(None).unwrap(), None);
        assert!(validate_product_code(Some(&"A".repeat(51))).is_err());
        assert!(validate_product_code(Some("PROD/1")).is_err());
    }

    #[test]
    fn test_normalize_optional() {
        assert_eq!(normalize_optional(Some("  Ana ")), Some("Ana".to_string()));
        assert_eq!(normalize_optional(Some("   ")), None);
        assert_eq!(normalize_optional(None), None);
    }

    #[test]
    fn test_quantities() {
        assert!(validate_stock_quantity(0).is_ok());
        assert!(validate_stock_quantity(-1).is_err());
        assert!(validate_transfer_quantity(1).is_ok());
        assert!(validate_transfer_quantity(0).is_err());
        assert!(validate_delta(-3).is_ok());
        assert!(validate_delta(0).is_err());
    }

    #[test]
    fn test_price_rules() {
        assert!(validate_price("sellingPrice", Money::from_cents(-1)).is_err());
        assert!(validate_price_order(Money::from_cents(500), Money::from_cents(800)).is_ok());
        assert!(validate_price_order(Money::from_cents(500), Money::from_cents(500)).is_err());
        assert!(validate_price_order(Money::from_cents(800), Money::from_cents(500)).is_err());
    }
}
