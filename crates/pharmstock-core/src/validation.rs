//! # Validation Module
//!
//! Field validators for raw catalog data.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Backend (Django models)                                      │
//! │  ├── Column types, NOT NULL                                            │
//! │  └── No check that pills_per_package > 0                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Deserialization (types.rs)                                   │
//! │  └── Shape only, every field optional                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: THIS MODULE                                                  │
//! │  ├── name non-empty                                                    │
//! │  ├── pills_per_package positive (no division by zero downstream)       │
//! │  └── price finite and non-negative                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pharmstock_core::validation::{validate_pills_per_package, parse_price};
//! use pharmstock_core::PriceValue;
//!
//! assert_eq!(validate_pills_per_package(Some(20)).unwrap(), 20);
//! assert!(validate_pills_per_package(Some(0)).is_err());
//!
//! let price = parse_price(Some(&PriceValue::Text("15000.00".into()))).unwrap();
//! assert_eq!(price, 15000.0);
//! ```

use crate::error::DataError;
use crate::types::PriceValue;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, DataError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a medicine display name.
///
/// ## Rules
/// - Must be present
/// - Must not be blank after trimming
///
/// ## Returns
/// The trimmed name.
pub fn validate_name(name: Option<&str>) -> ValidationResult<String> {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(DataError::MissingName),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the packaging unit size.
///
/// ## Rules
/// - Must be present
/// - Must be > 0
/// - Must fit in `u32`
///
/// ## Example
/// ```rust
/// use pharmstock_core::validation::validate_pills_per_package;
///
/// assert!(validate_pills_per_package(Some(10)).is_ok());
/// assert!(validate_pills_per_package(Some(-1)).is_err());
/// assert!(validate_pills_per_package(None).is_err());
/// ```
pub fn validate_pills_per_package(pills: Option<i64>) -> ValidationResult<u32> {
    match pills {
        Some(n) if n > 0 => u32::try_from(n).map_err(|_| DataError::InvalidPackageSize(pills)),
        _ => Err(DataError::InvalidPackageSize(pills)),
    }
}

/// Parses and validates a selling price.
///
/// ## Rules
/// - Missing or blank price is 0 (an unpriced product is still deliverable)
/// - Strings must parse as a decimal number
/// - Result must be finite and >= 0
pub fn parse_price(price: Option<&PriceValue>) -> ValidationResult<f64> {
    let value = match price {
        None => return Ok(0.0),
        Some(PriceValue::Number(n)) => *n,
        Some(PriceValue::Text(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(0.0);
            }
            s.parse::<f64>()
                .map_err(|_| DataError::InvalidPrice(format!("'{}' is not a number", s)))?
        }
    };

    if !value.is_finite() {
        return Err(DataError::InvalidPrice(format!("{} is not finite", value)));
    }

    if value < 0.0 {
        return Err(DataError::InvalidPrice(format!("{} is negative", value)));
    }

    Ok(value)
}

// =============================================================================
// Unit Tests
// =============================================================================
