//! # Error Types
//!
//! Domain-specific error types for pharmstock-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pharmstock-core errors (this file)                                    │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── DataError        - Malformed catalog entries                      │
//! │                                                                         │
//! │  pharmstock-sync errors (separate crate)                               │
//! │  └── SyncError        - Fetch / config failures                        │
//! │                                                                         │
//! │  Flow: DataError → skipped entry (logged)                              │
//! │        SyncError::Fetch → whole load aborted                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (medicine id, field)
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::types::MedicineId;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A catalog entry could not be normalized.
    #[error("Invalid catalog entry {id}: {source}")]
    InvalidEntry {
        id: MedicineId,
        #[source]
        source: DataError,
    },
}

impl CoreError {
    /// Returns the catalog entry this error refers to.
    pub fn medicine_id(&self) -> MedicineId {
        match self {
            CoreError::InvalidEntry { id, .. } => *id,
        }
    }

    /// Returns the underlying data error.
    pub fn data_error(&self) -> &DataError {
        match self {
            CoreError::InvalidEntry { source, .. } => source,
        }
    }
}

// =============================================================================
// Data Error
// =============================================================================

/// Malformed catalog data.
///
/// Raised by the catalog adapter instead of letting `NaN` or `Infinity`
/// leak into prices and values.
///
/// ## When This Occurs
/// ```text
/// pills_per_package = 0  ──► InvalidPackageSize
/// selling_price = "abc"  ──► InvalidPrice
/// name = "   "           ──► MissingName
/// pills_per_package = 1.5 ──► Malformed
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    /// Packaging size is zero, negative or missing.
    #[error("pills_per_package must be a positive integer, got {0:?}")]
    InvalidPackageSize(Option<i64>),

    /// Price is not a finite non-negative number.
    #[error("selling_price is invalid: {0}")]
    InvalidPrice(String),

    /// Display name is empty.
    #[error("name is required")]
    MissingName,

    /// Fields had the wrong JSON type; only the id could be read.
    #[error("entry is malformed: {0}")]
    Malformed(String),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DataError::InvalidPackageSize(Some(0));
        assert_eq!(
            err.to_string(),
            "pills_per_package must be a positive integer, got Some(0)"
        );

        let err = CoreError::InvalidEntry {
            id: MedicineId(7),
            source: DataError::MissingName,
        };
        assert_eq!(err.to_string(), "Invalid catalog entry 7: name is required");
    }

    #[test]
    fn test_accessors() {
        let err = CoreError::InvalidEntry {
            id: MedicineId(3),
            source: DataError::InvalidPrice("NaN".into()),
        };
        assert_eq!(err.medicine_id(), MedicineId(3));
        assert_eq!(err.data_error(), &DataError::InvalidPrice("NaN".into()));
    }
}
