//! # pharmstock-core: Pure Stock Reconciliation Logic
//!
//! Computes what a pharmacy was given, sold and still holds, per medicine,
//! from the product catalog and the pharmacy's delivery receipts.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      pharmstock Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Frontend (stock screens)                        │   │
//! │  │     Pharmacy list ──► Stock cards ──► Totals bar                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ StockReport                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              pharmstock-sync (fetch + orchestration)            │   │
//! │  │     StockSource, StockLoader, envelope normalization            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ pharmstock-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │   │
//! │  │   │  catalog  │  │ receipts  │  │ reconcile  │  │ validation│  │   │
//! │  │   │  adapter  │  │ aggregator│  │  engine    │  │   rules   │  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO GLOBAL STATE • PURE FUNCTIONS                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Wire shapes and output records
//! - [`catalog`] - Raw product → [`Medicine`] with per-unit price
//! - [`receipts`] - Given quantity per medicine
//! - [`reconcile`] - Records, sales ledgers, totals, search
//! - [`validation`] - Catalog field rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use pharmstock_core::{adapt_catalog, reconcile, PriceType, RawCatalogEntry, Receipt};
//!
//! let catalog = adapt_catalog(
//!     &[RawCatalogEntry::package_priced(1, "Paracetamol", 20, 15000.0)],
//!     PriceType::Package,
//! );
//! let receipts = vec![Receipt::new(1, &[(1, 20)]), Receipt::new(1, &[(1, 10)])];
//!
//! let records = reconcile(&catalog.medicines, &receipts);
//! assert_eq!(records[0].given_quantity, 30);
//! assert_eq!(records[0].given_packages, 1);
//! assert_eq!(records[0].given_value, 22500.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod receipts;
pub mod reconcile;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{adapt_catalog, CatalogAdaptation};
pub use error::{CoreError, CoreResult, DataError};
pub use receipts::{given_quantities, given_quantity, retain_pharmacy};
pub use reconcile::{filter_records, reconcile, reconcile_with, NoSales, SalesLedger, TransactionLedger};
pub use types::*;
