//! # pharmstock-sync: Fetch + Reconcile Orchestration
//!
//! This crate connects backend collaborators to the pure engine in
//! `pharmstock-core`: it fetches catalog and receipts, normalizes response
//! envelopes, runs the reconciliation and guards against stale results when
//! the user switches pharmacies quickly.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stock Loading Architecture                       │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                     StockLoader (orchestrator)                   │  │
//! │  │                                                                  │  │
//! │  │  select(pharmacy) → ticket   load_selected(ticket) → outcome     │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │  StockSource   │  │  ListEnvelope  │  │  pharmstock-core       │    │
//! │  │                │  │                │  │                        │    │
//! │  │ catalog,       │  │ bare list or   │  │ adapt_catalog          │    │
//! │  │ receipts,      │  │ {results: []}  │  │ reconcile_with         │    │
//! │  │ transactions   │  │                │  │ StockTotals            │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  OUTCOMES (to the presentation layer):                                 │
//! │  • Ready(report)  - render records and totals                          │
//! │  • Stale          - ignore, a newer load is on its way                 │
//! │  • Failed(error)  - show an error state, never a zeroed table          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - Loader configuration (TOML + environment)
//! - [`envelope`] - Response envelope normalization
//! - [`error`] - Sync error types
//! - [`loader`] - `StockLoader`, tickets and outcomes
//! - [`source`] - `StockSource` trait and the in-memory `StaticSource`
//! - [`telemetry`] - Tracing subscriber setup
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pharmstock_sync::{StockLoader, SyncConfig, StaticSource};
//! use pharmstock_core::PharmacyId;
//!
//! let config = SyncConfig::load_or_default(None);
//! pharmstock_sync::telemetry::init_tracing(&config.logging);
//!
//! let loader = StockLoader::new(source, &config);
//! match loader.refresh(PharmacyId(4)).await {
//!     LoadOutcome::Ready(report) => render(report),
//!     LoadOutcome::Stale { .. } => {}
//!     LoadOutcome::Failed { error, .. } => show_error(error),
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod envelope;
pub mod error;
pub mod loader;
pub mod source;
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{CatalogSettings, LoaderSettings, LoggingSettings, SyncConfig};
pub use envelope::{parse_list, ListEnvelope, ListItem};
pub use error::{SyncError, SyncResult};
pub use loader::{LoadOutcome, LoadTicket, StockLoader, StockReport};
pub use source::{StaticSource, StockSource};
