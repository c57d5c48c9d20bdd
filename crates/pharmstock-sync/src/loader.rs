//! # Stock Loader
//!
//! Fetches the inputs of a pharmacy's reconciliation and runs the engine.
//!
//! ## Load Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         StockLoader::load                               │
//! │                                                                         │
//! │   fetch_catalog() ──┐                                                   │
//! │                     ├── try_join ──► both Ok? ── no ──► SyncError        │
//! │   fetch_receipts() ─┘                   │                 (no records)  │
//! │                                         │ yes                           │
//! │   fetch_transactions() (failure or timeout → no sales data, logged)     │
//! │                                         ▼                               │
//! │   retain_pharmacy ──► adapt_catalog ──► reconcile_with ──► StockReport  │
//! │                          │                                              │
//! │                          └── skipped entries logged + reported          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Last Request Wins
//! ```text
//! select(A) → ticket{A, gen 1}  ─── load ───────────────────► Stale (gen 1 ≠ 2)
//! select(B) → ticket{B, gen 2}  ─── load ─────► Ready
//! ```
//! Every selection bumps a generation counter. A finished load whose ticket
//! is no longer the latest is discarded instead of overwriting the screen.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use pharmstock_core::{
    adapt_catalog, reconcile_with, retain_pharmacy, PharmacyId, PriceType, RawCatalogEntry,
    ReconciliationRecord, Receipt, SkippedEntry, StockTotals, StockTransaction, TransactionLedger,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{LoaderSettings, SyncConfig};
use crate::error::{SyncError, SyncResult};
use crate::source::StockSource;

// =============================================================================
// Report
// =============================================================================

/// Everything the stock screen needs for one pharmacy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockReport {
    pub pharmacy: PharmacyId,

    /// One record per delivered medicine, in catalog order.
    pub records: Vec<ReconciliationRecord>,

    pub totals: StockTotals,

    /// Catalog entries left out because of bad data.
    pub skipped: Vec<SkippedEntry>,

    pub generated_at: DateTime<Utc>,
}

// =============================================================================
// Tickets & Outcomes
// =============================================================================

/// Tag of a requested load: which pharmacy and which selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub pharmacy: PharmacyId,
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Result of a tagged load.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Fresh data for the current selection.
    Ready(StockReport),

    /// A newer selection superseded this load; its result was dropped.
    Stale { pharmacy: PharmacyId },

    /// Fetching failed; nothing was computed.
    Failed {
        pharmacy: PharmacyId,
        error: SyncError,
    },
}

impl LoadOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadOutcome::Ready(_))
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, LoadOutcome::Stale { .. })
    }

    /// Returns the report if the load is current and succeeded.
    pub fn into_report(self) -> Option<StockReport> {
        match self {
            LoadOutcome::Ready(report) => Some(report),
            _ => None,
        }
    }
}

// =============================================================================
// Loader
// =============================================================================

/// Runs reconciliations against a [`StockSource`].
pub struct StockLoader<S> {
    source: S,
    settings: LoaderSettings,
    default_price_type: PriceType,
    generation: AtomicU64,
}

impl<S: StockSource> StockLoader<S> {
    pub fn new(source: S, config: &SyncConfig) -> Self {
        StockLoader {
            source,
            settings: config.loader.clone(),
            default_price_type: config.default_price_type(),
            generation: AtomicU64::new(0),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Marks `pharmacy` as the current selection. Earlier tickets go stale.
    pub fn select(&self, pharmacy: PharmacyId) -> LoadTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(%pharmacy, generation, "Pharmacy selected");
        LoadTicket {
            pharmacy,
            generation,
        }
    }

    /// True if no selection happened after `ticket` was issued.
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    /// Loads the pharmacy of `ticket` and tags the result.
    pub async fn load_selected(&self, ticket: LoadTicket) -> LoadOutcome {
        let result = self.load(ticket.pharmacy).await;

        if self.settings.discard_stale && !self.is_current(&ticket) {
            debug!(
                pharmacy = %ticket.pharmacy,
                generation = ticket.generation,
                "Discarding stale stock result"
            );
            return LoadOutcome::Stale {
                pharmacy: ticket.pharmacy,
            };
        }

        match result {
            Ok(report) => LoadOutcome::Ready(report),
            Err(error) => {
                warn!(pharmacy = %ticket.pharmacy, error = %error, "Stock load failed");
                LoadOutcome::Failed {
                    pharmacy: ticket.pharmacy,
                    error,
                }
            }
        }
    }

    /// Selects `pharmacy` and loads it. Convenience for refresh actions.
    pub async fn refresh(&self, pharmacy: PharmacyId) -> LoadOutcome {
        let ticket = self.select(pharmacy);
        self.load_selected(ticket).await
    }

    /// Fetches and reconciles one pharmacy, untagged.
    pub async fn load(&self, pharmacy: PharmacyId) -> SyncResult<StockReport> {
        info!(%pharmacy, "Loading pharmacy stock");

        // An input failure returns at once instead of waiting on the sales feed.
        let sales = async { Ok::<_, SyncError>(self.fetch_sales(pharmacy).await) };
        let ((catalog, mut receipts), transactions) =
            tokio::try_join!(self.fetch_inputs(pharmacy), sales)?;

        let foreign = retain_pharmacy(&mut receipts, pharmacy);
        if foreign > 0 {
            warn!(%pharmacy, dropped = foreign, "Source returned receipts for other pharmacies");
        }

        let adaptation = adapt_catalog(&catalog, self.default_price_type);
        let ledger = TransactionLedger::from_transactions(&transactions);
        let records = reconcile_with(&adaptation.medicines, &receipts, &ledger);
        let totals = StockTotals::from_records(&records);

        info!(
            %pharmacy,
            records = records.len(),
            skipped = adaptation.skipped.len(),
            "Pharmacy stock reconciled"
        );

        Ok(StockReport {
            pharmacy,
            records,
            totals,
            skipped: adaptation.skipped_entries(),
            generated_at: Utc::now(),
        })
    }

    /// Catalog and receipts, concurrently. Either failing fails both.
    async fn fetch_inputs(
        &self,
        pharmacy: PharmacyId,
    ) -> SyncResult<(Vec<RawCatalogEntry>, Vec<Receipt>)> {
        self.limited(async {
            tokio::try_join!(
                self.source.fetch_catalog(),
                self.source.fetch_receipts(pharmacy)
            )
        })
        .await
    }

    /// Recorded sales. Any failure, a timeout included, means no sales data.
    async fn fetch_sales(&self, pharmacy: PharmacyId) -> Vec<StockTransaction> {
        match self.limited(self.source.fetch_transactions(pharmacy)).await {
            Ok(transactions) => transactions,
            Err(e) => {
                warn!(%pharmacy, error = %e, "Sales data unavailable, treating sold quantities as 0");
                Vec::new()
            }
        }
    }

    /// Applies the configured fetch timeout, if any.
    async fn limited<T, F>(&self, fetch: F) -> SyncResult<T>
    where
        F: Future<Output = SyncResult<T>>,
    {
        match self.settings.fetch_timeout() {
            Some(limit) => tokio::time::timeout(limit, fetch)
                .await
                .map_err(|_| SyncError::Timeout(self.settings.fetch_timeout_secs))?,
            None => fetch.await,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSource;
    use pharmstock_core::{MedicineId, TransactionKind};
    use std::time::Duration;

    fn paracetamol_source() -> StaticSource {
        StaticSource::new(
            vec![
                RawCatalogEntry::package_priced(1, "Paracetamol", 20, 15000.0),
                RawCatalogEntry::package_priced(2, "Broken", 0, 100.0),
                RawCatalogEntry::package_priced(3, "Aspirin", 10, 500.0),
            ],
            vec![
                Receipt::new(1, &[(1, 20), (2, 10)]),
                Receipt::new(1, &[(1, 10)]),
                Receipt::new(2, &[(3, 40)]),
            ],
        )
    }

    /// Source whose calls can fail or stall.
    struct ScriptedSource {
        inner: StaticSource,
        fail_catalog: bool,
        fail_receipts: bool,
        fail_transactions: bool,
        stall_transactions: bool,
        delay: Duration,
    }

    impl ScriptedSource {
        fn new(inner: StaticSource) -> Self {
            ScriptedSource {
                inner,
                fail_catalog: false,
                fail_receipts: false,
                fail_transactions: false,
                stall_transactions: false,
                delay: Duration::ZERO,
            }
        }
    }

    impl StockSource for ScriptedSource {
        async fn fetch_catalog(&self) -> SyncResult<Vec<RawCatalogEntry>> {
            tokio::time::sleep(self.delay).await;
            if self.fail_catalog {
                return Err(SyncError::fetch("catalog", "503 Service Unavailable"));
            }
            self.inner.fetch_catalog().await
        }

        async fn fetch_receipts(&self, pharmacy: PharmacyId) -> SyncResult<Vec<Receipt>> {
            if self.fail_receipts {
                return Err(SyncError::fetch("receipts", "connection reset"));
            }
            self.inner.fetch_receipts(pharmacy).await
        }

        async fn fetch_transactions(
            &self,
            pharmacy: PharmacyId,
        ) -> SyncResult<Vec<StockTransaction>> {
            if self.stall_transactions {
                std::future::pending::<()>().await;
            }
            if self.fail_transactions {
                return Err(SyncError::fetch("transactions", "404"));
            }
            self.inner.fetch_transactions(pharmacy).await
        }
    }

    #[tokio::test]
    async fn test_load_reconciles_one_pharmacy() {
        let loader = StockLoader::new(paracetamol_source(), &SyncConfig::default());
        let report = loader.load(PharmacyId(1)).await.unwrap();

        assert_eq!(report.pharmacy, PharmacyId(1));
        assert_eq!(report.records.len(), 1);

        let record = &report.records[0];
        assert_eq!(record.medicine.id, MedicineId(1));
        assert_eq!(record.given_quantity, 30);
        assert_eq!(record.given_packages, 1);
        assert_eq!(record.given_value, 22500.0);
        assert_eq!(record.remaining_value, 22500.0);

        assert_eq!(report.totals.total_given, 30);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].id, MedicineId(2));
    }

    #[tokio::test]
    async fn test_transactions_feed_sold_quantities() {
        let source = paracetamol_source().with_transactions(
            PharmacyId(2),
            vec![StockTransaction {
                medicine: MedicineId(3),
                quantity_pills: 15,
                kind: TransactionKind::Sold,
            }],
        );
        let loader = StockLoader::new(source, &SyncConfig::default());
        let report = loader.load(PharmacyId(2)).await.unwrap();

        let record = &report.records[0];
        assert_eq!(record.sold_quantity, 15);
        assert_eq!(record.remaining_quantity, 25);
        assert_eq!(record.remaining_packages, 2);
        assert_eq!(record.remaining_value, 1250.0);
    }

    #[tokio::test]
    async fn test_wrongly_typed_entry_is_reported_not_fatal() {
        let source = StaticSource::from_json(
            r#"[
                {"id": 1, "name": "Paracetamol", "pills_per_package": 20, "selling_price": "15000.00"},
                {"id": 2, "name": "Half pack", "pills_per_package": 1.5, "selling_price": 100}
            ]"#,
            r#"[
                {"pharmacy": 1, "products": [{"product_id": 1, "count": 30}, {"product_id": 2, "count": 4}]},
                {"pharmacy": null, "products": [{"product_id": 1, "count": 99}]}
            ]"#,
        )
        .unwrap();
        let loader = StockLoader::new(source, &SyncConfig::default());

        let report = loader.load(PharmacyId(1)).await.unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].given_value, 22500.0);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].id, MedicineId(2));
        assert!(report.skipped[0].reason.starts_with("entry is malformed"));
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_load() {
        let mut source = ScriptedSource::new(paracetamol_source());
        source.fail_receipts = true;
        let loader = StockLoader::new(source, &SyncConfig::default());

        let err = loader.load(PharmacyId(1)).await.unwrap_err();
        assert!(err.is_fetch_error());

        match loader.refresh(PharmacyId(1)).await {
            LoadOutcome::Failed { pharmacy, error } => {
                assert_eq!(pharmacy, PharmacyId(1));
                assert!(matches!(error, SyncError::Fetch { .. }));
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_catalog_failure_aborts_load() {
        let mut source = ScriptedSource::new(paracetamol_source());
        source.fail_catalog = true;
        let loader = StockLoader::new(source, &SyncConfig::default());

        assert!(loader.load(PharmacyId(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_transaction_failure_degrades_to_no_sales() {
        let mut source = ScriptedSource::new(paracetamol_source());
        source.fail_transactions = true;
        let loader = StockLoader::new(source, &SyncConfig::default());

        let report = loader.load(PharmacyId(1)).await.unwrap();
        assert_eq!(report.records[0].sold_quantity, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_sales_feed_times_out_to_no_sales() {
        let mut source = ScriptedSource::new(paracetamol_source());
        source.stall_transactions = true;
        let mut config = SyncConfig::default();
        config.loader.fetch_timeout_secs = 5;
        let loader = StockLoader::new(source, &config);

        let report = loader.load(PharmacyId(1)).await.unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].sold_quantity, 0);
        assert_eq!(report.records[0].remaining_quantity, 30);
    }

    #[tokio::test]
    async fn test_input_failure_does_not_wait_for_sales() {
        let mut source = ScriptedSource::new(paracetamol_source());
        source.fail_receipts = true;
        source.stall_transactions = true;
        let loader = StockLoader::new(source, &SyncConfig::default());

        let err = loader.load(PharmacyId(1)).await.unwrap_err();
        assert!(err.is_fetch_error());
    }

    #[tokio::test]
    async fn test_superseded_load_is_stale() {
        let loader = StockLoader::new(paracetamol_source(), &SyncConfig::default());

        let first = loader.select(PharmacyId(1));
        let second = loader.select(PharmacyId(2));
        assert!(!loader.is_current(&first));
        assert!(loader.is_current(&second));

        let (a, b) = tokio::join!(loader.load_selected(first), loader.load_selected(second));
        assert!(a.is_stale());

        let report = b.into_report().unwrap();
        assert_eq!(report.pharmacy, PharmacyId(2));
        assert_eq!(report.records[0].medicine.id, MedicineId(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_selection_during_slow_fetch_discards_result() {
        let mut source = ScriptedSource::new(paracetamol_source());
        source.delay = Duration::from_secs(2);
        let loader = StockLoader::new(source, &SyncConfig::default());

        let ticket = loader.select(PharmacyId(1));
        let slow = loader.load_selected(ticket);
        let switch = async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            loader.select(PharmacyId(2))
        };

        let (outcome, newer) = tokio::join!(slow, switch);
        assert!(outcome.is_stale());
        assert!(loader.is_current(&newer));
    }

    #[tokio::test]
    async fn test_stale_results_kept_when_disabled() {
        let mut config = SyncConfig::default();
        config.loader.discard_stale = false;
        let loader = StockLoader::new(paracetamol_source(), &config);

        let first = loader.select(PharmacyId(1));
        let _second = loader.select(PharmacyId(2));
        assert!(loader.load_selected(first).await.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_timeout() {
        let mut source = ScriptedSource::new(paracetamol_source());
        source.delay = Duration::from_secs(30);
        let mut config = SyncConfig::default();
        config.loader.fetch_timeout_secs = 5;
        let loader = StockLoader::new(source, &config);

        let err = loader.load(PharmacyId(1)).await.unwrap_err();
        assert!(matches!(err, SyncError::Timeout(5)));
    }

    #[tokio::test]
    async fn test_pill_default_price_type() {
        let mut entry = RawCatalogEntry::package_priced(1, "Syrup", 5, 40.0);
        entry.price_type = None;
        let source = StaticSource::new(vec![entry], vec![Receipt::new(1, &[(1, 10)])]);

        let mut config = SyncConfig::default();
        config.catalog.default_price_type = PriceType::Pill;
        let loader = StockLoader::new(source, &config);

        let report = loader.load(PharmacyId(1)).await.unwrap();
        assert_eq!(report.records[0].medicine.price_per_unit, 40.0);
        assert_eq!(report.records[0].given_value, 400.0);
    }

    #[tokio::test]
    async fn test_report_serializes_for_frontend() {
        let loader = StockLoader::new(paracetamol_source(), &SyncConfig::default());
        let report = loader.load(PharmacyId(1)).await.unwrap();

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["pharmacy"], 1);
        assert_eq!(value["records"][0]["givenQuantity"], 30);
        assert_eq!(value["totals"]["totalGivenValue"], 22500.0);
        assert!(value["generatedAt"].is_string());
    }
}
