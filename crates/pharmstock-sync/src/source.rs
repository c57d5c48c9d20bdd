//! # Stock Sources
//!
//! The collaborator seam: whatever talks to the backend (HTTP client,
//! cached snapshot, fixture) implements [`StockSource`]. Session tokens and
//! similar context belong to the implementation, never to the core.
//!
//! ```text
//! ┌────────────────────┐      fetch_catalog()          ┌─────────────────┐
//! │  StockLoader       │ ─────────────────────────────►│  StockSource    │
//! │                    │      fetch_receipts(ph)       │                 │
//! │                    │ ─────────────────────────────►│  /products/     │
//! │                    │      fetch_transactions(ph)   │  /receipts/     │
//! │                    │ ─────────────────────────────►│  (optional)     │
//! └────────────────────┘                               └─────────────────┘
//! ```

use std::collections::HashMap;
use std::future::Future;

use pharmstock_core::{PharmacyId, RawCatalogEntry, Receipt, StockTransaction};

use crate::envelope::parse_list;
use crate::error::SyncResult;

/// Provides the raw inputs of a reconciliation.
///
/// Failures must be reported as [`SyncError::Fetch`](crate::SyncError::Fetch)
/// (or another fetch-side error); the loader then skips the computation.
pub trait StockSource: Send + Sync {
    /// The full product catalog.
    fn fetch_catalog(&self) -> impl Future<Output = SyncResult<Vec<RawCatalogEntry>>> + Send;

    /// Receipts addressed to `pharmacy`.
    fn fetch_receipts(
        &self,
        pharmacy: PharmacyId,
    ) -> impl Future<Output = SyncResult<Vec<Receipt>>> + Send;

    /// Recorded sales/returns for `pharmacy`.
    ///
    /// Sources without sales data keep the default, which reports nothing
    /// sold.
    fn fetch_transactions(
        &self,
        _pharmacy: PharmacyId,
    ) -> impl Future<Output = SyncResult<Vec<StockTransaction>>> + Send {
        async { Ok(Vec::new()) }
    }
}

// =============================================================================
// Static Source
// =============================================================================

/// In-memory snapshot of backend data.
///
/// Useful for previews and tests; receipts for every pharmacy live in one
/// list and are filtered per request the way the receipts endpoint does.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    catalog: Vec<RawCatalogEntry>,
    receipts: Vec<Receipt>,
    transactions: HashMap<PharmacyId, Vec<StockTransaction>>,
}

impl StaticSource {
    pub fn new(catalog: Vec<RawCatalogEntry>, receipts: Vec<Receipt>) -> Self {
        StaticSource {
            catalog,
            receipts,
            transactions: HashMap::new(),
        }
    }

    /// Builds a snapshot from raw response bodies in either envelope.
    pub fn from_json(catalog_body: &str, receipts_body: &str) -> SyncResult<Self> {
        Ok(StaticSource::new(
            parse_list(catalog_body)?,
            parse_list(receipts_body)?,
        ))
    }

    /// Attaches recorded transactions for one pharmacy.
    pub fn with_transactions(
        mut self,
        pharmacy: PharmacyId,
        transactions: Vec<StockTransaction>,
    ) -> Self {
        self.transactions.insert(pharmacy, transactions);
        self
    }

    pub fn catalog(&self) -> &[RawCatalogEntry] {
        &self.catalog
    }
}

impl StockSource for StaticSource {
    async fn fetch_catalog(&self) -> SyncResult<Vec<RawCatalogEntry>> {
        Ok(self.catalog.clone())
    }

    async fn fetch_receipts(&self, pharmacy: PharmacyId) -> SyncResult<Vec<Receipt>> {
        Ok(self
            .receipts
            .iter()
            .filter(|receipt| receipt.pharmacy == pharmacy)
            .cloned()
            .collect())
    }

    async fn fetch_transactions(&self, pharmacy: PharmacyId) -> SyncResult<Vec<StockTransaction>> {
        Ok(self.transactions.get(&pharmacy).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_source_filters_receipts_by_pharmacy() {
        let source = StaticSource::new(
            vec![RawCatalogEntry::package_priced(1, "A", 10, 100.0)],
            vec![
                Receipt::new(1, &[(1, 5)]),
                Receipt::new(2, &[(1, 7)]),
                Receipt::new(1, &[(1, 2)]),
            ],
        );

        assert_eq!(source.fetch_catalog().await.unwrap().len(), 1);
        assert_eq!(source.fetch_receipts(PharmacyId(1)).await.unwrap().len(), 2);
        assert_eq!(source.fetch_receipts(PharmacyId(2)).await.unwrap().len(), 1);
        assert!(source.fetch_receipts(PharmacyId(3)).await.unwrap().is_empty());
        assert!(source.fetch_transactions(PharmacyId(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_from_json_accepts_both_envelopes() {
        let source = StaticSource::from_json(
            r#"{"results": [{"id": 1, "name": "Paracetamol", "pills_per_package": 20, "selling_price": "15000.00"}]}"#,
            r#"[{"pharmacy": 1, "products": [{"product_id": 1, "count": 20}]}]"#,
        )
        .unwrap();

        assert_eq!(source.catalog().len(), 1);
        let receipts = source.fetch_receipts(PharmacyId(1)).await.unwrap();
        assert_eq!(receipts[0].products.len(), 1);
    }

    #[tokio::test]
    async fn test_from_json_keeps_valid_entries_beside_bad_ones() {
        let source = StaticSource::from_json(
            r#"[
                {"id": 1, "name": "Paracetamol", "pills_per_package": 20, "selling_price": "15000.00"},
                {"id": 2, "name": "Half pack", "pills_per_package": 1.5, "selling_price": 100}
            ]"#,
            r#"[
                {"pharmacy": 1, "products": [{"product_id": 1, "count": 30}]},
                {"pharmacy": null, "products": null}
            ]"#,
        )
        .unwrap();

        assert_eq!(source.catalog().len(), 2);
        assert!(source.catalog()[1].malformed.is_some());
        assert_eq!(source.fetch_receipts(PharmacyId(1)).await.unwrap().len(), 1);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(StaticSource::from_json("not json", "[]").is_err());
    }
}
