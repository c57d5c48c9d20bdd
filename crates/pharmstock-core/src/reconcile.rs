//! # Stock Reconciliation Engine
//!
//! Combines the normalized catalog, the receipts of one pharmacy and a
//! sales ledger into one [`ReconciliationRecord`] per delivered medicine.
//!
//! ## Per-Record Math
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  given      = Σ receipt line counts for the medicine                    │
//! │  sold       = SalesLedger::sold_quantity (NoSales → 0)                  │
//! │  remaining  = max(0, given − sold)                                      │
//! │                                                                         │
//! │  *_packages = *_quantity / pills_per_package   (floored)                │
//! │  *_value    = *_quantity × price_per_unit                               │
//! │                                                                         │
//! │  given == 0  ──►  no record                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Output keeps catalog order. The engine is a pure function: same inputs,
//! same output, no side effects.

use std::collections::HashMap;

use tracing::debug;

use crate::receipts::given_quantities;
use crate::types::{
    Medicine, MedicineId, ReconciliationRecord, Receipt, StockTotals, StockTransaction,
    TransactionKind,
};

// =============================================================================
// Sales Ledger
// =============================================================================

/// Source of sold quantities for one pharmacy.
pub trait SalesLedger {
    /// Units of `medicine` sold by the pharmacy.
    fn sold_quantity(&self, medicine: MedicineId) -> u64;
}

/// Ledger with no sales data. Every medicine reports 0 sold.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSales;

impl SalesLedger for NoSales {
    fn sold_quantity(&self, _medicine: MedicineId) -> u64 {
        0
    }
}

/// Ledger built from recorded pharmacy transactions.
///
/// Per medicine: `sold − returned`, floored at 0. `Given` transactions are
/// ignored here; deliveries come from receipts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionLedger {
    sold: HashMap<MedicineId, u64>,
}

impl TransactionLedger {
    pub fn from_transactions<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a StockTransaction>,
    {
        let mut sold: HashMap<MedicineId, u64> = HashMap::new();
        let mut returned: HashMap<MedicineId, u64> = HashMap::new();

        for tx in transactions {
            let bucket = match tx.kind {
                TransactionKind::Sold => &mut sold,
                TransactionKind::Returned => &mut returned,
                TransactionKind::Given => continue,
            };
            let total = bucket.entry(tx.medicine).or_insert(0);
            *total = total.saturating_add(tx.quantity_pills);
        }

        for (medicine, back) in returned {
            if let Some(total) = sold.get_mut(&medicine) {
                *total = total.saturating_sub(back);
            }
        }

        TransactionLedger { sold }
    }

    pub fn is_empty(&self) -> bool {
        self.sold.values().all(|&qty| qty == 0)
    }
}

impl SalesLedger for TransactionLedger {
    fn sold_quantity(&self, medicine: MedicineId) -> u64 {
        self.sold.get(&medicine).copied().unwrap_or(0)
    }
}

// =============================================================================
// Records
// =============================================================================

impl ReconciliationRecord {
    /// Builds the record for one medicine from its given and sold units.
    ///
    /// `medicine.pills_per_package` must be positive, which
    /// [`Medicine::from_entry`] guarantees. A hand-built medicine with a zero
    /// size trips a debug assertion; release builds count it as one unit
    /// per package.
    pub fn new(medicine: Medicine, given_quantity: u64, sold_quantity: u64) -> Self {
        debug_assert!(
            medicine.pills_per_package > 0,
            "medicine {} has a zero package size",
            medicine.id
        );
        let remaining_quantity = given_quantity.saturating_sub(sold_quantity);
        let per_package = u64::from(medicine.pills_per_package.max(1));
        let price = medicine.price_per_unit;

        ReconciliationRecord {
            given_quantity,
            given_packages: given_quantity / per_package,
            given_value: given_quantity as f64 * price,
            sold_quantity,
            sold_packages: sold_quantity / per_package,
            sold_value: sold_quantity as f64 * price,
            remaining_quantity,
            remaining_packages: remaining_quantity / per_package,
            remaining_value: remaining_quantity as f64 * price,
            medicine,
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Reconciles with no sales data (sold is always 0).
pub fn reconcile(catalog: &[Medicine], receipts: &[Receipt]) -> Vec<ReconciliationRecord> {
    reconcile_with(catalog, receipts, &NoSales)
}

/// Reconciles using `ledger` for sold quantities.
pub fn reconcile_with<L>(
    catalog: &[Medicine],
    receipts: &[Receipt],
    ledger: &L,
) -> Vec<ReconciliationRecord>
where
    L: SalesLedger + ?Sized,
{
    let given = given_quantities(receipts);

    let records: Vec<_> = catalog
        .iter()
        .filter_map(|medicine| {
            let given_quantity = given.get(&medicine.id).copied().unwrap_or(0);
            if given_quantity == 0 {
                return None;
            }
            let sold_quantity = ledger.sold_quantity(medicine.id);
            Some(ReconciliationRecord::new(
                medicine.clone(),
                given_quantity,
                sold_quantity,
            ))
        })
        .collect();

    debug!(
        catalog = catalog.len(),
        receipts = receipts.len(),
        records = records.len(),
        "Reconciled pharmacy stock"
    );

    records
}

// =============================================================================
// Totals & Search
// =============================================================================

impl StockTotals {
    /// Sums any set of records, e.g. the full list or a search result.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ReconciliationRecord>,
    {
        records.into_iter().fold(StockTotals::default(), |acc, r| StockTotals {
            total_given: acc.total_given.saturating_add(r.given_quantity),
            total_sold: acc.total_sold.saturating_add(r.sold_quantity),
            total_remaining: acc.total_remaining.saturating_add(r.remaining_quantity),
            total_given_value: acc.total_given_value + r.given_value,
            total_sold_value: acc.total_sold_value + r.sold_value,
            total_remaining_value: acc.total_remaining_value + r.remaining_value,
        })
    }
}

/// Case-insensitive search over name, manufacturer and dosage.
///
/// A blank query matches everything.
pub fn filter_records<'a>(
    records: &'a [ReconciliationRecord],
    query: &str,
) -> Vec<&'a ReconciliationRecord> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return records.iter().collect();
    }

    records
        .iter()
        .filter(|record| {
            let medicine = &record.medicine;
            medicine.name.to_lowercase().contains(&query)
                || medicine.dosage.to_lowercase().contains(&query)
                || medicine
                    .manufacturer
                    .as_deref()
                    .is_some_and(|m| m.to_lowercase().contains(&query))
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
