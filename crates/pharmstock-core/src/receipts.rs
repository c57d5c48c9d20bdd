//! # Receipt Aggregator
//!
//! Sums delivered units per medicine across a pharmacy's receipts.
//!
//! ```text
//! receipt #1: [ (1, 20), (2, 5), (1, 4) ]     medicine 1 → 20 + 4 + 10 = 34
//! receipt #2: [ (1, 10) ]                ──►  medicine 2 → 5
//! receipt #3: products = null                 (contributes nothing)
//! ```
//!
//! Duplicates are additive, never deduplicated. Iteration order does not
//! matter.

use std::collections::HashMap;

use crate::types::{MedicineId, PharmacyId, Receipt};

/// Total units of `medicine` given across `receipts`.
///
/// The caller is expected to have scoped `receipts` to one pharmacy.
pub fn given_quantity(receipts: &[Receipt], medicine: MedicineId) -> u64 {
    receipts
        .iter()
        .flat_map(|receipt| receipt.products.iter())
        .filter(|item| item.product_id == medicine)
        .fold(0u64, |total, item| total.saturating_add(item.count))
}

/// Given quantity for every medicine mentioned in `receipts`, in one pass.
///
/// Equivalent to calling [`given_quantity`] for each id.
pub fn given_quantities(receipts: &[Receipt]) -> HashMap<MedicineId, u64> {
    let mut totals: HashMap<MedicineId, u64> = HashMap::new();

    for item in receipts.iter().flat_map(|receipt| receipt.products.iter()) {
        let total = totals.entry(item.product_id).or_insert(0);
        *total = total.saturating_add(item.count);
    }

    totals
}

/// Keeps only receipts addressed to `pharmacy`. Returns how many were dropped.
pub fn retain_pharmacy(receipts: &mut Vec<Receipt>, pharmacy: PharmacyId) -> usize {
    let before = receipts.len();
    receipts.retain(|receipt| receipt.pharmacy == pharmacy);
    before - receipts.len()
}

// =============================================================================
// Unit Tests
// =============================================================================
