//! # Domain Types
//!
//! Core domain types used throughout pharmstock.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  INPUT (backend wire shapes)          OUTPUT (presentation layer)      │
//! │  ┌─────────────────┐                  ┌──────────────────────────┐     │
//! │  │ RawCatalogEntry │ ── adapter ──►   │ Medicine                 │     │
//! │  │  id, name       │                  │  pricePerUnit (derived)  │     │
//! │  │  selling_price  │                  └────────────┬─────────────┘     │
//! │  └─────────────────┘                               │                   │
//! │  ┌─────────────────┐                  ┌────────────▼─────────────┐     │
//! │  │ Receipt         │ ── aggregator ─► │ ReconciliationRecord     │     │
//! │  │  pharmacy       │                  │  given / sold / remaining│     │
//! │  │  products[]     │                  │  packages, values        │     │
//! │  └─────────────────┘                  └────────────┬─────────────┘     │
//! │  ┌─────────────────┐                               │                   │
//! │  │StockTransaction │ ── sales ledger               ▼                   │
//! │  │  given/sold/ret │                  ┌──────────────────────────┐     │
//! │  └─────────────────┘                  │ StockTotals              │     │
//! │                                       └──────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Input types are deliberately forgiving on deserialization: receipts with a
//! broken `products` field must still load, they just contribute nothing.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Identifiers
// =============================================================================

/// Catalog identifier of a medicine/product. Shared by catalog and receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MedicineId(pub u64);

impl fmt::Display for MedicineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a receiving pharmacy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PharmacyId(pub u64);

impl fmt::Display for PharmacyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Catalog Input
// =============================================================================

/// How a catalog entry stores its selling price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceType {
    /// Price is for a whole package; the unit price is derived.
    #[default]
    Package,

    /// Price is already per pill.
    Pill,
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceType::Package => write!(f, "package"),
            PriceType::Pill => write!(f, "pill"),
        }
    }
}

impl std::str::FromStr for PriceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "package" | "pack" => Ok(PriceType::Package),
            "pill" | "unit" => Ok(PriceType::Pill),
            other => Err(format!(
                "Unknown price type: '{}'. Valid options: package, pill",
                other
            )),
        }
    }
}

/// A price as the backend sends it.
///
/// Decimal columns arrive as strings (`"15000.00"`), computed ones as numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceValue {
    Number(f64),
    Text(String),
}

/// A catalog entry as returned by the products endpoint.
///
/// Only the fields the reconciliation consumes are modelled; everything
/// else in the payload is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCatalogEntry {
    pub id: MedicineId,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub dosage: Option<String>,

    /// Packaging unit size. Kept signed so zero and negative sizes reach
    /// validation as data errors.
    #[serde(default)]
    pub pills_per_package: Option<i64>,

    #[serde(default)]
    pub selling_price: Option<PriceValue>,

    /// Missing means "use the configured default".
    #[serde(default)]
    pub price_type: Option<PriceType>,

    #[serde(default)]
    pub manufacturer: Option<String>,

    /// Set when only the `id` of the entry could be read. The adapter
    /// reports such entries instead of normalizing them.
    #[serde(skip)]
    pub malformed: Option<String>,
}

impl RawCatalogEntry {
    /// Reads one element of a catalog payload.
    ///
    /// Wrongly typed fields (`"pills_per_package": 1.5`, `"selling_price": true`)
    /// never fail the payload: the entry is kept with its id and marked
    /// malformed. Elements without a usable `id` cannot be reported and
    /// yield `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        let id = value.get("id").and_then(id_from_value)?;
        match serde_json::from_value::<RawCatalogEntry>(value) {
            Ok(entry) => Some(entry),
            Err(err) => Some(RawCatalogEntry::malformed(MedicineId(id), err.to_string())),
        }
    }

    /// An entry known only by its id.
    pub fn malformed(id: MedicineId, reason: impl Into<String>) -> Self {
        RawCatalogEntry {
            id,
            name: None,
            dosage: None,
            pills_per_package: None,
            selling_price: None,
            price_type: None,
            manufacturer: None,
            malformed: Some(reason.into()),
        }
    }

    /// Creates a package-priced entry. Mostly useful for tests and fixtures.
    pub fn package_priced(
        id: u64,
        name: impl Into<String>,
        pills_per_package: i64,
        selling_price: f64,
    ) -> Self {
        RawCatalogEntry {
            id: MedicineId(id),
            name: Some(name.into()),
            dosage: None,
            pills_per_package: Some(pills_per_package),
            selling_price: Some(PriceValue::Number(selling_price)),
            price_type: Some(PriceType::Package),
            manufacturer: None,
            malformed: None,
        }
    }
}

// =============================================================================
// Medicine (normalized catalog entry)
// =============================================================================

/// A normalized catalog entry with a derived per-unit price.
///
/// ## Invariants
/// - `pills_per_package > 0`
/// - `price_per_unit` is finite and non-negative
///
/// Both are guaranteed by [`Medicine::from_entry`](crate::catalog); the
/// fields stay public for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    #[ts(type = "number")]
    pub id: MedicineId,

    pub name: String,

    /// Free-text strength/form descriptor ("500mg", "10ml syrup").
    pub dosage: String,

    pub pills_per_package: u32,

    /// Monetary price of one base unit (pill).
    pub price_per_unit: f64,

    pub manufacturer: Option<String>,
}

// =============================================================================
// Receipts
// =============================================================================

/// One delivered product inside a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: MedicineId,

    /// Number of base units delivered.
    pub count: u64,
}

/// A record of medicines delivered to a pharmacy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub pharmacy: PharmacyId,

    /// Delivered products in receipt order. The same product may appear
    /// more than once.
    #[serde(default, deserialize_with = "lenient_line_items")]
    pub products: Vec<LineItem>,
}

impl Receipt {
    /// Creates a receipt from `(product_id, count)` pairs.
    pub fn new(pharmacy: u64, items: &[(u64, u64)]) -> Self {
        Receipt {
            pharmacy: PharmacyId(pharmacy),
            products: items
                .iter()
                .map(|&(product_id, count)| LineItem {
                    product_id: MedicineId(product_id),
                    count,
                })
                .collect(),
        }
    }
}

/// Deserializes `products` without ever failing the receipt.
///
/// `null`, objects, strings and other non-arrays become an empty list.
/// Array elements without a usable `product_id` are dropped; a missing,
/// negative or non-numeric `count` counts as 0.
fn lenient_line_items<'de, D>(deserializer: D) -> Result<Vec<LineItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(line_items_from_value(&value))
}

/// Extracts line items from an arbitrary JSON value.
pub fn line_items_from_value(value: &Value) -> Vec<LineItem> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let product_id = item.get("product_id").and_then(id_from_value)?;
            let count = item.get("count").map(count_from_value).unwrap_or(0);
            Some(LineItem {
                product_id: MedicineId(product_id),
                count,
            })
        })
        .collect()
}

/// Integer ids, also when sent as whole-number floats (`1.0`).
fn id_from_value(value: &Value) -> Option<u64> {
    if let Some(id) = value.as_u64() {
        return Some(id);
    }
    match value.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 => Some(f as u64),
        _ => None,
    }
}

fn count_from_value(value: &Value) -> u64 {
    if let Some(n) = value.as_u64() {
        return n;
    }
    match value.as_f64() {
        Some(f) if f.is_finite() && f > 0.0 => f.trunc() as u64,
        _ => 0,
    }
}

// =============================================================================
// Pharmacy Transactions (sold-quantity source)
// =============================================================================

/// Direction of a pharmacy stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Delivered to the pharmacy.
    Given,
    /// Sold by the pharmacy.
    Sold,
    /// Sold units that came back.
    Returned,
}

/// A single stock movement recorded for a pharmacy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockTransaction {
    pub medicine: MedicineId,

    /// Base units moved.
    pub quantity_pills: u64,

    #[serde(rename = "transaction_type")]
    pub kind: TransactionKind,
}

// =============================================================================
// Reconciliation Output
// =============================================================================

/// Per-medicine stock picture for one pharmacy.
///
/// Computed fresh on every load, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationRecord {
    pub medicine: Medicine,

    #[ts(type = "number")]
    pub given_quantity: u64,
    #[ts(type = "number")]
    pub given_packages: u64,
    pub given_value: f64,

    #[ts(type = "number")]
    pub sold_quantity: u64,
    #[ts(type = "number")]
    pub sold_packages: u64,
    pub sold_value: f64,

    #[ts(type = "number")]
    pub remaining_quantity: u64,
    #[ts(type = "number")]
    pub remaining_packages: u64,
    pub remaining_value: f64,
}

/// Summary bar over a set of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockTotals {
    #[ts(type = "number")]
    pub total_given: u64,
    #[ts(type = "number")]
    pub total_sold: u64,
    #[ts(type = "number")]
    pub total_remaining: u64,
    pub total_given_value: f64,
    pub total_sold_value: f64,
    pub total_remaining_value: f64,
}

/// A catalog entry that was left out of a reconciliation, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SkippedEntry {
    #[ts(type = "number")]
    pub id: MedicineId,
    pub reason: String,
}

// =============================================================================
// Unit Tests
// =============================================================================
