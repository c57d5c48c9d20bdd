//! # Product Catalog Adapter
//!
//! Turns raw product records into [`Medicine`] values with a per-unit price.
//!
//! ## Price Derivation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  price_type = package (default)                                         │
//! │    selling_price = 15000, pills_per_package = 20                        │
//! │    price_per_unit = 15000 / 20 = 750                                    │
//! │                                                                         │
//! │  price_type = pill                                                      │
//! │    selling_price = 750                                                  │
//! │    price_per_unit = 750                                                 │
//! │                                                                         │
//! │  pills_per_package = 0  ──►  DataError, entry skipped (never Infinity)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::warn;

use crate::error::{CoreError, CoreResult, DataError};
use crate::types::{Medicine, PriceType, RawCatalogEntry, SkippedEntry};
use crate::validation::{parse_price, validate_name, validate_pills_per_package};

impl Medicine {
    /// Normalizes a raw catalog entry.
    ///
    /// `default_price_type` applies when the entry does not say how its
    /// price is stored.
    pub fn from_entry(entry: &RawCatalogEntry, default_price_type: PriceType) -> CoreResult<Self> {
        Self::build(entry, default_price_type).map_err(|source| CoreError::InvalidEntry {
            id: entry.id,
            source,
        })
    }

    fn build(entry: &RawCatalogEntry, default_price_type: PriceType) -> Result<Self, DataError> {
        if let Some(reason) = &entry.malformed {
            return Err(DataError::Malformed(reason.clone()));
        }

        let name = validate_name(entry.name.as_deref())?;
        let pills_per_package = validate_pills_per_package(entry.pills_per_package)?;
        let selling_price = parse_price(entry.selling_price.as_ref())?;

        let price_per_unit = match entry.price_type.unwrap_or(default_price_type) {
            PriceType::Package => selling_price / f64::from(pills_per_package),
            PriceType::Pill => selling_price,
        };

        Ok(Medicine {
            id: entry.id,
            name,
            dosage: entry.dosage.clone().unwrap_or_default(),
            pills_per_package,
            price_per_unit,
            manufacturer: entry.manufacturer.clone(),
        })
    }

    /// Price of one full package.
    pub fn price_per_package(&self) -> f64 {
        self.price_per_unit * f64::from(self.pills_per_package)
    }
}

impl TryFrom<&RawCatalogEntry> for Medicine {
    type Error = CoreError;

    fn try_from(entry: &RawCatalogEntry) -> Result<Self, Self::Error> {
        Medicine::from_entry(entry, PriceType::default())
    }
}

// =============================================================================
// Whole-Catalog Adaptation
// =============================================================================

/// Result of adapting a full catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogAdaptation {
    /// Valid medicines, in catalog order.
    pub medicines: Vec<Medicine>,

    /// Entries that failed validation.
    pub skipped: Vec<CoreError>,
}

impl CatalogAdaptation {
    /// Skipped entries in their serializable form.
    pub fn skipped_entries(&self) -> Vec<SkippedEntry> {
        self.skipped
            .iter()
            .map(|err| SkippedEntry {
                id: err.medicine_id(),
                reason: err.data_error().to_string(),
            })
            .collect()
    }
}

/// Adapts every entry of a catalog.
///
/// A bad entry does not abort the rest: it is logged and reported in
/// [`CatalogAdaptation::skipped`].
pub fn adapt_catalog(entries: &[RawCatalogEntry], default_price_type: PriceType) -> CatalogAdaptation {
    let mut adaptation = CatalogAdaptation::default();

    for entry in entries {
        match Medicine::from_entry(entry, default_price_type) {
            Ok(medicine) => adaptation.medicines.push(medicine),
            Err(err) => {
                warn!(medicine_id = %entry.id, error = %err.data_error(), "Skipping malformed catalog entry");
                adaptation.skipped.push(err);
            }
        }
    }

    adaptation
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MedicineId, PriceValue};

    #[test]
    fn test_package_price_is_divided() {
        let entry = RawCatalogEntry::package_priced(1, "Paracetamol", 20, 15000.0);
        let medicine = Medicine::try_from(&entry).unwrap();

        assert_eq!(medicine.id, MedicineId(1));
        assert_eq!(medicine.pills_per_package, 20);
        assert_eq!(medicine.price_per_unit, 750.0);
        assert_eq!(medicine.dosage, "");
    }

    #[test]
    fn test_pill_price_is_taken_directly() {
        let mut entry = RawCatalogEntry::package_priced(2, "Ibuprofen", 10, 800.0);
        entry.price_type = Some(PriceType::Pill);

        let medicine = Medicine::try_from(&entry).unwrap();
        assert_eq!(medicine.price_per_unit, 800.0);
        assert_eq!(medicine.price_per_package(), 8000.0);
    }

    #[test]
    fn test_default_price_type_applies_when_missing() {
        let mut entry = RawCatalogEntry::package_priced(3, "Vitamin C", 4, 100.0);
        entry.price_type = None;

        let as_package = Medicine::from_entry(&entry, PriceType::Package).unwrap();
        let as_pill = Medicine::from_entry(&entry, PriceType::Pill).unwrap();
        assert_eq!(as_package.price_per_unit, 25.0);
        assert_eq!(as_pill.price_per_unit, 100.0);
    }

    #[test]
    fn test_unit_price_round_trips_to_package_price() {
        for (pills, price) in [(3, 100.0), (7, 15000.0), (12, 0.01), (1, 999.99), (30, 0.0)] {
            let entry = RawCatalogEntry::package_priced(1, "X", pills, price);
            let medicine = Medicine::try_from(&entry).unwrap();
            assert!((medicine.price_per_package() - price).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_package_size_is_a_data_error() {
        let entry = RawCatalogEntry::package_priced(4, "Broken", 0, 1000.0);
        let err = Medicine::try_from(&entry).unwrap_err();

        assert_eq!(err.medicine_id(), MedicineId(4));
        assert_eq!(err.data_error(), &DataError::InvalidPackageSize(Some(0)));
    }

    #[test]
    fn test_string_price_is_parsed() {
        let mut entry = RawCatalogEntry::package_priced(5, "Amoxicillin", 10, 0.0);
        entry.selling_price = Some(PriceValue::Text("2500.50".into()));

        let medicine = Medicine::try_from(&entry).unwrap();
        assert!((medicine.price_per_unit - 250.05).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_entry_is_reported() {
        let entries = vec![
            RawCatalogEntry::package_priced(1, "Paracetamol", 20, 15000.0),
            RawCatalogEntry::malformed(MedicineId(2), "invalid type: floating point `1.5`"),
        ];

        let adaptation = adapt_catalog(&entries, PriceType::Package);
        assert_eq!(adaptation.medicines.len(), 1);
        assert_eq!(adaptation.skipped[0].medicine_id(), MedicineId(2));
        assert!(matches!(
            adaptation.skipped[0].data_error(),
            DataError::Malformed(reason) if reason.contains("1.5")
        ));
    }

    #[test]
    fn test_adapt_catalog_skips_bad_entries_and_keeps_order() {
        let mut nameless = RawCatalogEntry::package_priced(3, "", 10, 10.0);
        nameless.name = None;

        let entries = vec![
            RawCatalogEntry::package_priced(1, "A", 10, 100.0),
            RawCatalogEntry::package_priced(2, "B", 0, 100.0),
            nameless,
            RawCatalogEntry::package_priced(4, "D", 5, 50.0),
        ];

        let adaptation = adapt_catalog(&entries, PriceType::Package);
        let ids: Vec<_> = adaptation.medicines.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![MedicineId(1), MedicineId(4)]);

        let skipped = adaptation.skipped_entries();
        assert_eq!(skipped.len(), 2);
        assert_eq!(skipped[0].id, MedicineId(2));
        assert_eq!(skipped[1].id, MedicineId(3));
        assert_eq!(skipped[1].reason, "name is required");
    }
}
