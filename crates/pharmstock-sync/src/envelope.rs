//! # Response Envelopes
//!
//! List endpoints answer either with a bare JSON array or with a paginated
//! object:
//!
//! ```text
//! [ {...}, {...} ]                                   ──► Bare
//! { "count": 2, "next": null, "results": [ ... ] }   ──► Paginated
//! ```
//!
//! Both are normalized here, once, so nothing downstream has to care.
//!
//! Elements are read one at a time: a single unreadable element is dropped
//! (or, for catalog entries, kept as malformed) instead of failing the list.

use pharmstock_core::{RawCatalogEntry, Receipt, StockTransaction};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::SyncResult;

/// A list response in either envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Bare(Vec<T>),
    Paginated {
        results: Vec<T>,
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
    },
}

impl<T> ListEnvelope<T> {
    /// Unwraps the items regardless of envelope.
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListEnvelope::Bare(items) => items,
            ListEnvelope::Paginated { results, .. } => results,
        }
    }

    /// True when a paginated response says more pages follow.
    pub fn has_more(&self) -> bool {
        matches!(self, ListEnvelope::Paginated { next: Some(_), .. })
    }
}

/// An element type of a list endpoint.
pub trait ListItem: Sized {
    /// Converts one element. `None` drops it.
    fn from_item(item: Value) -> Option<Self>;
}

impl ListItem for RawCatalogEntry {
    fn from_item(item: Value) -> Option<Self> {
        RawCatalogEntry::from_value(item)
    }
}

impl ListItem for Receipt {
    fn from_item(item: Value) -> Option<Self> {
        serde_json::from_value(item).ok()
    }
}

impl ListItem for StockTransaction {
    fn from_item(item: Value) -> Option<Self> {
        serde_json::from_value(item).ok()
    }
}

/// Parses a list response body.
///
/// Only the envelope itself can fail; unreadable elements are dropped and
/// counted in a warning.
pub fn parse_list<T: ListItem>(body: &str) -> SyncResult<Vec<T>> {
    let envelope: ListEnvelope<Value> = serde_json::from_str(body)?;
    if envelope.has_more() {
        warn!("List response is paginated and has further pages; only the first page is used");
    }

    let raw = envelope.into_items();
    let total = raw.len();
    let items: Vec<T> = raw.into_iter().filter_map(T::from_item).collect();

    if items.len() < total {
        warn!(
            dropped = total - items.len(),
            total, "Dropped unreadable list elements"
        );
    }
    Ok(items)
}
