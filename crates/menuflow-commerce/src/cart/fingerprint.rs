//! Cart line identity.
//!
//! Two configurations with the same product, the same options and the same
//! note share a fingerprint and therefore a cart line. The key is a compact
//! JSON array, so it is stable across restarts and safe to persist.

use crate::catalog::{Product, Relation, RelationKind};
use crate::pricing::ResolvedSelection;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical key of a configured product.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an already computed key.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprint a product configuration.
///
/// Option groups are ordered by related product id (then relation id). A group
/// the product offers but the customer left empty stays in the key as `[]`; a
/// group the product does not offer at all is `null`. The observation is
/// trimmed but otherwise kept verbatim.
pub fn fingerprint(product: &Product, observation: &str, selection: &ResolvedSelection) -> Fingerprint {
    let key = serde_json::json!([
        product.id.as_str(),
        observation.trim(),
        canonical(product, RelationKind::Flavor, &selection.flavors),
        canonical(product, RelationKind::Additional, &selection.additionals),
        canonical(product, RelationKind::Composition, &selection.removed_compositions),
    ]);
    Fingerprint(key.to_string())
}

fn canonical<'a>(product: &Product, kind: RelationKind, relations: &'a [Relation]) -> Option<Vec<[&'a str; 2]>> {
    if relations.is_empty() && product.relations_of(kind).next().is_none() {
        return None;
    }
    let mut entries: Vec<[&str; 2]> = relations
        .iter()
        .map(|r| [r.related_product.id.as_str(), r.id.as_str()])
        .collect();
    entries.sort_unstable();
    Some(entries)
}
