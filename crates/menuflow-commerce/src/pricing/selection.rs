//! Option selections for a product being configured.

use crate::catalog::{Product, Relation, RelationKind};
use crate::error::CommerceError;
use crate::ids::RelationId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The options a customer picked for one product, by relation id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSet {
    #[serde(default)]
    pub selected_flavor_ids: BTreeSet<RelationId>,
    #[serde(default)]
    pub selected_additional_ids: BTreeSet<RelationId>,
    #[serde(default)]
    pub removed_composition_ids: BTreeSet<RelationId>,
}

impl SelectionSet {
    /// Empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a flavor (builder style, unchecked).
    pub fn with_flavor(mut self, id: impl Into<RelationId>) -> Self {
        self.selected_flavor_ids.insert(id.into());
        self
    }

    /// Add an additional (builder style, unchecked).
    pub fn with_additional(mut self, id: impl Into<RelationId>) -> Self {
        self.selected_additional_ids.insert(id.into());
        self
    }

    /// Remove a composition (builder style, unchecked).
    pub fn without_composition(mut self, id: impl Into<RelationId>) -> Self {
        self.removed_composition_ids.insert(id.into());
        self
    }

    /// Number of selected flavors.
    pub fn flavor_count(&self) -> u32 {
        self.selected_flavor_ids.len() as u32
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected_flavor_ids.is_empty()
            && self.selected_additional_ids.is_empty()
            && self.removed_composition_ids.is_empty()
    }

    /// Toggle a flavor. Selecting past `flavor_allowed` is rejected.
    ///
    /// Returns whether the flavor is selected afterwards.
    pub fn toggle_flavor(&mut self, product: &Product, id: &RelationId) -> Result<bool, CommerceError> {
        expect_kind(product, id, RelationKind::Flavor)?;
        if self.selected_flavor_ids.remove(id) {
            return Ok(false);
        }
        if let Some(allowed) = product.flavor_allowed {
            if self.flavor_count() >= allowed {
                return Err(CommerceError::FlavorLimitExceeded {
                    allowed,
                    selected: self.flavor_count() + 1,
                });
            }
        }
        self.selected_flavor_ids.insert(id.clone());
        Ok(true)
    }

    /// Toggle an additional. Returns whether it is selected afterwards.
    pub fn toggle_additional(
        &mut self,
        product: &Product,
        id: &RelationId,
    ) -> Result<bool, CommerceError> {
        expect_kind(product, id, RelationKind::Additional)?;
        Ok(toggle(&mut self.selected_additional_ids, id))
    }

    /// Toggle removal of a default ingredient. Returns whether it is removed afterwards.
    pub fn toggle_composition(
        &mut self,
        product: &Product,
        id: &RelationId,
    ) -> Result<bool, CommerceError> {
        expect_kind(product, id, RelationKind::Composition)?;
        Ok(toggle(&mut self.removed_composition_ids, id))
    }

    /// Check every id against the product and enforce flavor bounds.
    pub fn validate(&self, product: &Product) -> Result<(), CommerceError> {
        for id in &self.selected_flavor_ids {
            expect_kind(product, id, RelationKind::Flavor)?;
        }
        for id in &self.selected_additional_ids {
            expect_kind(product, id, RelationKind::Additional)?;
        }
        for id in &self.removed_composition_ids {
            expect_kind(product, id, RelationKind::Composition)?;
        }

        let selected = self.flavor_count();
        if let Some(allowed) = product.flavor_allowed {
            if selected > allowed {
                return Err(CommerceError::FlavorLimitExceeded { allowed, selected });
            }
        }
        if product.has_flavors() && selected < product.flavor_mandatory {
            return Err(CommerceError::FlavorMinimumNotMet {
                mandatory: product.flavor_mandatory,
                selected,
            });
        }
        Ok(())
    }
}

/// Selected relations frozen as full objects.
///
/// Each list is ordered by related product id, then relation id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSelection {
    pub flavors: Vec<Relation>,
    pub additionals: Vec<Relation>,
    pub removed_compositions: Vec<Relation>,
}

impl ResolvedSelection {
    /// Validate `selection` against `product` and resolve the ids.
    pub fn resolve(product: &Product, selection: &SelectionSet) -> Result<Self, CommerceError> {
        selection.validate(product)?;
        Ok(Self {
            flavors: collect(product, &selection.selected_flavor_ids),
            additionals: collect(product, &selection.selected_additional_ids),
            removed_compositions: collect(product, &selection.removed_composition_ids),
        })
    }

    /// Back to ids.
    pub fn to_selection_set(&self) -> SelectionSet {
        let ids = |rs: &[Relation]| rs.iter().map(|r| r.id.clone()).collect();
        SelectionSet {
            selected_flavor_ids: ids(&self.flavors),
            selected_additional_ids: ids(&self.additionals),
            removed_composition_ids: ids(&self.removed_compositions),
        }
    }
}

fn collect(product: &Product, ids: &BTreeSet<RelationId>) -> Vec<Relation> {
    let mut relations: Vec<Relation> = ids
        .iter()
        .filter_map(|id| product.relation(id).cloned())
        .collect();
    sort_by_related_product(&mut relations);
    relations
}

/// Canonical option order: related product id, then relation id.
fn sort_by_related_product(relations: &mut [Relation]) {
    relations.sort_by(|a, b| {
        a.related_product
            .id
            .cmp(&b.related_product.id)
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn toggle(set: &mut BTreeSet<RelationId>, id: &RelationId) -> bool {
    if set.remove(id) {
        false
    } else {
        set.insert(id.clone());
        true
    }
}

fn expect_kind<'a>(
    product: &'a Product,
    id: &RelationId,
    expected: RelationKind,
) -> Result<&'a Relation, CommerceError> {
    let relation = product
        .relation(id)
        .ok_or_else(|| CommerceError::RelationNotFound {
            product_id: product.id.to_string(),
            relation_id: id.to_string(),
        })?;
    if relation.kind != expected {
        return Err(CommerceError::RelationKindMismatch {
            relation_id: id.to_string(),
            expected: expected.as_str(),
            actual: relation.kind.as_str(),
        });
    }
    Ok(relation)
}
