//! Unit price computation for configured products.

use crate::catalog::{Product, Relation, RelationKind};
use crate::error::CommerceError;
use crate::money::Money;
use crate::pricing::{ResolvedSelection, SelectionSet};
use serde::{Deserialize, Serialize};

/// How selected flavors contribute to the price, set per tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FlavorCalcType {
    /// Every selected flavor adds its price.
    #[default]
    Sum,
    /// Selected flavors add their mean price, rounded to the cent.
    Average,
}

impl FlavorCalcType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlavorCalcType::Sum => "sum",
            FlavorCalcType::Average => "average",
        }
    }
}

/// Display-only price range for catalog browsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Money,
    pub max: Money,
}

/// Deterministic pricing of a product plus selected options.
///
/// Unit price = base price + selected additionals + flavor contribution.
/// Compositions never change the price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PricingEngine {
    flavor_calc: FlavorCalcType,
}

impl PricingEngine {
    /// Create an engine for a tenant's flavor mode.
    pub fn new(flavor_calc: FlavorCalcType) -> Self {
        Self { flavor_calc }
    }

    /// The flavor mode in effect.
    pub fn flavor_calc(&self) -> FlavorCalcType {
        self.flavor_calc
    }

    /// Validate and resolve a selection into relation objects.
    pub fn resolve(
        &self,
        product: &Product,
        selection: &SelectionSet,
    ) -> Result<ResolvedSelection, CommerceError> {
        ResolvedSelection::resolve(product, selection)
    }

    /// Unit price for `product` configured with `selection`.
    pub fn unit_price(&self, product: &Product, selection: &SelectionSet) -> Result<Money, CommerceError> {
        let resolved = self.resolve(product, selection)?;
        self.price_resolved(product, &resolved)
    }

    /// Unit price from an already resolved selection.
    pub fn price_resolved(
        &self,
        product: &Product,
        resolved: &ResolvedSelection,
    ) -> Result<Money, CommerceError> {
        let additionals = sum_prices(&resolved.additionals)?;
        let flavors = self.flavor_contribution(&resolved.flavors)?;

        product
            .price
            .try_add(&additionals)
            .and_then(|m| m.try_add(&flavors))
            .ok_or(CommerceError::Overflow)
    }

    /// What the selected flavors add to the unit price.
    ///
    /// In average mode the mean is quantized to the cent before it is added,
    /// so the displayed unit price times the count always equals the line total.
    pub fn flavor_contribution(&self, flavors: &[Relation]) -> Result<Money, CommerceError> {
        let total = sum_prices(flavors)?;
        match self.flavor_calc {
            FlavorCalcType::Sum => Ok(total),
            FlavorCalcType::Average if flavors.is_empty() => Ok(Money::zero()),
            FlavorCalcType::Average => total
                .divide_rounded(flavors.len() as i64)
                .ok_or(CommerceError::Overflow),
        }
    }

    /// Price range to show instead of a zero base price.
    ///
    /// Only for products without a base price whose flavors carry prices.
    pub fn price_range(&self, product: &Product) -> Option<PriceRange> {
        if !product.price.is_zero() {
            return None;
        }
        let prices: Vec<Money> = product
            .relations_of(RelationKind::Flavor)
            .map(|r| r.price)
            .collect();
        if !prices.iter().any(|p| p.is_positive()) {
            return None;
        }
        let min = prices.iter().min().copied()?;
        let max = prices.iter().max().copied()?;
        Some(PriceRange { min, max })
    }
}

fn sum_prices(relations: &[Relation]) -> Result<Money, CommerceError> {
    Money::try_sum(relations.iter().map(|r| &r.price)).ok_or(CommerceError::Overflow)
}
