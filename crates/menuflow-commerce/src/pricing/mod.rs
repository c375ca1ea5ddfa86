//! Pricing module.
//!
//! Selections, their resolution against a product, and unit price rules.

mod engine;
mod selection;

pub use engine::{FlavorCalcType, PriceRange, PricingEngine};
pub use selection::{ResolvedSelection, SelectionSet};
