//! Catalog module.
//!
//! Read-only menu data: categories, products and their options.

mod category;
mod product;

pub use category::{Catalog, Category};
pub use product::{
    OptionModel, Product, ProductSession, RelatedProduct, Relation, RelationKind, SessionItem,
};
