//! Product and option types.

use crate::error::CommerceError;
use crate::ids::{ProductId, RelationId};
use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Kind of option attached to a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    /// Limited choice such as a pizza half. Priced by the tenant's flavor mode.
    Flavor,
    /// Paid add-on.
    #[default]
    Additional,
    /// Default ingredient the customer may remove. Never priced.
    Composition,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Flavor => "flavor",
            RelationKind::Additional => "additional",
            RelationKind::Composition => "composition",
        }
    }
}

/// The product an option points at, kept for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedProduct {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// An option entry on a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    /// Relation id (what selections refer to).
    pub id: RelationId,
    /// Option kind.
    #[serde(rename = "type")]
    pub kind: RelationKind,
    /// Price contribution; may be zero.
    pub price: Money,
    /// Product being offered as the option.
    pub related_product: RelatedProduct,
}

/// Legacy grouped-accompaniment block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSession {
    pub id: RelationId,
    pub name: String,
    /// Option kind every item in the group has.
    #[serde(rename = "type", default)]
    pub kind: RelationKind,
    #[serde(default)]
    pub items: Vec<SessionItem>,
}

/// One choice inside a legacy [`ProductSession`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionItem {
    pub id: RelationId,
    pub price: Money,
    pub product: RelatedProduct,
}

/// Where a product's options came from.
///
/// Both shapes are flattened into [`Product::relations`] at load time;
/// this only remembers the original grouping for display.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionModel {
    /// Flat relation list.
    RelationBased,
    /// Legacy grouped sessions.
    SessionBased(Vec<ProductSession>),
}

/// A product in the catalog.
///
/// Immutable once loaded. Deserialization validates prices and option ids so
/// that a malformed catalog is rejected instead of priced wrongly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProductWire", into = "ProductWire")]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Base price (zero when the catalog leaves it unset).
    pub price: Money,
    /// Canonical option list consumed by pricing.
    pub relations: Vec<Relation>,
    /// Original option shape.
    pub options: OptionModel,
    /// Maximum flavors; `None` means no cap.
    pub flavor_allowed: Option<u32>,
    /// Minimum flavors required when the product has flavors.
    pub flavor_mandatory: u32,
}

impl Product {
    /// Create a product with no options.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price,
            relations: Vec::new(),
            options: OptionModel::RelationBased,
            flavor_allowed: None,
            flavor_mandatory: 0,
        }
    }

    /// Add an option (builder style).
    pub fn with_relation(
        mut self,
        id: impl Into<RelationId>,
        kind: RelationKind,
        price: Money,
        related: RelatedProduct,
    ) -> Self {
        self.relations.push(Relation {
            id: id.into(),
            kind,
            price,
            related_product: related,
        });
        self
    }

    /// Set flavor bounds (builder style).
    pub fn with_flavor_bounds(mut self, mandatory: u32, allowed: Option<u32>) -> Self {
        self.flavor_mandatory = mandatory;
        self.flavor_allowed = allowed;
        self
    }

    /// Look up an option by id.
    pub fn relation(&self, id: &RelationId) -> Option<&Relation> {
        self.relations.iter().find(|r| &r.id == id)
    }

    /// Options of one kind, in catalog order.
    pub fn relations_of(&self, kind: RelationKind) -> impl Iterator<Item = &Relation> {
        self.relations.iter().filter(move |r| r.kind == kind)
    }

    /// Whether the product offers flavors at all.
    pub fn has_flavors(&self) -> bool {
        self.relations_of(RelationKind::Flavor).next().is_some()
    }
}

/// Wire shape of a product as served by the tenant API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductWire {
    id: ProductId,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    price: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    relations: Option<Vec<Relation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sessions: Option<Vec<ProductSession>>,
    #[serde(default)]
    flavor_allowed: Option<u32>,
    #[serde(default)]
    flavor_mandatory: Option<u32>,
}

impl TryFrom<ProductWire> for Product {
    type Error = CommerceError;

    fn try_from(wire: ProductWire) -> Result<Self, Self::Error> {
        let invalid = |msg: String| CommerceError::InvalidCatalog(format!("product {}: {}", wire.id, msg));

        let price = wire.price.unwrap_or_default();
        if price.is_negative() {
            return Err(invalid(format!("negative price {}", price)));
        }

        // A non-empty flat list wins over legacy sessions.
        let (relations, options) = match (wire.relations, wire.sessions) {
            (Some(relations), _) if !relations.is_empty() => (relations, OptionModel::RelationBased),
            (_, Some(sessions)) if !sessions.is_empty() => {
                let relations = sessions
                    .iter()
                    .flat_map(|session| {
                        session.items.iter().map(move |item| Relation {
                            id: item.id.clone(),
                            kind: session.kind,
                            price: item.price,
                            related_product: item.product.clone(),
                        })
                    })
                    .collect();
                (relations, OptionModel::SessionBased(sessions))
            }
            _ => (Vec::new(), OptionModel::RelationBased),
        };

        let mut seen = HashSet::new();
        for relation in &relations {
            if relation.price.is_negative() {
                return Err(invalid(format!("option {} has negative price", relation.id)));
            }
            if !seen.insert(&relation.id) {
                return Err(invalid(format!("duplicate option id {}", relation.id)));
            }
        }

        // Zero cap is how the API says "not set".
        let flavor_allowed = wire.flavor_allowed.filter(|n| *n > 0);
        let flavor_mandatory = wire.flavor_mandatory.unwrap_or(0);
        if let Some(allowed) = flavor_allowed {
            if flavor_mandatory > allowed {
                return Err(invalid(format!(
                    "flavorMandatory {} exceeds flavorAllowed {}",
                    flavor_mandatory, allowed
                )));
            }
        }

        Ok(Product {
            id: wire.id,
            name: wire.name,
            description: wire.description.unwrap_or_default(),
            price,
            relations,
            options,
            flavor_allowed,
            flavor_mandatory,
        })
    }
}

impl From<Product> for ProductWire {
    fn from(product: Product) -> Self {
        let (relations, sessions) = match product.options {
            OptionModel::RelationBased => (Some(product.relations), None),
            OptionModel::SessionBased(sessions) => (None, Some(sessions)),
        };
        ProductWire {
            id: product.id,
            name: product.name,
            description: Some(product.description),
            price: Some(product.price),
            relations,
            sessions,
            flavor_allowed: product.flavor_allowed,
            flavor_mandatory: Some(product.flavor_mandatory),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_based_product() {
        let json = r#"{
            "id": 10,
            "name": "Pizza Grande",
            "price": 20,
            "flavorAllowed": 2,
            "flavorMandatory": 1,
            "relations": [
                {"id": 1, "type": "flavor", "price": 8.0,
                 "relatedProduct": {"id": 100, "name": "Calabresa"}},
                {"id": 2, "type": "additional", "price": 3.0,
                 "relatedProduct": {"id": 200, "name": "Borda"}},
                {"id": 3, "type": "composition", "price": 0,
                 "relatedProduct": {"id": 300, "name": "Cebola"}}
            ]
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();

        assert_eq!(product.price, Money::new(2000));
        assert_eq!(product.relations.len(), 3);
        assert_eq!(product.options, OptionModel::RelationBased);
        assert_eq!(product.flavor_allowed, Some(2));
        assert!(product.has_flavors());
        assert_eq!(product.relations_of(RelationKind::Composition).count(), 1);
    }

    #[test]
    fn test_session_based_product_is_flattened() {
        let json = r#"{
            "id": "p1",
            "name": "Prato Feito",
            "price": 18.5,
            "sessions": [
                {"id": "s1", "name": "Acompanhamentos", "type": "additional", "items": [
                    {"id": "i1", "price": 2.5, "product": {"id": "a", "name": "Farofa"}},
                    {"id": "i2", "price": 4, "product": {"id": "b", "name": "Ovo"}}
                ]}
            ]
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();

        assert_eq!(product.relations.len(), 2);
        assert!(matches!(product.options, OptionModel::SessionBased(ref s) if s.len() == 1));
        let ovo = product.relation(&RelationId::new("i2")).unwrap();
        assert_eq!(ovo.kind, RelationKind::Additional);
        assert_eq!(ovo.price, Money::new(400));
    }

    #[test]
    fn test_missing_price_is_zero() {
        let product: Product = serde_json::from_str(r#"{"id": 1, "name": "Brinde"}"#).unwrap();
        assert!(product.price.is_zero());
        assert!(product.relations.is_empty());
    }

    #[test]
    fn test_relation_without_price_is_rejected() {
        let json = r#"{"id": 1, "name": "X", "relations": [
            {"id": 1, "type": "additional", "relatedProduct": {"id": 2, "name": "Y"}}
        ]}"#;
        assert!(serde_json::from_str::<Product>(json).is_err());
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let err = serde_json::from_str::<Product>(r#"{"id": 1, "name": "X", "price": -1}"#)
            .unwrap_err();
        assert!(err.to_string().contains("negative price"));
    }

    #[test]
    fn test_duplicate_relation_ids_rejected() {
        let json = r#"{"id": 1, "name": "X", "relations": [
            {"id": 1, "type": "additional", "price": 1, "relatedProduct": {"id": 2, "name": "Y"}},
            {"id": 1, "type": "flavor", "price": 1, "relatedProduct": {"id": 3, "name": "Z"}}
        ]}"#;
        assert!(serde_json::from_str::<Product>(json).is_err());
    }

    #[test]
    fn test_inconsistent_flavor_bounds_rejected() {
        let json = r#"{"id": 1, "name": "X", "flavorAllowed": 1, "flavorMandatory": 2}"#;
        assert!(serde_json::from_str::<Product>(json).is_err());
    }

    #[test]
    fn test_zero_flavor_allowed_means_uncapped() {
        let json = r#"{"id": 1, "name": "X", "flavorAllowed": 0}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.flavor_allowed, None);
    }

    #[test]
    fn test_serialization_round_trip_keeps_option_model() {
        let json = r#"{"id": "p1", "name": "PF", "sessions": [
            {"id": "s1", "name": "Extras", "items": [
                {"id": "i1", "price": 2, "product": {"id": "a", "name": "Farofa"}}
            ]}
        ]}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        let back: Product = serde_json::from_str(&serde_json::to_string(&product).unwrap()).unwrap();
        assert_eq!(product, back);
    }
}
