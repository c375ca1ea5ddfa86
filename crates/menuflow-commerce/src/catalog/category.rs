//! Category and catalog types.

use crate::catalog::Product;
use crate::ids::{CategoryId, ProductId, TenantId};
use serde::{Deserialize, Serialize};

/// A menu category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique category identifier.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Hidden categories stay in the payload but are not offered.
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Products in menu order.
    #[serde(default)]
    pub products: Vec<Product>,
}

fn default_active() -> bool {
    true
}

/// A tenant's full menu as fetched from the tenant API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub tenant_id: TenantId,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Catalog {
    /// Parse a catalog payload, rejecting malformed products.
    pub fn from_json(json: &str) -> Result<Self, crate::CommerceError> {
        serde_json::from_str(json)
            .map_err(|e| crate::CommerceError::InvalidCatalog(e.to_string()))
    }

    /// Categories that should be shown, in menu order.
    pub fn active_categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|c| c.is_active)
    }

    /// Find a product in any active category.
    pub fn find_product(&self, id: &ProductId) -> Option<&Product> {
        self.active_categories()
            .flat_map(|c| c.products.iter())
            .find(|p| &p.id == id)
    }

    /// Total number of orderable products.
    pub fn product_count(&self) -> usize {
        self.active_categories().map(|c| c.products.len()).sum()
    }
}
