//! Customer identity as provided by the host's auth layer.

use crate::checkout::Address;
use crate::ids::{AddressId, CustomerId};
use serde::{Deserialize, Serialize};

/// A signed-in customer. Read-only to checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    /// Saved addresses.
    #[serde(default)]
    pub addresses: Vec<Address>,
}

impl Customer {
    pub fn new(id: impl Into<CustomerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone: String::new(),
            addresses: Vec::new(),
        }
    }

    /// Find a saved address.
    pub fn address(&self, id: &AddressId) -> Option<&Address> {
        self.addresses.iter().find(|a| a.id.as_ref() == Some(id))
    }
}
