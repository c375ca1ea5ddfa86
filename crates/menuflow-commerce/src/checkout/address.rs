//! Delivery addresses.

use crate::error::CommerceError;
use crate::ids::AddressId;
use crate::money::Money;
use crate::tenant::{City, Neighborhood};
use serde::{Deserialize, Serialize};

/// A delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Address ID (None for unsaved addresses).
    #[serde(default)]
    pub id: Option<AddressId>,
    /// Label such as "Casa" or "Trabalho".
    #[serde(default)]
    pub nickname: String,
    pub street: String,
    pub number: String,
    #[serde(default)]
    pub complement: Option<String>,
    pub neighborhood: Neighborhood,
    pub city: City,
    #[serde(default)]
    pub postal_code: String,
    /// Landmark note for the courier.
    #[serde(default)]
    pub reference: Option<String>,
}

impl Address {
    /// Create an address with the required fields.
    pub fn new(
        street: impl Into<String>,
        number: impl Into<String>,
        neighborhood: Neighborhood,
        city: City,
    ) -> Self {
        Self {
            id: None,
            nickname: String::new(),
            street: street.into(),
            number: number.into(),
            complement: None,
            neighborhood,
            city,
            postal_code: String::new(),
            reference: None,
        }
    }

    /// Fee charged for delivering here.
    pub fn delivery_fee(&self) -> Money {
        self.neighborhood.delivery_fee
    }

    /// Street and number must be present.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.street.trim().is_empty() {
            return Err(CommerceError::InvalidAddress("street"));
        }
        if self.number.trim().is_empty() {
            return Err(CommerceError::InvalidAddress("number"));
        }
        Ok(())
    }

    /// Format as single line.
    pub fn one_line(&self) -> String {
        let mut parts = vec![format!("{}, {}", self.street.trim(), self.number.trim())];
        if let Some(ref complement) = self.complement {
            if !complement.trim().is_empty() {
                parts.push(complement.trim().to_string());
            }
        }
        parts.push(self.neighborhood.name.clone());
        parts.push(self.city.name.clone());
        parts.join(" - ")
    }
}
