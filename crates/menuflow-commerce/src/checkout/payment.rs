//! Payment methods offered by a tenant.

use crate::ids::PaymentMethodId;
use serde::{Deserialize, Serialize};

/// A payment method. Settlement happens outside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    /// Display name.
    pub name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Cash-like methods where the customer states what they will pay with.
    #[serde(default)]
    pub needs_change: bool,
}

fn default_active() -> bool {
    true
}

impl PaymentMethod {
    pub fn new(id: impl Into<PaymentMethodId>, name: impl Into<String>, needs_change: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_active: true,
            needs_change,
        }
    }
}
