//! Per-visitor state kept across page loads: cart, customer and last order.

use crate::cart::{CartLimits, CartSnapshot, CartStore};
use crate::checkout::{Customer, OrderReceipt};
use crate::error::CommerceError;
use crate::ids::TenantId;
use crate::pricing::PricingEngine;
use menuflow_cache::{cache_key, Cache, Session, SessionId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VisitorState {
    #[serde(default)]
    cart: CartSnapshot,
    #[serde(default)]
    customer: Option<Customer>,
    #[serde(default)]
    last_receipt: Option<OrderReceipt>,
}

/// A visitor's stored state for one tenant.
///
/// Each tenant gets its own namespace, so a visitor browsing two menus keeps
/// two independent carts.
pub struct CartSession {
    store: Session<VisitorState>,
    id: SessionId,
    tenant_id: TenantId,
}

impl CartSession {
    pub fn new(cache: Cache, tenant_id: TenantId, id: SessionId) -> Self {
        let namespace = cache_key!("menuflow", tenant_id);
        Self {
            store: Session::with_namespace(cache, namespace),
            id,
            tenant_id,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Persist the cart contents.
    pub fn save_cart(&self, cart: &CartStore) -> Result<(), CommerceError> {
        let snapshot = cart.snapshot();
        self.store.update(&self.id, |state| state.cart = snapshot.clone())?;
        tracing::trace!(session = %self.id, lines = cart.len(), "cart saved");
        Ok(())
    }

    /// Rebuild the stored cart, or an empty one.
    pub fn load_cart(&self, pricing: PricingEngine, limits: CartLimits) -> Result<CartStore, CommerceError> {
        let snapshot = self
            .store
            .get(&self.id)?
            .map(|state| state.cart)
            .unwrap_or_default();
        Ok(CartStore::restore(pricing, limits, snapshot))
    }

    pub fn save_customer(&self, customer: &Customer) -> Result<(), CommerceError> {
        self.store
            .update(&self.id, |state| state.customer = Some(customer.clone()))?;
        Ok(())
    }

    pub fn customer(&self) -> Result<Option<Customer>, CommerceError> {
        Ok(self.store.get(&self.id)?.and_then(|state| state.customer))
    }

    /// Store the receipt of a placed order and drop the stored cart.
    pub fn record_order(&self, receipt: &OrderReceipt) -> Result<(), CommerceError> {
        self.store.update(&self.id, |state| {
            state.cart = CartSnapshot::default();
            state.last_receipt = Some(receipt.clone());
        })?;
        Ok(())
    }

    pub fn last_receipt(&self) -> Result<Option<OrderReceipt>, CommerceError> {
        Ok(self.store.get(&self.id)?.and_then(|state| state.last_receipt))
    }

    /// Forget the customer. The cart stays.
    pub fn logout(&self) -> Result<(), CommerceError> {
        self.store.update(&self.id, |state| state.customer = None)?;
        Ok(())
    }

    /// Remove everything stored for this visitor.
    pub fn clear(&self) -> Result<(), CommerceError> {
        self.store.delete(&self.id)?;
        Ok(())
    }
}
