//! Cart pricing, availability and checkout for multi-tenant digital menus.
//!
//! This crate is the engine behind a menu/ordering UI:
//!
//! - **Catalog**: products with flavor, additional and composition options
//! - **Pricing**: selections and deterministic unit prices in integer cents
//! - **Cart**: fingerprinted lines that merge identical configurations
//! - **Availability**: open-now checks and bookable delivery slots
//! - **Checkout**: the delivery/address/payment/change-due state machine and
//!   order submission through an [`OrderApi`](checkout::OrderApi)
//! - **Schedule**: cancellable pollers for availability and order status
//!
//! # Example
//!
//! ```rust
//! use menuflow_commerce::prelude::*;
//!
//! let pizza = Product::new("pizza", "Pizza", Money::new(2000));
//! let mut cart = CartStore::new(PricingEngine::new(FlavorCalcType::Sum));
//! let line = cart.add(&pizza, &SelectionSet::new(), "", 2).unwrap();
//!
//! assert_eq!(cart.line(&line).unwrap().count, 2);
//! assert_eq!(cart.total().unwrap().display(), "R$ 40,00");
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod availability;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod pricing;
pub mod schedule;
pub mod session;
pub mod tenant;

pub use error::CommerceError;
pub use ids::*;
pub use money::Money;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::Money;

    // Catalog
    pub use crate::catalog::{Catalog, Category, OptionModel, Product, Relation, RelationKind};

    // Pricing
    pub use crate::pricing::{FlavorCalcType, PriceRange, PricingEngine, ResolvedSelection, SelectionSet};

    // Cart
    pub use crate::cart::{CartLimits, CartLine, CartSnapshot, CartStore, Fingerprint};

    // Availability
    pub use crate::availability::{AvailabilityCalculator, ClockTime, OpeningShift, TenantAvailability};

    // Checkout
    pub use crate::checkout::{
        Address, CheckoutFlow, CheckoutState, CheckoutTotals, Customer, DeliveryType, OrderApi,
        OrderPayload, OrderReceipt, OrderStatus, PaymentMethod,
    };

    // Tenant, config and session
    pub use crate::config::MenuConfig;
    pub use crate::session::CartSession;
    pub use crate::tenant::{City, Neighborhood, TenantConfig};
}
