//! Commerce error types.

use crate::money::Money;
use thiserror::Error;

/// Generic message shown when a submission fails without a server message.
pub const GENERIC_SUBMISSION_FAILURE: &str = "Could not place the order. Please try again.";

/// Errors that can occur in menu, cart and checkout operations.
///
/// Validation variants are recoverable: the operation that produced them left
/// all state untouched. `Submission` is recoverable by retrying. The
/// `Invalid*` input variants mean the catalog or tenant payload itself is
/// unusable.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// A selected option id does not belong to the product.
    #[error("Option {relation_id} not found on product {product_id}")]
    RelationNotFound {
        product_id: String,
        relation_id: String,
    },

    /// A selected option id was used as the wrong kind of option.
    #[error("Option {relation_id} is a {actual}, not a {expected}")]
    RelationKindMismatch {
        relation_id: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// More flavors selected than the product allows.
    #[error("At most {allowed} flavor(s) allowed, {selected} selected")]
    FlavorLimitExceeded { allowed: u32, selected: u32 },

    /// Fewer flavors selected than the product requires.
    #[error("At least {mandatory} flavor(s) required, {selected} selected")]
    FlavorMinimumNotMet { mandatory: u32, selected: u32 },

    /// Observation text longer than the configured cap.
    #[error("Observation too long: {len} characters (max {max})")]
    ObservationTooLong { len: usize, max: usize },

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// No cart line with this fingerprint.
    #[error("Cart line not found: {0}")]
    LineNotFound(String),

    /// Address missing a required field.
    #[error("Invalid address: missing {0}")]
    InvalidAddress(&'static str),

    /// Change-due input is not a positive amount.
    #[error("Invalid change amount: {0:?}")]
    InvalidChangeAmount(String),

    /// Change-due amount does not cover the order total.
    #[error("Change for {change} is less than the order total {total}")]
    ChangeBelowTotal { change: Money, total: Money },

    /// Change-due entered for a payment method that does not take change.
    #[error("Payment method {0} does not take change")]
    ChangeNotAccepted(String),

    /// Payment method is disabled by the tenant.
    #[error("Payment method {0} is not active")]
    PaymentMethodInactive(String),

    /// Delivery type not offered in the current context.
    #[error("Delivery type {0} is not available")]
    DeliveryTypeUnavailable(&'static str),

    /// Requested time slot is not bookable.
    #[error("Time slot {0} is not available")]
    SlotUnavailable(String),

    /// Invalid checkout state transition.
    #[error("Invalid checkout transition from {from} to {to}")]
    InvalidCheckoutTransition { from: String, to: String },

    /// Checkout incomplete.
    #[error("Checkout incomplete: missing {0}")]
    CheckoutIncomplete(String),

    /// The order API failed or rejected the order.
    #[error("Order submission failed: {}", .message.as_deref().unwrap_or("no message from server"))]
    Submission { message: Option<String> },

    /// Catalog payload is unusable.
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// Tenant configuration payload is unusable.
    #[error("Invalid tenant configuration: {0}")]
    InvalidTenantConfig(String),

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Local cache error.
    #[error("Cache error: {0}")]
    Cache(#[from] menuflow_cache::CacheError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CommerceError {
    /// Whether this error is a user-fixable validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CommerceError::RelationNotFound { .. }
                | CommerceError::RelationKindMismatch { .. }
                | CommerceError::FlavorLimitExceeded { .. }
                | CommerceError::FlavorMinimumNotMet { .. }
                | CommerceError::ObservationTooLong { .. }
                | CommerceError::InvalidQuantity(_)
                | CommerceError::QuantityExceedsLimit(..)
                | CommerceError::LineNotFound(_)
                | CommerceError::InvalidAddress(_)
                | CommerceError::InvalidChangeAmount(_)
                | CommerceError::ChangeBelowTotal { .. }
                | CommerceError::ChangeNotAccepted(_)
                | CommerceError::PaymentMethodInactive(_)
                | CommerceError::DeliveryTypeUnavailable(_)
                | CommerceError::SlotUnavailable(_)
                | CommerceError::InvalidCheckoutTransition { .. }
                | CommerceError::CheckoutIncomplete(_)
        )
    }

    /// Whether the same call may succeed if the user retries it unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CommerceError::Submission { .. })
    }

    /// Message to show the user.
    ///
    /// Server-provided submission messages are forwarded verbatim.
    pub fn user_message(&self) -> String {
        match self {
            CommerceError::Submission { message: Some(m) } => m.clone(),
            CommerceError::Submission { message: None } => GENERIC_SUBMISSION_FAILURE.to_string(),
            other => other.to_string(),
        }
    }
}
