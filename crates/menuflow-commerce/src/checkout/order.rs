//! Order payload, receipt and the order API seam.

use crate::cart::{CartLine, Fingerprint};
use crate::catalog::Relation;
use crate::checkout::Address;
use crate::error::CommerceError;
use crate::ids::{CheckoutId, CustomerId, OrderId, PaymentMethodId, ProductId, TenantId};
use crate::money::Money;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Order status as reported by the order API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Received, waiting for the tenant.
    #[default]
    Pending,
    Accepted,
    Preparing,
    /// Out for delivery.
    Dispatched,
    /// Ready for pickup or to be served.
    Ready,
    Delivered,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Dispatched => "dispatched",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Rejected => "rejected",
        }
    }

    /// Parse a status from the feed, ignoring case and surrounding space.
    pub fn parse(raw: &str) -> Option<Self> {
        let status = match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => OrderStatus::Pending,
            "accepted" => OrderStatus::Accepted,
            "preparing" => OrderStatus::Preparing,
            "dispatched" => OrderStatus::Dispatched,
            "ready" => OrderStatus::Ready,
            "delivered" => OrderStatus::Delivered,
            "cancelled" | "canceled" => OrderStatus::Cancelled,
            "rejected" => OrderStatus::Rejected,
            _ => return None,
        };
        Some(status)
    }

    /// Check if order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }
}

/// One cart line as sent to the order API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub fingerprint: Fingerprint,
    pub observation: String,
    pub count: u32,
    pub unit_price: Money,
    /// Unit price times count.
    pub total_price: Money,
    pub flavors: Vec<Relation>,
    pub additionals: Vec<Relation>,
    pub removed_compositions: Vec<Relation>,
}

impl OrderItem {
    pub fn from_line(line: &CartLine) -> Result<Self, CommerceError> {
        Ok(Self {
            product_id: line.product.id.clone(),
            product_name: line.product.name.clone(),
            fingerprint: line.fingerprint.clone(),
            observation: line.observation.clone(),
            count: line.count,
            unit_price: line.total_price,
            total_price: line.line_total()?,
            flavors: line.selection.flavors.clone(),
            additionals: line.selection.additionals.clone(),
            removed_compositions: line.selection.removed_compositions.clone(),
        })
    }
}

/// Order submission body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    /// Same for every attempt of one checkout session.
    pub idempotency_key: CheckoutId,
    pub customer_id: Option<CustomerId>,
    pub tenant_id: TenantId,
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total: Money,
    pub is_pickup: bool,
    /// Present for delivery only.
    pub address: Option<Address>,
    pub payment_method_id: PaymentMethodId,
    pub payment_method_name: String,
    pub change_due_amount: Option<Money>,
    pub order_note: String,
    pub scheduled_for: Option<NaiveDateTime>,
    /// Dine-in table the order was placed from.
    pub table_reference: Option<String>,
}

/// Successful submission response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub order_id: OrderId,
    #[serde(default, deserialize_with = "crate::tenant::deserialize_local_timestamp")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub status: OrderStatus,
}

/// Failure reported by an [`OrderApi`] implementation.
///
/// `message` is the server's human-readable text, when it sent one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", .message.as_deref().unwrap_or("order API request failed"))]
pub struct ApiFailure {
    pub message: Option<String>,
}

impl ApiFailure {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// Transport failure with nothing to show the user.
    pub fn network() -> Self {
        Self { message: None }
    }
}

impl From<ApiFailure> for CommerceError {
    fn from(failure: ApiFailure) -> Self {
        CommerceError::Submission {
            message: failure.message,
        }
    }
}

/// Remote order service. Implemented by the host over its HTTP client.
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Place an order.
    async fn submit_order(&self, payload: &OrderPayload) -> Result<OrderReceipt, ApiFailure>;

    /// Current status of a placed order.
    async fn order_status(&self, order_id: &OrderId) -> Result<OrderStatus, ApiFailure>;
}
