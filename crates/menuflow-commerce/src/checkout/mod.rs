//! Checkout module.
//!
//! Contains types for the checkout flow, addresses, payment methods and orders.

mod address;
mod customer;
mod flow;
mod order;
mod payment;

pub use address::Address;
pub use customer::Customer;
pub use flow::{CheckoutFlow, CheckoutState, CheckoutTotals, DeliveryType};
pub use order::{ApiFailure, OrderApi, OrderItem, OrderPayload, OrderReceipt, OrderStatus};
pub use payment::PaymentMethod;
