//! Checkout flow state machine.
//!
//! The flow stores what the customer has entered; its [`CheckoutState`] is
//! derived from that data and the cart on every read, so it cannot drift from
//! the inputs. Every setter validates before touching anything: a rejected
//! call leaves the flow exactly as it was.

use crate::availability::{AvailabilityCalculator, TenantAvailability};
use crate::cart::CartStore;
use crate::checkout::{
    Address, Customer, OrderApi, OrderItem, OrderPayload, OrderReceipt, PaymentMethod,
};
use crate::error::CommerceError;
use crate::ids::{AddressId, CheckoutId, CustomerId, TenantId};
use crate::money::Money;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    Delivery,
    Pickup,
}

impl DeliveryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryType::Delivery => "delivery",
            DeliveryType::Pickup => "pickup",
        }
    }
}

/// Steps of the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckoutState {
    Idle,
    DeliveryTypeChosen,
    /// Delivery only.
    AddressResolved,
    PaymentMethodChosen,
    /// Only for methods that need change.
    ChangeDueResolved,
    ReadyToSubmit,
    /// Terminal.
    Submitted,
}

impl CheckoutState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "idle",
            CheckoutState::DeliveryTypeChosen => "delivery_type_chosen",
            CheckoutState::AddressResolved => "address_resolved",
            CheckoutState::PaymentMethodChosen => "payment_method_chosen",
            CheckoutState::ChangeDueResolved => "change_due_resolved",
            CheckoutState::ReadyToSubmit => "ready_to_submit",
            CheckoutState::Submitted => "submitted",
        }
    }
}

/// Derived checkout amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutTotals {
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total: Money,
}

/// One checkout session.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutFlow {
    id: CheckoutId,
    tenant_id: TenantId,
    customer_id: Option<CustomerId>,
    table_reference: Option<String>,
    delivery_type: Option<DeliveryType>,
    address: Option<Address>,
    payment_method: Option<PaymentMethod>,
    change_due: Option<Money>,
    order_note: String,
    scheduled_for: Option<NaiveDateTime>,
    receipt: Option<OrderReceipt>,
}

impl CheckoutFlow {
    /// Start a checkout session for a tenant.
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            id: CheckoutId::generate(),
            tenant_id,
            customer_id: None,
            table_reference: None,
            delivery_type: None,
            address: None,
            payment_method: None,
            change_due: None,
            order_note: String::new(),
            scheduled_for: None,
            receipt: None,
        }
    }

    /// Start a dine-in checkout placed from a table.
    pub fn for_table(tenant_id: TenantId, table_reference: impl Into<String>) -> Self {
        let mut flow = Self::new(tenant_id);
        flow.table_reference = Some(table_reference.into());
        flow
    }

    /// Session id, sent as the idempotency key.
    pub fn id(&self) -> &CheckoutId {
        &self.id
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn delivery_type(&self) -> Option<DeliveryType> {
        self.delivery_type
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn payment_method(&self) -> Option<&PaymentMethod> {
        self.payment_method.as_ref()
    }

    pub fn change_due(&self) -> Option<Money> {
        self.change_due
    }

    pub fn order_note(&self) -> &str {
        &self.order_note
    }

    pub fn scheduled_for(&self) -> Option<NaiveDateTime> {
        self.scheduled_for
    }

    /// Receipt of the accepted order, once submitted.
    pub fn receipt(&self) -> Option<&OrderReceipt> {
        self.receipt.as_ref()
    }

    pub fn is_submitted(&self) -> bool {
        self.receipt.is_some()
    }

    /// Attach the signed-in customer.
    pub fn set_customer(&mut self, customer_id: CustomerId) -> Result<(), CommerceError> {
        self.ensure_open("customer")?;
        self.customer_id = Some(customer_id);
        Ok(())
    }

    /// Choose delivery or pickup.
    ///
    /// Delivery is not offered in table mode. Pickup needs no address and
    /// carries no delivery fee.
    pub fn choose_delivery_type(
        &mut self,
        delivery_type: DeliveryType,
        availability: &TenantAvailability,
    ) -> Result<(), CommerceError> {
        self.ensure_open(CheckoutState::DeliveryTypeChosen.as_str())?;
        if delivery_type == DeliveryType::Delivery && availability.is_table_mode_override {
            tracing::debug!(checkout_id = %self.id, "delivery rejected in table mode");
            return Err(CommerceError::DeliveryTypeUnavailable(delivery_type.as_str()));
        }
        self.delivery_type = Some(delivery_type);
        tracing::debug!(checkout_id = %self.id, delivery_type = delivery_type.as_str(), "delivery type chosen");
        Ok(())
    }

    /// Set the delivery address. Requires delivery to be chosen.
    pub fn set_address(&mut self, address: Address) -> Result<(), CommerceError> {
        self.ensure_open(CheckoutState::AddressResolved.as_str())?;
        if self.delivery_type != Some(DeliveryType::Delivery) {
            return Err(CommerceError::InvalidCheckoutTransition {
                from: self.delivery_type_label().to_string(),
                to: CheckoutState::AddressResolved.as_str().to_string(),
            });
        }
        address.validate()?;
        tracing::debug!(
            checkout_id = %self.id,
            neighborhood = %address.neighborhood.name,
            delivery_fee = %address.delivery_fee(),
            "address resolved"
        );
        self.address = Some(address);
        Ok(())
    }

    /// Use one of the customer's saved addresses.
    pub fn use_saved_address(
        &mut self,
        customer: &Customer,
        address_id: &AddressId,
    ) -> Result<(), CommerceError> {
        let address = customer
            .address(address_id)
            .ok_or(CommerceError::InvalidAddress("saved address"))?
            .clone();
        self.set_address(address)
    }

    /// Select a payment method.
    ///
    /// A method without change clears any change-due value, and so does
    /// switching to a different method.
    pub fn select_payment_method(&mut self, method: &PaymentMethod) -> Result<(), CommerceError> {
        self.ensure_open(CheckoutState::PaymentMethodChosen.as_str())?;
        if !method.is_active {
            return Err(CommerceError::PaymentMethodInactive(method.name.clone()));
        }
        let switched = self.payment_method.as_ref().map(|m| &m.id) != Some(&method.id);
        if !method.needs_change || switched {
            self.change_due = None;
        }
        self.payment_method = Some(method.clone());
        tracing::debug!(
            checkout_id = %self.id,
            payment_method = %method.id,
            needs_change = method.needs_change,
            "payment method chosen"
        );
        Ok(())
    }

    /// Record what the customer will pay with.
    ///
    /// `input` must parse as a positive amount no lower than the current
    /// checkout total. On rejection the previous value is kept.
    pub fn set_change_due(&mut self, input: &str, cart: &CartStore) -> Result<Money, CommerceError> {
        self.ensure_open(CheckoutState::ChangeDueResolved.as_str())?;
        let method = self
            .payment_method
            .as_ref()
            .ok_or_else(|| CommerceError::CheckoutIncomplete("payment method".to_string()))?;
        if !method.needs_change {
            return Err(CommerceError::ChangeNotAccepted(method.name.clone()));
        }

        let change = Money::parse(input)
            .filter(|m| m.is_positive())
            .ok_or_else(|| CommerceError::InvalidChangeAmount(input.to_string()))?;
        let total = self.totals(cart)?.total;
        if change < total {
            tracing::debug!(checkout_id = %self.id, %change, %total, "change due below total");
            return Err(CommerceError::ChangeBelowTotal { change, total });
        }

        self.change_due = Some(change);
        Ok(change)
    }

    /// Free-text note for the whole order. Allowed at any point before submission.
    pub fn set_order_note(&mut self, note: impl Into<String>) -> Result<(), CommerceError> {
        self.ensure_open("order note")?;
        self.order_note = note.into().trim().to_string();
        Ok(())
    }

    /// Pin the order to a time slot, or clear it with `None`.
    ///
    /// The slot must be one of the bookable slots at `now`.
    pub fn schedule_for(
        &mut self,
        slot: Option<NaiveDateTime>,
        calculator: &AvailabilityCalculator,
        availability: &TenantAvailability,
        now: NaiveDateTime,
    ) -> Result<(), CommerceError> {
        self.ensure_open("schedule")?;
        if let Some(at) = slot {
            if !calculator.is_bookable(availability, now, at) {
                return Err(CommerceError::SlotUnavailable(at.format("%Y-%m-%d %H:%M").to_string()));
            }
        }
        self.scheduled_for = slot;
        Ok(())
    }

    /// Subtotal from the cart plus the delivery fee, if any.
    pub fn totals(&self, cart: &CartStore) -> Result<CheckoutTotals, CommerceError> {
        let subtotal = cart.total()?;
        let delivery_fee = match (self.delivery_type, &self.address) {
            (Some(DeliveryType::Delivery), Some(address)) => address.delivery_fee(),
            _ => Money::zero(),
        };
        let total = subtotal
            .try_add(&delivery_fee)
            .ok_or(CommerceError::Overflow)?;
        Ok(CheckoutTotals {
            subtotal,
            delivery_fee,
            total,
        })
    }

    /// Current step, derived from the entered data and the cart.
    pub fn state(&self, cart: &CartStore) -> CheckoutState {
        if self.is_submitted() {
            return CheckoutState::Submitted;
        }
        let Some(delivery_type) = self.delivery_type else {
            return CheckoutState::Idle;
        };
        let mut state = CheckoutState::DeliveryTypeChosen;
        if delivery_type == DeliveryType::Delivery {
            if self.address.is_none() {
                return state;
            }
            state = CheckoutState::AddressResolved;
        }
        let Some(method) = &self.payment_method else {
            return state;
        };
        state = CheckoutState::PaymentMethodChosen;
        if method.needs_change {
            if !self.change_covers_total(cart) {
                return state;
            }
            state = CheckoutState::ChangeDueResolved;
        }
        match cart.total() {
            Ok(total) if total.is_positive() => CheckoutState::ReadyToSubmit,
            _ => state,
        }
    }

    /// What is still needed before the order can be submitted.
    pub fn missing(&self, cart: &CartStore) -> Vec<&'static str> {
        let mut missing = Vec::new();
        match self.delivery_type {
            None => missing.push("delivery type"),
            Some(DeliveryType::Delivery) if self.address.is_none() => missing.push("address"),
            Some(_) => {}
        }
        match &self.payment_method {
            None => missing.push("payment method"),
            Some(method) if method.needs_change && !self.change_covers_total(cart) => {
                missing.push("change due")
            }
            Some(_) => {}
        }
        if !matches!(cart.total(), Ok(total) if total.is_positive()) {
            missing.push("cart items");
        }
        missing
    }

    /// Totals if everything required is on file, else `CheckoutIncomplete`.
    pub fn readiness(&self, cart: &CartStore) -> Result<CheckoutTotals, CommerceError> {
        self.ensure_open(CheckoutState::ReadyToSubmit.as_str())?;
        let missing = self.missing(cart);
        if !missing.is_empty() {
            return Err(CommerceError::CheckoutIncomplete(missing.join(", ")));
        }
        self.totals(cart)
    }

    pub fn is_ready(&self, cart: &CartStore) -> bool {
        self.readiness(cart).is_ok()
    }

    /// Assemble the order body.
    pub fn build_order(&self, cart: &CartStore) -> Result<OrderPayload, CommerceError> {
        let totals = self.readiness(cart)?;
        let method = self
            .payment_method
            .as_ref()
            .ok_or_else(|| CommerceError::CheckoutIncomplete("payment method".to_string()))?;
        let is_pickup = self.delivery_type == Some(DeliveryType::Pickup);
        let items = cart
            .lines()
            .iter()
            .map(OrderItem::from_line)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OrderPayload {
            idempotency_key: self.id.clone(),
            customer_id: self.customer_id.clone(),
            tenant_id: self.tenant_id.clone(),
            items,
            subtotal: totals.subtotal,
            delivery_fee: totals.delivery_fee,
            total: totals.total,
            is_pickup,
            address: if is_pickup { None } else { self.address.clone() },
            payment_method_id: method.id.clone(),
            payment_method_name: method.name.clone(),
            change_due_amount: if method.needs_change { self.change_due } else { None },
            order_note: self.order_note.clone(),
            scheduled_for: self.scheduled_for,
            table_reference: self.table_reference.clone(),
        })
    }

    /// Submit the order.
    ///
    /// On success the cart is cleared and the flow becomes `Submitted`. On
    /// failure neither the cart nor the flow is touched, so the same call can
    /// be retried; every attempt carries the same idempotency key.
    #[tracing::instrument(skip_all, fields(checkout_id = %self.id, tenant_id = %self.tenant_id))]
    pub async fn submit<A>(&mut self, cart: &mut CartStore, api: &A) -> Result<OrderReceipt, CommerceError>
    where
        A: OrderApi + ?Sized,
    {
        let payload = self.build_order(cart)?;
        tracing::info!(items = payload.items.len(), total = %payload.total, "submitting order");

        match api.submit_order(&payload).await {
            Ok(receipt) => {
                tracing::info!(order_id = %receipt.order_id, "order accepted");
                cart.clear();
                self.receipt = Some(receipt.clone());
                Ok(receipt)
            }
            Err(failure) => {
                tracing::warn!(error = %failure, "order submission failed");
                Err(CommerceError::from(failure))
            }
        }
    }

    fn change_covers_total(&self, cart: &CartStore) -> bool {
        match (self.change_due, self.totals(cart)) {
            (Some(change), Ok(totals)) => change >= totals.total,
            _ => false,
        }
    }

    fn delivery_type_label(&self) -> &'static str {
        self.delivery_type.map(|d| d.as_str()).unwrap_or("unset")
    }

    fn ensure_open(&self, to: &str) -> Result<(), CommerceError> {
        if self.is_submitted() {
            tracing::debug!(checkout_id = %self.id, to, "rejected transition after submission");
            return Err(CommerceError::InvalidCheckoutTransition {
                from: CheckoutState::Submitted.as_str().to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::{ClockTime, OpeningShift};
    use crate::catalog::Product;
    use crate::checkout::{OrderStatus, PaymentMethod};
    use crate::ids::OrderId;
    use crate::pricing::{PricingEngine, SelectionSet};
    use crate::tenant::{City, Neighborhood};
    use chrono::NaiveDate;

    fn cart_with(cents: i64, count: u32) -> CartStore {
        let mut cart = CartStore::new(PricingEngine::default());
        cart.add(&Product::new("p", "Prato", Money::new(cents)), &SelectionSet::new(), "", count)
            .unwrap();
        cart
    }

    fn address(street: &str) -> Address {
        Address::new(
            street,
            "42",
            Neighborhood {
                id: "1".into(),
                name: "Centro".to_string(),
                delivery_fee: Money::new(700),
            },
            City {
                id: "9".into(),
                name: "Campinas".to_string(),
            },
        )
    }

    fn open_all_day() -> TenantAvailability {
        TenantAvailability::new(
            vec![OpeningShift::new(
                ClockTime::from_hm(8, 0).unwrap(),
                ClockTime::from_hm(23, 0).unwrap(),
            )],
            1..=7,
        )
    }

    fn cash() -> PaymentMethod {
        PaymentMethod::new("1", "Dinheiro", true)
    }

    fn pix() -> PaymentMethod {
        PaymentMethod::new("2", "Pix", false)
    }

    #[test]
    fn test_delivery_blocks_until_address() {
        let cart = cart_with(3000, 1);
        let mut flow = CheckoutFlow::new("t1".into());
        assert_eq!(flow.state(&cart), CheckoutState::Idle);

        flow.choose_delivery_type(DeliveryType::Delivery, &open_all_day()).unwrap();
        flow.select_payment_method(&pix()).unwrap();
        assert_eq!(flow.state(&cart), CheckoutState::DeliveryTypeChosen);
        assert!(matches!(
            flow.readiness(&cart),
            Err(CommerceError::CheckoutIncomplete(ref m)) if m == "address"
        ));

        // Switching to pickup clears the address requirement.
        flow.choose_delivery_type(DeliveryType::Pickup, &open_all_day()).unwrap();
        assert_eq!(flow.state(&cart), CheckoutState::ReadyToSubmit);
    }

    #[test]
    fn test_address_sets_delivery_fee() {
        let cart = cart_with(3000, 1);
        let mut flow = CheckoutFlow::new("t1".into());
        flow.choose_delivery_type(DeliveryType::Delivery, &open_all_day()).unwrap();
        flow.set_address(address("Rua A")).unwrap();
        assert_eq!(flow.state(&cart), CheckoutState::AddressResolved);

        let totals = flow.totals(&cart).unwrap();
        assert_eq!(totals.delivery_fee, Money::new(700));
        assert_eq!(totals.total, Money::new(3700));

        flow.choose_delivery_type(DeliveryType::Pickup, &open_all_day()).unwrap();
        assert_eq!(flow.totals(&cart).unwrap().delivery_fee, Money::zero());
    }

    #[test]
    fn test_invalid_address_keeps_previous() {
        let mut flow = CheckoutFlow::new("t1".into());
        flow.choose_delivery_type(DeliveryType::Delivery, &open_all_day()).unwrap();
        flow.set_address(address("Rua A")).unwrap();

        assert!(flow.set_address(address("")).is_err());
        assert_eq!(flow.address().unwrap().street, "Rua A");
    }

    #[test]
    fn test_address_requires_delivery() {
        let mut flow = CheckoutFlow::new("t1".into());
        assert!(matches!(
            flow.set_address(address("Rua A")),
            Err(CommerceError::InvalidCheckoutTransition { .. })
        ));
    }

    #[test]
    fn test_saved_address() {
        let mut customer = Customer::new("c1", "Ana");
        let mut saved = address("Rua Salva");
        saved.id = Some("a1".into());
        customer.addresses.push(saved);

        let mut flow = CheckoutFlow::new("t1".into());
        flow.choose_delivery_type(DeliveryType::Delivery, &open_all_day()).unwrap();
        assert!(flow.use_saved_address(&customer, &"nope".into()).is_err());
        flow.use_saved_address(&customer, &"a1".into()).unwrap();
        assert_eq!(flow.address().unwrap().street, "Rua Salva");
    }

    #[test]
    fn test_table_mode_rejects_delivery() {
        let mut flow = CheckoutFlow::for_table("t1".into(), "Mesa 4");
        let availability = open_all_day().with_table_mode(true);
        assert!(matches!(
            flow.choose_delivery_type(DeliveryType::Delivery, &availability),
            Err(CommerceError::DeliveryTypeUnavailable("delivery"))
        ));
        assert_eq!(flow.delivery_type(), None);
        flow.choose_delivery_type(DeliveryType::Pickup, &availability).unwrap();
    }

    #[test]
    fn test_change_due_flow() {
        let cart = cart_with(3300, 2);
        let mut flow = CheckoutFlow::new("t1".into());
        flow.choose_delivery_type(DeliveryType::Pickup, &open_all_day()).unwrap();
        flow.select_payment_method(&cash()).unwrap();
        assert_eq!(flow.state(&cart), CheckoutState::PaymentMethodChosen);

        assert!(matches!(
            flow.set_change_due("abc", &cart),
            Err(CommerceError::InvalidChangeAmount(_))
        ));
        assert!(matches!(
            flow.set_change_due("0", &cart),
            Err(CommerceError::InvalidChangeAmount(_))
        ));
        assert!(matches!(
            flow.set_change_due("50,00", &cart),
            Err(CommerceError::ChangeBelowTotal { .. })
        ));
        assert_eq!(flow.change_due(), None);

        assert_eq!(flow.set_change_due("100", &cart).unwrap(), Money::new(10000));
        assert_eq!(flow.state(&cart), CheckoutState::ReadyToSubmit);

        // A rejected re-entry keeps the accepted value.
        assert!(flow.set_change_due("10", &cart).is_err());
        assert_eq!(flow.change_due(), Some(Money::new(10000)));
    }

    #[test]
    fn test_method_without_change_clears_change_due() {
        let cart = cart_with(1000, 1);
        let mut flow = CheckoutFlow::new("t1".into());
        flow.choose_delivery_type(DeliveryType::Pickup, &open_all_day()).unwrap();
        flow.select_payment_method(&cash()).unwrap();
        flow.set_change_due("20", &cart).unwrap();

        flow.select_payment_method(&pix()).unwrap();
        assert_eq!(flow.change_due(), None);
        assert!(matches!(
            flow.set_change_due("20", &cart),
            Err(CommerceError::ChangeNotAccepted(_))
        ));
    }

    #[test]
    fn test_inactive_payment_method_rejected() {
        let mut flow = CheckoutFlow::new("t1".into());
        let mut method = pix();
        method.is_active = false;
        assert!(matches!(
            flow.select_payment_method(&method),
            Err(CommerceError::PaymentMethodInactive(_))
        ));
        assert!(flow.payment_method().is_none());
    }

    #[test]
    fn test_empty_cart_is_not_ready() {
        let cart = CartStore::new(PricingEngine::default());
        let mut flow = CheckoutFlow::new("t1".into());
        flow.choose_delivery_type(DeliveryType::Pickup, &open_all_day()).unwrap();
        flow.select_payment_method(&pix()).unwrap();

        assert_eq!(flow.state(&cart), CheckoutState::PaymentMethodChosen);
        assert_eq!(flow.missing(&cart), vec!["cart items"]);
    }

    #[test]
    fn test_schedule_for_validates_slot() {
        let mut flow = CheckoutFlow::new("t1".into());
        let calculator = AvailabilityCalculator::default();
        let availability = open_all_day().with_delivery_time(30);
        let day = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        let now = day.and_hms_opt(12, 10, 0).unwrap();

        let good = day.and_hms_opt(13, 0, 0).unwrap();
        flow.schedule_for(Some(good), &calculator, &availability, now).unwrap();
        assert_eq!(flow.scheduled_for(), Some(good));

        let too_soon = day.and_hms_opt(12, 30, 0).unwrap();
        assert!(matches!(
            flow.schedule_for(Some(too_soon), &calculator, &availability, now),
            Err(CommerceError::SlotUnavailable(_))
        ));
        assert_eq!(flow.scheduled_for(), Some(good));

        flow.schedule_for(None, &calculator, &availability, now).unwrap();
        assert_eq!(flow.scheduled_for(), None);
    }

    #[test]
    fn test_build_order_payload() {
        let cart = cart_with(3300, 2);
        let mut flow = CheckoutFlow::for_table("t1".into(), "Mesa 4");
        flow.set_customer("c1".into()).unwrap();
        flow.choose_delivery_type(DeliveryType::Pickup, &open_all_day()).unwrap();
        flow.select_payment_method(&pix()).unwrap();
        flow.set_order_note("  sem pressa ").unwrap();

        let payload = flow.build_order(&cart).unwrap();
        assert_eq!(&payload.idempotency_key, flow.id());
        assert!(payload.is_pickup);
        assert!(payload.address.is_none());
        assert_eq!(payload.total, Money::new(6600));
        assert_eq!(payload.items[0].total_price, Money::new(6600));
        assert_eq!(payload.items[0].unit_price, Money::new(3300));
        assert_eq!(payload.order_note, "sem pressa");
        assert_eq!(payload.table_reference.as_deref(), Some("Mesa 4"));
        assert_eq!(payload.change_due_amount, None);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["isPickup"], true);
        assert_eq!(json["total"], 66.0);
        assert!(json["address"].is_null());
        assert!(json.get("idempotencyKey").is_some());
    }

    #[test]
    fn test_submitted_flow_is_terminal() {
        let cart = cart_with(1000, 1);
        let mut flow = CheckoutFlow::new("t1".into());
        flow.receipt = Some(OrderReceipt {
            order_id: OrderId::new("o1"),
            created_at: None,
            status: OrderStatus::Pending,
        });

        assert_eq!(flow.state(&cart), CheckoutState::Submitted);
        assert!(matches!(
            flow.choose_delivery_type(DeliveryType::Pickup, &open_all_day()),
            Err(CommerceError::InvalidCheckoutTransition { .. })
        ));
        assert!(flow.set_order_note("x").is_err());
    }
}
