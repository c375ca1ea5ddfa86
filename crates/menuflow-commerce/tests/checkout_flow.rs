//! End-to-end cart and checkout scenarios against an in-process order API.

use async_trait::async_trait;
use menuflow_commerce::checkout::ApiFailure;
use menuflow_commerce::prelude::*;
use std::sync::Mutex;

const CATALOG: &str = r#"{
    "tenantId": "pizzaria-do-ze",
    "categories": [{
        "id": 1,
        "name": "Pizzas",
        "isActive": true,
        "products": [{
            "id": 10,
            "name": "Pizza Grande",
            "description": "Até dois sabores",
            "price": 20.00,
            "flavorAllowed": 2,
            "flavorMandatory": 1,
            "relations": [
                {"id": 1, "type": "flavor", "price": 8.00,
                 "relatedProduct": {"id": 101, "name": "Calabresa"}},
                {"id": 2, "type": "flavor", "price": 12.00,
                 "relatedProduct": {"id": 102, "name": "Camarão"}},
                {"id": 3, "type": "additional", "price": 3.00,
                 "relatedProduct": {"id": 201, "name": "Borda recheada"}},
                {"id": 4, "type": "composition", "price": 0,
                 "relatedProduct": {"id": 301, "name": "Cebola"}}
            ]
        }]
    }]
}"#;

const TENANT: &str = r#"{
    "flavorCalcType": "average",
    "openingTime": "18:00",
    "closingTime": "23:30",
    "openingDays": [1, 2, 3, 4, 5, 6, 7],
    "deliveryTime": 40,
    "lastPooling": "2024-06-05T19:00:00",
    "neighborhoods": [{"id": 1, "name": "Centro", "deliveryFee": 6.50}],
    "cities": [{"id": 1, "name": "Campinas"}],
    "paymentTypes": [
        {"id": 1, "name": "Dinheiro", "isActive": true, "needsChange": true},
        {"id": 2, "name": "Pix", "isActive": true, "needsChange": false}
    ]
}"#;

/// Fails the first `failures` submissions, then accepts.
struct FakeOrderApi {
    failures: Mutex<u32>,
    received: Mutex<Vec<OrderPayload>>,
}

impl FakeOrderApi {
    fn failing(failures: u32) -> Self {
        Self {
            failures: Mutex::new(failures),
            received: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl OrderApi for FakeOrderApi {
    async fn submit_order(&self, payload: &OrderPayload) -> Result<OrderReceipt, ApiFailure> {
        self.received.lock().unwrap().push(payload.clone());
        let mut failures = self.failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(ApiFailure::with_message("Loja temporariamente indisponível"));
        }
        Ok(OrderReceipt {
            order_id: OrderId::new("9001"),
            created_at: None,
            status: OrderStatus::Pending,
        })
    }

    async fn order_status(&self, _order_id: &OrderId) -> Result<OrderStatus, ApiFailure> {
        Ok(OrderStatus::Pending)
    }
}

fn setup() -> (TenantConfig, Product, CartStore) {
    let tenant = TenantConfig::from_json(TENANT).unwrap();
    let catalog = Catalog::from_json(CATALOG).unwrap();
    let product = catalog.find_product(&ProductId::new("10")).unwrap().clone();
    let cart = CartStore::new(tenant.pricing_engine());
    (tenant, product, cart)
}

fn full_selection() -> SelectionSet {
    SelectionSet::new()
        .with_additional("3")
        .with_flavor("1")
        .with_flavor("2")
}

#[test]
fn test_end_to_end_pickup_total() {
    let (tenant, product, mut cart) = setup();

    let key = cart.add(&product, &full_selection(), "", 2).unwrap();
    let line = cart.line(&key).unwrap();
    assert_eq!(line.total_price, Money::new(3300));
    assert_eq!(line.count, 2);
    assert_eq!(line.line_total().unwrap(), Money::new(6600));

    let mut flow = CheckoutFlow::new(TenantId::new("pizzaria-do-ze"));
    flow.choose_delivery_type(DeliveryType::Pickup, &tenant.availability(false))
        .unwrap();
    let totals = flow.totals(&cart).unwrap();
    assert_eq!(totals.delivery_fee, Money::zero());
    assert_eq!(totals.total, Money::new(6600));
}

#[test]
fn test_delivery_adds_neighborhood_fee() {
    let (tenant, product, mut cart) = setup();
    cart.add(&product, &full_selection(), "", 1).unwrap();

    let neighborhood = tenant.neighborhood(&NeighborhoodId::new("1")).unwrap().clone();
    let city = tenant.city(&CityId::new("1")).unwrap().clone();

    let mut flow = CheckoutFlow::new(TenantId::new("pizzaria-do-ze"));
    flow.choose_delivery_type(DeliveryType::Delivery, &tenant.availability(false))
        .unwrap();
    assert!(flow
        .set_address(Address::new("Rua das Flores", "", neighborhood.clone(), city.clone()))
        .is_err());
    flow.set_address(Address::new("Rua das Flores", "120", neighborhood, city))
        .unwrap();

    let totals = flow.totals(&cart).unwrap();
    assert_eq!(totals.total, Money::new(3300 + 650));
}

#[test]
fn test_change_due_must_cover_total() {
    let (tenant, product, mut cart) = setup();
    cart.add(&product, &full_selection(), "", 2).unwrap();

    let mut flow = CheckoutFlow::new(TenantId::new("pizzaria-do-ze"));
    flow.choose_delivery_type(DeliveryType::Pickup, &tenant.availability(false))
        .unwrap();
    let cash = tenant.payment_method(&PaymentMethodId::new("1")).unwrap();
    flow.select_payment_method(cash).unwrap();

    let err = flow.set_change_due("R$ 50,00", &cart).unwrap_err();
    assert!(err.is_validation());
    assert_ne!(flow.state(&cart), CheckoutState::ReadyToSubmit);

    flow.set_change_due("70", &cart).unwrap();
    assert_eq!(flow.state(&cart), CheckoutState::ReadyToSubmit);
}

#[test]
fn test_removing_composition_keeps_price_but_splits_line() {
    let (_tenant, product, mut cart) = setup();
    let plain = cart.add(&product, &full_selection(), "", 1).unwrap();
    let no_onion = cart
        .add(&product, &full_selection().without_composition("4"), "", 1)
        .unwrap();

    assert_ne!(plain, no_onion);
    assert_eq!(
        cart.line(&plain).unwrap().total_price,
        cart.line(&no_onion).unwrap().total_price
    );
}

#[tokio::test]
async fn test_failed_submission_can_be_retried() {
    let (tenant, product, mut cart) = setup();
    cart.add(&product, &full_selection(), "", 2).unwrap();

    let mut flow = CheckoutFlow::new(TenantId::new("pizzaria-do-ze"));
    flow.choose_delivery_type(DeliveryType::Pickup, &tenant.availability(false))
        .unwrap();
    flow.select_payment_method(tenant.payment_method(&PaymentMethodId::new("2")).unwrap())
        .unwrap();

    let api = FakeOrderApi::failing(1);
    let err = flow.submit(&mut cart, &api).await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(err.user_message(), "Loja temporariamente indisponível");
    assert_eq!(cart.item_count(), 2);
    assert_eq!(flow.state(&cart), CheckoutState::ReadyToSubmit);

    let receipt = flow.submit(&mut cart, &api).await.unwrap();
    assert_eq!(receipt.order_id.as_str(), "9001");
    assert!(cart.is_empty());
    assert_eq!(flow.state(&cart), CheckoutState::Submitted);

    let received = api.received.lock().unwrap();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].idempotency_key, received[1].idempotency_key);
    assert_eq!(received[0].total, Money::new(6600));
}

#[tokio::test]
async fn test_submitted_flow_rejects_resubmission() {
    let (tenant, product, mut cart) = setup();
    cart.add(&product, &full_selection(), "", 1).unwrap();

    let mut flow = CheckoutFlow::new(TenantId::new("pizzaria-do-ze"));
    flow.choose_delivery_type(DeliveryType::Pickup, &tenant.availability(false))
        .unwrap();
    flow.select_payment_method(tenant.payment_method(&PaymentMethodId::new("2")).unwrap())
        .unwrap();

    let api = FakeOrderApi::failing(0);
    flow.submit(&mut cart, &api).await.unwrap();

    cart.add(&product, &full_selection(), "", 1).unwrap();
    let err = flow.submit(&mut cart, &api).await.unwrap_err();
    assert!(matches!(err, CommerceError::InvalidCheckoutTransition { .. }));
    assert_eq!(api.received.lock().unwrap().len(), 1);
}
