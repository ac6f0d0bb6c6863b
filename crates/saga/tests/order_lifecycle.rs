//! End-to-end tests of the write-side order lifecycle against the in-memory
//! store and gateways.

use common::{AddressId, OrderItemId, PaymentId, ProductId, UserId};
use domain::{CancelReason, ClaimDecision, ClaimStatus, ClaimType, Money, OrderItemStatus};
use entity_store::{EntityStore, InMemoryEntityStore};
use gateway::{Address, DeliveryGateway, DeliveryStatus, InMemoryDeliveryGateway,
    InMemoryPaymentGateway, InMemoryProductGateway, Product};
use saga::{ClaimService, CreateOrderRequest, CreationSaga, FulfillmentService, OrderError,
    OrderLine};

struct TestHarness {
    creation: CreationSaga<InMemoryEntityStore, InMemoryPaymentGateway, InMemoryDeliveryGateway>,
    fulfillment:
        FulfillmentService<InMemoryEntityStore, InMemoryDeliveryGateway, InMemoryProductGateway>,
    claims: ClaimService<InMemoryEntityStore>,
    store: InMemoryEntityStore,
    payment: InMemoryPaymentGateway,
    delivery: InMemoryDeliveryGateway,
}

impl TestHarness {
    fn new() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .try_init();

        let store = InMemoryEntityStore::new();
        let payment = InMemoryPaymentGateway::new();
        let delivery = InMemoryDeliveryGateway::new();
        let product = InMemoryProductGateway::new();

        delivery.set_address(
            AddressId::new(5),
            Address {
                recipient_name: "Jane Doe".to_string(),
                recipient_tel: "010-0000-0000".to_string(),
                recipient_addr1: "1 Main St".to_string(),
                recipient_addr2: "Apt 2".to_string(),
                recipient_zipcode: "00000".to_string(),
                recipient_req: "leave at the door".to_string(),
            },
        );
        product.set_product(
            ProductId::new(11),
            Product {
                name: "Widget".to_string(),
                image: "/img/widget.png".to_string(),
                seller_id: UserId::new(2),
                seller_address_id: AddressId::new(9),
                courier_name: "FastShip".to_string(),
            },
        );

        Self {
            creation: CreationSaga::new(store.clone(), payment.clone(), delivery.clone()),
            fulfillment: FulfillmentService::new(store.clone(), delivery.clone(), product),
            claims: ClaimService::new(store.clone()),
            store,
            payment,
            delivery,
        }
    }

    fn request(&self, payment: i64) -> CreateOrderRequest {
        CreateOrderRequest {
            user_id: UserId::new(1),
            payment_id: PaymentId::new(payment),
            address_id: AddressId::new(5),
            items: vec![OrderLine {
                product_id: ProductId::new(11),
                seller_id: UserId::new(2),
                quantity: 2,
                unit_price: Money::from_units(10_000),
                discount_price: Money::from_units(8_000),
                shipping_fee: Money::from_units(2_500),
            }],
        }
    }

    async fn create_paid_item(&self) -> OrderItemId {
        let order_number = self.creation.create_order(self.request(10)).await.unwrap();
        self.store.items_for_order(&order_number).await.unwrap()[0].id
    }
}

#[tokio::test]
async fn order_totals_match_item_totals() {
    let h = TestHarness::new();
    let order_number = h.creation.create_order(h.request(10)).await.unwrap();

    let order = h.store.get_order(&order_number).await.unwrap().unwrap();
    let items = h.store.items_for_order(&order_number).await.unwrap();

    let sum: Money = items.iter().map(|i| i.total_amount).sum();
    assert_eq!(order.total_amount, sum);
    assert_eq!(sum, Money::from_units(18_500));
}

#[tokio::test]
async fn second_order_for_same_payment_is_rejected() {
    let h = TestHarness::new();
    h.creation.create_order(h.request(10)).await.unwrap();

    let err = h.creation.create_order(h.request(10)).await.unwrap_err();
    assert!(matches!(err, OrderError::DuplicatePayment(_)));
    assert_eq!(h.store.order_count().await, 1);
}

#[tokio::test]
async fn failed_notification_attempts_both_compensations() {
    let h = TestHarness::new();
    h.payment.set_fail_on_assign(true);
    h.delivery.set_fail_on_delete_address(true);

    let err = h.creation.create_order(h.request(10)).await.unwrap_err();
    assert!(matches!(err, OrderError::OrderCreationFailed(_)));

    // The address delete failed, the payment delete still ran.
    assert!(h.delivery.deleted_addresses().is_empty());
    assert_eq!(h.payment.deleted_payments(), vec![PaymentId::new(10)]);
    // Local rows were rolled back.
    assert_eq!(h.store.order_count().await, 0);
    assert_eq!(h.store.item_count().await, 0);
}

#[tokio::test]
async fn full_fulfillment_walk_drives_the_delivery_record() {
    let h = TestHarness::new();
    let item_id = h.create_paid_item().await;

    let statuses = [
        OrderItemStatus::ReadyShipment,
        OrderItemStatus::Shipped,
        OrderItemStatus::Delivered,
        OrderItemStatus::PurchaseConfirmed,
    ];
    for expected in statuses {
        let item = h.fulfillment.advance(item_id).await.unwrap();
        assert_eq!(item.status, expected);
    }

    let record = h
        .delivery
        .find_delivery_for_item(item_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.status, DeliveryStatus::Delivered);

    // The path has ended; the next advance fails rather than silently skipping.
    let err = h.fulfillment.advance(item_id).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidTransition(_)));
}

#[tokio::test]
async fn refund_claim_lifecycle() {
    let h = TestHarness::new();
    let item_id = h.create_paid_item().await;

    // Deliver the item, then dispute it.
    for _ in 0..3 {
        h.fulfillment.advance(item_id).await.unwrap();
    }
    let claim = h
        .claims
        .file_claim(item_id, ClaimType::Refund, "damaged on arrival".to_string())
        .await
        .unwrap();
    assert_eq!(claim.status, ClaimStatus::Requested);

    let item = h.store.get_order_item(item_id).await.unwrap().unwrap();
    assert_eq!(item.status, OrderItemStatus::RefundRequested);

    // A disputed item cannot be advanced.
    assert!(h.fulfillment.advance(item_id).await.is_err());

    let decided = h
        .claims
        .decide_claim(claim.id, ClaimDecision::Reject, None, None)
        .await
        .unwrap();
    assert_eq!(decided.status, ClaimStatus::Rejected);

    let item = h.store.get_order_item(item_id).await.unwrap().unwrap();
    assert_eq!(item.status, OrderItemStatus::RefundRejected);
    assert!(h.fulfillment.advance(item_id).await.is_err());
}

#[tokio::test]
async fn cancel_claim_filed_before_shipment() {
    let h = TestHarness::new();
    let item_id = h.create_paid_item().await;

    h.claims
        .file_claim(item_id, ClaimType::Cancel, "ordered twice".to_string())
        .await
        .unwrap();

    let item = h.store.get_order_item(item_id).await.unwrap().unwrap();
    assert_eq!(item.status, OrderItemStatus::Cancelled);
    assert!(h.fulfillment.advance(item_id).await.is_err());
}

#[tokio::test]
async fn seller_cancel_is_terminal() {
    let h = TestHarness::new();
    let item_id = h.create_paid_item().await;
    h.fulfillment.advance(item_id).await.unwrap();

    let item = h
        .fulfillment
        .cancel(item_id, CancelReason::Undeliverable)
        .await
        .unwrap();
    assert_eq!(item.status, OrderItemStatus::CancelledNoDelivery);

    assert!(h.fulfillment.advance(item_id).await.is_err());
    assert!(
        h.claims
            .file_claim(item_id, ClaimType::Refund, "".to_string())
            .await
            .is_err()
    );
}

#[tokio::test]
async fn claim_listing_reflects_decisions() {
    let h = TestHarness::new();
    let item_id = h.create_paid_item().await;

    let claim = h
        .claims
        .file_claim(item_id, ClaimType::Refund, "damaged".to_string())
        .await
        .unwrap();
    h.claims
        .decide_claim(
            claim.id,
            ClaimDecision::Approve,
            Some("ops".to_string()),
            Some("photo provided".to_string()),
        )
        .await
        .unwrap();

    let listing = h
        .claims
        .claims_for_seller(UserId::new(2), Some(ClaimType::Refund))
        .await
        .unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].status, ClaimStatus::Approved);
    assert_eq!(listing[0].amount, Money::from_units(18_500));

    let item = h.store.get_order_item(item_id).await.unwrap().unwrap();
    assert_eq!(item.status, OrderItemStatus::RefundApproved);
}
