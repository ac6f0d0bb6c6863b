//! The locally-owned entity graph: orders, order items, and claims.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use common::{AddressId, ClaimId, OrderItemId, OrderNumber, PaymentId, ProductId, UserId};

use crate::money::Money;
use crate::status::{ClaimStatus, ClaimType, OrderItemStatus};

/// The unit price actually charged for a line: the discount price when one
/// is set (non-zero), the list price otherwise.
pub fn applied_unit_price(unit_price: Money, discount_price: Money) -> Money {
    if discount_price.is_positive() {
        discount_price
    } else {
        unit_price
    }
}

/// One checkout transaction.
///
/// Immutable after creation; per-line state lives on the [`OrderItem`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Generated order number, also the shipment tracking reference.
    pub order_number: OrderNumber,

    /// The buyer who placed the order.
    pub user_id: UserId,

    /// External payment reference; unique across all orders.
    pub payment_id: PaymentId,

    /// Delivery address reference held by the delivery service.
    pub address_id: AddressId,

    /// Creation timestamp.
    pub ordered_at: DateTime<Utc>,

    /// Sum of the line totals at creation time.
    pub total_amount: Money,
}

impl Order {
    /// The calendar date the order was placed, used for range filtering.
    pub fn ordered_date(&self) -> NaiveDate {
        self.ordered_at.date_naive()
    }
}

/// One product line within an order, carrying its own lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Store-assigned primary key.
    pub id: OrderItemId,

    /// Parent order.
    pub order_number: OrderNumber,

    /// The product being sold.
    pub product_id: ProductId,

    /// The seller who owns the product.
    pub seller_id: UserId,

    /// Units ordered.
    pub quantity: u32,

    /// List price per unit.
    pub unit_price: Money,

    /// Discounted price per unit; zero means no discount.
    pub discount_price: Money,

    /// Shipping fee for this line.
    pub shipping_fee: Money,

    /// `applied unit price × quantity + shipping fee`, fixed at creation.
    pub total_amount: Money,

    /// Current fulfillment/dispute status.
    pub status: OrderItemStatus,
}

impl OrderItem {
    /// The unit price actually charged for this line.
    pub fn applied_unit_price(&self) -> Money {
        applied_unit_price(self.unit_price, self.discount_price)
    }

    /// The goods portion of the line total, excluding shipping.
    pub fn goods_total(&self) -> Money {
        self.applied_unit_price().multiply(self.quantity)
    }
}

/// An order item about to be persisted; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub order_number: OrderNumber,
    pub product_id: ProductId,
    pub seller_id: UserId,
    pub quantity: u32,
    pub unit_price: Money,
    pub discount_price: Money,
    pub shipping_fee: Money,
    pub total_amount: Money,
    pub status: OrderItemStatus,
}

impl NewOrderItem {
    /// Builds a `PAID` line with its total computed from the pricing rule.
    #[allow(clippy::too_many_arguments)]
    pub fn paid(
        order_number: OrderNumber,
        product_id: ProductId,
        seller_id: UserId,
        quantity: u32,
        unit_price: Money,
        discount_price: Money,
        shipping_fee: Money,
    ) -> Self {
        let total_amount =
            applied_unit_price(unit_price, discount_price).multiply(quantity) + shipping_fee;
        Self {
            order_number,
            product_id,
            seller_id,
            quantity,
            unit_price,
            discount_price,
            shipping_fee,
            total_amount,
            status: OrderItemStatus::Paid,
        }
    }
}

/// A buyer-filed dispute against one order item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Store-assigned primary key.
    pub id: ClaimId,

    /// The disputed order item.
    pub order_item_id: OrderItemId,

    /// The buyer who filed the claim.
    pub user_id: UserId,

    /// Cancel, refund, or exchange.
    pub claim_type: ClaimType,

    /// Free-text reason supplied by the buyer.
    pub reason: String,

    /// Requested / approved / rejected.
    pub status: ClaimStatus,

    /// When the claim was filed.
    pub claimed_at: DateTime<Utc>,

    /// When the claim was decided, if it has been.
    pub processed_at: Option<DateTime<Utc>>,

    /// Who decided the claim.
    pub processed_by: Option<String>,

    /// Optional decision memo.
    pub memo: Option<String>,
}

/// A claim about to be persisted; the store assigns the id and the claim is
/// born `REQUESTED` with no decision fields set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClaim {
    pub order_item_id: OrderItemId,
    pub user_id: UserId,
    pub claim_type: ClaimType,
    pub reason: String,
    pub claimed_at: DateTime<Utc>,
}
