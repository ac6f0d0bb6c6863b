//! The enriched item and per-order view shapes shared by the list views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use common::{AddressId, OrderItemId, OrderNumber, PaymentId, ProductId, UserId};
use domain::{Money, Order, OrderItem, OrderItemStatus, applied_unit_price};
use gateway::Product;

/// An order item joined with the display fields owned by other services.
///
/// The optional fields are populated per view: buyer views carry names and
/// the card type, seller views carry the card type, the confirmed-items view
/// carries the order date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedOrderItem {
    pub order_item_id: OrderItemId,
    pub order_number: OrderNumber,
    pub product_id: ProductId,
    pub seller_id: UserId,

    /// Product display name (fallback-substituted when the catalog is down).
    pub product_name: String,
    pub image: String,

    pub quantity: u32,
    pub unit_price: Money,
    pub discount_price: Money,
    pub shipping_fee: Money,
    pub total_amount: Money,
    pub status: OrderItemStatus,

    pub company_name: Option<String>,
    pub seller_name: Option<String>,
    pub buyer_name: Option<String>,
    pub card_type: Option<String>,
    pub ordered_at: Option<DateTime<Utc>>,
}

impl EnrichedOrderItem {
    /// Joins an item with its product record; the optional display fields
    /// start empty.
    pub(crate) fn base(item: &OrderItem, product: Product) -> Self {
        Self {
            order_item_id: item.id,
            order_number: item.order_number.clone(),
            product_id: item.product_id,
            seller_id: item.seller_id,
            product_name: product.name,
            image: product.image,
            quantity: item.quantity,
            unit_price: item.unit_price,
            discount_price: item.discount_price,
            shipping_fee: item.shipping_fee,
            total_amount: item.total_amount,
            status: item.status,
            company_name: None,
            seller_name: None,
            buyer_name: None,
            card_type: None,
            ordered_at: None,
        }
    }

    /// The goods portion of the line (applied unit price × quantity).
    pub fn goods_total(&self) -> Money {
        applied_unit_price(self.unit_price, self.discount_price).multiply(self.quantity)
    }

    /// Case-sensitive keyword match over the product name and the seller's
    /// company name.
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        self.product_name.contains(keyword)
            || self
                .company_name
                .as_deref()
                .is_some_and(|company| company.contains(keyword))
    }
}

/// One order with its (filtered) enriched items and derived totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    pub order_number: OrderNumber,
    pub payment_id: PaymentId,
    pub address_id: AddressId,
    pub ordered_at: DateTime<Utc>,
    pub total_amount: Money,

    pub items: Vec<EnrichedOrderItem>,
    /// Σ applied unit price × quantity over the remaining items.
    pub items_total: Money,
    /// Σ shipping fee over the remaining items.
    pub shipping_total: Money,
}

impl OrderView {
    /// Assembles the view and its totals from an order and its kept items.
    pub(crate) fn assemble(order: &Order, items: Vec<EnrichedOrderItem>) -> Self {
        let items_total = items.iter().map(|i| i.goods_total()).sum();
        let shipping_total = items.iter().map(|i| i.shipping_fee).sum();
        Self {
            order_number: order.order_number.clone(),
            payment_id: order.payment_id,
            address_id: order.address_id,
            ordered_at: order.ordered_at,
            total_amount: order.total_amount,
            items,
            items_total,
            shipping_total,
        }
    }
}
