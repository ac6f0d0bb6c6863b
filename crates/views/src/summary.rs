//! Count-by-bucket summaries over view results.
//!
//! Statuses outside a summary's bucket set are ignored rather than counted
//! into the wrong bucket.

use serde::{Deserialize, Serialize};

use domain::OrderItemStatus;

use crate::item::{EnrichedOrderItem, OrderView};

/// Item counts per fulfillment bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemStatusCounts {
    /// Items in `PAID`.
    pub paid: usize,
    /// Items in `READY_SHIPMENT` or `SHIPPED`.
    pub ready: usize,
    /// Items in `DELIVERED` or `PURCHASE_CONFIRMED`.
    pub complete: usize,
}

impl ItemStatusCounts {
    /// Items that still need seller action.
    pub fn in_processing(&self) -> usize {
        self.paid + self.ready
    }
}

/// Counts items per fulfillment bucket.
pub fn item_status_counts(items: &[EnrichedOrderItem]) -> ItemStatusCounts {
    let mut counts = ItemStatusCounts::default();
    for item in items {
        match item.status {
            OrderItemStatus::Paid => counts.paid += 1,
            OrderItemStatus::ReadyShipment | OrderItemStatus::Shipped => counts.ready += 1,
            OrderItemStatus::Delivered | OrderItemStatus::PurchaseConfirmed => {
                counts.complete += 1
            }
            _ => {}
        }
    }
    counts
}

/// Item counts per delivery-progress bucket, across a list of orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderStatusCounts {
    /// Items in `PAID`.
    pub paid_or_ready: usize,
    /// Items in `READY_SHIPMENT` or `SHIPPED`.
    pub shipped: usize,
    /// Items in `DELIVERED`.
    pub delivered: usize,
}

/// Counts the items of a buyer's order list per delivery-progress bucket.
pub fn order_status_counts(orders: &[OrderView]) -> OrderStatusCounts {
    let mut counts = OrderStatusCounts::default();
    for order in orders {
        for item in &order.items {
            match item.status {
                OrderItemStatus::Paid => counts.paid_or_ready += 1,
                OrderItemStatus::ReadyShipment | OrderItemStatus::Shipped => counts.shipped += 1,
                OrderItemStatus::Delivered => counts.delivered += 1,
                _ => {}
            }
        }
    }
    counts
}
