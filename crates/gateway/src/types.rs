//! Wire types shared with the owning services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use common::{AddressId, OrderItemId, ProductId, UserId};
use domain::Money;

/// A delivery address as served by the delivery service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub recipient_name: String,
    pub recipient_tel: String,
    pub recipient_addr1: String,
    pub recipient_addr2: String,
    pub recipient_zipcode: String,
    /// Free-text delivery note ("leave at the door").
    pub recipient_req: String,
}

/// Product display and routing data as served by the product service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    pub image: String,
    /// The seller who owns the product.
    pub seller_id: UserId,
    /// The seller's dispatch address held by the delivery service.
    pub seller_address_id: AddressId,
    /// Courier the seller ships with.
    pub courier_name: String,
}

/// Delivery progress as tracked by the delivery service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Ready,
    InTransit,
    Delivered,
}

impl DeliveryStatus {
    /// The next status in the delivery pipeline, if any.
    pub fn advanced(&self) -> DeliveryStatus {
        match self {
            DeliveryStatus::Ready => DeliveryStatus::InTransit,
            DeliveryStatus::InTransit | DeliveryStatus::Delivered => DeliveryStatus::Delivered,
        }
    }
}

/// A delivery record owned by the delivery service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecord {
    pub delivery_id: i64,
    pub order_item_id: OrderItemId,
    pub status: DeliveryStatus,
}

/// The shipment fields sent when creating a delivery record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRequest {
    pub order_item_id: OrderItemId,
    pub product_id: ProductId,
    pub seller_address_id: AddressId,

    /// Destination address, copied from the buyer's address record.
    #[serde(flatten)]
    pub recipient: Address,

    /// Shipment tracking reference (the order number).
    pub tracking_num: String,
    pub courier_name: String,
    pub estimated_delivery_date: DateTime<Utc>,
    pub shipping_fee: Money,
}
