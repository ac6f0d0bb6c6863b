//! Status enums for the fulfillment and dispute pipelines.

use serde::{Deserialize, Serialize};

/// The status of an order line item.
///
/// Fulfillment path (strictly monotonic):
/// ```text
/// PAID ──► READY_SHIPMENT ──► SHIPPED ──► DELIVERED ──► PURCHASE_CONFIRMED
/// ```
///
/// Dispute and cancellation states branch off the fulfillment path and are
/// reached only through the [`transition`](crate::transition) engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderItemStatus {
    /// Payment confirmed, fulfillment not started.
    Paid,

    /// Seller is preparing the shipment.
    ReadyShipment,

    /// Parcel handed to the courier.
    Shipped,

    /// Parcel delivered to the buyer.
    Delivered,

    /// Buyer confirmed the purchase (terminal).
    PurchaseConfirmed,

    /// Buyer-filed cancellation (terminal).
    Cancelled,

    /// Seller cancelled: product out of stock (terminal).
    CancelledEmpty,

    /// Seller cancelled: address undeliverable (terminal).
    CancelledNoDelivery,

    /// Buyer requested a refund; awaiting the seller decision.
    RefundRequested,

    /// Refund approved (terminal).
    RefundApproved,

    /// Refund rejected (terminal).
    RefundRejected,

    /// Buyer requested an exchange; awaiting the seller decision.
    ExchangeRequested,

    /// Exchange approved (terminal).
    ExchangeApproved,

    /// Exchange rejected (terminal).
    ExchangeRejected,
}

impl OrderItemStatus {
    /// Statuses on the fulfillment path, including the confirmed terminal.
    pub fn is_fulfillment(&self) -> bool {
        matches!(
            self,
            OrderItemStatus::Paid
                | OrderItemStatus::ReadyShipment
                | OrderItemStatus::Shipped
                | OrderItemStatus::Delivered
                | OrderItemStatus::PurchaseConfirmed
        )
    }

    /// Statuses belonging to the cancel/refund/exchange pipeline.
    pub fn is_dispute(&self) -> bool {
        matches!(
            self,
            OrderItemStatus::Cancelled
                | OrderItemStatus::RefundRequested
                | OrderItemStatus::RefundApproved
                | OrderItemStatus::RefundRejected
                | OrderItemStatus::ExchangeRequested
                | OrderItemStatus::ExchangeApproved
                | OrderItemStatus::ExchangeRejected
        )
    }

    /// Statuses a buyer may still file a dispute from.
    pub fn is_pre_dispute(&self) -> bool {
        matches!(
            self,
            OrderItemStatus::Paid
                | OrderItemStatus::ReadyShipment
                | OrderItemStatus::Shipped
                | OrderItemStatus::Delivered
        )
    }

    /// Fulfillment statuses counted as completed in the seller queue.
    pub fn is_completed(&self) -> bool {
        matches!(
            self,
            OrderItemStatus::Delivered | OrderItemStatus::PurchaseConfirmed
        )
    }

    /// Returns true if no trigger can move the item out of this status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderItemStatus::PurchaseConfirmed
                | OrderItemStatus::Cancelled
                | OrderItemStatus::CancelledEmpty
                | OrderItemStatus::CancelledNoDelivery
                | OrderItemStatus::RefundApproved
                | OrderItemStatus::RefundRejected
                | OrderItemStatus::ExchangeApproved
                | OrderItemStatus::ExchangeRejected
        )
    }

    /// Returns the storage form of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderItemStatus::Paid => "PAID",
            OrderItemStatus::ReadyShipment => "READY_SHIPMENT",
            OrderItemStatus::Shipped => "SHIPPED",
            OrderItemStatus::Delivered => "DELIVERED",
            OrderItemStatus::PurchaseConfirmed => "PURCHASE_CONFIRMED",
            OrderItemStatus::Cancelled => "CANCELLED",
            OrderItemStatus::CancelledEmpty => "CANCELLED_EMPTY",
            OrderItemStatus::CancelledNoDelivery => "CANCELLED_NO_DELIVERY",
            OrderItemStatus::RefundRequested => "REFUND_REQUESTED",
            OrderItemStatus::RefundApproved => "REFUND_APPROVED",
            OrderItemStatus::RefundRejected => "REFUND_REJECTED",
            OrderItemStatus::ExchangeRequested => "EXCHANGE_REQUESTED",
            OrderItemStatus::ExchangeApproved => "EXCHANGE_APPROVED",
            OrderItemStatus::ExchangeRejected => "EXCHANGE_REJECTED",
        }
    }
}

impl std::fmt::Display for OrderItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PAID" => Ok(OrderItemStatus::Paid),
            "READY_SHIPMENT" => Ok(OrderItemStatus::ReadyShipment),
            "SHIPPED" => Ok(OrderItemStatus::Shipped),
            "DELIVERED" => Ok(OrderItemStatus::Delivered),
            "PURCHASE_CONFIRMED" => Ok(OrderItemStatus::PurchaseConfirmed),
            "CANCELLED" => Ok(OrderItemStatus::Cancelled),
            "CANCELLED_EMPTY" => Ok(OrderItemStatus::CancelledEmpty),
            "CANCELLED_NO_DELIVERY" => Ok(OrderItemStatus::CancelledNoDelivery),
            "REFUND_REQUESTED" => Ok(OrderItemStatus::RefundRequested),
            "REFUND_APPROVED" => Ok(OrderItemStatus::RefundApproved),
            "REFUND_REJECTED" => Ok(OrderItemStatus::RefundRejected),
            "EXCHANGE_REQUESTED" => Ok(OrderItemStatus::ExchangeRequested),
            "EXCHANGE_APPROVED" => Ok(OrderItemStatus::ExchangeApproved),
            "EXCHANGE_REJECTED" => Ok(OrderItemStatus::ExchangeRejected),
            other => Err(format!("unknown order item status: {other}")),
        }
    }
}

/// The status of a claim.
///
/// `REQUESTED → APPROVED` or `REQUESTED → REJECTED`; both outcomes are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    /// Filed by the buyer, awaiting the seller decision.
    Requested,

    /// Approved by the seller (terminal).
    Approved,

    /// Rejected by the seller (terminal).
    Rejected,
}

impl ClaimStatus {
    /// Returns true once a decision has been made.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimStatus::Approved | ClaimStatus::Rejected)
    }

    /// Returns the storage form of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Requested => "REQUESTED",
            ClaimStatus::Approved => "APPROVED",
            ClaimStatus::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ClaimStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REQUESTED" => Ok(ClaimStatus::Requested),
            "APPROVED" => Ok(ClaimStatus::Approved),
            "REJECTED" => Ok(ClaimStatus::Rejected),
            other => Err(format!("unknown claim status: {other}")),
        }
    }
}

/// The kind of dispute a buyer can file against an order item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimType {
    Cancel,
    Refund,
    Exchange,
}

impl ClaimType {
    /// The item status set when a claim of this type is filed.
    pub fn requested_status(&self) -> OrderItemStatus {
        match self {
            ClaimType::Cancel => OrderItemStatus::Cancelled,
            ClaimType::Refund => OrderItemStatus::RefundRequested,
            ClaimType::Exchange => OrderItemStatus::ExchangeRequested,
        }
    }

    /// Returns the storage form of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimType::Cancel => "CANCEL",
            ClaimType::Refund => "REFUND",
            ClaimType::Exchange => "EXCHANGE",
        }
    }
}

impl std::fmt::Display for ClaimType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ClaimType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CANCEL" => Ok(ClaimType::Cancel),
            "REFUND" => Ok(ClaimType::Refund),
            "EXCHANGE" => Ok(ClaimType::Exchange),
            other => Err(format!("unknown claim type: {other}")),
        }
    }
}

/// Why a seller cancelled an item outside the claim flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancelReason {
    /// The product is out of stock.
    StockOut,

    /// The destination address cannot be served.
    Undeliverable,
}

impl CancelReason {
    /// The terminal item status this reason maps to.
    pub fn cancelled_status(&self) -> OrderItemStatus {
        match self {
            CancelReason::StockOut => OrderItemStatus::CancelledEmpty,
            CancelReason::Undeliverable => OrderItemStatus::CancelledNoDelivery,
        }
    }

    /// Returns the storage form of the reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            CancelReason::StockOut => "STOCK_OUT",
            CancelReason::Undeliverable => "UNDELIVERABLE",
        }
    }
}

impl std::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
