use thiserror::Error;

use common::{ClaimId, OrderItemId, OrderNumber, PaymentId};
use domain::{ClaimStatus, OrderItemStatus};

/// Errors that can occur when interacting with the entity store.
#[derive(Debug, Error)]
pub enum EntityStoreError {
    /// An order already exists for this payment reference.
    #[error("an order already exists for payment reference {0}")]
    DuplicatePaymentRef(PaymentId),

    /// An order already exists with this order number.
    #[error("an order already exists with number {0}")]
    DuplicateOrderNumber(OrderNumber),

    /// The order was not found.
    #[error("order not found: {0}")]
    OrderNotFound(OrderNumber),

    /// The order item was not found.
    #[error("order item not found: {0}")]
    OrderItemNotFound(OrderItemId),

    /// The claim was not found.
    #[error("claim not found: {0}")]
    ClaimNotFound(ClaimId),

    /// A compare-and-set status update lost a race: the stored status no
    /// longer matches what the caller read.
    #[error(
        "status conflict on order item {order_item_id}: expected {expected}, found {actual}"
    )]
    ItemStatusConflict {
        order_item_id: OrderItemId,
        expected: OrderItemStatus,
        actual: OrderItemStatus,
    },

    /// A compare-and-set claim update lost a race.
    #[error("status conflict on claim {claim_id}: expected {expected}, found {actual}")]
    ClaimStatusConflict {
        claim_id: ClaimId,
        expected: ClaimStatus,
        actual: ClaimStatus,
    },

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored value could not be decoded into its domain type.
    #[error("corrupt stored value: {0}")]
    Decode(String),
}

/// Result type for entity store operations.
pub type Result<T> = std::result::Result<T, EntityStoreError>;
