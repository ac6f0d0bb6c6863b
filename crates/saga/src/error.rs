//! The error taxonomy of the write-side operations.

use thiserror::Error;

use common::{ClaimId, OrderItemId, OrderNumber, PaymentId};
use domain::TransitionError;
use entity_store::EntityStoreError;
use gateway::GatewayError;

/// Errors surfaced by the order lifecycle operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// An order already exists for this payment reference. User-facing;
    /// retrying will not help.
    #[error("payment {0} has already been processed")]
    DuplicatePayment(PaymentId),

    /// Storage rejected the order write (a race on the payment reference or
    /// an order-number collision). Retryable once the conflict is resolved.
    #[error("order could not be persisted")]
    OrderPersistFailure(#[source] EntityStoreError),

    /// No unique order number could be allocated.
    #[error("could not allocate a unique order number after {0} attempts")]
    OrderNumberExhausted(u32),

    /// The order does not exist.
    #[error("order not found: {0}")]
    OrderNotFound(OrderNumber),

    /// The order item does not exist.
    #[error("order item not found: {0}")]
    OrderItemNotFound(OrderItemId),

    /// The claim does not exist.
    #[error("claim not found: {0}")]
    ClaimNotFound(ClaimId),

    /// The delivery service has no record for the item being advanced.
    #[error("no delivery record for order item {0}")]
    DeliveryNotFound(OrderItemId),

    /// The requested status transition is not permitted.
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    /// A hard-dependency call to an owning service failed.
    #[error("{service} service unavailable")]
    ExternalDependency {
        service: &'static str,
        #[source]
        source: GatewayError,
    },

    /// The creation saga failed; compensation has been attempted. Wraps the
    /// root cause unchanged.
    #[error("order creation failed")]
    OrderCreationFailed(#[source] Box<OrderError>),

    /// Any other storage failure.
    #[error("storage error")]
    Store(#[from] EntityStoreError),
}

impl From<GatewayError> for OrderError {
    fn from(e: GatewayError) -> Self {
        OrderError::ExternalDependency {
            service: e.service(),
            source: e,
        }
    }
}

/// Result type for the write-side operations.
pub type Result<T> = std::result::Result<T, OrderError>;
