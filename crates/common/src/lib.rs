//! Shared identifier types for the order lifecycle system.
//!
//! Every entity and cross-service reference gets its own newtype so that a
//! payment reference can never be passed where a product reference is
//! expected.

pub mod types;

pub use types::{AddressId, ClaimId, OrderItemId, OrderNumber, PaymentId, ProductId, UserId};
