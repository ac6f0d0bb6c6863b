//! Payment service gateway trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use common::{OrderNumber, PaymentId};

use crate::error::{GatewayError, Result};

/// Trait for payment service operations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Fetches the card brand recorded for a payment. Read-enrichment call;
    /// callers substitute a fallback on failure.
    async fn fetch_card_type(&self, payment_id: PaymentId) -> Result<String>;

    /// Notifies the payment service of the order number generated for a
    /// payment. Hard dependency of order creation; failure propagates.
    async fn assign_order_number(
        &self,
        payment_id: PaymentId,
        order_number: &OrderNumber,
    ) -> Result<()>;

    /// Removes a payment record. Compensation call; the caller logs and
    /// swallows failures.
    async fn delete_payment(&self, payment_id: PaymentId) -> Result<()>;
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    card_types: HashMap<PaymentId, String>,
    assigned: HashMap<PaymentId, OrderNumber>,
    deleted: Vec<PaymentId>,
    fail_on_fetch: bool,
    fail_on_assign: bool,
    fail_on_delete: bool,
}

/// In-memory payment gateway for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentGateway {
    /// Creates a new in-memory payment gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a card type for a payment reference.
    pub fn set_card_type(&self, payment_id: PaymentId, card_type: impl Into<String>) {
        self.state
            .write()
            .unwrap()
            .card_types
            .insert(payment_id, card_type.into());
    }

    /// Configures the next `fetch_card_type` calls to fail.
    pub fn set_fail_on_fetch(&self, fail: bool) {
        self.state.write().unwrap().fail_on_fetch = fail;
    }

    /// Configures the next `assign_order_number` calls to fail.
    pub fn set_fail_on_assign(&self, fail: bool) {
        self.state.write().unwrap().fail_on_assign = fail;
    }

    /// Configures the next `delete_payment` calls to fail.
    pub fn set_fail_on_delete(&self, fail: bool) {
        self.state.write().unwrap().fail_on_delete = fail;
    }

    /// Returns the order number assigned to a payment, if any.
    pub fn assigned_order_number(&self, payment_id: PaymentId) -> Option<OrderNumber> {
        self.state.read().unwrap().assigned.get(&payment_id).cloned()
    }

    /// Returns the payments deleted through compensation.
    pub fn deleted_payments(&self) -> Vec<PaymentId> {
        self.state.read().unwrap().deleted.clone()
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn fetch_card_type(&self, payment_id: PaymentId) -> Result<String> {
        let state = self.state.read().unwrap();
        if state.fail_on_fetch {
            return Err(GatewayError::Rejected {
                service: "payment",
                reason: "injected fetch failure".to_string(),
            });
        }
        state
            .card_types
            .get(&payment_id)
            .cloned()
            .ok_or_else(|| GatewayError::InvalidResponse {
                service: "payment",
                reason: format!("no payment record for {payment_id}"),
            })
    }

    async fn assign_order_number(
        &self,
        payment_id: PaymentId,
        order_number: &OrderNumber,
    ) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_assign {
            return Err(GatewayError::Rejected {
                service: "payment",
                reason: "injected assign failure".to_string(),
            });
        }
        state.assigned.insert(payment_id, order_number.clone());
        Ok(())
    }

    async fn delete_payment(&self, payment_id: PaymentId) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_delete {
            return Err(GatewayError::Rejected {
                service: "payment",
                reason: "injected delete failure".to_string(),
            });
        }
        state.deleted.push(payment_id);
        Ok(())
    }
}
