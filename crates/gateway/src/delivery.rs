//! Delivery service gateway trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use common::{AddressId, OrderItemId};

use crate::error::{GatewayError, Result};
use crate::types::{Address, DeliveryRecord, DeliveryRequest, DeliveryStatus};

/// Trait for delivery service operations.
#[async_trait]
pub trait DeliveryGateway: Send + Sync {
    /// Fetches a buyer address. Read-enrichment call; callers substitute a
    /// fallback on failure.
    async fn fetch_address(&self, address_id: AddressId) -> Result<Address>;

    /// Creates a delivery record when an item enters shipment preparation.
    /// Hard dependency; failure propagates.
    async fn create_delivery(&self, request: DeliveryRequest) -> Result<DeliveryRecord>;

    /// Moves a delivery record to a new status. Hard dependency; failure
    /// propagates.
    async fn update_delivery_status(
        &self,
        delivery_id: i64,
        status: DeliveryStatus,
    ) -> Result<DeliveryRecord>;

    /// Looks up the delivery record tracking an order item, if one exists.
    async fn find_delivery_for_item(
        &self,
        order_item_id: OrderItemId,
    ) -> Result<Option<DeliveryRecord>>;

    /// Removes a buyer address. Compensation call; the caller logs and
    /// swallows failures.
    async fn delete_address(&self, address_id: AddressId) -> Result<()>;
}

#[derive(Debug, Default)]
struct InMemoryDeliveryState {
    addresses: HashMap<AddressId, Address>,
    deliveries: Vec<DeliveryRecord>,
    deleted_addresses: Vec<AddressId>,
    next_id: i64,
    fail_on_fetch_address: bool,
    fail_on_create: bool,
    fail_on_update: bool,
    fail_on_delete_address: bool,
}

/// In-memory delivery gateway for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDeliveryGateway {
    state: Arc<RwLock<InMemoryDeliveryState>>,
}

impl InMemoryDeliveryGateway {
    /// Creates a new in-memory delivery gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an address record.
    pub fn set_address(&self, address_id: AddressId, address: Address) {
        self.state
            .write()
            .unwrap()
            .addresses
            .insert(address_id, address);
    }

    /// Configures the next `fetch_address` calls to fail.
    pub fn set_fail_on_fetch_address(&self, fail: bool) {
        self.state.write().unwrap().fail_on_fetch_address = fail;
    }

    /// Configures the next `create_delivery` calls to fail.
    pub fn set_fail_on_create(&self, fail: bool) {
        self.state.write().unwrap().fail_on_create = fail;
    }

    /// Configures the next `update_delivery_status` calls to fail.
    pub fn set_fail_on_update(&self, fail: bool) {
        self.state.write().unwrap().fail_on_update = fail;
    }

    /// Configures the next `delete_address` calls to fail.
    pub fn set_fail_on_delete_address(&self, fail: bool) {
        self.state.write().unwrap().fail_on_delete_address = fail;
    }

    /// Returns the number of delivery records created.
    pub fn delivery_count(&self) -> usize {
        self.state.read().unwrap().deliveries.len()
    }

    /// Returns the addresses deleted through compensation.
    pub fn deleted_addresses(&self) -> Vec<AddressId> {
        self.state.read().unwrap().deleted_addresses.clone()
    }
}

#[async_trait]
impl DeliveryGateway for InMemoryDeliveryGateway {
    async fn fetch_address(&self, address_id: AddressId) -> Result<Address> {
        let state = self.state.read().unwrap();
        if state.fail_on_fetch_address {
            return Err(GatewayError::Rejected {
                service: "delivery",
                reason: "injected address failure".to_string(),
            });
        }
        state
            .addresses
            .get(&address_id)
            .cloned()
            .ok_or_else(|| GatewayError::InvalidResponse {
                service: "delivery",
                reason: format!("no address record for {address_id}"),
            })
    }

    async fn create_delivery(&self, request: DeliveryRequest) -> Result<DeliveryRecord> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_create {
            return Err(GatewayError::Rejected {
                service: "delivery",
                reason: "injected create failure".to_string(),
            });
        }
        state.next_id += 1;
        let record = DeliveryRecord {
            delivery_id: state.next_id,
            order_item_id: request.order_item_id,
            status: DeliveryStatus::Ready,
        };
        state.deliveries.push(record.clone());
        Ok(record)
    }

    async fn update_delivery_status(
        &self,
        delivery_id: i64,
        status: DeliveryStatus,
    ) -> Result<DeliveryRecord> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_update {
            return Err(GatewayError::Rejected {
                service: "delivery",
                reason: "injected update failure".to_string(),
            });
        }
        let record = state
            .deliveries
            .iter_mut()
            .find(|d| d.delivery_id == delivery_id)
            .ok_or_else(|| GatewayError::InvalidResponse {
                service: "delivery",
                reason: format!("no delivery record {delivery_id}"),
            })?;
        record.status = status;
        Ok(record.clone())
    }

    async fn find_delivery_for_item(
        &self,
        order_item_id: OrderItemId,
    ) -> Result<Option<DeliveryRecord>> {
        let state = self.state.read().unwrap();
        Ok(state
            .deliveries
            .iter()
            .find(|d| d.order_item_id == order_item_id)
            .cloned())
    }

    async fn delete_address(&self, address_id: AddressId) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_delete_address {
            return Err(GatewayError::Rejected {
                service: "delivery",
                reason: "injected address delete failure".to_string(),
            });
        }
        state.deleted_addresses.push(address_id);
        Ok(())
    }
}
