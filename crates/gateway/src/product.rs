//! Product service gateway trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use common::ProductId;

use crate::error::{GatewayError, Result};
use crate::types::Product;

/// Trait for product catalog lookups.
#[async_trait]
pub trait ProductGateway: Send + Sync {
    /// Fetches product display and routing data. Read-enrichment call;
    /// callers substitute a fallback on failure.
    async fn fetch_product(&self, product_id: ProductId) -> Result<Product>;
}

#[derive(Debug, Default)]
struct InMemoryProductState {
    products: HashMap<ProductId, Product>,
    fail_on_fetch: bool,
}

/// In-memory product gateway for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductGateway {
    state: Arc<RwLock<InMemoryProductState>>,
}

impl InMemoryProductGateway {
    /// Creates a new in-memory product gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a product record.
    pub fn set_product(&self, product_id: ProductId, product: Product) {
        self.state
            .write()
            .unwrap()
            .products
            .insert(product_id, product);
    }

    /// Configures the next `fetch_product` calls to fail.
    pub fn set_fail_on_fetch(&self, fail: bool) {
        self.state.write().unwrap().fail_on_fetch = fail;
    }
}

#[async_trait]
impl ProductGateway for InMemoryProductGateway {
    async fn fetch_product(&self, product_id: ProductId) -> Result<Product> {
        let state = self.state.read().unwrap();
        if state.fail_on_fetch {
            return Err(GatewayError::Rejected {
                service: "product",
                reason: "injected fetch failure".to_string(),
            });
        }
        state
            .products
            .get(&product_id)
            .cloned()
            .ok_or_else(|| GatewayError::InvalidResponse {
                service: "product",
                reason: format!("no product record for {product_id}"),
            })
    }
}
