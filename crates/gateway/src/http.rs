//! HTTP implementations of the gateway traits.
//!
//! All four clients share a single `reqwest::Client` with a bounded per-call
//! timeout, constructed once from [`GatewayConfig`] and injected wherever a
//! gateway is needed.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use common::{AddressId, OrderItemId, OrderNumber, PaymentId, ProductId, UserId};

use crate::delivery::DeliveryGateway;
use crate::error::{GatewayError, Result};
use crate::payment::PaymentGateway;
use crate::product::ProductGateway;
use crate::types::{Address, DeliveryRecord, DeliveryRequest, DeliveryStatus, Product};
use crate::user::UserGateway;

const DEFAULT_TIMEOUT_MS: u64 = 3_000;

/// Base URLs and the per-call timeout for the HTTP gateway clients.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub payment_base_url: String,
    pub delivery_base_url: String,
    pub product_base_url: String,
    pub user_base_url: String,
    pub call_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            payment_base_url: "http://localhost:10400".to_string(),
            delivery_base_url: "http://localhost:10500".to_string(),
            product_base_url: "http://localhost:10100".to_string(),
            user_base_url: "http://localhost:10000".to_string(),
            call_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl GatewayConfig {
    /// Builds a config from `ORDER_*_URL` / `ORDER_GATEWAY_TIMEOUT_MS`
    /// environment variables, falling back to local-dev defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let var = |name: &str, default: String| std::env::var(name).unwrap_or(default);

        let timeout_ms = std::env::var("ORDER_GATEWAY_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        Self {
            payment_base_url: var("ORDER_PAYMENT_URL", defaults.payment_base_url),
            delivery_base_url: var("ORDER_DELIVERY_URL", defaults.delivery_base_url),
            product_base_url: var("ORDER_PRODUCT_URL", defaults.product_base_url),
            user_base_url: var("ORDER_USER_URL", defaults.user_base_url),
            call_timeout: Duration::from_millis(timeout_ms),
        }
    }
}

/// The four HTTP clients, sharing one connection pool.
#[derive(Debug, Clone)]
pub struct HttpGateways {
    pub payment: HttpPaymentGateway,
    pub delivery: HttpDeliveryGateway,
    pub product: HttpProductGateway,
    pub user: HttpUserGateway,
}

impl HttpGateways {
    /// Builds the clients from a config. The returned values are cheap to
    /// clone and safe to share across tasks.
    pub fn new(config: GatewayConfig) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(config.call_timeout).build()?;

        Ok(Self {
            payment: HttpPaymentGateway {
                client: client.clone(),
                base_url: config.payment_base_url,
            },
            delivery: HttpDeliveryGateway {
                client: client.clone(),
                base_url: config.delivery_base_url,
            },
            product: HttpProductGateway {
                client: client.clone(),
                base_url: config.product_base_url,
            },
            user: HttpUserGateway {
                client,
                base_url: config.user_base_url,
            },
        })
    }
}

fn request_error(service: &'static str, e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout { service }
    } else {
        GatewayError::Http { service, source: e }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentInfo {
    #[serde(default)]
    card_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignOrderNum<'a> {
    order_num: &'a str,
}

#[derive(Debug, Serialize)]
struct StatusUpdate {
    status: DeliveryStatus,
}

#[derive(Debug, Deserialize)]
struct UserName {
    name: String,
}

/// HTTP client for the payment service.
#[derive(Debug, Clone)]
pub struct HttpPaymentGateway {
    client: Client,
    base_url: String,
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn fetch_card_type(&self, payment_id: PaymentId) -> Result<String> {
        let url = format!("{}/api/payment/{payment_id}", self.base_url);
        let info: PaymentInfo = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| request_error("payment", e))?
            .json()
            .await
            .map_err(|e| request_error("payment", e))?;

        info.card_type.ok_or_else(|| GatewayError::InvalidResponse {
            service: "payment",
            reason: "payment record carries no cardType".to_string(),
        })
    }

    #[tracing::instrument(skip(self))]
    async fn assign_order_number(
        &self,
        payment_id: PaymentId,
        order_number: &OrderNumber,
    ) -> Result<()> {
        let url = format!("{}/api/payment/{payment_id}/order-num", self.base_url);
        self.client
            .put(url)
            .json(&AssignOrderNum {
                order_num: order_number.as_str(),
            })
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| request_error("payment", e))?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_payment(&self, payment_id: PaymentId) -> Result<()> {
        let url = format!("{}/api/payment/{payment_id}", self.base_url);
        self.client
            .delete(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| request_error("payment", e))?;
        Ok(())
    }
}

/// HTTP client for the delivery service.
#[derive(Debug, Clone)]
pub struct HttpDeliveryGateway {
    client: Client,
    base_url: String,
}

#[async_trait]
impl DeliveryGateway for HttpDeliveryGateway {
    async fn fetch_address(&self, address_id: AddressId) -> Result<Address> {
        let url = format!("{}/api/delivery/user/{address_id}", self.base_url);
        self.client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| request_error("delivery", e))?
            .json()
            .await
            .map_err(|e| request_error("delivery", e))
    }

    #[tracing::instrument(skip(self, request), fields(order_item_id = %request.order_item_id))]
    async fn create_delivery(&self, request: DeliveryRequest) -> Result<DeliveryRecord> {
        let url = format!("{}/api/delivery", self.base_url);
        self.client
            .post(url)
            .json(&request)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| request_error("delivery", e))?
            .json()
            .await
            .map_err(|e| request_error("delivery", e))
    }

    #[tracing::instrument(skip(self))]
    async fn update_delivery_status(
        &self,
        delivery_id: i64,
        status: DeliveryStatus,
    ) -> Result<DeliveryRecord> {
        let url = format!("{}/api/delivery/{delivery_id}/status", self.base_url);
        self.client
            .put(url)
            .json(&StatusUpdate { status })
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| request_error("delivery", e))?
            .json()
            .await
            .map_err(|e| request_error("delivery", e))
    }

    async fn find_delivery_for_item(
        &self,
        order_item_id: OrderItemId,
    ) -> Result<Option<DeliveryRecord>> {
        let url = format!("{}/api/delivery/order-item/{order_item_id}", self.base_url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| request_error("delivery", e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let record = response
            .error_for_status()
            .map_err(|e| request_error("delivery", e))?
            .json()
            .await
            .map_err(|e| request_error("delivery", e))?;
        Ok(Some(record))
    }

    #[tracing::instrument(skip(self))]
    async fn delete_address(&self, address_id: AddressId) -> Result<()> {
        let url = format!("{}/api/delivery/user/{address_id}", self.base_url);
        self.client
            .delete(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| request_error("delivery", e))?;
        Ok(())
    }
}

/// HTTP client for the product service.
#[derive(Debug, Clone)]
pub struct HttpProductGateway {
    client: Client,
    base_url: String,
}

#[async_trait]
impl ProductGateway for HttpProductGateway {
    async fn fetch_product(&self, product_id: ProductId) -> Result<Product> {
        let url = format!("{}/api/products/{product_id}", self.base_url);
        self.client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| request_error("product", e))?
            .json()
            .await
            .map_err(|e| request_error("product", e))
    }
}

/// HTTP client for the user service.
#[derive(Debug, Clone)]
pub struct HttpUserGateway {
    client: Client,
    base_url: String,
}

#[async_trait]
impl UserGateway for HttpUserGateway {
    async fn fetch_display_name(&self, user_id: UserId) -> Result<String> {
        let url = format!("{}/api/users/{user_id}", self.base_url);
        let user: UserName = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| request_error("user", e))?
            .json()
            .await
            .map_err(|e| request_error("user", e))?;
        Ok(user.name)
    }

    async fn fetch_company_name(&self, user_id: UserId) -> Result<String> {
        let url = format!("{}/api/users/{user_id}/company-name", self.base_url);
        self.client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| request_error("user", e))?
            .text()
            .await
            .map_err(|e| request_error("user", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_local_services() {
        let config = GatewayConfig::default();
        assert_eq!(config.payment_base_url, "http://localhost:10400");
        assert_eq!(config.delivery_base_url, "http://localhost:10500");
        assert_eq!(config.product_base_url, "http://localhost:10100");
        assert_eq!(config.user_base_url, "http://localhost:10000");
        assert_eq!(config.call_timeout, Duration::from_millis(3_000));
    }

    #[test]
    fn clients_build_from_default_config() {
        assert!(HttpGateways::new(GatewayConfig::default()).is_ok());
    }

    #[test]
    fn assign_order_num_wire_shape() {
        let body = AssignOrderNum {
            order_num: "202406130001",
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"orderNum":"202406130001"}"#
        );
    }
}
