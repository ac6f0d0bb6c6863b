//! User service gateway trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use common::UserId;

use crate::error::{GatewayError, Result};

/// Trait for user/account service lookups.
///
/// Both calls are read-enrichment; callers substitute fallbacks on failure.
#[async_trait]
pub trait UserGateway: Send + Sync {
    /// Fetches a user's display name.
    async fn fetch_display_name(&self, user_id: UserId) -> Result<String>;

    /// Fetches a seller's registered company name.
    async fn fetch_company_name(&self, user_id: UserId) -> Result<String>;
}

#[derive(Debug, Default)]
struct InMemoryUserState {
    display_names: HashMap<UserId, String>,
    company_names: HashMap<UserId, String>,
    fail_on_fetch: bool,
}

/// In-memory user gateway for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserGateway {
    state: Arc<RwLock<InMemoryUserState>>,
}

impl InMemoryUserGateway {
    /// Creates a new in-memory user gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a display name.
    pub fn set_display_name(&self, user_id: UserId, name: impl Into<String>) {
        self.state
            .write()
            .unwrap()
            .display_names
            .insert(user_id, name.into());
    }

    /// Registers a company name.
    pub fn set_company_name(&self, user_id: UserId, name: impl Into<String>) {
        self.state
            .write()
            .unwrap()
            .company_names
            .insert(user_id, name.into());
    }

    /// Configures the next lookups to fail.
    pub fn set_fail_on_fetch(&self, fail: bool) {
        self.state.write().unwrap().fail_on_fetch = fail;
    }
}

#[async_trait]
impl UserGateway for InMemoryUserGateway {
    async fn fetch_display_name(&self, user_id: UserId) -> Result<String> {
        let state = self.state.read().unwrap();
        if state.fail_on_fetch {
            return Err(GatewayError::Rejected {
                service: "user",
                reason: "injected fetch failure".to_string(),
            });
        }
        state
            .display_names
            .get(&user_id)
            .cloned()
            .ok_or_else(|| GatewayError::InvalidResponse {
                service: "user",
                reason: format!("no user record for {user_id}"),
            })
    }

    async fn fetch_company_name(&self, user_id: UserId) -> Result<String> {
        let state = self.state.read().unwrap();
        if state.fail_on_fetch {
            return Err(GatewayError::Rejected {
                service: "user",
                reason: "injected fetch failure".to_string(),
            });
        }
        state
            .company_names
            .get(&user_id)
            .cloned()
            .ok_or_else(|| GatewayError::InvalidResponse {
                service: "user",
                reason: format!("no company record for {user_id}"),
            })
    }
}
