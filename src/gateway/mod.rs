//! Asynchronous access to server resources.
//!
//! [`ResourceGateway`] is the seam between effect runners and the network:
//! `RestGateway` talks to the backend over HTTP, `InMemoryGateway` keeps
//! records locally for offline use and tests.

pub mod auth;
mod client;
mod error;
mod memory;
mod rest;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::resource::Resource;

pub use auth::{AuthGateway, AuthResponse, LoginRequest, RestAuthGateway, SignupRequest};
pub use client::{build_auth_header, decode, unwrap_envelope, ApiClient, AuthHeader, BearerSource};
pub use error::{GatewayError, GatewayResult, StatusClass};
pub use memory::{InMemoryGateway, LocalRecord, LIST_QUERY_HISTORY};
pub use rest::RestGateway;

/// List request: filter criteria plus the page to fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery<F> {
    pub criteria: F,
    pub page: u32,
    pub page_size: u32,
}

impl<F: Serialize> ListQuery<F> {
    pub fn new(criteria: F, page: u32, page_size: u32) -> Self {
        Self {
            criteria,
            page,
            page_size,
        }
    }

    /// Query-string pairs: every set filter field followed by the page.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = match serde_json::to_value(&self.criteria) {
            Ok(Value::Object(map)) => map
                .into_iter()
                .filter_map(|(key, value)| query_value(value).map(|v| (key, v)))
                .collect(),
            Ok(_) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Filter criteria could not be serialized");
                Vec::new()
            }
        };
        pairs.push(("page".to_string(), self.page.to_string()));
        pairs.push(("pageSize".to_string(), self.page_size.to_string()));
        pairs
    }
}

fn query_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Array(values) => {
            let joined: Vec<String> = values.into_iter().filter_map(query_value).collect();
            Some(joined.join(","))
        }
        other => Some(other.to_string()),
    }
}

/// One page of a list response.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<R> {
    pub items: Vec<R>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

/// Async access to one resource kind.
#[async_trait]
pub trait ResourceGateway<R: Resource>: Send + Sync + 'static {
    async fn list(&self, query: &ListQuery<R::Filter>) -> GatewayResult<Page<R>>;

    async fn get_one(&self, id: &str) -> GatewayResult<R>;

    async fn create(&self, draft: &R::Draft) -> GatewayResult<R>;

    async fn update(&self, id: &str, patch: &R::Patch) -> GatewayResult<R>;

    async fn delete(&self, id: &str) -> GatewayResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AccountFilter, AccountType, TransactionFilter};
    use rust_decimal::Decimal;

    #[test]
    fn query_pairs_skip_unset_fields() {
        let query = ListQuery::new(
            AccountFilter {
                account_type: Some(AccountType::Bank),
                is_active: Some(true),
                search_text: None,
            },
            2,
            20,
        );
        let mut pairs = query.to_pairs();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("isActive".to_string(), "true".to_string()),
                ("page".to_string(), "2".to_string()),
                ("pageSize".to_string(), "20".to_string()),
                ("type".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn decimal_amounts_become_plain_numbers() {
        let query = ListQuery::new(
            TransactionFilter {
                min_amount: Some(Decimal::from(1000)),
                ..Default::default()
            },
            1,
            10,
        );
        let pairs = query.to_pairs();
        assert!(pairs.contains(&("minAmount".to_string(), "1000.0".to_string())));
    }
}
