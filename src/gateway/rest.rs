use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::client::{decode, unwrap_envelope, ApiClient};
use super::error::{GatewayError, GatewayResult};
use super::{ListQuery, Page, ResourceGateway};
use crate::resource::Resource;

/// REST gateway for one resource kind.
///
/// Uses `GET {path}` with query parameters for lists, `GET {path}/{id}`,
/// `POST {path}`, `PUT {path}/{id}` and `DELETE {path}/{id}`.
pub struct RestGateway<R> {
    client: ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> RestGateway<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    fn item_path(id: &str) -> String {
        format!("{}/{}", R::KIND.path(), id)
    }
}

#[async_trait]
impl<R: Resource> ResourceGateway<R> for RestGateway<R> {
    async fn list(&self, query: &ListQuery<R::Filter>) -> GatewayResult<Page<R>> {
        let value = self.client.get(R::KIND.path(), &query.to_pairs()).await?;
        let page = decode_list(value, query.page, query.page_size)?;
        tracing::debug!(
            kind = R::KIND.label(),
            items = page.items.len(),
            total = page.total,
            "Listed resources"
        );
        Ok(page)
    }

    async fn get_one(&self, id: &str) -> GatewayResult<R> {
        let value = self.client.get(&Self::item_path(id), &[]).await?;
        decode(value)
    }

    async fn create(&self, draft: &R::Draft) -> GatewayResult<R> {
        let value = self.client.post(R::KIND.path(), Some(draft)).await?;
        decode(value)
    }

    async fn update(&self, id: &str, patch: &R::Patch) -> GatewayResult<R> {
        let value = self.client.put(&Self::item_path(id), patch).await?;
        decode(value)
    }

    async fn delete(&self, id: &str) -> GatewayResult<()> {
        self.client.delete(&Self::item_path(id)).await?;
        Ok(())
    }
}

/// Decode any of the list shapes the backend produces:
///
/// - `{data: [...], total, page, pageSize}`
/// - `{data: <one of the shapes below>, message, code}`
/// - `{items: [...], total, page, pageSize, totalPages}`
/// - a bare array, whose length is the total
pub(crate) fn decode_list<R: DeserializeOwned>(
    value: Value,
    requested_page: u32,
    requested_page_size: u32,
) -> GatewayResult<Page<R>> {
    let (list, meta) = match value {
        Value::Object(mut map) if map.get("data").is_some_and(Value::is_array) && map.contains_key("total") => {
            let data = map.remove("data").unwrap_or(Value::Null);
            (data, Value::Object(map))
        }
        other => match unwrap_envelope(other) {
            Value::Object(mut map) if map.contains_key("items") => {
                let items = map.remove("items").unwrap_or(Value::Null);
                (items, Value::Object(map))
            }
            bare => (bare, Value::Null),
        },
    };

    let items: Vec<R> = match list {
        Value::Array(_) => {
            serde_json::from_value(list).map_err(|e| GatewayError::Decode(e.to_string()))?
        }
        other => {
            return Err(GatewayError::Decode(format!(
                "expected a list payload, got {}",
                json_kind(&other)
            )))
        }
    };

    let total = meta
        .get("total")
        .and_then(Value::as_u64)
        .unwrap_or(items.len() as u64);
    let page = meta
        .get("page")
        .and_then(Value::as_u64)
        .and_then(|p| u32::try_from(p).ok())
        .unwrap_or(requested_page);
    let page_size = meta
        .get("pageSize")
        .and_then(Value::as_u64)
        .and_then(|p| u32::try_from(p).ok())
        .unwrap_or(requested_page_size);

    Ok(Page {
        items,
        total,
        page,
        page_size,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        id: String,
    }

    #[test]
    fn bare_array_total_is_length() {
        let page: Page<Row> = decode_list(json!([{ "id": "a" }, { "id": "b" }]), 1, 10).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 2);
        assert_eq!((page.page, page.page_size), (1, 10));
    }

    #[test]
    fn paginated_object() {
        let value = json!({
            "items": [{ "id": "a" }],
            "total": 31, "page": 4, "pageSize": 10, "totalPages": 4
        });
        let page: Page<Row> = decode_list(value, 1, 10).unwrap();
        assert_eq!(page.total, 31);
        assert_eq!(page.page, 4);
    }

    #[test]
    fn enveloped_paginated_object() {
        let value = json!({
            "data": { "items": [{ "id": "a" }], "total": 7, "page": 1, "pageSize": 5 },
            "message": "ok", "code": 200
        });
        let page: Page<Row> = decode_list(value, 1, 10).unwrap();
        assert_eq!(page.total, 7);
        assert_eq!(page.page_size, 5);
    }

    #[test]
    fn enveloped_array() {
        let value = json!({ "data": [{ "id": "a" }], "message": "ok", "code": 200 });
        let page: Page<Row> = decode_list(value, 2, 10).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.page, 2);
    }

    #[test]
    fn data_list_with_total() {
        let value = json!({ "data": [{ "id": "a" }], "total": 12, "page": 2, "pageSize": 1 });
        let page: Page<Row> = decode_list(value, 1, 10).unwrap();
        assert_eq!(page.items, vec![Row { id: "a".to_string() }]);
        assert_eq!(page.total, 12);
    }

    #[test]
    fn rejects_non_list_payload() {
        let err = decode_list::<Row>(json!({ "id": "a" }), 1, 10).unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }
}
