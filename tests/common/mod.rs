//! Shared test utilities and mock infrastructure.

#![allow(dead_code, unused_imports)]

pub mod mock_backend;

use chrono::Utc;
use expense_flow::config::{ApiConfig, Config};
use expense_flow::gateway::ApiClient;
use expense_flow::model::{Category, CategoryType, Transaction, TransactionStatus, TransactionType, User};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Config pointing at `base_url` with short timeouts.
pub fn test_config(base_url: &str) -> Config {
    Config {
        api: ApiConfig {
            base_url: base_url.to_string(),
            timeout_seconds: 5,
            connect_timeout_seconds: 2,
        },
        ..Config::default()
    }
}

/// Write `content` to a config file in a fresh temp dir.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}

pub fn client(base_url: &str) -> ApiClient {
    ApiClient::new(&test_config(base_url).api).expect("Failed to build client")
}

pub fn user() -> User {
    User {
        id: "u1".to_string(),
        email: "an@example.com".to_string(),
        full_name: "Nguyen An".to_string(),
        avatar: None,
        created_at: None,
        updated_at: None,
    }
}

pub fn user_json() -> Value {
    json!({
        "id": "u1",
        "email": "an@example.com",
        "fullName": "Nguyen An"
    })
}

pub fn transaction_json(id: &str, description: &str, amount: i64, kind: &str) -> Value {
    json!({
        "id": id,
        "userId": "u1",
        "accountId": "a1",
        "categoryId": "c1",
        "type": kind,
        "amount": amount,
        "description": description,
        "date": "2024-03-05T00:00:00Z",
        "status": "COMPLETED",
        "tags": [],
        "createdAt": "2024-03-05T08:00:00Z",
        "updatedAt": "2024-03-05T08:00:00Z"
    })
}

pub fn category(id: &str, name: &str, category_type: CategoryType) -> Category {
    Category {
        id: id.to_string(),
        user_id: "u1".to_string(),
        name: name.to_string(),
        category_type,
        icon: None,
        color: None,
        description: None,
        is_default: false,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn transaction(id: &str, kind: TransactionType, amount: i64, category_id: &str) -> Transaction {
    Transaction {
        id: id.to_string(),
        user_id: "u1".to_string(),
        account_id: "a1".to_string(),
        category_id: category_id.to_string(),
        transaction_type: kind,
        amount: Decimal::from(amount),
        description: id.to_string(),
        date: Utc::now(),
        status: TransactionStatus::Completed,
        notes: None,
        tags: Vec::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Poll `check` until it holds or `timeout` passes.
pub async fn wait_until(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let start = std::time::Instant::now();
    while start.elapsed() < timeout {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
