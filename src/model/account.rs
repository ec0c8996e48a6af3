use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{timestamp, UnknownCode};
use crate::gateway::LocalRecord;
use crate::resource::{Resource, ResourceKind};

/// Kind of money holder. Encoded as an integer on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AccountType {
    Cash,
    Bank,
    CreditCard,
    DigitalWallet,
    Investment,
}

impl AccountType {
    pub fn label(&self) -> &'static str {
        match self {
            AccountType::Cash => "Cash",
            AccountType::Bank => "Bank",
            AccountType::CreditCard => "Credit card",
            AccountType::DigitalWallet => "Digital wallet",
            AccountType::Investment => "Investment",
        }
    }
}

impl TryFrom<u8> for AccountType {
    type Error = UnknownCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(AccountType::Cash),
            2 => Ok(AccountType::Bank),
            3 => Ok(AccountType::CreditCard),
            4 => Ok(AccountType::DigitalWallet),
            5 => Ok(AccountType::Investment),
            other => Err(UnknownCode {
                kind: "account type",
                code: other.to_string(),
            }),
        }
    }
}

impl From<AccountType> for u8 {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Cash => 1,
            AccountType::Bank => 2,
            AccountType::CreditCard => 3,
            AccountType::DigitalWallet => 4,
            AccountType::Investment => 5,
        }
    }
}

/// A wallet, bank account or other money holder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub balance: Decimal,
    #[serde(default)]
    pub initial_balance: Decimal,
    pub currency: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub initial_balance: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub account_type: Option<AccountType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub account_type: Option<AccountType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
}

impl Resource for Account {
    type Draft = AccountDraft;
    type Patch = AccountPatch;
    type Filter = AccountFilter;

    const KIND: ResourceKind = ResourceKind::Account;

    fn id(&self) -> &str {
        &self.id
    }
}

impl LocalRecord for Account {
    fn from_draft(id: String, user_id: &str, draft: &AccountDraft, now: DateTime<Utc>) -> Self {
        Account {
            id,
            user_id: user_id.to_string(),
            name: draft.name.clone(),
            account_type: draft.account_type,
            balance: draft.initial_balance,
            initial_balance: draft.initial_balance,
            currency: draft.currency.clone().unwrap_or_else(|| "VND".to_string()),
            is_active: true,
            color: draft.color.clone(),
            icon: draft.icon.clone(),
            description: draft.description.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &AccountPatch, now: DateTime<Utc>) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(account_type) = patch.account_type {
            self.account_type = account_type;
        }
        if let Some(balance) = patch.balance {
            self.balance = balance;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        if patch.color.is_some() {
            self.color = patch.color.clone();
        }
        if patch.icon.is_some() {
            self.icon = patch.icon.clone();
        }
        if patch.description.is_some() {
            self.description = patch.description.clone();
        }
        self.updated_at = now;
    }

    fn matches(&self, filter: &AccountFilter) -> bool {
        filter.is_active.is_none_or(|active| self.is_active == active)
            && filter.account_type.is_none_or(|t| self.account_type == t)
            && filter
                .search_text
                .as_deref()
                .is_none_or(|text| contains_ignore_case(&self.name, text))
    }
}

pub(super) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
