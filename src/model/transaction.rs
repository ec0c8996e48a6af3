use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::account::contains_ignore_case;
use super::{timestamp, UnknownCode};
use crate::gateway::LocalRecord;
use crate::resource::{Resource, ResourceKind};

/// Direction of money flow.
///
/// Serialized as `"INCOME"` / `"EXPENSE"`. Older endpoints send the
/// integer codes 1 and 2, which are accepted too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INCOME" | "1" => Ok(TransactionType::Income),
            "EXPENSE" | "2" => Ok(TransactionType::Expense),
            _ => Err(UnknownCode {
                kind: "transaction type",
                code: s.to_string(),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for TransactionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Code(u8),
        }

        let raw = match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text,
            Raw::Code(code) => code.to_string(),
        };
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    #[default]
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub account_id: String,
    pub category_id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    pub category_id: String,
    pub account_id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub description: String,
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<TransactionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<TransactionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<Decimal>,
}

impl Resource for Transaction {
    type Draft = TransactionDraft;
    type Patch = TransactionPatch;
    type Filter = TransactionFilter;

    const KIND: ResourceKind = ResourceKind::Transaction;

    fn id(&self) -> &str {
        &self.id
    }
}

impl LocalRecord for Transaction {
    fn from_draft(id: String, user_id: &str, draft: &TransactionDraft, now: DateTime<Utc>) -> Self {
        Transaction {
            id,
            user_id: user_id.to_string(),
            account_id: draft.account_id.clone(),
            category_id: draft.category_id.clone(),
            transaction_type: draft.transaction_type,
            amount: draft.amount,
            description: draft.description.clone(),
            date: draft.date,
            status: TransactionStatus::Completed,
            notes: draft.notes.clone(),
            tags: draft.tags.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &TransactionPatch, now: DateTime<Utc>) {
        if let Some(category_id) = &patch.category_id {
            self.category_id = category_id.clone();
        }
        if let Some(account_id) = &patch.account_id {
            self.account_id = account_id.clone();
        }
        if let Some(transaction_type) = patch.transaction_type {
            self.transaction_type = transaction_type;
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if patch.notes.is_some() {
            self.notes = patch.notes.clone();
        }
        if let Some(tags) = &patch.tags {
            self.tags = tags.clone();
        }
        self.updated_at = now;
    }

    fn matches(&self, filter: &TransactionFilter) -> bool {
        let day = self.date.date_naive();
        filter.start_date.is_none_or(|start| day >= start)
            && filter.end_date.is_none_or(|end| day <= end)
            && filter
                .category_id
                .as_deref()
                .is_none_or(|id| self.category_id == id)
            && filter
                .account_id
                .as_deref()
                .is_none_or(|id| self.account_id == id)
            && filter
                .transaction_type
                .is_none_or(|t| self.transaction_type == t)
            && filter.status.is_none_or(|s| self.status == s)
            && filter.min_amount.is_none_or(|min| self.amount >= min)
            && filter.max_amount.is_none_or(|max| self.amount <= max)
            && filter.search_text.as_deref().is_none_or(|text| {
                contains_ignore_case(&self.description, text)
                    || self
                        .notes
                        .as_deref()
                        .is_some_and(|notes| contains_ignore_case(notes, text))
            })
    }
}
