use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::account::contains_ignore_case;
use super::{timestamp, UnknownCode};
use crate::gateway::LocalRecord;
use crate::resource::{Resource, ResourceKind};

/// Whether a category classifies income or expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CategoryType {
    Income,
    Expense,
}

impl CategoryType {
    pub fn label(&self) -> &'static str {
        match self {
            CategoryType::Income => "Income",
            CategoryType::Expense => "Expense",
        }
    }
}

impl TryFrom<u8> for CategoryType {
    type Error = UnknownCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(CategoryType::Income),
            2 => Ok(CategoryType::Expense),
            other => Err(UnknownCode {
                kind: "category type",
                code: other.to_string(),
            }),
        }
    }
}

impl From<CategoryType> for u8 {
    fn from(value: CategoryType) -> Self {
        match value {
            CategoryType::Income => 1,
            CategoryType::Expense => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Seeded by the server for every new user.
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
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
pub struct CategoryDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub category_type: Option<CategoryType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryFilter {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub category_type: Option<CategoryType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
}

impl Resource for Category {
    type Draft = CategoryDraft;
    type Patch = CategoryPatch;
    type Filter = CategoryFilter;

    const KIND: ResourceKind = ResourceKind::Category;

    fn id(&self) -> &str {
        &self.id
    }
}

impl LocalRecord for Category {
    fn from_draft(id: String, user_id: &str, draft: &CategoryDraft, now: DateTime<Utc>) -> Self {
        Category {
            id,
            user_id: user_id.to_string(),
            name: draft.name.clone(),
            category_type: draft.category_type,
            icon: draft.icon.clone(),
            color: draft.color.clone(),
            description: draft.description.clone(),
            is_default: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &CategoryPatch, now: DateTime<Utc>) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(category_type) = patch.category_type {
            self.category_type = category_type;
        }
        if patch.icon.is_some() {
            self.icon = patch.icon.clone();
        }
        if patch.color.is_some() {
            self.color = patch.color.clone();
        }
        if patch.description.is_some() {
            self.description = patch.description.clone();
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now;
    }

    fn matches(&self, filter: &CategoryFilter) -> bool {
        filter.category_type.is_none_or(|t| self.category_type == t)
            && filter.is_active.is_none_or(|active| self.is_active == active)
            && filter
                .search_text
                .as_deref()
                .is_none_or(|text| contains_ignore_case(&self.name, text))
    }
}
