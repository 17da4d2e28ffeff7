// Copyright (c) 2025 Smartbill.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Closed set of ledger categories. The wire contract with the model uses
/// the Chinese labels; the CLI and database use the ASCII keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Shopping,
    Transport,
    Entertainment,
    Housing,
    Health,
    Education,
    Income,
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Food,
        Category::Shopping,
        Category::Transport,
        Category::Entertainment,
        Category::Housing,
        Category::Health,
        Category::Education,
        Category::Income,
        Category::Other,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Shopping => "shopping",
            Category::Transport => "transport",
            Category::Entertainment => "entertainment",
            Category::Housing => "housing",
            Category::Health => "health",
            Category::Education => "education",
            Category::Income => "income",
            Category::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Food => "餐饮",
            Category::Shopping => "购物",
            Category::Transport => "交通",
            Category::Entertainment => "娱乐",
            Category::Housing => "住房",
            Category::Health => "医疗",
            Category::Education => "教育",
            Category::Income => "收入",
            Category::Other => "其他",
        }
    }

    /// Exact key/label lookup, for CLI args and rows read back from the DB.
    /// Loose model output goes through `category::normalize` instead.
    pub fn from_key(s: &str) -> Option<Category> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.key() == s || c.label() == s)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A committed ledger entry. `amount` is always non-negative; direction is
/// implied by `category == Income`. Entries with `need_confirmation` set are
/// excluded from every aggregate until confirmed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category: Category,
    pub merchant: String,
    pub is_auto_imported: bool,
    pub need_confirmation: bool,
}

/// A ledger entry before it has an id, as produced by manual entry, the
/// reconciler, or the CSV importer.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category: Category,
    pub merchant: String,
    pub is_auto_imported: bool,
    pub need_confirmation: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of the conversation transcript. The stored list is an append-only
/// audit log and is never truncated; only the slice fed back to the model is
/// bounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extracted: Vec<RawCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibe_check: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_color: Option<String>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::User,
            text: text.into(),
            extracted: Vec::new(),
            vibe_check: None,
            mood_color: None,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::Assistant,
            text: text.into(),
            extracted: Vec::new(),
            vibe_check: None,
            mood_color: None,
        }
    }
}

/// An unvalidated transaction candidate exactly as the model emitted it.
/// Every field is optional at this boundary; `amount` stays a raw JSON value
/// because models send numbers and numeric strings interchangeably.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCandidate {
    #[serde(default)]
    pub amount: serde_json::Value,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub merchant: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub is_income: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Persona {
    #[serde(default)]
    pub vibe_check: String,
    #[serde(default)]
    pub mood_color: String,
}

/// The three-field response contract every downstream consumer relies on:
/// a conversational reply, zero or more extracted candidates, a mood tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelReply {
    #[serde(default)]
    pub chat_response: String,
    #[serde(default)]
    pub transactions: Vec<RawCandidate>,
    #[serde(default)]
    pub ai_persona: Persona,
}

impl ModelReply {
    /// A reply with no extracted transactions, used by every gateway
    /// fallback path.
    pub fn plain(text: impl Into<String>, vibe: &str, color: &str) -> Self {
        ModelReply {
            chat_response: text.into(),
            transactions: Vec::new(),
            ai_persona: Persona {
                vibe_check: vibe.to_string(),
                mood_color: color.to_string(),
            },
        }
    }
}
