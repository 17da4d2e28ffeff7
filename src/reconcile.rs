// Copyright (c) 2025 Smartbill.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::category;
use crate::models::{ModelReply, NewTransaction};

pub const FALLBACK_MERCHANT: &str = "未知";

#[derive(Debug, Clone, Default)]
pub struct Outcome {
    /// Entries committed to the ledger; malformed candidates are dropped
    /// without being counted.
    pub added: usize,
}

/// Coerce a raw candidate amount (JSON number or numeric string) to a
/// decimal. Anything unparseable or non-finite collapses to zero, which the
/// reconciler then rejects.
pub fn sanitize_amount(raw: &serde_json::Value) -> Decimal {
    match raw {
        serde_json::Value::Number(n) => n
            .as_f64()
            .and_then(|f| Decimal::try_from(f).ok())
            .unwrap_or(Decimal::ZERO),
        serde_json::Value::String(s) => s.trim().parse::<Decimal>().unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

/// Commit the model's extracted candidates to the ledger, in the order they
/// were received.
///
/// Per candidate: the amount is sanitized and must be strictly positive or
/// the candidate is skipped; the category label is normalized and then
/// reconciled against the explicit income flag; merchant and date fall back
/// to a placeholder and `today`. Entries from this path are trusted
/// immediately (`need_confirmation = false`, unlike the passive importer).
/// No deduplication: repeated submissions are distinct events.
///
/// Malformed candidates never fail the batch; the only error source is the
/// `append` sink itself.
pub fn apply(
    reply: &ModelReply,
    today: NaiveDate,
    mut append: impl FnMut(NewTransaction) -> Result<()>,
) -> Result<Outcome> {
    let mut outcome = Outcome::default();
    for candidate in &reply.transactions {
        let amount = sanitize_amount(&candidate.amount);
        if amount <= Decimal::ZERO {
            continue;
        }

        let is_income = candidate.is_income == Some(true);
        let normalized = category::normalize(candidate.category.as_deref().unwrap_or(""));
        let cat = category::reconcile_income_flag(normalized, is_income);

        let date = candidate
            .date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .unwrap_or(today);

        let merchant = candidate
            .merchant
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_MERCHANT.to_string());

        append(NewTransaction {
            date,
            amount,
            category: cat,
            merchant,
            is_auto_imported: false,
            need_confirmation: false,
        })?;
        outcome.added += 1;
    }
    Ok(outcome)
}
