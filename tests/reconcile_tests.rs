// Copyright (c) 2025 Smartbill.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;
use smartbill::models::{Category, ModelReply, NewTransaction, RawCandidate};
use smartbill::reconcile::{apply, sanitize_amount, FALLBACK_MERCHANT};

fn today() -> NaiveDate {
    NaiveDate::parse_from_str("2025-08-25", "%Y-%m-%d").unwrap()
}

fn candidate(amount: serde_json::Value) -> RawCandidate {
    RawCandidate {
        amount,
        category: Some("餐饮".into()),
        merchant: Some("x".into()),
        date: Some("2024-01-01".into()),
        is_income: None,
    }
}

fn reply_with(candidates: Vec<RawCandidate>) -> ModelReply {
    ModelReply {
        chat_response: "ok".into(),
        transactions: candidates,
        ai_persona: Default::default(),
    }
}

fn collect(reply: &ModelReply) -> (usize, Vec<NewTransaction>) {
    let mut out = Vec::new();
    let outcome = apply(reply, today(), |t| {
        out.push(t);
        Ok(())
    })
    .unwrap();
    (outcome.added, out)
}

#[test]
fn sanitize_accepts_numbers_and_numeric_strings() {
    assert_eq!(sanitize_amount(&json!(35)), Decimal::from(35));
    assert_eq!(sanitize_amount(&json!(12.5)), "12.5".parse().unwrap());
    assert_eq!(sanitize_amount(&json!("88.20")), "88.20".parse().unwrap());
    assert_eq!(sanitize_amount(&json!(" 7 ")), Decimal::from(7));
}

#[test]
fn sanitize_collapses_garbage_to_zero() {
    assert_eq!(sanitize_amount(&json!("abc")), Decimal::ZERO);
    assert_eq!(sanitize_amount(&json!(null)), Decimal::ZERO);
    assert_eq!(sanitize_amount(&json!({"v": 1})), Decimal::ZERO);
    assert_eq!(sanitize_amount(&json!([35])), Decimal::ZERO);
    assert_eq!(sanitize_amount(&serde_json::Value::default()), Decimal::ZERO);
}

#[test]
fn lunch_extraction_lands_as_trusted_food_entry() {
    // "午饭花了35" => one candidate, amount 35, category 餐饮
    let mut c = candidate(json!(35));
    c.date = None;
    let (added, txns) = collect(&reply_with(vec![c]));
    assert_eq!(added, 1);
    assert_eq!(txns[0].amount, Decimal::from(35));
    assert_eq!(txns[0].category, Category::Food);
    assert_eq!(txns[0].date, today());
    assert!(!txns[0].need_confirmation);
    assert!(!txns[0].is_auto_imported);
}

#[test]
fn salary_with_income_flag_forces_income_category() {
    // "发工资了5000" with is_income: the category label may be sloppy,
    // the flag still wins
    let c = RawCandidate {
        amount: json!(5000),
        category: Some("工资".into()),
        merchant: Some("公司".into()),
        date: None,
        is_income: Some(true),
    };
    let (added, txns) = collect(&reply_with(vec![c]));
    assert_eq!(added, 1);
    assert_eq!(txns[0].category, Category::Income);

    // And a mislabeled income category without the flag is downgraded
    let c = RawCandidate {
        amount: json!(100),
        category: Some("收入".into()),
        merchant: None,
        date: None,
        is_income: Some(false),
    };
    let (_, txns) = collect(&reply_with(vec![c]));
    assert_eq!(txns[0].category, Category::Other);
}

#[test]
fn non_numeric_amount_is_dropped_not_fatal() {
    // {"amount":"abc", ...} appends nothing
    let (added, txns) = collect(&reply_with(vec![candidate(json!("abc"))]));
    assert_eq!(added, 0);
    assert!(txns.is_empty());
}

#[test]
fn zero_and_negative_amounts_never_create_entries() {
    let batch = vec![
        candidate(json!(0)),
        candidate(json!(-15)),
        candidate(json!("-3.5")),
        candidate(json!(20)),
    ];
    let (added, txns) = collect(&reply_with(batch));
    assert_eq!(added, 1);
    assert_eq!(txns[0].amount, Decimal::from(20));
}

#[test]
fn defaults_for_missing_merchant_and_date() {
    let c = RawCandidate {
        amount: json!(9),
        category: None,
        merchant: Some("   ".into()),
        date: Some("not-a-date".into()),
        is_income: None,
    };
    let (_, txns) = collect(&reply_with(vec![c]));
    assert_eq!(txns[0].merchant, FALLBACK_MERCHANT);
    assert_eq!(txns[0].date, today());
    assert_eq!(txns[0].category, Category::Other);
}

#[test]
fn batch_order_preserved_and_duplicates_accepted() {
    let batch = vec![candidate(json!(10)), candidate(json!(10)), candidate(json!(30))];
    let (added, txns) = collect(&reply_with(batch));
    assert_eq!(added, 3);
    let amounts: Vec<Decimal> = txns.iter().map(|t| t.amount).collect();
    assert_eq!(
        amounts,
        vec![Decimal::from(10), Decimal::from(10), Decimal::from(30)]
    );
}

#[test]
fn empty_transaction_array_is_a_clean_noop() {
    let (added, txns) = collect(&reply_with(vec![]));
    assert_eq!(added, 0);
    assert!(txns.is_empty());
}
