// Copyright (c) 2025 Smartbill.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use serde_json::json;
use smartbill::context::build_context;
use smartbill::db::init_schema;
use smartbill::models::{Category, ModelReply, NewTransaction, RawCandidate};
use smartbill::utils::{
    decimal_or_zero, get_monthly_budget, insert_transaction, load_ledger, set_setting,
};

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    init_schema(&mut conn).unwrap();
    conn
}

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn entry(date: &str, amount: &str, category: Category, pending: bool) -> NewTransaction {
    NewTransaction {
        date: d(date),
        amount: amount.parse().unwrap(),
        category,
        merchant: "测试".into(),
        is_auto_imported: pending,
        need_confirmation: pending,
    }
}

#[test]
fn ledger_loads_newest_first() {
    let conn = setup();
    insert_transaction(&conn, &entry("2025-08-01", "10", Category::Food, false)).unwrap();
    insert_transaction(&conn, &entry("2025-07-01", "20", Category::Food, false)).unwrap();
    let ledger = load_ledger(&conn).unwrap();
    assert_eq!(ledger.len(), 2);
    // Insertion order, not date order
    assert_eq!(ledger[0].date, d("2025-07-01"));
    assert_eq!(ledger[1].date, d("2025-08-01"));
}

#[test]
fn reconciled_entries_flow_into_aggregates() {
    let conn = setup();
    let reply = ModelReply {
        chat_response: "记好了".into(),
        transactions: vec![RawCandidate {
            amount: json!(35),
            category: Some("餐饮".into()),
            merchant: Some("食堂".into()),
            date: Some("2025-08-25".into()),
            is_income: None,
        }],
        ai_persona: Default::default(),
    };
    let outcome = smartbill::reconcile::apply(&reply, d("2025-08-25"), |t| {
        insert_transaction(&conn, &t).map(|_| ())
    })
    .unwrap();
    assert_eq!(outcome.added, 1);

    let ledger = load_ledger(&conn).unwrap();
    let ctx = build_context(&ledger, Decimal::from(3000), d("2025-08-25"));
    assert_eq!(ctx.month_expense, Decimal::from(35));
    assert_eq!(ctx.today_expense, Decimal::from(35));
}

#[test]
fn pending_imports_need_confirmation_before_counting() {
    let conn = setup();
    let id = insert_transaction(&conn, &entry("2025-08-25", "45", Category::Food, true)).unwrap();
    insert_transaction(&conn, &entry("2025-08-25", "12", Category::Transport, true)).unwrap();

    let ledger = load_ledger(&conn).unwrap();
    let ctx = build_context(&ledger, Decimal::from(3000), d("2025-08-25"));
    assert_eq!(ctx.month_expense, Decimal::ZERO);
    assert_eq!(ctx.recent_lines.len(), 2); // pending still visible

    conn.execute(
        "UPDATE transactions SET need_confirmation=0 WHERE id=?1",
        params![id],
    )
    .unwrap();
    let ledger = load_ledger(&conn).unwrap();
    let ctx = build_context(&ledger, Decimal::from(3000), d("2025-08-25"));
    assert_eq!(ctx.month_expense, Decimal::from(45));
}

#[test]
fn budget_setting_defaults_and_survives_corruption() {
    let conn = setup();
    assert_eq!(get_monthly_budget(&conn).unwrap(), Decimal::from(3000));

    set_setting(&conn, "monthly_budget", "4500").unwrap();
    assert_eq!(get_monthly_budget(&conn).unwrap(), Decimal::from(4500));

    set_setting(&conn, "monthly_budget", "not-a-number").unwrap();
    assert_eq!(get_monthly_budget(&conn).unwrap(), Decimal::from(3000));
}

#[test]
fn bad_stored_amounts_read_as_zero() {
    let conn = setup();
    conn.execute(
        "INSERT INTO transactions(date, amount, category, merchant) VALUES('2025-08-25','garbage','food','坏数据')",
        [],
    )
    .unwrap();
    let ledger = load_ledger(&conn).unwrap();
    assert_eq!(ledger[0].amount, Decimal::ZERO);

    // The coercion itself
    assert_eq!(decimal_or_zero("12.5"), "12.5".parse().unwrap());
    assert_eq!(decimal_or_zero("NaN"), Decimal::ZERO);
    assert_eq!(decimal_or_zero(""), Decimal::ZERO);
}

#[test]
fn unknown_category_rows_degrade_to_other() {
    let conn = setup();
    conn.execute(
        "INSERT INTO transactions(date, amount, category, merchant) VALUES('2025-08-25','5','legacy-tag','旧数据')",
        [],
    )
    .unwrap();
    let ledger = load_ledger(&conn).unwrap();
    assert_eq!(ledger[0].category, Category::Other);
}
