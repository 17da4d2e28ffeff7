// Copyright (c) 2025 Smartbill.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{bail, Result};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::category;
use crate::models::{Category, NewTransaction};
use crate::utils::{
    insert_transaction, maybe_print_json, parse_date, parse_decimal, pretty_table, today,
};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("confirm", sub)) => confirm(conn, sub)?,
        Some(("delete", sub)) => delete(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    if amount <= Decimal::ZERO {
        bail!("Amount must be positive; direction comes from the category");
    }
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => today(),
    };
    let is_income = sub.get_flag("income");
    let raw_cat = sub.get_one::<String>("category").map(|s| s.as_str());
    let cat = match raw_cat {
        Some(s) => Category::from_key(s).unwrap_or_else(|| category::normalize(s)),
        None => Category::Other,
    };
    let cat = category::reconcile_income_flag(cat, is_income);
    let merchant = sub
        .get_one::<String>("merchant")
        .cloned()
        .unwrap_or_else(|| "手动记账".to_string());

    let id = insert_transaction(
        conn,
        &NewTransaction {
            date,
            amount,
            category: cat,
            merchant: merchant.clone(),
            is_auto_imported: false,
            need_confirmation: false,
        },
    )?;
    println!(
        "Recorded #{}: {} ¥{} at '{}' on {}",
        id,
        cat.label(),
        amount,
        merchant,
        date
    );
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub merchant: String,
    pub amount: String,
    pub category: String,
    pub auto_imported: bool,
    pub pending: bool,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.merchant.clone(),
                    r.amount.clone(),
                    r.category.clone(),
                    if r.pending { "待确认".into() } else { "".into() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Date", "Merchant", "Amount", "Category", "Status"], rows)
        );
    }
    Ok(())
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let mut sql = String::from(
        "SELECT id, date, amount, category, merchant, is_auto_imported, need_confirmation
         FROM transactions WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();

    if let Some(month) = sub.get_one::<String>("month") {
        sql.push_str(" AND substr(date,1,7)=?");
        params_vec.push(month.into());
    }
    if let Some(cat) = sub.get_one::<String>("category") {
        let key = Category::from_key(cat)
            .unwrap_or_else(|| category::normalize(cat))
            .key();
        sql.push_str(" AND category=?");
        params_vec.push(key.into());
    }
    if sub.get_flag("pending") {
        sql.push_str(" AND need_confirmation=1");
    }
    sql.push_str(" ORDER BY id DESC");
    if let Some(limit) = sub.get_one::<usize>("limit") {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = if params_vec.is_empty() {
        stmt.query([])?
    } else {
        let params: Vec<&dyn rusqlite::ToSql> = params_vec
            .iter()
            .map(|s| s as &dyn rusqlite::ToSql)
            .collect();
        stmt.query(rusqlite::params_from_iter(params))?
    };

    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let date: String = r.get(1)?;
        let amount: String = r.get(2)?;
        let category_key: String = r.get(3)?;
        let merchant: String = r.get(4)?;
        let auto: i64 = r.get(5)?;
        let pending: i64 = r.get(6)?;
        let category = Category::from_key(&category_key)
            .unwrap_or(Category::Other)
            .label()
            .to_string();
        data.push(TransactionRow {
            id,
            date,
            merchant,
            amount,
            category,
            auto_imported: auto != 0,
            pending: pending != 0,
        });
    }
    Ok(data)
}

/// Confirming is the only mutation a ledger entry supports besides delete.
fn confirm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let n = conn.execute(
        "UPDATE transactions SET need_confirmation=0 WHERE id=?1",
        params![id],
    )?;
    if n == 0 {
        bail!("No transaction with id {}", id);
    }
    println!("Confirmed #{id}");
    Ok(())
}

fn delete(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let n = conn.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    if n == 0 {
        bail!("No transaction with id {}", id);
    }
    println!("Deleted #{id}");
    Ok(())
}
