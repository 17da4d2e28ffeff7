// Copyright (c) 2025 Smartbill.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{bail, Result};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::json;

use crate::context::build_context;
use crate::utils::{
    get_monthly_budget, load_ledger, maybe_print_json, parse_decimal, pretty_table,
    set_monthly_budget, today,
};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    if amount <= Decimal::ZERO {
        bail!("Budget must be positive");
    }
    set_monthly_budget(conn, amount)?;
    println!("Monthly budget set to ¥{}", amount);
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let ledger = load_ledger(conn)?;
    let budget = get_monthly_budget(conn)?;
    let ctx = build_context(&ledger, budget, today());

    let payload = json!({
        "as_of": ctx.as_of.to_string(),
        "monthly_budget": ctx.monthly_budget.to_string(),
        "month_expense": ctx.month_expense.to_string(),
        "month_income": ctx.month_income.to_string(),
        "net": ctx.net.to_string(),
        "remaining": ctx.remaining.to_string(),
        "usage_pct": ctx.usage_pct,
    });
    if !maybe_print_json(json_flag, jsonl_flag, &payload)? {
        let rows = vec![
            vec!["月度预算".to_string(), format!("¥{}", ctx.monthly_budget)],
            vec!["本月已消费".to_string(), format!("¥{}", ctx.month_expense)],
            vec!["本月收入".to_string(), format!("¥{}", ctx.month_income)],
            vec!["剩余可用".to_string(), format!("¥{}", ctx.remaining)],
            vec!["使用进度".to_string(), format!("{}%", ctx.usage_pct)],
        ];
        println!("{}", pretty_table(&["Item", "Value"], rows));
    }
    Ok(())
}
