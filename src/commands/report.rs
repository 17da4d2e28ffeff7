// Copyright (c) 2025 Smartbill.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;

use crate::context::build_context;
use crate::utils::{
    get_monthly_budget, load_ledger, maybe_print_json, parse_date, pretty_table, today,
};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, sub)?,
        Some(("context", sub)) => grounding(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn as_of(sub: &clap::ArgMatches) -> Result<NaiveDate> {
    match sub.get_one::<String>("date") {
        Some(d) => parse_date(d),
        None => Ok(today()),
    }
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let ledger = load_ledger(conn)?;
    let budget = get_monthly_budget(conn)?;
    let ctx = build_context(&ledger, budget, as_of(sub)?);

    let mut rows: Vec<Vec<String>> = ctx
        .top_expense
        .iter()
        .map(|(c, a)| vec!["支出".to_string(), c.label().to_string(), format!("¥{}", a)])
        .collect();
    rows.extend(
        ctx.top_income
            .iter()
            .map(|(c, a)| vec!["收入".to_string(), c.label().to_string(), format!("¥{}", a)]),
    );

    if !maybe_print_json(json_flag, jsonl_flag, &rows)? {
        println!(
            "{} 月支出 ¥{} / 收入 ¥{} / 净额 ¥{} / 预算余 ¥{} ({}%)",
            ctx.as_of,
            ctx.month_expense,
            ctx.month_income,
            ctx.net,
            ctx.remaining,
            ctx.usage_pct
        );
        println!("{}", pretty_table(&["Kind", "Category", "Total"], rows));
    }
    Ok(())
}

/// Prints the grounding text verbatim, exactly as the prompt builder would
/// embed it. Useful for checking what the model is told.
fn grounding(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let ledger = load_ledger(conn)?;
    let budget = get_monthly_budget(conn)?;
    let ctx = build_context(&ledger, budget, as_of(sub)?);
    println!("{}", ctx.render());
    Ok(())
}
